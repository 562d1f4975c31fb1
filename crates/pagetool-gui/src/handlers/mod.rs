pub mod batch;
pub mod merge;
pub mod sources;
pub mod thumbnails;
