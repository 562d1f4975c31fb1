mod batch;
mod input;
mod log;
mod output;
mod settings;
mod widgets;

pub use batch::{BatchAction, BatchChoice, show_batch};
pub use input::{InputAction, show_input};
pub use log::show_log;
pub use output::{OutputAction, show_output};
pub use settings::{SettingsAction, show_settings};
