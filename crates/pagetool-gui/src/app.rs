use eframe::egui;
use pagetool_runtime::{PageToolCommand, PageToolUpdate};
use pdf_pages::{
    BatchStatus, CancelFlag, ChangeKind, DragPayload, DropOutcome, DropRejection, PageCollection,
    PageId, PageRef, Rotation, resolve_drop,
};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::logger::AppLogger;
use crate::settings::{self, StoredSettings};
use crate::views::{
    BatchAction, BatchChoice, InputAction, OutputAction, SettingsAction, show_batch, show_input,
    show_log, show_output, show_settings,
};

/// Texture key: logical page plus the rotation baked into the pixels.
pub type TextureKey = (PageId, Rotation);

/// One opened source file and its read-only page list.
pub struct SourceEntry {
    pub path: PathBuf,
    pub pages: PageCollection,
}

impl SourceEntry {
    pub fn title(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Clone)]
struct ProgressState {
    operation: String,
    current: usize,
    total: usize,
}

pub struct PageToolApp {
    sources: Vec<SourceEntry>,
    output: PageCollection,
    output_changes: std::sync::mpsc::Receiver<(ChangeKind, usize)>,

    textures: HashMap<TextureKey, egui::TextureHandle>,
    pending_thumbs: HashSet<TextureKey>,
    failed_thumbs: HashSet<TextureKey>,
    thumbs_available: bool,

    drag: Option<DragPayload>,
    status: String,
    progress: Option<ProgressState>,

    stored: StoredSettings,
    prefs_draft: pdf_pages::Preferences,
    settings_open: bool,
    log_open: bool,
    batch_open: bool,
    batch_choice: BatchChoice,
    batch_rotation: Rotation,
    batch_cancel: Option<CancelFlag>,

    logger: AppLogger,

    // Async infrastructure
    command_tx: mpsc::UnboundedSender<PageToolCommand>,
    update_rx: mpsc::UnboundedReceiver<PageToolUpdate>,
    _tokio: tokio::runtime::Runtime,
}

impl PageToolApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, logger: AppLogger) -> anyhow::Result<Self> {
        let stored = settings::load();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(stored.prefs.thread_count.max(1))
            .build()?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        runtime.spawn(crate::worker::worker_task(command_rx, update_tx));

        // Structural changes surface in the status bar through this channel
        let (change_tx, change_rx) = std::sync::mpsc::channel();
        let mut output = PageCollection::new_output();
        output.subscribe(move |pages, kind| {
            let _ = change_tx.send((kind.clone(), pages.len()));
        });

        let _ = command_tx.send(PageToolCommand::ApplySettings {
            prefs: stored.prefs,
        });

        Ok(Self {
            sources: Vec::new(),
            output,
            output_changes: change_rx,
            textures: HashMap::new(),
            pending_thumbs: HashSet::new(),
            failed_thumbs: HashSet::new(),
            thumbs_available: true,
            drag: None,
            status: String::new(),
            progress: None,
            prefs_draft: stored.prefs,
            stored,
            settings_open: false,
            log_open: false,
            batch_open: false,
            batch_choice: BatchChoice::default(),
            batch_rotation: Rotation::Clockwise90,
            batch_cancel: None,
            logger,
            command_tx,
            update_rx,
            _tokio: runtime,
        })
    }

    fn send(&self, cmd: PageToolCommand) {
        let _ = self.command_tx.send(cmd);
    }

    fn open_file(&mut self, path: PathBuf) {
        self.status = format!("Loading {}...", path.display());
        self.send(PageToolCommand::LoadSource { path });
    }

    fn request_thumbnail(&mut self, page: &PageRef) {
        if !self.thumbs_available {
            return;
        }
        let key = (page.id.clone(), page.rotation);
        if self.textures.contains_key(&key)
            || self.pending_thumbs.contains(&key)
            || self.failed_thumbs.contains(&key)
        {
            return;
        }
        self.pending_thumbs.insert(key);
        let size = self.stored.prefs.thumbnail_size;
        self.send(PageToolCommand::RenderThumbnail {
            page: page.clone(),
            target: (size, size * 3 / 2),
        });
    }

    fn install_texture(&mut self, ctx: &egui::Context, page: PageRef, artifact: PathBuf) {
        let key = (page.id.clone(), page.rotation);
        self.pending_thumbs.remove(&key);
        match image::open(&artifact) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                let color = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                let name = format!("thumb:{}:{}", page.id, page.rotation.degrees());
                self.textures
                    .insert(key, ctx.load_texture(name, color, Default::default()));
            }
            Err(e) => {
                log::warn!("failed to load artifact {}: {e}", artifact.display());
                self.failed_thumbs.insert(key);
            }
        }
    }

    fn close_source(&mut self, slot: usize) {
        if slot >= self.sources.len() {
            return;
        }
        let entry = self.sources.remove(slot);
        // Output pages from a closed source can no longer be merged
        let orphaned: Vec<PageId> = self
            .output
            .pages()
            .iter()
            .filter(|p| p.id.source == entry.path)
            .map(|p| p.id.clone())
            .collect();
        for id in &orphaned {
            let _ = self.output.remove(id);
        }
        self.textures.retain(|(id, _), _| id.source != entry.path);
        self.pending_thumbs.retain(|(id, _)| id.source != entry.path);
        self.failed_thumbs.retain(|(id, _)| id.source != entry.path);
        log::info!("closed {}", entry.path.display());
    }

    fn handle_file_drops(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        for path in dropped {
            if path.extension().and_then(|s| s.to_str()) == Some("pdf") {
                self.open_file(path);
            } else {
                log::info!("ignoring non-PDF drop: {}", path.display());
            }
        }
    }

    fn drain_updates(&mut self, ctx: &egui::Context) {
        while let Ok(update) = self.update_rx.try_recv() {
            match update {
                PageToolUpdate::SourceLoaded { path, page_count } => {
                    if self.sources.iter().any(|s| s.path == path) {
                        self.status = format!("{} is already open", path.display());
                        continue;
                    }
                    self.stored.remember_recent(&path);
                    if let Err(e) = settings::save(&self.stored) {
                        log::warn!("failed to save settings: {e}");
                    }
                    self.status = format!("Loaded {} ({page_count} pages)", path.display());
                    self.sources.push(SourceEntry {
                        pages: PageCollection::from_source(&path, page_count),
                        path,
                    });
                }
                PageToolUpdate::SourceFailed { path, message } => {
                    self.status = format!("Failed to open {}: {message}", path.display());
                }
                PageToolUpdate::ThumbnailReady { page, artifact } => {
                    self.install_texture(ctx, page, artifact);
                }
                PageToolUpdate::ThumbnailFailed { page, .. } => {
                    let key = (page.id, page.rotation);
                    self.pending_thumbs.remove(&key);
                    self.failed_thumbs.insert(key);
                }
                PageToolUpdate::ThumbnailsUnavailable { message } => {
                    self.thumbs_available = false;
                    self.pending_thumbs.clear();
                    self.status = format!("Thumbnails unavailable: {message}");
                }
                PageToolUpdate::Progress {
                    operation,
                    current,
                    total,
                } => {
                    self.progress = Some(ProgressState {
                        operation,
                        current,
                        total,
                    });
                    ctx.request_repaint();
                }
                PageToolUpdate::MergeComplete { path, page_count } => {
                    self.progress = None;
                    self.status = format!("Merged {page_count} pages → {}", path.display());
                }
                PageToolUpdate::BatchFinished { report } => {
                    self.batch_cancel = None;
                    self.progress = None;
                    for (file, message) in &report.failures {
                        log::warn!("batch skipped {}: {message}", file.display());
                    }
                    self.status = match report.status {
                        BatchStatus::Completed => format!(
                            "Batch complete: {}/{} files succeeded",
                            report.succeeded, report.total
                        ),
                        BatchStatus::Canceled => format!(
                            "Batch canceled after {} of {} files",
                            report.processed, report.total
                        ),
                    };
                }
                PageToolUpdate::Error { message } => {
                    self.progress = None;
                    self.status = format!("Error: {message}");
                }
            }
        }
    }

    fn drain_output_changes(&mut self) {
        while let Ok((kind, len)) = self.output_changes.try_recv() {
            self.status = match kind {
                ChangeKind::Added(page) => format!("Added {} ({len} in output)", page.id),
                ChangeKind::Removed(page) => format!("Removed {}", page.id),
                ChangeKind::Reordered { from, to } => {
                    format!("Moved position {} → {}", from + 1, to + 1)
                }
                ChangeKind::Rotated(id) => format!("Rotated {id}"),
                ChangeKind::Cleared => "Cleared output".to_string(),
            };
        }
    }

    fn apply_input_actions(&mut self, actions: Vec<InputAction>) {
        for action in actions {
            match action {
                InputAction::SendToOutput(page) => {
                    if let Err(e) = self.output.append(page) {
                        self.status = e.to_string();
                    }
                }
                InputAction::SendAll(slot) => {
                    let pages = match self.sources.get(slot) {
                        Some(source) => source.pages.snapshot(),
                        None => continue,
                    };
                    let mut added = 0;
                    for page in pages {
                        if self.output.append(page).is_ok() {
                            added += 1;
                        }
                    }
                    self.status = format!("Added {added} pages");
                }
                InputAction::CloseSource(slot) => self.close_source(slot),
                InputAction::StartDrag(page) => {
                    self.drag = Some(DragPayload::ExistingPage(page));
                }
                InputAction::RequestThumbnail(page) => self.request_thumbnail(&page),
            }
        }
    }

    fn apply_output_actions(&mut self, actions: Vec<OutputAction>) {
        for action in actions {
            match action {
                OutputAction::Drop { point, centers } => {
                    if let Some(payload) = self.drag.take() {
                        match resolve_drop(&mut self.output, payload, point, &centers) {
                            DropOutcome::Rejected(DropRejection::Duplicate(id)) => {
                                self.status = format!("Already in output: {id}");
                            }
                            DropOutcome::Rejected(DropRejection::ExternalFiles(paths)) => {
                                for path in paths {
                                    self.open_file(path);
                                }
                            }
                            DropOutcome::Inserted { .. }
                            | DropOutcome::Moved { .. }
                            | DropOutcome::NoOp => {}
                        }
                    }
                }
                OutputAction::Rotate { id, delta } => match self.output.rotate(&id, delta) {
                    Ok(_) => {
                        self.textures.retain(|(tid, _), _| *tid != id);
                        self.pending_thumbs.retain(|(tid, _)| *tid != id);
                        self.failed_thumbs.retain(|(tid, _)| *tid != id);
                        self.send(PageToolCommand::InvalidatePage { id: id.clone() });
                        let page = self
                            .output
                            .index_of(&id)
                            .and_then(|i| self.output.get(i))
                            .cloned();
                        if let Some(page) = page {
                            self.request_thumbnail(&page);
                        }
                    }
                    Err(e) => self.status = e.to_string(),
                },
                OutputAction::Remove(id) => {
                    let _ = self.output.remove(&id);
                }
                OutputAction::Clear => self.output.clear(),
                OutputAction::StartDrag(page) => {
                    self.drag = Some(DragPayload::ExistingPage(page));
                }
                OutputAction::RequestThumbnail(page) => self.request_thumbnail(&page),
            }
        }
    }

    fn apply_settings_actions(&mut self, actions: Vec<SettingsAction>) {
        for action in actions {
            match action {
                SettingsAction::Apply(prefs) => {
                    let old = self.stored.prefs;
                    self.stored.prefs = prefs;
                    if let Err(e) = settings::save(&self.stored) {
                        log::warn!("failed to save settings: {e}");
                    }
                    self.send(PageToolCommand::ApplySettings { prefs });
                    if old.thumbnail_size != prefs.thumbnail_size {
                        self.textures.clear();
                        self.pending_thumbs.clear();
                        self.failed_thumbs.clear();
                    }
                    self.status = "Settings applied".to_string();
                }
            }
        }
    }

    fn apply_batch_actions(&mut self, actions: Vec<BatchAction>) {
        for action in actions {
            match action {
                BatchAction::Start(job) => {
                    let cancel = CancelFlag::new();
                    self.batch_cancel = Some(cancel.clone());
                    self.status = format!("Batch started: {} files", job.files.len());
                    self.send(PageToolCommand::RunBatch { job, cancel });
                }
                BatchAction::Cancel => {
                    if let Some(flag) = &self.batch_cancel {
                        flag.cancel();
                        self.status = "Canceling batch...".to_string();
                    }
                }
            }
        }
    }

    fn show_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open PDF…").clicked() {
                    if let Some(paths) = rfd::FileDialog::new()
                        .add_filter("PDF", &["pdf"])
                        .pick_files()
                    {
                        for path in paths {
                            self.open_file(path);
                        }
                    }
                }

                ui.menu_button("Recent", |ui| {
                    if self.stored.recent_files.is_empty() {
                        ui.label("No recent files");
                    }
                    let recent = self.stored.recent_files.clone();
                    for path in recent {
                        if ui.button(path.display().to_string()).clicked() {
                            self.open_file(path);
                            ui.close();
                        }
                    }
                });

                ui.separator();

                let can_merge = !self.output.is_empty() && self.progress.is_none();
                if ui
                    .add_enabled(can_merge, egui::Button::new("Merge…"))
                    .clicked()
                {
                    if let Some(output_path) = rfd::FileDialog::new()
                        .add_filter("PDF", &["pdf"])
                        .set_file_name("merged.pdf")
                        .save_file()
                    {
                        self.send(PageToolCommand::Merge {
                            pages: self.output.snapshot(),
                            output_path,
                        });
                        self.status = "Merging...".to_string();
                    }
                }

                if ui.button("Batch…").clicked() {
                    self.batch_open = true;
                }

                ui.separator();

                if ui.button("Settings").clicked() {
                    self.prefs_draft = self.stored.prefs;
                    self.settings_open = true;
                }
                if ui.button("Log").clicked() {
                    self.log_open = !self.log_open;
                }
            });
        });
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            if let Some(progress) = &self.progress {
                ui.label(&progress.operation);
                ui.add(
                    egui::ProgressBar::new(
                        progress.current as f32 / progress.total.max(1) as f32,
                    )
                    .show_percentage(),
                );
            }
            if !self.status.is_empty() {
                ui.label(&self.status);
            }
        });
    }

    fn paint_drag_ghost(&self, ctx: &egui::Context) {
        let Some(DragPayload::ExistingPage(page)) = &self.drag else {
            return;
        };
        if let Some(pos) = ctx.input(|i| i.pointer.interact_pos()) {
            let painter = ctx.layer_painter(egui::LayerId::new(
                egui::Order::Tooltip,
                egui::Id::new("drag_ghost"),
            ));
            painter.text(
                pos + egui::vec2(14.0, 14.0),
                egui::Align2::LEFT_TOP,
                format!("{}", page.id),
                egui::FontId::proportional(12.0),
                ctx.style().visuals.strong_text_color(),
            );
        }
    }
}

impl eframe::App for PageToolApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_file_drops(ctx);
        self.drain_updates(ctx);
        self.drain_output_changes();

        let cell = self.stored.prefs.thumbnail_size as f32;
        let mut input_actions = Vec::new();
        let mut output_actions = Vec::new();
        let mut settings_actions = Vec::new();
        let mut batch_actions = Vec::new();

        self.show_toolbar(ctx);
        self.show_status_bar(ctx);

        egui::SidePanel::left("input_panel")
            .default_width(cell * 2.4)
            .show(ctx, |ui| {
                ui.strong("Sources");
                ui.separator();
                show_input(ui, &self.sources, &self.textures, cell, &mut input_actions);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            show_output(
                ui,
                &self.output,
                &self.textures,
                cell,
                self.drag.is_some(),
                &mut output_actions,
            );
        });

        show_settings(
            ctx,
            &mut self.settings_open,
            &mut self.prefs_draft,
            &mut settings_actions,
        );
        let batch_files: Vec<PathBuf> = self.sources.iter().map(|s| s.path.clone()).collect();
        show_batch(
            ctx,
            &mut self.batch_open,
            &mut self.batch_choice,
            &mut self.batch_rotation,
            &batch_files,
            self.batch_cancel.is_some(),
            &mut batch_actions,
        );
        show_log(ctx, &mut self.log_open, &self.logger);

        self.apply_output_actions(output_actions);
        self.apply_input_actions(input_actions);
        self.apply_settings_actions(settings_actions);
        self.apply_batch_actions(batch_actions);

        self.paint_drag_ghost(ctx);
        if self.drag.is_some() && ctx.input(|i| i.pointer.any_released()) {
            self.drag = None;
        }

        // Keep polling while background work is outstanding
        if self.progress.is_some() || !self.pending_thumbs.is_empty() || self.batch_cancel.is_some()
        {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
