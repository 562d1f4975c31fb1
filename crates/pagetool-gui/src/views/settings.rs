use eframe::egui;
use pdf_pages::Preferences;

pub enum SettingsAction {
    Apply(Preferences),
}

pub fn show_settings(
    ctx: &egui::Context,
    open: &mut bool,
    draft: &mut Preferences,
    actions: &mut Vec<SettingsAction>,
) {
    let mut apply = false;
    egui::Window::new("Settings")
        .open(open)
        .resizable(false)
        .show(ctx, |ui| {
            egui::Grid::new("settings_grid")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Thumbnail size (px)");
                    ui.add(egui::Slider::new(&mut draft.thumbnail_size, 64..=512));
                    ui.end_row();

                    ui.label("Cache size (MB)");
                    ui.add(egui::Slider::new(&mut draft.cache_size_mb, 50..=1000));
                    ui.end_row();

                    ui.label("Batch threads");
                    ui.add(egui::Slider::new(&mut draft.thread_count, 1..=16));
                    ui.end_row();
                });
            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Apply").clicked() {
                    apply = true;
                }
                if ui.button("Defaults").clicked() {
                    *draft = Preferences::default();
                }
            });
        });
    if apply {
        actions.push(SettingsAction::Apply(*draft));
    }
}
