use eframe::egui;
use pdf_pages::{BatchJob, BatchOperation, Rotation};
use std::path::PathBuf;

pub enum BatchAction {
    Start(BatchJob),
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchChoice {
    #[default]
    Split,
    Rotate,
    MergeAll,
    Optimize,
}

/// Batch dialog: run one operation over every open source file. Page-level
/// extraction across files stays in the CLI.
pub fn show_batch(
    ctx: &egui::Context,
    open: &mut bool,
    choice: &mut BatchChoice,
    rotation: &mut Rotation,
    files: &[PathBuf],
    running: bool,
    actions: &mut Vec<BatchAction>,
) {
    egui::Window::new("Batch")
        .open(open)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("{} source file(s) loaded", files.len()));
            ui.separator();

            ui.horizontal(|ui| {
                ui.selectable_value(choice, BatchChoice::Split, "Split");
                ui.selectable_value(choice, BatchChoice::Rotate, "Rotate");
                ui.selectable_value(choice, BatchChoice::MergeAll, "Merge all");
                ui.selectable_value(choice, BatchChoice::Optimize, "Optimize");
            });

            if *choice == BatchChoice::Rotate {
                ui.horizontal(|ui| {
                    ui.selectable_value(rotation, Rotation::Clockwise90, "90°");
                    ui.selectable_value(rotation, Rotation::Clockwise180, "180°");
                    ui.selectable_value(rotation, Rotation::Clockwise270, "270°");
                });
            }

            ui.separator();

            if running {
                if ui.button("Cancel").clicked() {
                    actions.push(BatchAction::Cancel);
                }
            } else if ui
                .add_enabled(!files.is_empty(), egui::Button::new("Run…"))
                .clicked()
            {
                let operation = match *choice {
                    BatchChoice::Split => rfd::FileDialog::new()
                        .pick_folder()
                        .map(|output_dir| BatchOperation::Split { output_dir }),
                    BatchChoice::Rotate => {
                        rfd::FileDialog::new()
                            .pick_folder()
                            .map(|output_dir| BatchOperation::RotateAll {
                                rotation: *rotation,
                                output_dir,
                            })
                    }
                    BatchChoice::Optimize => rfd::FileDialog::new()
                        .pick_folder()
                        .map(|output_dir| BatchOperation::Optimize { output_dir }),
                    BatchChoice::MergeAll => rfd::FileDialog::new()
                        .add_filter("PDF", &["pdf"])
                        .set_file_name("merged.pdf")
                        .save_file()
                        .map(|output| BatchOperation::MergeAll { output }),
                };
                if let Some(operation) = operation {
                    actions.push(BatchAction::Start(BatchJob {
                        files: files.to_vec(),
                        operation,
                    }));
                }
            }
        });
}
