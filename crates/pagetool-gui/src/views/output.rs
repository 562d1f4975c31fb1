use eframe::egui;
use pdf_pages::{PageCollection, PageId, PageRef, Point};
use std::collections::HashMap;

use super::widgets::page_cell;
use crate::app::TextureKey;

pub enum OutputAction {
    /// Drag released over the output area; centers are the rendered widget
    /// centers in collection order.
    Drop { point: Point, centers: Vec<Point> },
    Rotate { id: PageId, delta: i32 },
    Remove(PageId),
    Clear,
    StartDrag(PageRef),
    RequestThumbnail(PageRef),
}

pub fn show_output(
    ui: &mut egui::Ui,
    output: &PageCollection,
    textures: &HashMap<TextureKey, egui::TextureHandle>,
    cell: f32,
    dragging: bool,
    actions: &mut Vec<OutputAction>,
) {
    ui.horizontal(|ui| {
        ui.strong("Output");
        ui.label(format!("{} pages", output.len()));
        if ui
            .add_enabled(!output.is_empty(), egui::Button::new("Clear").small())
            .clicked()
        {
            actions.push(OutputAction::Clear);
        }
    });
    ui.separator();

    let mut centers = Vec::with_capacity(output.len());

    let area = egui::ScrollArea::vertical()
        .id_salt("output_scroll")
        .show(ui, |ui| {
            // Keep a drop target even when nothing is assembled yet
            ui.set_min_size(egui::vec2(ui.available_width(), cell * 1.6));

            if output.is_empty() {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.label("Drag pages here or double-click them in a source");
                });
                return;
            }

            ui.horizontal_wrapped(|ui| {
                for page in output.pages() {
                    let texture = textures.get(&(page.id.clone(), page.rotation));
                    if texture.is_none() {
                        actions.push(OutputAction::RequestThumbnail(page.clone()));
                    }
                    let response = page_cell(ui, page, texture, cell);
                    let center = response.rect.center();
                    centers.push(Point::new(center.x, center.y));

                    if response.drag_started() {
                        actions.push(OutputAction::StartDrag(page.clone()));
                    }

                    let id = page.id.clone();
                    response.context_menu(|ui| {
                        if ui.button("Rotate right 90°").clicked() {
                            actions.push(OutputAction::Rotate {
                                id: id.clone(),
                                delta: 90,
                            });
                            ui.close();
                        }
                        if ui.button("Rotate left 90°").clicked() {
                            actions.push(OutputAction::Rotate {
                                id: id.clone(),
                                delta: -90,
                            });
                            ui.close();
                        }
                        if ui.button("Rotate 180°").clicked() {
                            actions.push(OutputAction::Rotate {
                                id: id.clone(),
                                delta: 180,
                            });
                            ui.close();
                        }
                        ui.separator();
                        if ui.button("Remove").clicked() {
                            actions.push(OutputAction::Remove(id.clone()));
                            ui.close();
                        }
                    });
                }
            });
        });

    if dragging {
        let released = ui.input(|i| i.pointer.any_released());
        let pointer = ui.input(|i| i.pointer.interact_pos());
        if released {
            if let Some(pos) = pointer {
                if area.inner_rect.contains(pos) {
                    actions.push(OutputAction::Drop {
                        point: Point::new(pos.x, pos.y),
                        centers,
                    });
                }
            }
        }
    }
}
