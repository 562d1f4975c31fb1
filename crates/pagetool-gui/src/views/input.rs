use eframe::egui;
use pdf_pages::PageRef;
use std::collections::HashMap;

use super::widgets::page_cell;
use crate::app::{SourceEntry, TextureKey};

pub enum InputAction {
    SendToOutput(PageRef),
    SendAll(usize),
    CloseSource(usize),
    StartDrag(PageRef),
    RequestThumbnail(PageRef),
}

pub fn show_input(
    ui: &mut egui::Ui,
    sources: &[SourceEntry],
    textures: &HashMap<TextureKey, egui::TextureHandle>,
    cell: f32,
    actions: &mut Vec<InputAction>,
) {
    if sources.is_empty() {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.label("Open a PDF or drop files here to begin");
        });
        return;
    }

    egui::ScrollArea::vertical()
        .id_salt("input_scroll")
        .show(ui, |ui| {
            for (slot, source) in sources.iter().enumerate() {
                ui.horizontal(|ui| {
                    ui.strong(source.title());
                    ui.label(format!("{} pages", source.pages.len()));
                    if ui.small_button("Add all").clicked() {
                        actions.push(InputAction::SendAll(slot));
                    }
                    if ui.small_button("Close").clicked() {
                        actions.push(InputAction::CloseSource(slot));
                    }
                });
                ui.horizontal_wrapped(|ui| {
                    for page in source.pages.pages() {
                        let texture = textures.get(&(page.id.clone(), page.rotation));
                        if texture.is_none() {
                            actions.push(InputAction::RequestThumbnail(page.clone()));
                        }
                        let response = page_cell(ui, page, texture, cell);
                        if response.drag_started() {
                            actions.push(InputAction::StartDrag(page.clone()));
                        }
                        if response.double_clicked() {
                            actions.push(InputAction::SendToOutput(page.clone()));
                        }
                        let _ = response.on_hover_text(format!("{}\nDouble-click to add", page.id));
                    }
                });
                ui.separator();
            }
        });
}
