use eframe::egui;
use pdf_pages::PageRef;

/// Fixed-footprint page cell: the rendered artifact when available, a
/// placeholder otherwise, with the page number underneath. Senses both
/// clicks and drags so callers can wire either gesture.
pub fn page_cell(
    ui: &mut egui::Ui,
    page: &PageRef,
    texture: Option<&egui::TextureHandle>,
    cell: f32,
) -> egui::Response {
    let size = egui::vec2(cell, cell * 1.35 + 18.0);
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());

    if ui.is_rect_visible(rect) {
        let painter = ui.painter();
        let image_rect =
            egui::Rect::from_min_max(rect.min, egui::pos2(rect.max.x, rect.max.y - 18.0));
        painter.rect_filled(
            image_rect,
            egui::CornerRadius::same(2),
            ui.visuals().extreme_bg_color,
        );
        painter.rect_stroke(
            image_rect,
            egui::CornerRadius::same(2),
            ui.visuals().widgets.inactive.bg_stroke,
            egui::StrokeKind::Inside,
        );

        if let Some(texture) = texture {
            let tex_size = texture.size_vec2();
            let scale = (image_rect.width() / tex_size.x)
                .min(image_rect.height() / tex_size.y)
                .min(1.0);
            let draw_rect = egui::Rect::from_center_size(image_rect.center(), tex_size * scale);
            painter.image(
                texture.id(),
                draw_rect,
                egui::Rect::from_min_max(egui::Pos2::ZERO, egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        } else {
            painter.text(
                image_rect.center(),
                egui::Align2::CENTER_CENTER,
                "⏳",
                egui::FontId::proportional(20.0),
                ui.visuals().weak_text_color(),
            );
        }

        painter.text(
            egui::pos2(rect.center().x, rect.max.y - 9.0),
            egui::Align2::CENTER_CENTER,
            format!("p{}", page.id.page_index + 1),
            egui::FontId::proportional(12.0),
            ui.visuals().text_color(),
        );

        if response.hovered() {
            ui.painter().rect_stroke(
                rect,
                egui::CornerRadius::same(2),
                ui.visuals().widgets.hovered.bg_stroke,
                egui::StrokeKind::Outside,
            );
        }
    }

    response.on_hover_cursor(egui::CursorIcon::Grab)
}
