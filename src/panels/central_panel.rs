use egui::{CursorIcon, Sense};

use crate::CanvasApp;
use crate::geometry::hit_testing::{corner_handle_at, crop_handle_at};

pub fn central_panel(app: &mut CanvasApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
            let canvas_rect = response.rect;
            app.state.workspace_size = canvas_rect.size();

            if app.files.check_for_dropped_files(ctx) {
                let drop_point = ctx
                    .input(|input| input.pointer.hover_pos())
                    .filter(|pos| canvas_rect.contains(*pos))
                    .unwrap_or(canvas_rect.center());
                let (images, errors) = app.files.process_dropped_files((drop_point - canvas_rect.min).to_pos2());
                for image in images {
                    app.state.add_layer(image.bitmap, image.position);
                }
                if let Some(err) = errors.last() {
                    app.status = Some(err.to_string());
                }
            }

            let (pointer_events, key_events) = app.input.process_input(ctx, canvas_rect);
            for event in pointer_events {
                let result = app.controller.handle_pointer(event, &mut app.state);
                app.report(result);
            }
            for event in key_events {
                let result = app.controller.handle_key(event, &mut app.state);
                app.report(result);
            }

            if let Some(hover) = response.hover_pos() {
                let pos = (hover - canvas_rect.min).to_pos2();
                let radius = app.state.config.handle_radius;
                let cursor = if let Some(session) = app.controller.crop_session() {
                    crop_handle_at(session.crop_box(), pos, radius).map(|handle| handle.cursor_icon())
                } else {
                    app.state
                        .selected_layer()
                        .and_then(|layer| corner_handle_at(layer.rect(), pos, radius))
                        .map(|corner| corner.cursor_icon())
                };
                ctx.set_cursor_icon(cursor.unwrap_or(CursorIcon::Default));
            }

            app.renderer
                .render(ctx, &painter, canvas_rect, &app.state, &app.controller);
        });
}
