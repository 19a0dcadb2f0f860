use egui::{Button, Slider};

use crate::CanvasApp;
use crate::app::GenerationStatus;
use crate::state::ToolKind;

pub fn tools_panel(app: &mut CanvasApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(240.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                tool_section(app, ui);
                ui.separator();
                layer_section(app, ui);
                ui.separator();
                stroke_section(app, ui);
                ui.separator();
                preset_section(app, ui);
                ui.separator();
                generate_section(app, ui);

                if let Some(status) = app.status.clone() {
                    ui.separator();
                    ui.horizontal(|ui| {
                        ui.colored_label(egui::Color32::LIGHT_RED, status);
                        if ui.small_button("✖").clicked() {
                            app.status = None;
                        }
                    });
                }
            });
        });
}

fn tool_section(app: &mut CanvasApp, ui: &mut egui::Ui) {
    ui.heading("Tools");
    ui.horizontal(|ui| {
        for tool in [ToolKind::Select, ToolKind::Draw] {
            if ui.selectable_label(app.state.active_tool() == tool, tool.name()).clicked() {
                log::info!("Tool selected from UI: {}", tool.name());
                let result = app.controller.set_tool(tool, &mut app.state);
                app.report(result);
            }
        }
    });
    ui.label(format!("State: {}", app.controller.state_name()));

    ui.horizontal(|ui| {
        ui.label("Color:");
        egui::color_picker::color_edit_button_srgba(
            ui,
            &mut app.state.brush.color,
            egui::color_picker::Alpha::OnlyBlend,
        );
    });
    ui.horizontal(|ui| {
        ui.label("Thickness:");
        ui.add(Slider::new(&mut app.state.brush.width, 1.0..=50.0));
    });
}

fn layer_section(app: &mut CanvasApp, ui: &mut egui::Ui) {
    ui.heading("Layers");
    let idle = app.controller.gesture().is_idle();

    // Top of the stack first, like the canvas reads
    let layers: Vec<_> = app.state.layers.iter().rev().map(|layer| layer.id()).collect();
    for id in layers {
        let selected = app.state.selection().layer() == Some(id);
        if ui.add_enabled(idle, egui::SelectableLabel::new(selected, id.to_string())).clicked() {
            app.state.select_layer(id);
        }
    }

    if let Some(id) = app.state.selection().layer() {
        ui.horizontal(|ui| {
            if ui.add_enabled(idle, Button::new("⬆ Raise")).clicked() {
                let result = app.controller.raise(id, &mut app.state);
                app.report(result);
            }
            if ui.add_enabled(idle, Button::new("⬇ Lower")).clicked() {
                let result = app.controller.lower(id, &mut app.state);
                app.report(result);
            }
        });
        ui.horizontal(|ui| {
            if ui.add_enabled(idle, Button::new("✂ Crop")).clicked() {
                let result = app.controller.start_crop(id, &mut app.state);
                app.report(result);
            }
            if ui.add_enabled(idle, Button::new("🗑 Delete")).clicked() {
                let result = app.controller.delete_layer(id, &mut app.state);
                app.report(result);
            }
        });
    }

    if app.controller.crop_session().is_some() {
        ui.label("Drag the handles, then confirm");
        ui.horizontal(|ui| {
            if ui.button("✔ Apply crop").clicked() {
                let result = app.controller.confirm_crop(&mut app.state);
                app.report(result);
            }
            if ui.button("Cancel").clicked() {
                let result = app.controller.cancel_crop(&mut app.state);
                app.report(result);
            }
        });
    }
}

fn stroke_section(app: &mut CanvasApp, ui: &mut egui::Ui) {
    ui.heading("Drawing");
    ui.label(format!("{} strokes", app.state.strokes.len()));
    let can_edit = !app.controller.is_busy() && !app.state.strokes.is_empty();
    ui.horizontal(|ui| {
        if ui.add_enabled(can_edit, Button::new("↩ Undo stroke")).clicked() {
            let result = app.controller.undo_stroke(&mut app.state);
            app.report(result);
        }
        if ui.add_enabled(can_edit, Button::new("Clear drawing")).clicked() {
            let result = app.controller.clear_strokes(&mut app.state);
            app.report(result);
        }
    });
    let can_clear = app.controller.gesture().is_idle() && !app.state.is_empty();
    if ui.add_enabled(can_clear, Button::new("🧹 Clear canvas")).clicked() {
        let result = app.controller.clear_canvas(&mut app.state);
        app.report(result);
    }
}

fn preset_section(app: &mut CanvasApp, ui: &mut egui::Ui) {
    ui.heading("Presets");
    let Some(presets) = app.presets.as_mut() else {
        ui.label("Presets are unavailable");
        return;
    };

    let mut chosen = None;
    let mut deleted = None;
    for preset in presets.list() {
        ui.horizontal(|ui| {
            if ui.button(&preset.name).on_hover_text(&preset.text).clicked() {
                chosen = Some(preset.text.clone());
            }
            if ui.small_button("🗑").clicked() {
                deleted = Some(preset.id);
            }
        });
    }

    let result = deleted.map(|id| presets.delete(id).map(|_| ()));
    ui.horizontal(|ui| {
        ui.text_edit_singleline(&mut app.preset_name);
        if ui.button("Save prompt").clicked() {
            let saved = presets.save(&app.preset_name, &app.prompt);
            if saved.is_ok() {
                app.preset_name.clear();
            }
            app.status = saved.err().map(|err| err.to_string());
        }
    });

    if let Some(text) = chosen {
        app.prompt = text;
    }
    if let Some(result) = result {
        app.report(result);
    }
}

fn generate_section(app: &mut CanvasApp, ui: &mut egui::Ui) {
    ui.heading("Generate");
    ui.add(
        egui::TextEdit::multiline(&mut app.prompt)
            .hint_text("Describe the result")
            .desired_rows(4),
    );

    let status = app.generation_status();
    let running = matches!(status, GenerationStatus::Running);
    let can_generate = !running && !app.state.is_empty();
    if ui.add_enabled(can_generate, Button::new("✨ Generate")).clicked() {
        app.start_generation(ui.ctx());
    }

    match status {
        GenerationStatus::Idle => {}
        GenerationStatus::Running => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Generating…");
            });
        }
        GenerationStatus::Done(bytes) => {
            ui.label(format!("Result ready ({} KiB)", bytes.len() / 1024));
            if ui.button("Place on canvas").clicked() {
                app.place_generated();
            }
        }
        GenerationStatus::Failed(message) => {
            ui.colored_label(egui::Color32::LIGHT_RED, message);
            if ui.add_enabled(can_generate, Button::new("Retry")).clicked() {
                app.start_generation(ui.ctx());
            }
        }
    }
}
