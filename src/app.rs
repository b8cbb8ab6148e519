// ============================================================================
// APP — window layout, controls, canvas view
// ============================================================================

use eframe::egui;
use egui::{Color32, ColorImage, Pos2, Rect, TextureHandle, TextureOptions, Vec2};

use crate::canvas::EditorState;
use crate::components::tools::{self, Tool, ToolState};
use crate::io::FileHandler;

pub struct LassoFadeApp {
    editor: EditorState,
    tool_state: ToolState,
    file_handler: FileHandler,

    /// GPU texture of the displayed buffer; re-uploaded when the editor's
    /// dirty generation moves.
    display_texture: Option<TextureHandle>,
    texture_generation: u64,

    /// Slider-backed opacity value, mirrored into the editor on change.
    opacity_slider: f32,
    /// Last action / error text shown in the control bar.
    status: String,
}

impl LassoFadeApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            editor: EditorState::new(),
            tool_state: ToolState::default(),
            file_handler: FileHandler::new(),
            display_texture: None,
            texture_generation: 0,
            opacity_slider: 1.0,
            status: "Open an image to begin.".to_string(),
        }
    }

    fn open_image(&mut self) {
        let Some((image, path)) = self.file_handler.open_image() else {
            return;
        };
        let (w, h) = image.dimensions();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string());
        self.editor.load_image(image, stem);
        self.opacity_slider = 1.0;
        self.tool_state.tool = Tool::View;
        self.tool_state.lasso.cancel();
        let shown_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.status = format!("Loaded {} ({}x{}).", shown_name, w, h);
        crate::log_info!("loaded {} ({}x{})", path.display(), w, h);
    }

    fn save_image(&mut self) {
        let Some(image) = self.editor.export_image() else {
            return;
        };
        let suggested = self.editor.suggested_save_name();
        match self.file_handler.save_png_dialog(image, &suggested) {
            Ok(Some(path)) => {
                self.status = format!("Saved {}.", path.display());
                crate::log_info!("saved {}", path.display());
            }
            Ok(None) => {} // dialog cancelled
            Err(e) => {
                self.status = format!("Save failed: {}", e);
                crate::log_err!("save failed: {}", e);
            }
        }
    }

    fn clear_selection(&mut self) {
        self.editor.clear_selection();
        self.opacity_slider = 1.0;
        self.status = "Selection cleared — opacity baked in.".to_string();
    }

    fn clear_canvas(&mut self) {
        self.editor.clear_all();
        self.display_texture = None;
        self.file_handler.current_path = None;
        self.opacity_slider = 1.0;
        self.tool_state.tool = Tool::View;
        self.tool_state.lasso.cancel();
        self.status = "Canvas cleared.".to_string();
    }

    fn controls_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open Image…").clicked() {
                self.open_image();
            }

            let lasso_active = self.tool_state.tool == Tool::Lasso;
            let lasso = ui.add_enabled(
                self.editor.has_image(),
                egui::SelectableLabel::new(lasso_active, "Lasso"),
            );
            if lasso.clicked() {
                self.tool_state.tool = if lasso_active { Tool::View } else { Tool::Lasso };
                self.tool_state.lasso.cancel();
            }

            // Only offered while a selection exists.
            if self.editor.has_selection() && ui.button("Clear Selection").clicked() {
                self.clear_selection();
            }

            ui.separator();

            let slider = ui.add_enabled(
                self.editor.has_selection(),
                egui::Slider::new(&mut self.opacity_slider, 0.0..=1.0)
                    .step_by(0.01)
                    .text("Opacity"),
            );
            if slider.changed() {
                self.editor.set_opacity(self.opacity_slider);
            }

            ui.separator();

            if ui
                .add_enabled(self.editor.has_image(), egui::Button::new("Save Image…"))
                .clicked()
            {
                self.save_image();
            }
            if ui.button("Clear Canvas").clicked() {
                self.clear_canvas();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(&self.status);
            });
        });
    }

    fn canvas_view(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_size();
        let sense = egui::Sense::click_and_drag().union(egui::Sense::hover());
        let (response, painter) = ui.allocate_painter(available, sense);
        let canvas_rect = response.rect;

        let Some((native_w, native_h)) = self.editor.dimensions() else {
            painter.text(
                canvas_rect.center(),
                egui::Align2::CENTER_CENTER,
                "No image loaded",
                egui::FontId::proportional(16.0),
                ui.visuals().weak_text_color(),
            );
            return;
        };

        // Fit the document into the panel, preserving aspect ratio.
        let display_scale =
            (canvas_rect.width() / native_w as f32).min(canvas_rect.height() / native_h as f32);
        let display_size = Vec2::new(native_w as f32, native_h as f32) * display_scale;
        let image_rect = Rect::from_min_size(
            canvas_rect.min + (canvas_rect.size() - display_size) * 0.5,
            display_size,
        );

        self.ensure_display_texture(ui.ctx());
        if let Some(texture) = &self.display_texture {
            let uv = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0));
            painter.image(texture.id(), image_rect, uv, Color32::WHITE);
        }

        if let Some(path) = self.editor.selection_path() {
            tools::draw_selection_outline(&painter, path, image_rect, display_scale);
        }

        if self.tool_state.tool == Tool::Lasso
            && let Some(polygon) =
                tools::handle_lasso_input(&mut self.tool_state, ui, &response, &painter, image_rect)
        {
            // Map display-space points back to native pixels at commit.
            let scale_x = native_w as f32 / image_rect.width();
            let scale_y = native_h as f32 / image_rect.height();
            if self.editor.commit_selection(&polygon, scale_x, scale_y) {
                self.opacity_slider = 1.0;
                self.tool_state.tool = Tool::View;
                self.status = "Selection committed — adjust opacity.".to_string();
            }
            // Too few points: the gesture is discarded silently.
        }
    }

    /// Re-upload the display texture when the editor's buffer changed.
    fn ensure_display_texture(&mut self, ctx: &egui::Context) {
        let Some(buffer) = self.editor.displayed() else {
            self.display_texture = None;
            return;
        };
        let generation = self.editor.dirty_generation;
        if self.display_texture.is_some() && self.texture_generation == generation {
            return;
        }

        let size = [buffer.width() as usize, buffer.height() as usize];
        let color_image = ColorImage::from_rgba_unmultiplied(size, buffer.as_raw());
        match &mut self.display_texture {
            Some(texture) => texture.set(color_image, TextureOptions::LINEAR),
            None => {
                self.display_texture =
                    Some(ctx.load_texture("document", color_image, TextureOptions::LINEAR));
            }
        }
        self.texture_generation = generation;
    }
}

impl eframe::App for LassoFadeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            self.controls_bar(ui);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.canvas_view(ui);
        });
    }
}
