// ============================================================================
// TOOLS — lasso gesture recording and canvas pointer input
// ============================================================================

use eframe::egui;
use egui::{Color32, Pos2, Rect, Vec2};

/// Active pointer tool over the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Tool {
    /// No pixel interaction; the canvas just displays the document.
    #[default]
    View,
    /// Freehand selection: drag to trace, release to commit.
    Lasso,
}

/// State for the Lasso (freeform) selection tool. Transient per-gesture:
/// reset on `begin`, drained on `end` — nothing leaks between gestures.
#[derive(Clone, Debug, Default)]
pub struct LassoState {
    /// Accumulated polygon points in display coordinates, relative to the
    /// top-left of the on-screen image rect.
    points: Vec<Pos2>,
    /// True while dragging to collect points.
    dragging: bool,
}

impl LassoState {
    /// Start a new gesture at `p`, discarding any stray previous points.
    pub fn begin(&mut self, p: Pos2) {
        self.points.clear();
        self.points.push(p);
        self.dragging = true;
    }

    /// Append a point. Ignored unless the gesture is live and the pointer
    /// moved at least 1 px since the last recorded point — sub-pixel jitter
    /// doesn't change the enclosed area, it only bloats the polygon.
    pub fn extend(&mut self, p: Pos2) {
        if !self.dragging {
            return;
        }
        if let Some(last) = self.points.last()
            && (*last - p).length() >= 1.0
        {
            self.points.push(p);
        }
    }

    /// Finish the gesture and drain the accumulated points. Returns the
    /// traced polygon when it has at least three points; shorter gestures
    /// are discarded — a click or a tiny jitter selects nothing.
    pub fn end(&mut self) -> Option<Vec<Pos2>> {
        self.dragging = false;
        let points = std::mem::take(&mut self.points);
        if points.len() >= 3 { Some(points) } else { None }
    }

    /// Abandon the gesture without producing a polygon.
    pub fn cancel(&mut self) {
        self.dragging = false;
        self.points.clear();
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}

/// The tool selection plus per-gesture state the app carries between frames.
#[derive(Default)]
pub struct ToolState {
    pub tool: Tool,
    pub lasso: LassoState,
}

/// Drive the lasso tool from this frame's pointer input over the canvas
/// response. Points are recorded relative to `image_rect` (and clamped to
/// it, so a drag that wanders off the image stays on its border). Returns
/// the finished polygon on the frame the drag is released with enough
/// points — the caller commits it to the session.
pub fn handle_lasso_input(
    tool_state: &mut ToolState,
    ui: &egui::Ui,
    response: &egui::Response,
    painter: &egui::Painter,
    image_rect: Rect,
) -> Option<Vec<Pos2>> {
    // Esc abandons an in-flight gesture.
    if ui.input(|i| i.key_pressed(egui::Key::Escape)) && tool_state.lasso.is_dragging() {
        tool_state.lasso.cancel();
        ui.ctx().request_repaint();
        return None;
    }

    let local_pos = response
        .interact_pointer_pos()
        .map(|p| clamp_to_rect(p, image_rect) - image_rect.min.to_vec2());

    if response.drag_started()
        && let Some(pos) = response.interact_pointer_pos()
    {
        // Only a press on the image starts tracing.
        if image_rect.contains(pos) {
            tool_state.lasso.begin(pos - image_rect.min.to_vec2());
        }
    } else if response.dragged()
        && let Some(pos) = local_pos
    {
        tool_state.lasso.extend(pos);
        ui.ctx().request_repaint();
    }

    draw_lasso_preview(painter, &tool_state.lasso, image_rect);

    if response.drag_released() && tool_state.lasso.is_dragging() {
        ui.ctx().request_repaint();
        return tool_state.lasso.end();
    }

    None
}

/// Draw the in-progress lasso path as a white-over-black double stroke so it
/// reads on both light and dark imagery.
fn draw_lasso_preview(painter: &egui::Painter, lasso: &LassoState, image_rect: Rect) {
    if !lasso.dragging || lasso.points.len() < 2 {
        return;
    }
    let screen_pts: Vec<Pos2> = lasso
        .points
        .iter()
        .map(|p| image_rect.min + p.to_vec2())
        .collect();
    painter.add(egui::Shape::line(
        screen_pts.clone(),
        egui::Stroke::new(1.5, Color32::WHITE),
    ));
    painter.add(egui::Shape::line(
        screen_pts,
        egui::Stroke::new(0.8, Color32::from_black_alpha(150)),
    ));
}

/// Draw the committed selection outline. `path` is in native image
/// coordinates; `display_scale` is the display/native ratio.
pub fn draw_selection_outline(
    painter: &egui::Painter,
    path: &[Pos2],
    image_rect: Rect,
    display_scale: f32,
) {
    if path.len() < 3 {
        return;
    }
    let screen_pts: Vec<Pos2> = path
        .iter()
        .map(|p| image_rect.min + Vec2::new(p.x, p.y) * display_scale)
        .collect();
    painter.add(egui::Shape::closed_line(
        screen_pts.clone(),
        egui::Stroke::new(1.5, Color32::WHITE),
    ));
    painter.add(egui::Shape::closed_line(
        screen_pts,
        egui::Stroke::new(0.8, Color32::from_black_alpha(150)),
    ));
}

fn clamp_to_rect(p: Pos2, rect: Rect) -> Pos2 {
    Pos2::new(
        p.x.clamp(rect.min.x, rect.max.x),
        p.y.clamp(rect.min.y, rect.max.y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_resets_previous_points() {
        let mut lasso = LassoState::default();
        lasso.begin(Pos2::new(0.0, 0.0));
        lasso.extend(Pos2::new(5.0, 0.0));
        lasso.extend(Pos2::new(5.0, 5.0));
        lasso.begin(Pos2::new(100.0, 100.0));
        assert_eq!(lasso.points.len(), 1);
        assert_eq!(lasso.points[0], Pos2::new(100.0, 100.0));
    }

    #[test]
    fn extend_filters_subpixel_movement() {
        let mut lasso = LassoState::default();
        lasso.begin(Pos2::new(10.0, 10.0));
        lasso.extend(Pos2::new(10.4, 10.3)); // < 1 px, dropped
        lasso.extend(Pos2::new(12.0, 10.0));
        assert_eq!(lasso.points.len(), 2);
    }

    #[test]
    fn extend_without_begin_is_ignored() {
        let mut lasso = LassoState::default();
        lasso.extend(Pos2::new(3.0, 3.0));
        assert!(lasso.points.is_empty());
    }

    #[test]
    fn short_gesture_is_discarded() {
        let mut lasso = LassoState::default();
        lasso.begin(Pos2::new(0.0, 0.0));
        lasso.extend(Pos2::new(4.0, 4.0));
        assert!(lasso.end().is_none());
        assert!(lasso.points.is_empty());
        assert!(!lasso.is_dragging());
    }

    #[test]
    fn full_gesture_yields_the_polygon_and_drains_state() {
        let mut lasso = LassoState::default();
        lasso.begin(Pos2::new(0.0, 0.0));
        lasso.extend(Pos2::new(10.0, 0.0));
        lasso.extend(Pos2::new(10.0, 10.0));
        let polygon = lasso.end().expect("three points commit");
        assert_eq!(polygon.len(), 3);
        assert!(lasso.points.is_empty());
    }

    #[test]
    fn cancel_drops_everything() {
        let mut lasso = LassoState::default();
        lasso.begin(Pos2::new(0.0, 0.0));
        lasso.extend(Pos2::new(10.0, 0.0));
        lasso.extend(Pos2::new(10.0, 10.0));
        lasso.cancel();
        assert!(lasso.end().is_none());
    }
}
