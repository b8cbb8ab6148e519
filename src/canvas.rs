// ============================================================================
// EDITOR STATE — the per-document editing session
// ============================================================================
//
// Owns the loaded document, the active selection and the opacity factor, and
// mediates between UI actions and the pure ops in ops::selection /
// ops::adjustments. All mutation happens here; the ops modules only read.
// No operation may panic or error for ordinary user-driven sequences —
// adjusting opacity with no selection is a no-op, not a bug.

use egui::Pos2;
use image::{GrayImage, RgbaImage};

use crate::ops::adjustments::apply_opacity;
use crate::ops::selection::{rasterize_polygon, to_image_space};

/// A committed lasso selection.
pub struct Selection {
    /// Closed polygon in native image coordinates (unclosed point list; the
    /// edge back to the first point is implicit).
    pub path: Vec<Pos2>,
    /// 0 = outside, 255 = inside. Dimensions always equal the document's.
    pub mask: GrayImage,
    /// Snapshot of the displayed buffer at commit time. Every opacity
    /// recomputation reads this, never the live displayed buffer, so
    /// repeated slider changes cannot compound.
    original: RgbaImage,
}

/// The editing session. At most one document and one selection at a time.
pub struct EditorState {
    /// The document at native resolution, as currently displayed and as it
    /// would be exported. Selection outlines are screen-space overlays and
    /// never touch this buffer.
    displayed: Option<RgbaImage>,
    /// File stem of the loaded image, used for the `edited_` save name.
    source_stem: Option<String>,
    selection: Option<Selection>,
    /// Current opacity factor in [0, 1]. 1.0 = no change.
    opacity: f32,
    /// Bumped whenever `displayed` changes; the app re-uploads its texture
    /// when this moves.
    pub dirty_generation: u64,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    pub fn new() -> Self {
        Self {
            displayed: None,
            source_stem: None,
            selection: None,
            opacity: 1.0,
            dirty_generation: 0,
        }
    }

    pub fn has_image(&self) -> bool {
        self.displayed.is_some()
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// The buffer to display and export, if a document is loaded.
    pub fn displayed(&self) -> Option<&RgbaImage> {
        self.displayed.as_ref()
    }

    /// Native (width, height) of the loaded document.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.displayed.as_ref().map(|img| img.dimensions())
    }

    /// Committed selection outline in native coordinates, for the overlay.
    pub fn selection_path(&self) -> Option<&[Pos2]> {
        self.selection.as_ref().map(|s| s.path.as_slice())
    }

    /// Replace the document. Discards any selection and resets opacity —
    /// a freshly loaded image always starts from a clean session.
    pub fn load_image(&mut self, image: RgbaImage, source_stem: Option<String>) {
        self.displayed = Some(image);
        self.source_stem = source_stem;
        self.selection = None;
        self.opacity = 1.0;
        self.mark_dirty();
    }

    /// Commit a lasso gesture as the active selection, replacing any prior
    /// one. `display_path` is in display coordinates; `scale_x`/`scale_y`
    /// are the native/display ratios. The mask is rasterized at the
    /// document's native dimensions and the current displayed buffer is
    /// snapshotted as the selection's original, so later fades always start
    /// from what was on screen at commit time.
    ///
    /// Returns false (and leaves the session untouched) when no document is
    /// loaded or the path has fewer than three points.
    pub fn commit_selection(&mut self, display_path: &[Pos2], scale_x: f32, scale_y: f32) -> bool {
        let Some(displayed) = self.displayed.as_ref() else {
            return false;
        };
        if display_path.len() < 3 {
            return false;
        }

        let (w, h) = displayed.dimensions();
        let path: Vec<Pos2> = display_path
            .iter()
            .map(|&p| to_image_space(p, scale_x, scale_y))
            .collect();
        let mask = rasterize_polygon(&path, w, h);

        self.selection = Some(Selection {
            path,
            mask,
            original: displayed.clone(),
        });
        // The snapshot is the new baseline: factor 1.0 means "as committed".
        self.opacity = 1.0;
        true
    }

    /// Set the opacity factor and recompute the displayed buffer from the
    /// selection's original snapshot. Clamped to [0, 1]. A no-op when no
    /// selection exists.
    pub fn set_opacity(&mut self, factor: f32) {
        let Some(selection) = self.selection.as_ref() else {
            return;
        };
        self.opacity = factor.clamp(0.0, 1.0);
        self.displayed = Some(apply_opacity(
            &selection.original,
            &selection.mask,
            self.opacity,
        ));
        self.mark_dirty();
    }

    /// Discard the selection, keeping the displayed buffer as-is: the last
    /// applied opacity is baked in and the factor resets to 1.0. The slider
    /// becomes unavailable until a new selection is committed.
    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.opacity = 1.0;
    }

    /// Return the session to its initial empty state.
    pub fn clear_all(&mut self) {
        self.displayed = None;
        self.source_stem = None;
        self.selection = None;
        self.opacity = 1.0;
        self.mark_dirty();
    }

    /// The pixels a save operation should encode. Identical to the displayed
    /// buffer — the selection outline lives only in the screen-space overlay.
    pub fn export_image(&self) -> Option<&RgbaImage> {
        self.displayed.as_ref()
    }

    /// Default save name: `edited_<stem>.png`.
    pub fn suggested_save_name(&self) -> String {
        crate::io::edited_file_name(self.source_stem.as_deref())
    }

    fn mark_dirty(&mut self) {
        self.dirty_generation = self.dirty_generation.wrapping_add(1);
    }
}
