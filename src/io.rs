// ============================================================================
// FILE IO — native dialogs, decode, PNG encode
// ============================================================================

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ImageEncoder, RgbaImage};
use rfd::FileDialog;

/// Raster formats the open dialog offers (everything the `image` crate is
/// built with here).
pub const OPEN_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "webp", "bmp", "tga", "ico", "tiff", "tif",
];

/// Tracks the current file across open/save operations and owns the native
/// dialogs.
pub struct FileHandler {
    /// Path of the most recently opened image (None before the first open).
    pub current_path: Option<PathBuf>,
}

impl Default for FileHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl FileHandler {
    pub fn new() -> Self {
        Self { current_path: None }
    }

    /// Show the native open dialog and decode the picked file.
    /// Returns None when the user cancels or the file cannot be decoded;
    /// decode failures are logged, never surfaced as errors.
    pub fn open_image(&mut self) -> Option<(RgbaImage, PathBuf)> {
        let path = FileDialog::new()
            .add_filter("Images", OPEN_EXTENSIONS)
            .add_filter("All Files", &["*"])
            .pick_file()?;

        match load_image(&path) {
            Ok(rgba) => {
                self.current_path = Some(path.clone());
                Some((rgba, path))
            }
            Err(e) => {
                crate::log_err!("open failed: {}", e);
                None
            }
        }
    }

    /// Show the native save dialog (pre-filled with `suggested_name`) and
    /// write the image as PNG. Returns Ok(None) when the user cancels.
    pub fn save_png_dialog(
        &mut self,
        image: &RgbaImage,
        suggested_name: &str,
    ) -> Result<Option<PathBuf>, String> {
        let Some(path) = FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(suggested_name)
            .save_file()
        else {
            return Ok(None);
        };

        save_png(image, &path)?;
        Ok(Some(path))
    }
}

/// Decode any supported raster file into RGBA8 at native resolution.
pub fn load_image(path: &Path) -> Result<RgbaImage, String> {
    let img = image::open(path)
        .map_err(|e| format!("could not decode '{}': {}", path.display(), e))?;
    Ok(img.to_rgba8())
}

/// Encode as lossless, full-quality PNG.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), String> {
    let file = File::create(path)
        .map_err(|e| format!("could not create '{}': {}", path.display(), e))?;
    let writer = BufWriter::new(file);
    PngEncoder::new(writer)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ColorType::Rgba8,
        )
        .map_err(|e| format!("could not encode '{}': {}", path.display(), e))
}

/// Default save name for an edited image: `edited_<stem>.png`.
pub fn edited_file_name(source_stem: Option<&str>) -> String {
    match source_stem {
        Some(stem) => format!("edited_{}.png", stem),
        None => "edited_image.png".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn edited_name_prefixes_the_stem() {
        assert_eq!(edited_file_name(Some("holiday")), "edited_holiday.png");
        assert_eq!(edited_file_name(None), "edited_image.png");
    }

    #[test]
    fn png_save_load_round_trip_preserves_pixels() {
        let img = RgbaImage::from_fn(20, 10, |x, y| Rgba([x as u8 * 10, y as u8 * 20, 7, 200]));
        let path = std::env::temp_dir().join("lassofade_io_roundtrip.png");

        save_png(&img, &path).expect("save should succeed");
        let loaded = load_image(&path).expect("load should succeed");
        assert_eq!(loaded.as_raw(), img.as_raw());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load_image(Path::new("/nonexistent/lassofade.png")).unwrap_err();
        assert!(err.contains("could not decode"));
    }
}
