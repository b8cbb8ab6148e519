// ============================================================================
// LassoFade CLI — headless selection fades via command-line arguments
// ============================================================================
//
// Usage examples:
//   lassofade --input photo.png --points "120,80 400,95 390,300 110,280" \
//             --opacity 0.4 --output faded.png
//   lassofade -i photo.jpg -o photo_as.png          (decode + re-encode as PNG)
//   lassofade -i shots/*.png --points "..." --opacity 0 --output-dir cut/
//
// No GUI is opened in CLI mode. The polygon is given in native pixel
// coordinates, so the display-space mapping step of the GUI does not apply.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use egui::Pos2;

use crate::io::{edited_file_name, load_image, save_png};
use crate::ops::adjustments::apply_opacity;
use crate::ops::selection::rasterize_polygon;

/// LassoFade headless processor.
///
/// Fade a polygonal region of an image's alpha channel — no GUI required.
#[derive(Parser, Debug)]
#[command(
    name = "lassofade",
    about = "LassoFade headless selection fader",
    long_about = "Apply a polygon-masked opacity fade to image files and write\n\
                  the result as PNG, without opening the GUI.\n\n\
                  Example:\n  \
                  lassofade --input photo.png --points \"10,10 200,14 180,220\" \\\n           \
                  --opacity 0.4 --output faded.png"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Selection polygon in native pixel coordinates: "x,y x,y x,y ..."
    /// (at least 3 vertices). When omitted, inputs are only decoded and
    /// re-encoded (useful for PNG conversion).
    #[arg(short, long, value_name = "\"x,y x,y ...\"")]
    pub points: Option<String>,

    /// Opacity factor applied inside the polygon. Clamped to 0–1.
    #[arg(long, default_value_t = 1.0, value_name = "0.0-1.0")]
    pub opacity: f32,

    /// Output file path. Only valid for single-file input; defaults to
    /// edited_<stem>.png next to the input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing. Files are written here as
    /// edited_<stem>.png.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process
    /// arguments. Used by `main()` to route before creating a window.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| a == "--input" || a == "-i")
    }
}

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    let polygon = match &args.points {
        Some(raw) => match parse_points(raw) {
            Ok(points) => Some(points),
            Err(e) => {
                eprintln!("error: invalid --points: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    if let Some(dir) = &args.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "error: could not create output directory '{}': {}",
                dir.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    }

    let mut failures = 0usize;
    for input in &inputs {
        let out_path = output_path_for(input, &args);
        let start = Instant::now();
        match process_one(input, polygon.as_deref(), args.opacity, &out_path) {
            Ok(()) => {
                if args.verbose {
                    println!(
                        "{} -> {} ({} ms)",
                        input.display(),
                        out_path.display(),
                        start.elapsed().as_millis()
                    );
                }
            }
            Err(e) => {
                eprintln!("error: {}: {}", input.display(), e);
                failures += 1;
            }
        }
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        eprintln!("{} of {} files failed.", failures, inputs.len());
        ExitCode::FAILURE
    }
}

/// Load one image, apply the polygon fade when given, and write PNG.
fn process_one(
    input: &Path,
    polygon: Option<&[Pos2]>,
    opacity: f32,
    out_path: &Path,
) -> Result<(), String> {
    let image = load_image(input)?;

    let result = match polygon {
        Some(points) => {
            let (w, h) = image.dimensions();
            let mask = rasterize_polygon(points, w, h);
            apply_opacity(&image, &mask, opacity)
        }
        None => image,
    };

    save_png(&result, out_path)
}

/// Expand glob patterns / literal paths into concrete files.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for pattern in patterns {
        match glob::glob(pattern) {
            Ok(matches) => {
                let mut any = false;
                for entry in matches.flatten() {
                    if entry.is_file() {
                        files.push(entry);
                        any = true;
                    }
                }
                // A literal path with no glob metacharacters may still exist
                // even when glob() yields nothing (e.g. special characters).
                if !any {
                    let literal = PathBuf::from(pattern);
                    if literal.is_file() {
                        files.push(literal);
                    }
                }
            }
            Err(_) => {
                let literal = PathBuf::from(pattern);
                if literal.is_file() {
                    files.push(literal);
                }
            }
        }
    }
    files
}

/// Parse "x,y x,y x,y ..." into a polygon with at least three vertices.
fn parse_points(raw: &str) -> Result<Vec<Pos2>, String> {
    let mut points = Vec::new();
    for token in raw.split_whitespace() {
        let (x, y) = token
            .split_once(',')
            .ok_or_else(|| format!("'{}' is not an x,y pair", token))?;
        let x: f32 = x
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a number", x))?;
        let y: f32 = y
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a number", y))?;
        points.push(Pos2::new(x, y));
    }
    if points.len() < 3 {
        return Err(format!(
            "a selection polygon needs at least 3 vertices, got {}",
            points.len()
        ));
    }
    Ok(points)
}

/// Where the result for `input` goes: --output for single files, otherwise
/// edited_<stem>.png in --output-dir or next to the input.
fn output_path_for(input: &Path, args: &CliArgs) -> PathBuf {
    if let Some(out) = &args.output
        && args.output_dir.is_none()
    {
        return out.clone();
    }
    let name = edited_file_name(input.file_stem().and_then(|s| s.to_str()));
    match &args.output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_points_accepts_triangle() {
        let pts = parse_points("1,2 3.5,4 5,6.25").expect("valid polygon");
        assert_eq!(pts.len(), 3);
        assert_eq!(pts[1], Pos2::new(3.5, 4.0));
    }

    #[test]
    fn parse_points_rejects_two_vertices() {
        assert!(parse_points("1,2 3,4").is_err());
    }

    #[test]
    fn parse_points_rejects_malformed_pairs() {
        assert!(parse_points("1;2 3,4 5,6").is_err());
        assert!(parse_points("a,b c,d e,f").is_err());
    }

    #[test]
    fn output_path_defaults_beside_input() {
        let args = CliArgs {
            input: vec!["photo.png".into()],
            points: None,
            opacity: 1.0,
            output: None,
            output_dir: None,
            verbose: false,
        };
        let out = output_path_for(Path::new("shots/photo.png"), &args);
        assert_eq!(out, Path::new("shots/edited_photo.png"));
    }

    #[test]
    fn output_dir_wins_over_input_location() {
        let args = CliArgs {
            input: vec!["photo.png".into()],
            points: None,
            opacity: 1.0,
            output: None,
            output_dir: Some(PathBuf::from("out")),
            verbose: false,
        };
        let out = output_path_for(Path::new("shots/photo.png"), &args);
        assert_eq!(out, Path::new("out/edited_photo.png"));
    }
}
