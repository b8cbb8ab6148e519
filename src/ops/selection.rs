// ============================================================================
// SELECTION OPS — coordinate mapping + polygon rasterization
// ============================================================================
//
// The pure half of the lasso pipeline. Nothing in this module touches session
// state: display points and dimensions go in, native points and masks come
// out. The orchestrator in canvas.rs is the only writer.

use egui::Pos2;
use image::GrayImage;

/// Map a display-space point to native image coordinates.
///
/// `scale_x` / `scale_y` are `native / display` ratios and must be recomputed
/// whenever the display scale changes (image reload, window resize).
pub fn to_image_space(point: Pos2, scale_x: f32, scale_y: f32) -> Pos2 {
    debug_assert!(
        scale_x > 0.0 && scale_y > 0.0,
        "display scale must be positive"
    );
    Pos2::new(point.x * scale_x, point.y * scale_y)
}

/// Scanline-fill a closed polygon into a 0/255 mask of `width` × `height`.
///
/// Even-odd rule sampled at pixel-row centres (y + 0.5): for each row the
/// x-intercepts of crossing edges are sorted and filled in pairs. The edge
/// from the last point back to the first is implicit — callers pass the
/// polygon unclosed. Polygons with fewer than three points produce an
/// all-zero mask.
pub fn rasterize_polygon(points: &[Pos2], width: u32, height: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    if points.len() < 3 || width == 0 || height == 0 {
        return mask;
    }

    let w = width as usize;
    let mut crossings: Vec<f32> = Vec::new();

    for (y, row) in mask.chunks_exact_mut(w).enumerate() {
        let scan_y = y as f32 + 0.5;
        crossings.clear();
        collect_crossings(points, scan_y, &mut crossings);
        crossings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        for pair in crossings.chunks_exact(2) {
            let x0 = (pair[0].max(0.0) as usize).min(w);
            let x1 = ((pair[1] + 1.0).max(0.0) as usize).min(w);
            if x0 < x1 {
                row[x0..x1].fill(255);
            }
        }
    }

    mask
}

/// Collect the x-intercepts of every polygon edge crossing `scan_y`.
/// An edge crosses when its endpoints lie on opposite sides of the scanline,
/// the half-open test keeps vertices from being counted twice.
fn collect_crossings(points: &[Pos2], scan_y: f32, out: &mut Vec<f32>) {
    let n = points.len();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        if (a.y < scan_y) != (b.y < scan_y) {
            let t = (scan_y - a.y) / (b.y - a.y);
            out.push(a.x + t * (b.x - a.x));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<Pos2> {
        vec![
            Pos2::new(x0, y0),
            Pos2::new(x1, y0),
            Pos2::new(x1, y1),
            Pos2::new(x0, y1),
        ]
    }

    #[test]
    fn to_image_space_applies_both_scales() {
        let p = to_image_space(Pos2::new(10.0, 20.0), 2.0, 0.5);
        assert_eq!(p, Pos2::new(20.0, 10.0));
    }

    #[test]
    fn rasterize_is_deterministic() {
        let poly = vec![
            Pos2::new(3.0, 2.0),
            Pos2::new(47.0, 9.0),
            Pos2::new(31.0, 44.0),
            Pos2::new(6.0, 30.0),
        ];
        let a = rasterize_polygon(&poly, 50, 50);
        let b = rasterize_polygon(&poly, 50, 50);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn square_interior_is_inside_and_exterior_outside() {
        let mask = rasterize_polygon(&square(10.0, 10.0, 50.0, 50.0), 100, 100);
        assert_eq!(mask.get_pixel(30, 30).0[0], 255);
        assert_eq!(mask.get_pixel(11, 11).0[0], 255);
        assert_eq!(mask.get_pixel(5, 5).0[0], 0);
        assert_eq!(mask.get_pixel(60, 30).0[0], 0);
        assert_eq!(mask.get_pixel(99, 99).0[0], 0);
    }

    #[test]
    fn degenerate_polygon_yields_empty_mask() {
        let two = vec![Pos2::new(1.0, 1.0), Pos2::new(8.0, 8.0)];
        let mask = rasterize_polygon(&two, 16, 16);
        assert!(mask.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn polygon_outside_canvas_is_clipped() {
        let mask = rasterize_polygon(&square(-20.0, -20.0, -5.0, -5.0), 32, 32);
        assert!(mask.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn concave_polygon_follows_even_odd_rule() {
        // A "C" shape: the notch on the right must stay outside.
        let poly = vec![
            Pos2::new(5.0, 5.0),
            Pos2::new(35.0, 5.0),
            Pos2::new(35.0, 15.0),
            Pos2::new(15.0, 15.0),
            Pos2::new(15.0, 25.0),
            Pos2::new(35.0, 25.0),
            Pos2::new(35.0, 35.0),
            Pos2::new(5.0, 35.0),
        ];
        let mask = rasterize_polygon(&poly, 40, 40);
        assert_eq!(mask.get_pixel(10, 20).0[0], 255); // spine of the C
        assert_eq!(mask.get_pixel(30, 20).0[0], 0); // notch
        assert_eq!(mask.get_pixel(30, 10).0[0], 255); // upper arm
        assert_eq!(mask.get_pixel(30, 30).0[0], 255); // lower arm
    }
}
