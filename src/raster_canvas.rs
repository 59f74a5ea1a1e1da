//! Raster canvas backend
//!
//! Pixel implementation of the drawing context on an RGBA buffer, used to
//! verify geometric output and export PNG previews. Coverage is binary (no
//! anti-aliasing): a pixel is painted when its center falls inside the
//! filled region, with fill spans half-open so adjacent shapes tile without
//! gaps or double coverage.

use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::canvas::{Canvas, CanvasState, PathCommand};
use crate::error::RendererResult;
use crate::types::{Color, Size};

/// A polyline subpath flattened from the current path.
struct Subpath {
    points: Vec<(f64, f64)>,
    closed: bool,
}

pub struct RasterCanvas {
    width: u32,
    height: u32,
    image: RgbaImage,
    state: CanvasState,
    clip: Option<Vec<bool>>,
    stack: Vec<(CanvasState, Option<Vec<bool>>)>,
    path: Vec<PathCommand>,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            image: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0])),
            state: CanvasState::default(),
            clip: None,
            stack: Vec::new(),
            path: Vec::new(),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Channel values of the pixel at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> RendererResult<()> {
        self.image.save(path)?;
        Ok(())
    }

    fn flatten(path: &[PathCommand]) -> Vec<Subpath> {
        let mut subpaths = Vec::new();
        let mut current: Vec<(f64, f64)> = Vec::new();

        fn flush(current: &mut Vec<(f64, f64)>, closed: bool, out: &mut Vec<Subpath>) {
            if current.len() >= 2 {
                out.push(Subpath {
                    points: std::mem::take(current),
                    closed,
                });
            } else {
                current.clear();
            }
        }

        for command in path {
            match *command {
                PathCommand::MoveTo { x, y } => {
                    flush(&mut current, false, &mut subpaths);
                    current.push((x, y));
                }
                PathCommand::LineTo { x, y } => {
                    current.push((x, y));
                }
                PathCommand::Arc {
                    cx,
                    cy,
                    radius,
                    start_angle,
                    end_angle,
                } => {
                    current.extend(arc_points(cx, cy, radius, start_angle, end_angle));
                }
                PathCommand::Rect { x, y, width, height } => {
                    flush(&mut current, false, &mut subpaths);
                    subpaths.push(Subpath {
                        points: vec![
                            (x, y),
                            (x + width, y),
                            (x + width, y + height),
                            (x, y + height),
                        ],
                        closed: true,
                    });
                }
                PathCommand::Close => {
                    flush(&mut current, true, &mut subpaths);
                }
            }
        }
        flush(&mut current, false, &mut subpaths);
        subpaths
    }

    fn paint_subpaths(&mut self, subpaths: &[Subpath], color: Color) {
        let rgba = color.to_rgb8();
        let pixel = Rgba([rgba[0], rgba[1], rgba[2], 255]);
        let clip = &self.clip;
        let image = &mut self.image;
        let width = self.width as usize;
        scan_fill(self.width, self.height, subpaths, |x, y| {
            let allowed = match clip {
                Some(mask) => mask[y as usize * width + x as usize],
                None => true,
            };
            if allowed {
                image.put_pixel(x, y, pixel);
            }
        });
    }

    fn stroke_geometry(subpaths: &[Subpath], half_width: f64) -> Vec<Subpath> {
        let mut quads = Vec::new();
        for subpath in subpaths {
            let points = &subpath.points;
            let count = points.len();
            if count < 2 {
                continue;
            }
            let segment_count = if subpath.closed { count } else { count - 1 };
            for k in 0..segment_count {
                let (x1, y1) = points[k];
                let (x2, y2) = points[(k + 1) % count];
                let (dx, dy) = (x2 - x1, y2 - y1);
                let length = (dx * dx + dy * dy).sqrt();
                if length == 0.0 {
                    continue;
                }
                let (nx, ny) = (-dy / length * half_width, dx / length * half_width);
                quads.push(Subpath {
                    points: vec![
                        (x1 + nx, y1 + ny),
                        (x2 + nx, y2 + ny),
                        (x2 - nx, y2 - ny),
                        (x1 - nx, y1 - ny),
                    ],
                    closed: true,
                });
            }
            // Square joins and caps at every vertex.
            for &(x, y) in points {
                quads.push(Subpath {
                    points: vec![
                        (x - half_width, y - half_width),
                        (x + half_width, y - half_width),
                        (x + half_width, y + half_width),
                        (x - half_width, y + half_width),
                    ],
                    closed: true,
                });
            }
        }
        quads
    }
}

impl Canvas for RasterCanvas {
    fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state.fill_color = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke_color = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn close_path(&mut self) {
        self.path.push(PathCommand::Close);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.push(PathCommand::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.path.push(PathCommand::LineTo { x, y });
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start_angle: f64, end_angle: f64) {
        self.path.push(PathCommand::Arc {
            cx,
            cy,
            radius,
            start_angle,
            end_angle,
        });
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.path.push(PathCommand::Rect { x, y, width, height });
    }

    fn fill(&mut self) {
        let subpaths = Self::flatten(&self.path);
        self.paint_subpaths(&subpaths, self.state.fill_color);
    }

    fn stroke(&mut self) {
        let half_width = self.state.line_width / 2.0;
        if half_width <= 0.0 {
            return;
        }
        let subpaths = Self::flatten(&self.path);
        let quads = Self::stroke_geometry(&subpaths, half_width);
        // Paint each quad on its own so overlapping winding never cancels.
        let color = self.state.stroke_color;
        for quad in &quads {
            self.paint_subpaths(std::slice::from_ref(quad), color);
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let rect = Subpath {
            points: vec![(x, y), (x + width, y), (x + width, y + height), (x, y + height)],
            closed: true,
        };
        self.paint_subpaths(std::slice::from_ref(&rect), self.state.fill_color);
    }

    fn clip(&mut self) {
        let subpaths = Self::flatten(&self.path);
        let mut mask = vec![false; (self.width as usize) * (self.height as usize)];
        let width = self.width as usize;
        scan_fill(self.width, self.height, &subpaths, |x, y| {
            mask[y as usize * width + x as usize] = true;
        });
        self.clip = Some(match self.clip.take() {
            Some(previous) => previous
                .iter()
                .zip(mask.iter())
                .map(|(a, b)| *a && *b)
                .collect(),
            None => mask,
        });
    }

    fn save(&mut self) {
        self.stack.push((self.state.clone(), self.clip.clone()));
    }

    fn restore(&mut self) {
        if let Some((state, clip)) = self.stack.pop() {
            self.state = state;
            self.clip = clip;
        }
    }
}

/// Flatten an arc to a polyline, start point included. The polyline is
/// inscribed in the circle, so it never escapes the exact radius.
fn arc_points(cx: f64, cy: f64, radius: f64, start_angle: f64, end_angle: f64) -> Vec<(f64, f64)> {
    let sweep = end_angle - start_angle;
    let turns = sweep.abs() / (2.0 * std::f64::consts::PI);
    let segments = ((turns * 90.0).ceil() as usize).max(8);
    (0..=segments)
        .map(|i| {
            let angle = start_angle + sweep * i as f64 / segments as f64;
            (cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect()
}

/// Scanline fill with the non-zero winding rule over pixel centers.
/// Subpaths are implicitly closed. Spans are half-open in x.
fn scan_fill(width: u32, height: u32, subpaths: &[Subpath], mut plot: impl FnMut(u32, u32)) {
    let mut crossings: Vec<(f64, i32)> = Vec::new();
    for yi in 0..height {
        let yc = yi as f64 + 0.5;
        crossings.clear();

        for subpath in subpaths {
            let points = &subpath.points;
            let count = points.len();
            if count < 2 {
                continue;
            }
            for k in 0..count {
                let (x1, y1) = points[k];
                let (x2, y2) = points[(k + 1) % count];
                if y1 == y2 {
                    continue;
                }
                let (ymin, ymax, direction) = if y2 > y1 { (y1, y2, 1) } else { (y2, y1, -1) };
                if yc >= ymin && yc < ymax {
                    let x = x1 + (yc - y1) * (x2 - x1) / (y2 - y1);
                    crossings.push((x, direction));
                }
            }
        }

        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut winding = 0;
        let mut span_start = 0.0;
        for &(x, direction) in &crossings {
            let was_inside = winding != 0;
            winding += direction;
            if !was_inside && winding != 0 {
                span_start = x;
            } else if was_inside && winding == 0 {
                // Pixel centers in [span_start, x).
                let first = (span_start - 0.5).ceil().max(0.0) as i64;
                let last = ((x - 0.5).ceil() as i64).min(width as i64);
                for xi in first..last {
                    plot(xi as u32, yi);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{
        CircularHatch, FilledRectangle, GradientCircleGrid, Pattern, TriangleTessellation,
    };
    use crate::rng::RandomSource;

    const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];
    const BLACK: [u8; 4] = [0, 0, 0, 255];
    const RED: [u8; 4] = [255, 0, 0, 255];

    #[test]
    fn filled_rectangle_fill_and_stroke_bands() {
        let mut ctx = RasterCanvas::new(600, 600);
        FilledRectangle::default().render(&mut ctx);

        // Interior is the red fill.
        assert_eq!(ctx.pixel(300, 300), RED);
        assert_eq!(ctx.pixel(30, 30), RED);
        // The 20-unit stroke band covers the outer 20 units on every side,
        // miter corners included.
        assert_eq!(ctx.pixel(5, 5), BLACK);
        assert_eq!(ctx.pixel(0, 0), BLACK);
        assert_eq!(ctx.pixel(15, 300), BLACK);
        assert_eq!(ctx.pixel(599, 599), BLACK);
    }

    #[test]
    fn circle_grid_paints_circle_edges_only() {
        let mut ctx = RasterCanvas::new(600, 600);
        GradientCircleGrid::default().render(&mut ctx);

        // First circle: center (25, 25), radius 15. Its stroke crosses row 25
        // near x = 40 in the first circle's cyan, but the center stays bare.
        let edge: Vec<_> = (36..=41).map(|x| ctx.pixel(x, 25)).collect();
        assert!(edge.contains(&[0, 255, 255, 255]));
        assert_eq!(ctx.pixel(25, 25), TRANSPARENT);
    }

    #[test]
    fn hatch_never_escapes_the_clip_circle() {
        let mut ctx = RasterCanvas::new(200, 200);
        CircularHatch::default().render(&mut ctx);

        let mut painted = 0u32;
        for y in 0..200 {
            for x in 0..200 {
                if ctx.pixel(x, y) != TRANSPARENT {
                    painted += 1;
                    let dx = x as f64 + 0.5 - 100.0;
                    let dy = y as f64 + 0.5 - 100.0;
                    assert!(
                        (dx * dx + dy * dy).sqrt() <= 100.0,
                        "stroked pixel ({x}, {y}) outside the clip circle"
                    );
                }
            }
        }
        assert!(painted > 0);
    }

    #[test]
    fn hatch_clip_does_not_leak() {
        let mut ctx = RasterCanvas::new(200, 200);
        CircularHatch::default().render(&mut ctx);

        // Painting after the pattern reaches the corners again.
        ctx.set_fill_color(Color::white());
        ctx.fill_rect(0.0, 0.0, 200.0, 200.0);
        assert_eq!(ctx.pixel(0, 0), [255, 255, 255, 255]);
        assert_eq!(ctx.pixel(199, 199), [255, 255, 255, 255]);
    }

    /// Source pinned to one value, for coverage tests that must avoid
    /// black triangles.
    #[derive(Clone)]
    struct ConstSource(u64);

    impl RandomSource for ConstSource {
        fn next_u64(&mut self) -> u64 {
            self.0
        }
    }

    #[test]
    fn tessellation_covers_the_whole_canvas() {
        let mut ctx = RasterCanvas::new(120, 80);
        TriangleTessellation::with_source(ConstSource(30)).render(&mut ctx);

        for y in 0..80 {
            for x in 0..120 {
                let pixel = ctx.pixel(x, y);
                assert_ne!(pixel, TRANSPARENT, "gap at ({x}, {y})");
                assert_ne!(pixel, BLACK, "background shows at ({x}, {y})");
            }
        }
    }

    #[test]
    fn tessellation_pixels_reproduce_under_a_seed() {
        let pattern = TriangleTessellation::new(0x5eed);
        let mut a = RasterCanvas::new(160, 120);
        let mut b = RasterCanvas::new(160, 120);
        pattern.render(&mut a);
        pattern.render(&mut b);
        assert_eq!(a.image().as_raw(), b.image().as_raw());
    }

    #[test]
    fn zero_sized_canvas_does_not_panic() {
        let mut ctx = RasterCanvas::new(0, 0);
        FilledRectangle::default().render(&mut ctx);
        CircularHatch::default().render(&mut ctx);
        TriangleTessellation::new(1).render(&mut ctx);
    }

    #[test]
    fn save_png_writes_a_file() {
        let mut ctx = RasterCanvas::new(60, 60);
        FilledRectangle::default().render(&mut ctx);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pattern.png");
        ctx.save_png(&path).unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }
}
