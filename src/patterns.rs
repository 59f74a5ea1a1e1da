//! Geometric pattern painters
//!
//! Each pattern paints onto any [`Canvas`] backend through a single
//! `render` entry point, so the same pattern can target the PDF content
//! stream backend or the raster backend.

use std::f64::consts::PI;

use crate::canvas::Canvas;
use crate::rng::{RandomSource, SplitMix64};
use crate::types::Color;

/// A paintable pattern. Implementations draw side effects onto the given
/// context and return nothing.
pub trait Pattern {
    fn render(&self, ctx: &mut dyn Canvas);
}

/// Inset rectangle, filled and stroked with the stroke fully contained
/// within the canvas bounds.
#[derive(Debug, Clone)]
pub struct FilledRectangle {
    pub line_width: f64,
    pub fill_color: Color,
    pub stroke_color: Color,
}

impl Default for FilledRectangle {
    fn default() -> Self {
        Self {
            line_width: 20.0,
            fill_color: Color::red(),
            stroke_color: Color::black(),
        }
    }
}

impl Pattern for FilledRectangle {
    fn render(&self, ctx: &mut dyn Canvas) {
        let size = ctx.size();
        let inset = self.line_width / 2.0;

        ctx.set_fill_color(self.fill_color);
        ctx.set_line_width(self.line_width);
        ctx.set_stroke_color(self.stroke_color);
        ctx.rect(
            inset,
            inset,
            size.width - self.line_width,
            size.height - self.line_width,
        );
        ctx.fill();
        ctx.stroke();
    }
}

/// Grid of unfilled circles whose stroke color fades with grid position.
#[derive(Debug, Clone)]
pub struct GradientCircleGrid {
    pub grid_size: u32,
    pub radius: f64,
    pub spacing: f64,
    /// Center of the first circle, applied to both axes.
    pub offset: f64,
}

impl Default for GradientCircleGrid {
    fn default() -> Self {
        Self {
            grid_size: 15,
            radius: 15.0,
            spacing: 40.0,
            offset: 25.0,
        }
    }
}

impl GradientCircleGrid {
    /// Stroke color for the circle at (row, col): green fades with the row,
    /// blue with the column, channels clamped the way CSS clamps `rgb()`.
    pub fn stroke_color(row: u32, col: u32) -> Color {
        let g = (255.0 - 42.5 * row as f64).floor().clamp(0.0, 255.0);
        let b = (255.0 - 42.5 * col as f64).floor().clamp(0.0, 255.0);
        Color::rgb8(0, g as u8, b as u8)
    }
}

impl Pattern for GradientCircleGrid {
    fn render(&self, ctx: &mut dyn Canvas) {
        for i in 0..self.grid_size {
            for j in 0..self.grid_size {
                ctx.set_stroke_color(Self::stroke_color(i, j));
                ctx.begin_path();
                ctx.arc(
                    self.offset + j as f64 * self.spacing,
                    self.offset + i as f64 * self.spacing,
                    self.radius,
                    0.0,
                    PI * 2.0,
                );
                ctx.stroke();
            }
        }
    }
}

/// Dense line grid clipped to a circle centered on the canvas.
#[derive(Debug, Clone)]
pub struct CircularHatch {
    pub spacing: f64,
    pub line_width: f64,
}

impl Default for CircularHatch {
    fn default() -> Self {
        Self {
            spacing: 10.0,
            line_width: 1.0,
        }
    }
}

impl Pattern for CircularHatch {
    fn render(&self, ctx: &mut dyn Canvas) {
        let size = ctx.size();

        // Clip is scoped to this operation: save before clipping, restore
        // after the last stroke.
        ctx.save();
        ctx.begin_path();
        ctx.arc(
            size.width * 0.5,
            size.height * 0.5,
            (size.height * 0.5).max(0.0),
            0.0,
            PI * 2.0,
        );
        ctx.close_path();
        ctx.clip();

        ctx.set_line_width(self.line_width);

        if self.spacing > 0.0 {
            // horizontal lines
            let mut y = 0.0;
            while y < size.height {
                ctx.begin_path();
                ctx.move_to(0.0, y);
                ctx.line_to(size.width, y);
                ctx.stroke();
                y += self.spacing;
            }

            // vertical lines
            let mut x = 0.0;
            while x < size.width {
                ctx.begin_path();
                ctx.move_to(x, 0.0);
                ctx.line_to(x, size.height);
                ctx.stroke();
                x += self.spacing;
            }
        }

        ctx.restore();
    }
}

/// Alternating up/down triangle tiling with randomized HSL colors.
///
/// Colors draw from the injected random source; the same source state
/// reproduces the same output.
#[derive(Debug, Clone)]
pub struct TriangleTessellation<R: RandomSource + Clone = SplitMix64> {
    pub side: f64,
    source: R,
}

impl TriangleTessellation<SplitMix64> {
    pub fn new(seed: u64) -> Self {
        Self::with_source(SplitMix64::new(seed))
    }
}

impl<R: RandomSource + Clone> TriangleTessellation<R> {
    pub fn with_source(source: R) -> Self {
        Self { side: 40.0, source }
    }

    fn next_color(rng: &mut R, hue: f64) -> Color {
        let lightness = rng.next_in_range(0, 60) as f64 / 100.0;
        Color::from_hsl(hue, 0.5, lightness)
    }
}

impl<R: RandomSource + Clone> Pattern for TriangleTessellation<R> {
    fn render(&self, ctx: &mut dyn Canvas) {
        const HEIGHT_SCALE: f64 = 0.866;

        let size = ctx.size();
        let mut rng = self.source.clone();

        ctx.set_fill_color(Color::black());
        ctx.fill_rect(0.0, 0.0, size.width, size.height);
        ctx.set_line_width(1.0);

        let hue_start = rng.next_in_range(0, 360) as f64;
        let half = self.side / 2.0;
        let row_height = (self.side * HEIGHT_SCALE).floor();
        if row_height <= 0.0 {
            return;
        }
        let columns = (size.width / self.side).ceil() as i64 + 1;
        let rows = (size.height / row_height).ceil() as i64;

        for row in 0..rows {
            let hue = hue_start + row as f64 * 3.0;

            for col in 0..columns {
                let mut x = col as f64 * self.side;
                let y = row as f64 * row_height;
                if row % 2 != 0 {
                    x -= half;
                }

                // upward pointing triangle
                let color = Self::next_color(&mut rng, hue);
                ctx.set_fill_color(color);
                ctx.set_stroke_color(color);
                ctx.begin_path();
                ctx.move_to(x, y);
                ctx.line_to(x + half, y + row_height);
                ctx.line_to(x - half, y + row_height);
                ctx.close_path();
                ctx.fill();
                ctx.stroke(); // closes antialiased gaps on shared edges

                // downward pointing triangle
                let color = Self::next_color(&mut rng, hue);
                ctx.set_fill_color(color);
                ctx.set_stroke_color(color);
                ctx.begin_path();
                ctx.move_to(x, y);
                ctx.line_to(x + self.side, y);
                ctx.line_to(x + half, y + row_height);
                ctx.close_path();
                ctx.fill();
                ctx.stroke();
            }
        }
    }
}
