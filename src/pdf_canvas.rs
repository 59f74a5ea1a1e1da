//! PDF content-stream canvas backend
//!
//! Records drawing-context operations into a `pdf_writer::Content` stream.
//! The current path is buffered and replayed for every paint so canvas path
//! semantics (fill and stroke of one path, clip without consuming) map onto
//! PDF's consume-on-paint path model. A flip transform at the top of the
//! stream puts the origin at the top-left corner.

use pdf_writer::Content;

use crate::canvas::{Canvas, CanvasState, PathCommand};
use crate::types::{Color, Size};

/// Control-point factor approximating a quarter circle with one cubic.
const QUARTER_ARC_KAPPA: f64 = 0.552_284_75;

pub struct PdfCanvas {
    size: Size,
    content: Content,
    state: CanvasState,
    state_stack: Vec<CanvasState>,
    path: Vec<PathCommand>,
}

impl PdfCanvas {
    pub fn new(size: Size) -> Self {
        let mut content = Content::new();
        // Map the top-left-origin canvas space onto PDF's bottom-up space.
        content.transform([1.0, 0.0, 0.0, -1.0, 0.0, size.height as f32]);
        Self {
            size,
            content,
            state: CanvasState::default(),
            state_stack: Vec::new(),
            path: Vec::new(),
        }
    }

    /// Finalize into raw content-stream bytes.
    pub fn finish(self) -> Vec<u8> {
        self.content.finish()
    }

    fn replay_path(content: &mut Content, path: &[PathCommand]) {
        let mut has_current = false;
        for command in path {
            match *command {
                PathCommand::MoveTo { x, y } => {
                    content.move_to(x as f32, y as f32);
                    has_current = true;
                }
                PathCommand::LineTo { x, y } => {
                    if has_current {
                        content.line_to(x as f32, y as f32);
                    } else {
                        content.move_to(x as f32, y as f32);
                    }
                    has_current = true;
                }
                PathCommand::Rect { x, y, width, height } => {
                    content.rect(x as f32, y as f32, width as f32, height as f32);
                    has_current = true;
                }
                PathCommand::Arc {
                    cx,
                    cy,
                    radius,
                    start_angle,
                    end_angle,
                } => {
                    Self::replay_arc(
                        content,
                        cx,
                        cy,
                        radius,
                        start_angle,
                        end_angle,
                        has_current,
                    );
                    has_current = true;
                }
                PathCommand::Close => {
                    content.close_path();
                }
            }
        }
    }

    /// Emit an arc as cubic Bézier segments of at most a quarter turn each.
    fn replay_arc(
        content: &mut Content,
        cx: f64,
        cy: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        has_current: bool,
    ) {
        let sweep = end_angle - start_angle;
        let start = (
            cx + radius * start_angle.cos(),
            cy + radius * start_angle.sin(),
        );
        if has_current {
            content.line_to(start.0 as f32, start.1 as f32);
        } else {
            content.move_to(start.0 as f32, start.1 as f32);
        }
        if sweep == 0.0 || radius <= 0.0 {
            return;
        }

        let segments = (sweep.abs() / std::f64::consts::FRAC_PI_2).ceil().max(1.0) as usize;
        let step = sweep / segments as f64;
        // Exact for a quarter turn, scaled for shorter segments.
        let kappa = if (step.abs() - std::f64::consts::FRAC_PI_2).abs() < 1e-9 {
            QUARTER_ARC_KAPPA
        } else {
            4.0 / 3.0 * (step / 4.0).tan()
        };

        let mut angle = start_angle;
        for _ in 0..segments {
            let next = angle + step;
            let c1 = (
                cx + radius * (angle.cos() - kappa * angle.sin()),
                cy + radius * (angle.sin() + kappa * angle.cos()),
            );
            let c2 = (
                cx + radius * (next.cos() + kappa * next.sin()),
                cy + radius * (next.sin() - kappa * next.cos()),
            );
            let end = (cx + radius * next.cos(), cy + radius * next.sin());
            content.cubic_to(
                c1.0 as f32,
                c1.1 as f32,
                c2.0 as f32,
                c2.1 as f32,
                end.0 as f32,
                end.1 as f32,
            );
            angle = next;
        }
    }
}

impl Canvas for PdfCanvas {
    fn size(&self) -> Size {
        self.size
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state.fill_color = color;
        self.content
            .set_fill_rgb(color.r as f32, color.g as f32, color.b as f32);
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke_color = color;
        self.content
            .set_stroke_rgb(color.r as f32, color.g as f32, color.b as f32);
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
        self.content.set_line_width(width as f32);
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
        Self::replay_path(&mut self.content, &self.path);
        self.content.fill_nonzero();
    }

    fn stroke(&mut self) {
        Self::replay_path(&mut self.content, &self.path);
        self.content.stroke();
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.content
            .rect(x as f32, y as f32, width as f32, height as f32);
        self.content.fill_nonzero();
    }

    fn clip(&mut self) {
        Self::replay_path(&mut self.content, &self.path);
        self.content.clip_nonzero();
        self.content.end_path();
    }

    fn save(&mut self) {
        self.state_stack.push(self.state.clone());
        self.content.save_state();
    }

    fn restore(&mut self) {
        if let Some(state) = self.state_stack.pop() {
            self.state = state;
            self.content.restore_state();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{GradientCircleGrid, Pattern};

    fn content_text(canvas: PdfCanvas) -> String {
        String::from_utf8_lossy(&canvas.finish()).into_owned()
    }

    #[test]
    fn starts_with_flip_transform() {
        let canvas = PdfCanvas::new(Size::new(600.0, 600.0));
        let text = content_text(canvas);
        assert!(text.contains("cm"));
        assert!(text.contains("-1"));
    }

    #[test]
    fn fill_then_stroke_replays_the_same_path() {
        let mut canvas = PdfCanvas::new(Size::new(100.0, 100.0));
        canvas.rect(10.0, 10.0, 80.0, 80.0);
        canvas.fill();
        canvas.stroke();
        let text = content_text(canvas);
        assert_eq!(text.matches("re").count(), 2);
    }

    #[test]
    fn clip_emits_clip_operator() {
        let mut canvas = PdfCanvas::new(Size::new(100.0, 100.0));
        canvas.rect(0.0, 0.0, 50.0, 50.0);
        canvas.clip();
        let text = content_text(canvas);
        assert!(text.contains('W'));
    }

    #[test]
    fn restore_without_save_is_a_no_op() {
        let mut canvas = PdfCanvas::new(Size::new(100.0, 100.0));
        canvas.restore();
        canvas.save();
        canvas.set_line_width(5.0);
        canvas.restore();
        assert_eq!(canvas.state.line_width, 1.0);
    }

    #[test]
    fn pattern_output_is_deterministic() {
        let pattern = GradientCircleGrid::default();
        let mut a = PdfCanvas::new(Size::new(600.0, 600.0));
        let mut b = PdfCanvas::new(Size::new(600.0, 600.0));
        pattern.render(&mut a);
        pattern.render(&mut b);
        assert_eq!(a.finish(), b.finish());
    }
}
