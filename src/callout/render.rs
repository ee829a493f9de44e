use crate::callout::controller::RenderSurface;
use crate::callout::geometry::{Point, Rect};
use crate::callout::layout::ResolvedLayout;
use crate::callout::path::{bounding_rect, OutlinePath};
use crate::callout::style::{rgba_index, Background, BackgroundImage, Color, ImageMode};

/// Straight-alpha RGBA8 canvas that rasterizes callout outlines in software.
///
/// `origin` is the window-local coordinate that maps onto the top-left
/// corner of pixel (0, 0), so a canvas can extend past the window frame to
/// hold the outer half of the border stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    origin: Point,
    rgba: Vec<u8>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_origin(width, height, Point::default())
    }

    pub fn with_origin(width: u32, height: u32, origin: Point) -> Self {
        let len = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        Self {
            width,
            height,
            origin,
            rgba: vec![0; len],
        }
    }

    /// Canvas covering `layout`'s window plus half the border on each side.
    pub fn for_layout(layout: &ResolvedLayout, border_width: f32) -> Self {
        let half = border_width.max(0.0) / 2.0;
        let width = (layout.window_frame.width() + half * 2.0).ceil().max(1.0) as u32;
        let height = (layout.window_frame.height() + half * 2.0).ceil().max(1.0) as u32;
        Self::with_origin(width, height, Point::new(-half, -half))
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn rgba_pixels(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        if x >= self.width || y >= self.height {
            return Color::TRANSPARENT;
        }
        let idx = rgba_index(self.width, x, y);
        Color::from_rgba_array([
            self.rgba[idx],
            self.rgba[idx + 1],
            self.rgba[idx + 2],
            self.rgba[idx + 3],
        ])
    }

    /// Pixel under a window-local coordinate.
    pub fn pixel_at(&self, local: Point) -> Color {
        let x = (local.x - self.origin.x).floor();
        let y = (local.y - self.origin.y).floor();
        if x < 0.0 || y < 0.0 {
            return Color::TRANSPARENT;
        }
        self.pixel(x as u32, y as u32)
    }

    pub fn clear(&mut self, color: Color) {
        for px in self.rgba.chunks_exact_mut(4) {
            px.copy_from_slice(&color.to_rgba_array());
        }
    }

    fn pixel_center(&self, x: u32, y: u32) -> Point {
        Point::new(
            self.origin.x + x as f32 + 0.5,
            self.origin.y + y as f32 + 0.5,
        )
    }

    fn blend_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height || color.a == 0 {
            return;
        }
        let idx = rgba_index(self.width, x, y);
        let dst = [
            self.rgba[idx],
            self.rgba[idx + 1],
            self.rgba[idx + 2],
            self.rgba[idx + 3],
        ];
        let blended = blend_over(Color::from_rgba_array(dst), color);
        self.rgba[idx..idx + 4].copy_from_slice(&blended.to_rgba_array());
    }

    /// Pixel rows/columns whose centers may fall inside `rect` (window-local).
    fn pixel_span(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let x0 = (rect.min_x() - self.origin.x - 0.5).floor().max(0.0);
        let y0 = (rect.min_y() - self.origin.y - 0.5).floor().max(0.0);
        let x1 = (rect.max_x() - self.origin.x + 0.5).ceil().min(self.width as f32);
        let y1 = (rect.max_y() - self.origin.y + 0.5).ceil().min(self.height as f32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

impl RenderSurface for PixelCanvas {
    fn fill_path(&mut self, path: &OutlinePath, background: &Background) {
        let polygon = path.flatten();
        if polygon.len() < 3 {
            return;
        }
        let bounds = bounding_rect(&polygon);
        let Some((_, y0, _, y1)) = self.pixel_span(bounds) else {
            return;
        };

        let mut crossings = Vec::with_capacity(8);
        for y in y0..y1 {
            let sample_y = self.origin.y + y as f32 + 0.5;
            scanline_crossings(&polygon, sample_y, &mut crossings);
            for span in crossings.chunks_exact(2) {
                let start = (span[0] - self.origin.x - 0.5).ceil().max(0.0) as u32;
                let end = (span[1] - self.origin.x - 0.5).ceil().min(self.width as f32);
                if end <= 0.0 {
                    continue;
                }
                for x in start..end as u32 {
                    let color = match background {
                        Background::Color(color) => *color,
                        Background::Image(image) => {
                            sample_image(image, bounds, self.pixel_center(x, y))
                        }
                    };
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    fn stroke_path(&mut self, path: &OutlinePath, color: Color, width: f32) {
        if width <= 0.0 {
            return;
        }
        let polygon = path.flatten();
        if polygon.len() < 2 {
            return;
        }
        let half = width / 2.0;
        let half_sq = half * half;
        let bounds = bounding_rect(&polygon).outset(half);
        let Some((x0, y0, x1, y1)) = self.pixel_span(bounds) else {
            return;
        };

        for y in y0..y1 {
            for x in x0..x1 {
                let center = self.pixel_center(x, y);
                let n = polygon.len();
                let hit = (0..n).any(|i| {
                    point_segment_distance_sq(center, polygon[i], polygon[(i + 1) % n]) <= half_sq
                });
                if hit {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }
}

/// Sorted x coordinates where the closed polygon crosses the horizontal line
/// at `y`. Half-open on y so shared vertices are counted once.
fn scanline_crossings(polygon: &[Point], y: f32, out: &mut Vec<f32>) {
    out.clear();
    let n = polygon.len();
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        if (a.y <= y) != (b.y <= y) {
            out.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
        }
    }
    out.sort_by(|l, r| l.total_cmp(r));
}

fn sample_image(image: &BackgroundImage, bounds: Rect, at: Point) -> Color {
    let u = at.x - bounds.min_x();
    let v = at.y - bounds.min_y();
    let (w, h) = (image.width() as f32, image.height() as f32);
    let (sx, sy) = match image.mode {
        ImageMode::Tile => (u.rem_euclid(w), v.rem_euclid(h)),
        ImageMode::Stretch => (
            u / bounds.width().max(1.0) * w,
            v / bounds.height().max(1.0) * h,
        ),
    };
    image.pixel(sx.max(0.0) as u32, sy.max(0.0) as u32)
}

fn blend_over(dst: Color, src: Color) -> Color {
    if src.a == 255 {
        return src;
    }
    let sa = u32::from(src.a);
    let da = u32::from(dst.a) * (255 - sa) / 255;
    let out_a = sa + da;
    if out_a == 0 {
        return Color::TRANSPARENT;
    }
    let channel = |s: u8, d: u8| ((u32::from(s) * sa + u32::from(d) * da) / out_a) as u8;
    Color::rgba(
        channel(src.r, dst.r),
        channel(src.g, dst.g),
        channel(src.b, dst.b),
        out_a as u8,
    )
}

fn point_segment_distance_sq(point: Point, start: Point, end: Point) -> f32 {
    let vx = end.x - start.x;
    let vy = end.y - start.y;
    let wx = point.x - start.x;
    let wy = point.y - start.y;
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f32::EPSILON {
        return wx * wx + wy * wy;
    }
    let t = ((wx * vx + wy * vy) / len_sq).clamp(0.0, 1.0);
    let dx = point.x - (start.x + vx * t);
    let dy = point.y - (start.y + vy * t);
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::{blend_over, PixelCanvas};
    use crate::callout::controller::RenderSurface;
    use crate::callout::geometry::{Point, Size};
    use crate::callout::layout::{compute_layout, AttachmentSpec};
    use crate::callout::side::Side;
    use crate::callout::style::{Background, BackgroundImage, Color, ImageMode, StyleParameters};

    const FILL: Color = Color::rgba(10, 20, 30, 255);
    const BORDER: Color = Color::rgba(250, 250, 250, 255);

    fn arrow_style() -> StyleParameters {
        StyleParameters {
            border_width: 0.0,
            view_margin: 0.0,
            corner_radius: 0.0,
            has_arrow: true,
            arrow_base_width: 20.0,
            arrow_height: 10.0,
            distance: 0.0,
            background: Background::Color(FILL),
            ..StyleParameters::default()
        }
    }

    fn top_request() -> AttachmentSpec {
        AttachmentSpec {
            side: Side::Top,
            ..AttachmentSpec::new(Size::new(40.0, 30.0), Point::new(100.0, 100.0))
        }
    }

    #[test]
    fn fill_covers_body_and_notch_only() {
        let style = arrow_style();
        let layout = compute_layout(&top_request(), &style).expect("layout");
        let mut canvas = PixelCanvas::for_layout(&layout, 0.0);
        assert_eq!(canvas.size(), (40, 40));
        canvas.fill_path(&layout.outline, &style.background);

        assert_eq!(canvas.pixel_at(Point::new(20.0, 15.0)), FILL);
        // just under the body, inside the notch
        assert_eq!(canvas.pixel_at(Point::new(20.0, 31.0)), FILL);
        // same row, outside the notch
        assert_eq!(canvas.pixel_at(Point::new(3.0, 31.0)), Color::TRANSPARENT);
        assert_eq!(canvas.pixel_at(Point::new(37.0, 35.0)), Color::TRANSPARENT);
    }

    #[test]
    fn stroke_stays_near_the_outline() {
        let style = StyleParameters {
            border_width: 2.0,
            ..arrow_style()
        };
        let layout = compute_layout(&top_request(), &style).expect("layout");
        let mut canvas = PixelCanvas::for_layout(&layout, style.border_width);
        canvas.fill_path(&layout.outline, &style.background);
        canvas.stroke_path(&layout.outline, BORDER, style.border_width);

        assert_eq!(canvas.pixel_at(Point::new(0.2, 10.0)), BORDER);
        assert_eq!(canvas.pixel_at(Point::new(-0.6, 10.0)), BORDER);
        assert_eq!(canvas.pixel_at(Point::new(21.0, 16.0)), FILL);
    }

    #[test]
    fn tiled_image_repeats_across_the_fill() {
        let pixels = vec![
            255, 0, 0, 255, 0, 0, 255, 255, //
            0, 0, 255, 255, 255, 0, 0, 255,
        ];
        let image = BackgroundImage::from_rgba(2, 2, pixels, ImageMode::Tile).expect("image");
        let style = StyleParameters {
            has_arrow: false,
            background: Background::Image(image),
            ..arrow_style()
        };
        let layout = compute_layout(&top_request(), &style).expect("layout");
        let mut canvas = PixelCanvas::for_layout(&layout, 0.0);
        canvas.fill_path(&layout.outline, &style.background);

        let red = Color::rgba(255, 0, 0, 255);
        let blue = Color::rgba(0, 0, 255, 255);
        assert_eq!(canvas.pixel(0, 0), red);
        assert_eq!(canvas.pixel(1, 0), blue);
        assert_eq!(canvas.pixel(2, 0), red);
        assert_eq!(canvas.pixel(1, 1), red);
    }

    #[test]
    fn translucent_source_blends_over_destination() {
        let out = blend_over(
            Color::rgba(0, 0, 0, 255),
            Color::rgba(255, 255, 255, 128),
        );
        assert_eq!(out.a, 255);
        assert!(out.r > 120 && out.r < 135);
        assert_eq!(
            blend_over(Color::TRANSPARENT, Color::rgba(9, 9, 9, 0)),
            Color::TRANSPARENT
        );
    }

    #[test]
    fn clear_sets_every_pixel() {
        let mut canvas = PixelCanvas::new(3, 2);
        canvas.clear(FILL);
        assert!(canvas
            .rgba_pixels()
            .chunks_exact(4)
            .all(|px| px == FILL.to_rgba_array()));
    }
}
