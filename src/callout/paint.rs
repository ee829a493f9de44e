use crate::callout::controller::{PresentationHost, RenderSurface};
use crate::callout::geometry::{Point, Rect};
use crate::callout::path::OutlinePath;
use crate::callout::render::PixelCanvas;
use crate::callout::style::{Background, BackgroundImage, Color};
use eframe::egui::{self, Color32, Pos2, Shape, Stroke};

pub fn to_color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

pub fn from_color32(color: Color32) -> Color {
    Color::from_rgba_array(color.to_srgba_unmultiplied())
}

pub fn to_pos2(point: Point) -> Pos2 {
    egui::pos2(point.x, point.y)
}

pub fn to_egui_rect(rect: Rect) -> egui::Rect {
    egui::Rect::from_min_size(
        to_pos2(rect.origin),
        egui::vec2(rect.width(), rect.height()),
    )
}

pub fn from_egui_rect(rect: egui::Rect) -> Rect {
    Rect::new(rect.min.x, rect.min.y, rect.width(), rect.height())
}

/// Keeps the last uploaded background texture so an unchanged image fill is
/// not rasterized and uploaded again on every frame.
#[derive(Default)]
pub struct TextureCache {
    entry: Option<CachedTexture>,
    uploads: usize,
}

struct CachedTexture {
    image: BackgroundImage,
    outline: OutlinePath,
    texture: egui::TextureHandle,
}

impl TextureCache {
    /// Number of textures uploaded so far.
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    fn texture_for(
        &mut self,
        ctx: &egui::Context,
        path: &OutlinePath,
        image: &BackgroundImage,
    ) -> egui::TextureHandle {
        if let Some(cached) = self
            .entry
            .as_ref()
            .filter(|cached| cached.image.is_same_image(image) && cached.outline == *path)
        {
            return cached.texture.clone();
        }

        let bounds = path.bounds();
        let width = bounds.width().ceil().max(1.0) as u32;
        let height = bounds.height().ceil().max(1.0) as u32;
        let mut canvas = PixelCanvas::with_origin(width, height, bounds.origin);
        canvas.fill_path(path, &Background::Image(image.clone()));

        let pixels = egui::ColorImage::from_rgba_unmultiplied(
            [width as usize, height as usize],
            canvas.rgba_pixels(),
        );
        let texture = ctx.load_texture("callout_background", pixels, egui::TextureOptions::LINEAR);
        self.uploads += 1;
        tracing::trace!(width, height, "uploaded callout background texture");
        self.entry = Some(CachedTexture {
            image: image.clone(),
            outline: path.clone(),
            texture: texture.clone(),
        });
        texture
    }
}

/// Paints callout outlines through an egui painter. Window-local coordinates
/// are shifted by `origin`, the screen position of the window's top-left.
pub struct EguiSurface<'a> {
    painter: &'a egui::Painter,
    origin: Pos2,
    textures: &'a mut TextureCache,
}

impl<'a> EguiSurface<'a> {
    pub fn new(painter: &'a egui::Painter, origin: Pos2, textures: &'a mut TextureCache) -> Self {
        Self {
            painter,
            origin,
            textures,
        }
    }

    fn screen_points(&self, points: &[Point]) -> Vec<Pos2> {
        points
            .iter()
            .map(|p| egui::pos2(self.origin.x + p.x, self.origin.y + p.y))
            .collect()
    }

    /// Image fills are rasterized in software and drawn as one texture,
    /// since egui only fills convex shapes with flat colors.
    fn fill_with_image(&mut self, path: &OutlinePath, image: &BackgroundImage) {
        let bounds = path.bounds();
        let texture = self.textures.texture_for(self.painter.ctx(), path, image);
        let size = texture.size_vec2();
        let min = egui::pos2(
            self.origin.x + bounds.min_x(),
            self.origin.y + bounds.min_y(),
        );
        let rect = egui::Rect::from_min_size(min, size);
        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        self.painter.image(texture.id(), rect, uv, Color32::WHITE);
    }
}

impl RenderSurface for EguiSurface<'_> {
    fn fill_path(&mut self, path: &OutlinePath, background: &Background) {
        let color = match background {
            Background::Color(color) => to_color32(*color),
            Background::Image(image) => {
                self.fill_with_image(path, image);
                return;
            }
        };

        // body and notch are each convex; the union is not
        let body = self.screen_points(&path.body_polygon());
        self.painter
            .add(Shape::convex_polygon(body, color, Stroke::NONE));
        if let Some(notch) = path.notch() {
            let triangle = self.screen_points(&notch.triangle());
            self.painter
                .add(Shape::convex_polygon(triangle, color, Stroke::NONE));
        }
    }

    fn stroke_path(&mut self, path: &OutlinePath, color: Color, width: f32) {
        let points = self.screen_points(&path.flatten());
        self.painter
            .add(Shape::closed_line(points, Stroke::new(width, to_color32(color))));
    }
}

/// Host backed by an egui context: frame changes are recorded for the next
/// paint and redraws go through `request_repaint`.
pub struct EguiHost {
    ctx: egui::Context,
    pub frame: Option<Rect>,
    pub content_rect: Option<Rect>,
}

impl EguiHost {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            frame: None,
            content_rect: None,
        }
    }
}

impl PresentationHost for EguiHost {
    fn set_window_frame(&mut self, frame: Rect) {
        self.frame = Some(frame);
    }

    fn place_content(&mut self, _content: crate::callout::controller::ContentHandle, rect: Rect) {
        self.content_rect = Some(rect);
    }

    fn request_redraw(&mut self) {
        self.ctx.request_repaint();
    }
}
