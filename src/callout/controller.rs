use crate::callout::geometry::{Point, Rect, Size};
use crate::callout::layout::{compute_layout, AttachmentSpec, LayoutError, ResolvedLayout};
use crate::callout::path::OutlinePath;
use crate::callout::side::Side;
use crate::callout::style::{Background, Color, StyleParameters};

/// Non-owning id of the view hosted inside the callout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHandle(pub u64);

/// Non-owning id of the window the target point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostWindowHandle(pub u64);

/// Presentation side of the callout: whatever actually owns the on-screen
/// window. Calls arrive synchronously from [`CalloutWindow::apply`]; the
/// redraw itself is expected to happen on the host's next drawing pass.
pub trait PresentationHost {
    fn set_window_frame(&mut self, frame: Rect);
    fn place_content(&mut self, content: ContentHandle, rect: Rect);
    fn request_redraw(&mut self);
}

/// Drawing backend that receives the outline in window-local coordinates.
pub trait RenderSurface {
    fn fill_path(&mut self, path: &OutlinePath, background: &Background);
    fn stroke_path(&mut self, path: &OutlinePath, color: Color, width: f32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Unchanged,
    Updated,
}

/// A borderless callout attached to a point.
///
/// Style and attachment live in two plain records. Mutate them through
/// [`style_mut`](Self::style_mut) / [`attachment_mut`](Self::attachment_mut)
/// or the convenience setters, then call [`apply`](Self::apply); every
/// setter here applies immediately.
#[derive(Debug, Clone)]
pub struct CalloutWindow {
    content: ContentHandle,
    host_window: Option<HostWindowHandle>,
    attachment: AttachmentSpec,
    style: StyleParameters,
    layout: Option<ResolvedLayout>,
    painted: Option<PaintInputs>,
    outline_dirty: bool,
}

/// Style fields that change pixels without changing geometry.
#[derive(Debug, Clone, PartialEq)]
struct PaintInputs {
    border_width: f32,
    border_color: Color,
    background: Background,
}

impl PaintInputs {
    fn of(style: &StyleParameters) -> Self {
        Self {
            border_width: style.border_width,
            border_color: style.border_color,
            background: style.background.clone(),
        }
    }
}

impl CalloutWindow {
    pub fn new(content: ContentHandle, view_size: Size, point: Point) -> Self {
        Self {
            content,
            host_window: None,
            attachment: AttachmentSpec::new(view_size, point),
            style: StyleParameters::default(),
            layout: None,
            painted: None,
            outline_dirty: true,
        }
    }

    /// Interprets the point relative to `frame`, the host window's frame in
    /// working-space coordinates.
    pub fn in_window(mut self, window: HostWindowHandle, frame: Rect) -> Self {
        self.host_window = Some(window);
        self.attachment.containing_rect = Some(frame);
        self
    }

    pub fn on_side(mut self, side: Side) -> Self {
        self.attachment.side = side;
        self
    }

    pub fn at_distance(mut self, distance: f32) -> Self {
        self.style.distance = distance;
        self
    }

    pub fn with_style(mut self, style: StyleParameters) -> Self {
        self.style = style;
        self
    }

    pub fn on_screen(mut self, screen: Rect) -> Self {
        self.attachment.screen_rect = Some(screen);
        self
    }

    pub fn content(&self) -> ContentHandle {
        self.content
    }

    pub fn host_window(&self) -> Option<HostWindowHandle> {
        self.host_window
    }

    pub fn style(&self) -> &StyleParameters {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut StyleParameters {
        &mut self.style
    }

    pub fn attachment(&self) -> &AttachmentSpec {
        &self.attachment
    }

    pub fn attachment_mut(&mut self) -> &mut AttachmentSpec {
        &mut self.attachment
    }

    pub fn layout(&self) -> Option<&ResolvedLayout> {
        self.layout.as_ref()
    }

    pub fn is_outline_dirty(&self) -> bool {
        self.outline_dirty
    }

    /// Fill color the window paints behind the content. The window's own
    /// background stays transparent so the outline shape shows.
    pub fn window_background_color(&self) -> Color {
        self.style.background_color()
    }

    /// Window frame grown by half the border width, enough to hold the part
    /// of the stroke that lies outside the outline.
    pub fn surface_bounds(&self) -> Option<Rect> {
        let half_border = self.style.border_width.max(0.0) / 2.0;
        self.layout
            .as_ref()
            .map(|layout| layout.window_frame.outset(half_border))
    }

    pub fn hit_test(&self, point: Point) -> bool {
        self.layout
            .as_ref()
            .map(|layout| layout.hit_test(point))
            .unwrap_or(false)
    }

    /// Sanitizes the stored style, recomputes the layout and pushes any change
    /// to the host. Geometry changes move the window and place the content;
    /// color-only changes just request a redraw. On error the previous layout
    /// is kept.
    pub fn apply<H: PresentationHost>(&mut self, host: &mut H) -> Result<ApplyOutcome, LayoutError> {
        self.style.sanitize();
        let next = match compute_layout(&self.attachment, &self.style) {
            Ok(layout) => layout,
            Err(err) => {
                tracing::warn!(error = %err, "rejected callout geometry; keeping previous layout");
                return Err(err);
            }
        };
        let paint = PaintInputs::of(&self.style);

        let geometry_changed = self.layout.as_ref() != Some(&next);
        let paint_changed = self.painted.as_ref() != Some(&paint);
        if !geometry_changed && !paint_changed {
            return Ok(ApplyOutcome::Unchanged);
        }

        if geometry_changed {
            let frame = next.window_frame;
            host.set_window_frame(frame);
            host.place_content(self.content, next.content_rect);
            tracing::debug!(side = ?next.side, ?frame, "callout window moved");
            self.layout = Some(next);
        }
        self.painted = Some(paint);
        self.outline_dirty = true;
        host.request_redraw();
        Ok(ApplyOutcome::Updated)
    }

    /// Runs `edit` on the attachment and applies it, restoring the previous
    /// attachment and host window when the result is rejected.
    fn apply_attachment<H, F>(&mut self, host: &mut H, edit: F) -> Result<ApplyOutcome, LayoutError>
    where
        H: PresentationHost,
        F: FnOnce(&mut AttachmentSpec, &mut Option<HostWindowHandle>),
    {
        let previous = (self.attachment.clone(), self.host_window);
        edit(&mut self.attachment, &mut self.host_window);
        let result = self.apply(host);
        if result.is_err() {
            (self.attachment, self.host_window) = previous;
        }
        result
    }

    /// Applies `edit` to the style and re-lays out the window.
    pub fn update_style<H, F>(&mut self, host: &mut H, edit: F) -> Result<ApplyOutcome, LayoutError>
    where
        H: PresentationHost,
        F: FnOnce(&mut StyleParameters),
    {
        edit(&mut self.style);
        self.apply(host)
    }

    pub fn set_point_and_side<H: PresentationHost>(
        &mut self,
        host: &mut H,
        point: Point,
        side: Side,
    ) -> Result<ApplyOutcome, LayoutError> {
        self.apply_attachment(host, |attachment, _| {
            attachment.target_point = point;
            attachment.side = side;
        })
    }

    /// Re-attaches to a point in another (or the same) host window.
    pub fn attach<H: PresentationHost>(
        &mut self,
        host: &mut H,
        point: Point,
        side: Side,
        window: Option<(HostWindowHandle, Rect)>,
    ) -> Result<ApplyOutcome, LayoutError> {
        self.apply_attachment(host, |attachment, host_window| {
            *host_window = window.map(|(handle, _)| handle);
            attachment.containing_rect = window.map(|(_, frame)| frame);
            attachment.target_point = point;
            attachment.side = side;
        })
    }

    pub fn set_view_size<H: PresentationHost>(
        &mut self,
        host: &mut H,
        size: Size,
    ) -> Result<ApplyOutcome, LayoutError> {
        self.apply_attachment(host, |attachment, _| attachment.view_size = size)
    }

    pub fn set_border_color<H: PresentationHost>(
        &mut self,
        host: &mut H,
        color: Color,
    ) -> Result<ApplyOutcome, LayoutError> {
        self.update_style(host, |style| style.border_color = color)
    }

    pub fn set_background<H: PresentationHost>(
        &mut self,
        host: &mut H,
        background: Background,
    ) -> Result<ApplyOutcome, LayoutError> {
        self.update_style(host, |style| style.background = background)
    }

    /// Paints the current layout: background fill first, then the border.
    /// Clears the dirty flag.
    pub fn paint<S: RenderSurface>(&mut self, surface: &mut S) {
        let Some(layout) = self.layout.as_ref() else {
            return;
        };
        surface.fill_path(&layout.outline, &self.style.background);
        if self.style.border_width > 0.0 {
            surface.stroke_path(&layout.outline, self.style.border_color, self.style.border_width);
        }
        self.outline_dirty = false;
    }
}

/// Host that only records what it was asked to do. Handy for headless use
/// and for tests.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingHost {
    pub frame: Option<Rect>,
    pub content: Option<(ContentHandle, Rect)>,
    pub frame_changes: usize,
    pub redraw_requests: usize,
}

impl PresentationHost for RecordingHost {
    fn set_window_frame(&mut self, frame: Rect) {
        self.frame = Some(frame);
        self.frame_changes += 1;
    }

    fn place_content(&mut self, content: ContentHandle, rect: Rect) {
        self.content = Some((content, rect));
    }

    fn request_redraw(&mut self) {
        self.redraw_requests += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ApplyOutcome, CalloutWindow, ContentHandle, HostWindowHandle, RecordingHost, RenderSurface,
    };
    use crate::callout::geometry::{Point, Rect, Size};
    use crate::callout::layout::LayoutError;
    use crate::callout::path::OutlinePath;
    use crate::callout::side::Side;
    use crate::callout::style::{Background, Color};

    #[derive(Default)]
    struct CallLog {
        calls: Vec<&'static str>,
        stroke_width: Option<f32>,
    }

    impl RenderSurface for CallLog {
        fn fill_path(&mut self, _path: &OutlinePath, _background: &Background) {
            self.calls.push("fill");
        }

        fn stroke_path(&mut self, _path: &OutlinePath, _color: Color, width: f32) {
            self.calls.push("stroke");
            self.stroke_width = Some(width);
        }
    }

    fn window() -> CalloutWindow {
        CalloutWindow::new(
            ContentHandle(7),
            Size::new(80.0, 40.0),
            Point::new(200.0, 200.0),
        )
        .on_side(Side::Bottom)
    }

    #[test]
    fn apply_pushes_frame_content_and_redraw_once() {
        let mut host = RecordingHost::default();
        let mut callout = window();
        assert_eq!(callout.apply(&mut host), Ok(ApplyOutcome::Updated));
        assert_eq!(host.frame_changes, 1);
        assert_eq!(host.redraw_requests, 1);
        let layout = callout.layout().expect("layout");
        assert_eq!(host.frame, Some(layout.window_frame));
        assert_eq!(host.content, Some((ContentHandle(7), layout.content_rect)));
        assert!(callout.is_outline_dirty());
    }

    #[test]
    fn reattaching_same_parameters_is_idempotent() {
        let mut host = RecordingHost::default();
        let mut callout = window();
        callout.apply(&mut host).expect("first apply");
        let before = callout.layout().cloned();

        let outcome = callout
            .set_point_and_side(&mut host, Point::new(200.0, 200.0), Side::Bottom)
            .expect("re-attach");
        assert_eq!(outcome, ApplyOutcome::Unchanged);
        assert_eq!(callout.layout().cloned(), before);
        assert_eq!(host.frame_changes, 1);
        assert_eq!(host.redraw_requests, 1);
    }

    #[test]
    fn negative_border_width_is_floored_on_apply() {
        let mut host = RecordingHost::default();
        let mut callout = window();
        callout
            .update_style(&mut host, |style| style.border_width = -5.0)
            .expect("apply");
        assert_eq!(callout.style().border_width, 0.0);

        let mut surface = CallLog::default();
        callout.paint(&mut surface);
        assert_eq!(surface.calls, vec!["fill"]);
    }

    #[test]
    fn paint_fills_before_stroking() {
        let mut host = RecordingHost::default();
        let mut callout = window();
        callout
            .update_style(&mut host, |style| style.border_width = 3.0)
            .expect("apply");
        let mut surface = CallLog::default();
        callout.paint(&mut surface);
        assert_eq!(surface.calls, vec!["fill", "stroke"]);
        assert_eq!(surface.stroke_width, Some(3.0));
        assert!(!callout.is_outline_dirty());
    }

    #[test]
    fn paint_without_layout_draws_nothing() {
        let mut callout = window();
        let mut surface = CallLog::default();
        callout.paint(&mut surface);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn invalid_view_size_keeps_previous_layout() {
        let mut host = RecordingHost::default();
        let mut callout = window();
        callout.apply(&mut host).expect("apply");
        let before = callout.layout().cloned();

        let err = callout
            .set_view_size(&mut host, Size::new(-1.0, 10.0))
            .expect_err("invalid size");
        assert_eq!(
            err,
            LayoutError::InvalidGeometry {
                width: -1.0,
                height: 10.0
            }
        );
        assert_eq!(callout.layout().cloned(), before);
        assert_eq!(callout.attachment().view_size, Size::new(80.0, 40.0));
        assert_eq!(host.frame_changes, 1);
    }

    #[test]
    fn attach_to_host_window_offsets_the_point() {
        let mut host = RecordingHost::default();
        let mut callout = window();
        let frame = Rect::new(100.0, 100.0, 600.0, 400.0);
        callout
            .attach(
                &mut host,
                Point::new(50.0, 50.0),
                Side::Bottom,
                Some((HostWindowHandle(3), frame)),
            )
            .expect("attach");
        assert_eq!(callout.host_window(), Some(HostWindowHandle(3)));
        let layout = callout.layout().expect("layout");
        let outline = layout.outline_in_working_space();
        let apex = outline.notch().expect("arrow").apex;
        assert!((apex.x - 150.0).abs() < 1e-4);
        assert!((apex.y - 150.0).abs() < 1e-4);
    }

    #[test]
    fn surface_bounds_cover_the_outer_half_of_the_stroke() {
        let mut host = RecordingHost::default();
        let mut callout = window();
        callout
            .update_style(&mut host, |style| style.border_width = 4.0)
            .expect("apply");
        let frame = callout.layout().expect("layout").window_frame;
        assert_eq!(callout.surface_bounds(), Some(frame.outset(2.0)));
    }

    #[test]
    fn window_background_tracks_style() {
        let mut host = RecordingHost::default();
        let mut callout = window();
        let color = Color::rgba(10, 20, 30, 40);
        callout
            .set_background(&mut host, Background::Color(color))
            .expect("apply");
        assert_eq!(callout.window_background_color(), color);
    }

    #[test]
    fn color_changes_request_a_redraw_without_moving() {
        let mut host = RecordingHost::default();
        let mut callout = window();
        callout.apply(&mut host).expect("apply");

        let outcome = callout
            .set_border_color(&mut host, Color::rgba(255, 0, 0, 255))
            .expect("border color");
        assert_eq!(outcome, ApplyOutcome::Updated);
        let outcome = callout
            .set_background(&mut host, Background::Color(Color::rgba(0, 255, 0, 255)))
            .expect("background");
        assert_eq!(outcome, ApplyOutcome::Updated);

        assert_eq!(host.redraw_requests, 3);
        assert_eq!(host.frame_changes, 1);
        assert!(callout.is_outline_dirty());

        let outcome = callout
            .set_border_color(&mut host, Color::rgba(255, 0, 0, 255))
            .expect("same color");
        assert_eq!(outcome, ApplyOutcome::Unchanged);
        assert_eq!(host.redraw_requests, 3);
    }

    #[test]
    fn rejected_point_leaves_the_window_usable() {
        let mut host = RecordingHost::default();
        let mut callout = window();
        callout.apply(&mut host).expect("apply");

        let err = callout
            .set_point_and_side(&mut host, Point::new(f32::NAN, 0.0), Side::Top)
            .expect_err("nan point");
        assert!(matches!(err, LayoutError::NonFiniteTarget { .. }));
        assert_eq!(callout.attachment().target_point, Point::new(200.0, 200.0));
        assert_eq!(callout.attachment().side, Side::Bottom);

        let outcome = callout
            .update_style(&mut host, |style| style.corner_radius = 3.0)
            .expect("later edit still applies");
        assert_eq!(outcome, ApplyOutcome::Updated);
        assert_eq!(callout.layout().expect("layout").corner_radius, 3.0);
    }

    #[test]
    fn rejected_attach_keeps_the_previous_host_window() {
        let mut host = RecordingHost::default();
        let mut callout = window();
        let frame = Rect::new(100.0, 100.0, 600.0, 400.0);
        callout
            .attach(
                &mut host,
                Point::new(50.0, 50.0),
                Side::Bottom,
                Some((HostWindowHandle(3), frame)),
            )
            .expect("attach");

        let bad = Rect::new(f32::INFINITY, 0.0, 10.0, 10.0);
        assert!(callout
            .attach(
                &mut host,
                Point::new(1.0, 1.0),
                Side::Left,
                Some((HostWindowHandle(4), bad)),
            )
            .is_err());
        assert_eq!(callout.host_window(), Some(HostWindowHandle(3)));
        assert_eq!(callout.attachment().containing_rect, Some(frame));
        assert_eq!(callout.attachment().target_point, Point::new(50.0, 50.0));
    }
}
