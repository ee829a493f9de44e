//! Geometry engine: turns an attachment request plus style into a window
//! frame, a content rectangle and the closed outline that gets filled,
//! stroked and hit-tested.
//!
//! All coordinates are y-down. `window_frame` is in the caller's working
//! space; `content_rect` and `outline` are local to the window.

use crate::callout::geometry::{Point, Rect, Size};
use crate::callout::path::{ArrowNotch, OutlinePath, PathBuilder};
use crate::callout::side::{resolve_side, ArrowAnchor, Edge, Side};
use crate::callout::style::StyleParameters;
use std::f32::consts::{FRAC_PI_2, PI};

#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentSpec {
    /// Natural size of the attached content.
    pub view_size: Size,
    /// Relative to `containing_rect.origin` when a containing rect is set.
    pub target_point: Point,
    pub containing_rect: Option<Rect>,
    /// Bounds used for automatic placement when there is no containing rect.
    pub screen_rect: Option<Rect>,
    pub side: Side,
}

impl AttachmentSpec {
    pub fn new(view_size: Size, target_point: Point) -> Self {
        Self {
            view_size,
            target_point,
            containing_rect: None,
            screen_rect: None,
            side: Side::Automatic,
        }
    }

    /// Target point in the working space.
    pub fn absolute_target(&self) -> Point {
        match self.containing_rect {
            Some(rect) => rect
                .origin
                .offset(self.target_point.x, self.target_point.y),
            None => self.target_point,
        }
    }

    pub fn placement_bounds(&self) -> Option<Rect> {
        self.containing_rect.or(self.screen_rect)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    InvalidGeometry { width: f32, height: f32 },
    NonFiniteTarget { x: f32, y: f32 },
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidGeometry { width, height } => {
                write!(f, "invalid content size {width}x{height}")
            }
            Self::NonFiniteTarget { x, y } => write!(f, "non-finite target point ({x}, {y})"),
        }
    }
}

impl std::error::Error for LayoutError {}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLayout {
    pub window_frame: Rect,
    pub content_rect: Rect,
    pub outline: OutlinePath,
    pub side: Side,
    /// Radius actually used after clamping to the body size.
    pub corner_radius: f32,
    /// Arrow base actually used after clamping to the arrow edge.
    pub arrow_base_width: f32,
}

impl ResolvedLayout {
    pub fn outline_in_working_space(&self) -> OutlinePath {
        self.outline
            .translate(self.window_frame.min_x(), self.window_frame.min_y())
    }

    pub fn content_frame_in_working_space(&self) -> Rect {
        self.content_rect
            .translate(self.window_frame.min_x(), self.window_frame.min_y())
    }

    pub fn hit_test(&self, point: Point) -> bool {
        let local = Point::new(
            point.x - self.window_frame.min_x(),
            point.y - self.window_frame.min_y(),
        );
        self.outline.contains(local)
    }
}

/// Radii in clockwise order starting top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CornerRadii {
    top_left: f32,
    top_right: f32,
    bottom_right: f32,
    bottom_left: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    side: Side,
    arrow_edge: Edge,
    window_frame: Rect,
    body: Rect,
    content_rect: Rect,
    radius: f32,
    corners: CornerRadii,
    arrow_base: f32,
    apex_along: f32,
}

pub fn compute_layout(
    spec: &AttachmentSpec,
    style: &StyleParameters,
) -> Result<ResolvedLayout, LayoutError> {
    if !spec.view_size.is_positive() {
        return Err(LayoutError::InvalidGeometry {
            width: spec.view_size.width,
            height: spec.view_size.height,
        });
    }
    let target = spec.absolute_target();
    if !target.x.is_finite() || !target.y.is_finite() {
        return Err(LayoutError::NonFiniteTarget {
            x: target.x,
            y: target.y,
        });
    }

    let style = style.sanitized();
    let bounds = spec.placement_bounds();
    let side = resolve_side(spec.side, |candidate| {
        let placement = place(spec.view_size, target, candidate, &style);
        visible_fraction(placement.window_frame, bounds)
    });

    let placement = place(spec.view_size, target, side, &style);
    let outline = trace_outline(&placement, &style);
    tracing::debug!(
        requested = ?spec.side,
        resolved = ?side,
        frame = ?placement.window_frame,
        "computed callout layout"
    );

    Ok(ResolvedLayout {
        window_frame: placement.window_frame,
        content_rect: placement.content_rect,
        outline,
        side,
        corner_radius: placement.radius,
        arrow_base_width: placement.arrow_base,
    })
}

/// Share of `frame` that lies inside `bounds`, in `0.0..=1.0`.
fn visible_fraction(frame: Rect, bounds: Option<Rect>) -> f32 {
    let Some(bounds) = bounds else {
        return 1.0;
    };
    let total = frame.size.area();
    if total <= 0.0 {
        return 0.0;
    }
    frame
        .intersect(&bounds)
        .map(|visible| visible.size.area() / total)
        .unwrap_or(0.0)
}

fn place(view_size: Size, target: Point, side: Side, style: &StyleParameters) -> Placement {
    let arrow_edge = side.arrow_edge().unwrap_or(Edge::Bottom);
    let pad = style.border_width / 2.0 + style.view_margin;
    let body_size = Size::new(view_size.width + pad * 2.0, view_size.height + pad * 2.0);

    let radius = style
        .corner_radius
        .min(body_size.width / 2.0)
        .min(body_size.height / 2.0);
    let beside_arrow = if style.draws_round_corner_beside_arrow {
        radius
    } else {
        0.0
    };

    let edge_len = if arrow_edge.is_horizontal() {
        body_size.width
    } else {
        body_size.height
    };
    let arrow_base = style
        .arrow_base_width
        .min((edge_len - beside_arrow * 2.0).max(0.0));
    let apex_along = match side.arrow_anchor() {
        ArrowAnchor::Centered => edge_len / 2.0,
        ArrowAnchor::NearMin => beside_arrow + arrow_base / 2.0,
        ArrowAnchor::NearMax => edge_len - beside_arrow - arrow_base / 2.0,
    };

    // arrow room is reserved even without an arrow so toggling it keeps the frame
    let protrusion = style.arrow_height + style.distance;

    let (window_size, body_origin, target_local) = match arrow_edge {
        Edge::Bottom => (
            Size::new(body_size.width, body_size.height + protrusion),
            Point::new(0.0, 0.0),
            Point::new(apex_along, body_size.height + protrusion),
        ),
        Edge::Top => (
            Size::new(body_size.width, body_size.height + protrusion),
            Point::new(0.0, protrusion),
            Point::new(apex_along, 0.0),
        ),
        Edge::Right => (
            Size::new(body_size.width + protrusion, body_size.height),
            Point::new(0.0, 0.0),
            Point::new(body_size.width + protrusion, apex_along),
        ),
        Edge::Left => (
            Size::new(body_size.width + protrusion, body_size.height),
            Point::new(protrusion, 0.0),
            Point::new(0.0, apex_along),
        ),
    };

    let corners = if style.has_arrow {
        let mut corners = CornerRadii {
            top_left: radius,
            top_right: radius,
            bottom_right: radius,
            bottom_left: radius,
        };
        let (a, b) = match arrow_edge {
            Edge::Top => (&mut corners.top_left, &mut corners.top_right),
            Edge::Right => (&mut corners.top_right, &mut corners.bottom_right),
            Edge::Bottom => (&mut corners.bottom_right, &mut corners.bottom_left),
            Edge::Left => (&mut corners.bottom_left, &mut corners.top_left),
        };
        *a = beside_arrow;
        *b = beside_arrow;
        corners
    } else {
        CornerRadii {
            top_left: radius,
            top_right: radius,
            bottom_right: radius,
            bottom_left: radius,
        }
    };

    let window_origin = Point::new(target.x - target_local.x, target.y - target_local.y);
    let body = Rect {
        origin: body_origin,
        size: body_size,
    };

    Placement {
        side,
        arrow_edge,
        window_frame: Rect {
            origin: window_origin,
            size: window_size,
        },
        body,
        content_rect: Rect {
            origin: body_origin.offset(pad, pad),
            size: view_size,
        },
        radius,
        corners,
        arrow_base,
        apex_along,
    }
}

/// Walks the body clockwise from just after the top-left corner, cutting the
/// notch into the edge that faces the target.
fn trace_outline(placement: &Placement, style: &StyleParameters) -> OutlinePath {
    let body = placement.body;
    let corners = placement.corners;
    let (x0, y0, x1, y1) = (body.min_x(), body.min_y(), body.max_x(), body.max_y());

    let notch_height = style.arrow_height;
    let half_base = placement.arrow_base / 2.0;
    let notch_edge = (style.has_arrow && placement.arrow_base > 0.0 && notch_height > 0.0)
        .then_some(placement.arrow_edge);

    let mut builder = PathBuilder::new(Point::new(x0 + corners.top_left, y0));

    if notch_edge == Some(Edge::Top) {
        let c = x0 + placement.apex_along;
        builder.notch(ArrowNotch {
            base_start: Point::new(c - half_base, y0),
            apex: Point::new(c, y0 - notch_height),
            base_end: Point::new(c + half_base, y0),
        });
    }
    builder.line_to(Point::new(x1 - corners.top_right, y0));
    builder.arc(
        Point::new(x1 - corners.top_right, y0 + corners.top_right),
        corners.top_right,
        -FRAC_PI_2,
        FRAC_PI_2,
    );

    if notch_edge == Some(Edge::Right) {
        let c = y0 + placement.apex_along;
        builder.notch(ArrowNotch {
            base_start: Point::new(x1, c - half_base),
            apex: Point::new(x1 + notch_height, c),
            base_end: Point::new(x1, c + half_base),
        });
    }
    builder.line_to(Point::new(x1, y1 - corners.bottom_right));
    builder.arc(
        Point::new(x1 - corners.bottom_right, y1 - corners.bottom_right),
        corners.bottom_right,
        0.0,
        FRAC_PI_2,
    );

    if notch_edge == Some(Edge::Bottom) {
        let c = x0 + placement.apex_along;
        builder.notch(ArrowNotch {
            base_start: Point::new(c + half_base, y1),
            apex: Point::new(c, y1 + notch_height),
            base_end: Point::new(c - half_base, y1),
        });
    }
    builder.line_to(Point::new(x0 + corners.bottom_left, y1));
    builder.arc(
        Point::new(x0 + corners.bottom_left, y1 - corners.bottom_left),
        corners.bottom_left,
        FRAC_PI_2,
        FRAC_PI_2,
    );

    if notch_edge == Some(Edge::Left) {
        let c = y0 + placement.apex_along;
        builder.notch(ArrowNotch {
            base_start: Point::new(x0, c + half_base),
            apex: Point::new(x0 - notch_height, c),
            base_end: Point::new(x0, c - half_base),
        });
    }
    builder.line_to(Point::new(x0, y0 + corners.top_left));
    builder.arc(
        Point::new(x0 + corners.top_left, y0 + corners.top_left),
        corners.top_left,
        PI,
        FRAC_PI_2,
    );

    tracing::trace!(side = ?placement.side, "traced callout outline");
    builder.close()
}
