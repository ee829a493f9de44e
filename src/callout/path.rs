use crate::callout::geometry::{Point, Rect};

const COINCIDENT_EPSILON: f32 = 1e-4;

/// One primitive of an outline. Every segment starts where the previous one
/// ended; the first starts at [`OutlinePath::start`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line {
        to: Point,
    },
    /// Circular arc. Angles are in radians in y-down space, so a positive
    /// sweep runs clockwise on screen.
    Arc {
        center: Point,
        radius: f32,
        start_angle: f32,
        sweep: f32,
    },
}

impl Segment {
    pub fn end_point(&self) -> Point {
        match *self {
            Self::Line { to } => to,
            Self::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => point_on_circle(center, radius, start_angle + sweep),
        }
    }
}

/// The triangular notch cut into the edge that faces the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowNotch {
    pub base_start: Point,
    pub apex: Point,
    pub base_end: Point,
}

impl ArrowNotch {
    pub fn base_width(&self) -> f32 {
        distance(self.base_start, self.base_end)
    }

    pub fn height(&self) -> f32 {
        let mid = Point::new(
            (self.base_start.x + self.base_end.x) / 2.0,
            (self.base_start.y + self.base_end.y) / 2.0,
        );
        distance(mid, self.apex)
    }

    pub fn triangle(&self) -> [Point; 3] {
        [self.base_start, self.apex, self.base_end]
    }
}

/// Closed outline of a callout in window-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlinePath {
    start: Point,
    segments: Vec<Segment>,
    notch: Option<ArrowNotch>,
}

impl OutlinePath {
    pub fn start(&self) -> Point {
        self.start
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn notch(&self) -> Option<&ArrowNotch> {
        self.notch.as_ref()
    }

    pub fn arc_radii(&self) -> impl Iterator<Item = f32> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Arc { radius, .. } => Some(*radius),
            Segment::Line { .. } => None,
        })
    }

    pub fn translate(&self, dx: f32, dy: f32) -> OutlinePath {
        let shift = |p: Point| p.offset(dx, dy);
        OutlinePath {
            start: shift(self.start),
            segments: self
                .segments
                .iter()
                .map(|segment| match *segment {
                    Segment::Line { to } => Segment::Line { to: shift(to) },
                    Segment::Arc {
                        center,
                        radius,
                        start_angle,
                        sweep,
                    } => Segment::Arc {
                        center: shift(center),
                        radius,
                        start_angle,
                        sweep,
                    },
                })
                .collect(),
            notch: self.notch.map(|notch| ArrowNotch {
                base_start: shift(notch.base_start),
                apex: shift(notch.apex),
                base_end: shift(notch.base_end),
            }),
        }
    }

    /// Approximates the outline with a closed polygon. The closing edge back
    /// to the first point is implied and not repeated.
    pub fn flatten(&self) -> Vec<Point> {
        let mut points = vec![self.start];
        for segment in &self.segments {
            match *segment {
                Segment::Line { to } => points.push(to),
                Segment::Arc {
                    center,
                    radius,
                    start_angle,
                    sweep,
                } => {
                    let steps = arc_steps(radius, sweep);
                    for step in 1..=steps {
                        let t = step as f32 / steps as f32;
                        points.push(point_on_circle(center, radius, start_angle + sweep * t));
                    }
                }
            }
        }
        if points.len() > 1 {
            if let Some(last) = points.last().copied() {
                if coincident(last, self.start) {
                    points.pop();
                }
            }
        }
        points
    }

    /// Flattened outline with the notch replaced by its base line. The result
    /// is convex, which lets painters that only fill convex shapes draw the
    /// body and the notch triangle separately.
    pub fn body_polygon(&self) -> Vec<Point> {
        let points = self.flatten();
        match self.notch {
            Some(notch) => points.into_iter().filter(|p| *p != notch.apex).collect(),
            None => points,
        }
    }

    pub fn bounds(&self) -> Rect {
        bounding_rect(&self.flatten())
    }

    /// Shoelace area of the flattened outline. Positive means clockwise on
    /// screen in y-down space.
    pub fn signed_area(&self) -> f32 {
        signed_area(&self.flatten())
    }

    /// Even-odd containment test against the flattened outline.
    pub fn contains(&self, point: Point) -> bool {
        polygon_contains(&self.flatten(), point)
    }
}

pub(crate) struct PathBuilder {
    start: Point,
    current: Point,
    segments: Vec<Segment>,
    notch: Option<ArrowNotch>,
}

impl PathBuilder {
    pub fn new(start: Point) -> Self {
        Self {
            start,
            current: start,
            segments: Vec::new(),
            notch: None,
        }
    }

    pub fn line_to(&mut self, to: Point) {
        if coincident(self.current, to) {
            return;
        }
        self.segments.push(Segment::Line { to });
        self.current = to;
    }

    pub fn arc(&mut self, center: Point, radius: f32, start_angle: f32, sweep: f32) {
        if radius <= 0.0 {
            return;
        }
        let segment = Segment::Arc {
            center,
            radius,
            start_angle,
            sweep,
        };
        self.current = segment.end_point();
        self.segments.push(segment);
    }

    pub fn notch(&mut self, notch: ArrowNotch) {
        self.line_to(notch.base_start);
        self.segments.push(Segment::Line { to: notch.apex });
        self.segments.push(Segment::Line {
            to: notch.base_end,
        });
        self.current = notch.base_end;
        self.notch = Some(notch);
    }

    pub fn close(mut self) -> OutlinePath {
        if !coincident(self.current, self.start) {
            self.segments.push(Segment::Line { to: self.start });
        }
        OutlinePath {
            start: self.start,
            segments: self.segments,
            notch: self.notch,
        }
    }
}

fn arc_steps(radius: f32, sweep: f32) -> usize {
    let quarter_turns = (sweep.abs() / std::f32::consts::FRAC_PI_2).max(1.0);
    let per_quarter = (radius.sqrt() * 2.0).ceil().clamp(2.0, 32.0);
    (per_quarter * quarter_turns).ceil() as usize
}

fn point_on_circle(center: Point, radius: f32, angle: f32) -> Point {
    Point::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

fn coincident(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() <= COINCIDENT_EPSILON && (a.y - b.y).abs() <= COINCIDENT_EPSILON
}

fn distance(a: Point, b: Point) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

pub fn bounding_rect(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::default();
    };
    let (mut min, mut max) = (*first, *first);
    for p in points.iter().skip(1) {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Rect::from_min_max(min, max)
}

pub fn signed_area(points: &[Point]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        twice_area += a.x * b.y - b.x * a.y;
    }
    twice_area / 2.0
}

pub fn polygon_contains(points: &[Point], point: Point) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (points[i], points[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let cross_x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
