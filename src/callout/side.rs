use serde::{Deserialize, Serialize};

/// Where the callout sits relative to its target point.
///
/// The cardinal sides center the window on the point along the
/// perpendicular axis. Composite sides keep the primary placement and let
/// the window extend in the secondary direction, so the arrow sits flush
/// against one corner instead of in the middle of the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
    LeftTop,
    LeftBottom,
    RightTop,
    RightBottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    #[default]
    Automatic,
}

/// An edge of the window's body rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// Position of the arrow along its edge, in terms of the edge's own axis
/// (x for top/bottom edges, y for left/right edges).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowAnchor {
    Centered,
    NearMin,
    NearMax,
}

/// Order in which automatic resolution tries sides. Earlier entries win ties.
pub const AUTOMATIC_CANDIDATES: [Side; 12] = [
    Side::Top,
    Side::Bottom,
    Side::Left,
    Side::Right,
    Side::LeftTop,
    Side::LeftBottom,
    Side::RightTop,
    Side::RightBottom,
    Side::TopLeft,
    Side::TopRight,
    Side::BottomLeft,
    Side::BottomRight,
];

pub const ALL_SIDES: [Side; 13] = [
    Side::Left,
    Side::Right,
    Side::Top,
    Side::Bottom,
    Side::LeftTop,
    Side::LeftBottom,
    Side::RightTop,
    Side::RightBottom,
    Side::TopLeft,
    Side::TopRight,
    Side::BottomLeft,
    Side::BottomRight,
    Side::Automatic,
];

const SCORE_EPSILON: f32 = 1e-4;

impl Side {
    pub fn is_automatic(self) -> bool {
        matches!(self, Self::Automatic)
    }

    pub fn is_composite(self) -> bool {
        !matches!(
            self,
            Self::Left | Self::Right | Self::Top | Self::Bottom | Self::Automatic
        )
    }

    /// The window edge that faces the target point and carries the arrow.
    pub fn arrow_edge(self) -> Option<Edge> {
        match self {
            Self::Left | Self::LeftTop | Self::LeftBottom => Some(Edge::Right),
            Self::Right | Self::RightTop | Self::RightBottom => Some(Edge::Left),
            Self::Top | Self::TopLeft | Self::TopRight => Some(Edge::Bottom),
            Self::Bottom | Self::BottomLeft | Self::BottomRight => Some(Edge::Top),
            Self::Automatic => None,
        }
    }

    pub fn arrow_anchor(self) -> ArrowAnchor {
        match self {
            // extends up or left: the arrow ends up near the far (max) end
            Self::LeftTop | Self::RightTop | Self::TopLeft | Self::BottomLeft => {
                ArrowAnchor::NearMax
            }
            Self::LeftBottom | Self::RightBottom | Self::TopRight | Self::BottomRight => {
                ArrowAnchor::NearMin
            }
            Self::Left | Self::Right | Self::Top | Self::Bottom | Self::Automatic => {
                ArrowAnchor::Centered
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Top => "Top",
            Self::Bottom => "Bottom",
            Self::LeftTop => "Left Top",
            Self::LeftBottom => "Left Bottom",
            Self::RightTop => "Right Top",
            Self::RightBottom => "Right Bottom",
            Self::TopLeft => "Top Left",
            Self::TopRight => "Top Right",
            Self::BottomLeft => "Bottom Left",
            Self::BottomRight => "Bottom Right",
            Self::Automatic => "Automatic",
        }
    }
}

/// Resolves `requested` to a concrete side.
///
/// Explicit sides pass through untouched. For `Automatic`, each candidate
/// is scored by `score` (higher is better) and the first candidate with the
/// best score wins; a later candidate has to beat the best by more than a
/// small epsilon, which keeps float noise from breaking the tie order.
pub fn resolve_side<F>(requested: Side, mut score: F) -> Side
where
    F: FnMut(Side) -> f32,
{
    if !requested.is_automatic() {
        return requested;
    }

    let mut best = AUTOMATIC_CANDIDATES[0];
    let mut best_score = score(best);
    for candidate in AUTOMATIC_CANDIDATES.iter().copied().skip(1) {
        let candidate_score = score(candidate);
        if candidate_score > best_score + SCORE_EPSILON {
            best = candidate;
            best_score = candidate_score;
        }
    }
    best
}
