pub mod controller;
pub mod geometry;
pub mod layout;
pub mod paint;
pub mod path;
pub mod render;
pub mod settings;
pub mod settings_store;
pub mod side;
pub mod style;

pub use controller::{
    ApplyOutcome, CalloutWindow, ContentHandle, HostWindowHandle, PresentationHost,
    RecordingHost, RenderSurface,
};
pub use geometry::{Point, Rect, Size};
pub use layout::{compute_layout, AttachmentSpec, LayoutError, ResolvedLayout};
pub use path::{ArrowNotch, OutlinePath, Segment};
pub use side::Side;
pub use style::{Background, BackgroundImage, Color, ImageMode, StyleParameters};
