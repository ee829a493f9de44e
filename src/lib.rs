pub mod callout;
pub mod gui;
pub mod logging;
