use crate::callout::side::Side;
use crate::callout::style::{
    clamp_extent, clamp_non_negative, default_background_color, Background, BackgroundImage,
    Color, ImageMode, StyleParameters,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persisted callout appearance. Mirrors [`StyleParameters`] with a file
/// path in place of a decoded background image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalloutSettings {
    #[serde(default = "default_border_width")]
    pub border_width: f32,
    #[serde(default = "default_view_margin")]
    pub view_margin: f32,
    #[serde(default = "default_corner_radius")]
    pub corner_radius: f32,
    #[serde(default = "default_true")]
    pub has_arrow: bool,
    #[serde(default = "default_arrow_base_width")]
    pub arrow_base_width: f32,
    #[serde(default = "default_arrow_height")]
    pub arrow_height: f32,
    #[serde(default = "default_true")]
    pub draws_round_corner_beside_arrow: bool,
    #[serde(default)]
    pub distance: f32,
    #[serde(default = "default_border_color")]
    pub border_color: Color,
    #[serde(default = "default_background_color")]
    pub background_color: Color,
    #[serde(default)]
    pub background_image: Option<PathBuf>,
    #[serde(default)]
    pub background_image_mode: ImageMode,
    #[serde(default)]
    pub side: Side,
    #[serde(default)]
    pub debug_logging: bool,
}

fn default_border_width() -> f32 {
    2.0
}

fn default_view_margin() -> f32 {
    2.0
}

fn default_corner_radius() -> f32 {
    8.0
}

fn default_arrow_base_width() -> f32 {
    20.0
}

fn default_arrow_height() -> f32 {
    16.0
}

fn default_true() -> bool {
    true
}

fn default_border_color() -> Color {
    Color::WHITE
}

impl Default for CalloutSettings {
    fn default() -> Self {
        Self {
            border_width: default_border_width(),
            view_margin: default_view_margin(),
            corner_radius: default_corner_radius(),
            has_arrow: true,
            arrow_base_width: default_arrow_base_width(),
            arrow_height: default_arrow_height(),
            draws_round_corner_beside_arrow: true,
            distance: 0.0,
            border_color: default_border_color(),
            background_color: default_background_color(),
            background_image: None,
            background_image_mode: ImageMode::default(),
            side: Side::default(),
            debug_logging: false,
        }
    }
}

impl CalloutSettings {
    /// Floors negative or non-finite numbers at zero, with the same infinite
    /// radius and arrow base handling as the runtime style. Returns true if
    /// any value changed.
    pub fn sanitize(&mut self) -> bool {
        let mut changed = false;
        let floor: fn(f32) -> f32 = clamp_non_negative;
        let extent: fn(f32) -> f32 = clamp_extent;
        for (value, clamp) in [
            (&mut self.border_width, floor),
            (&mut self.view_margin, floor),
            (&mut self.corner_radius, extent),
            (&mut self.arrow_base_width, extent),
            (&mut self.arrow_height, floor),
            (&mut self.distance, floor),
        ] {
            let clamped = clamp(*value);
            if clamped.to_bits() != value.to_bits() {
                *value = clamped;
                changed = true;
            }
        }
        changed
    }

    /// Builds the runtime style, decoding the background image if one is
    /// configured.
    pub fn to_style(&self) -> Result<StyleParameters> {
        let background = match &self.background_image {
            Some(path) => {
                Background::Image(BackgroundImage::open(path, self.background_image_mode)?)
            }
            None => Background::Color(self.background_color),
        };
        Ok(StyleParameters {
            border_width: self.border_width,
            view_margin: self.view_margin,
            corner_radius: self.corner_radius,
            has_arrow: self.has_arrow,
            arrow_base_width: self.arrow_base_width,
            arrow_height: self.arrow_height,
            draws_round_corner_beside_arrow: self.draws_round_corner_beside_arrow,
            distance: self.distance,
            border_color: self.border_color,
            background,
        }
        .sanitized())
    }

    /// Copies the numeric and color fields of `style` back into the settings.
    /// The image path is left alone since a decoded image has no path.
    pub fn update_from_style(&mut self, style: &StyleParameters) {
        self.border_width = style.border_width;
        self.view_margin = style.view_margin;
        self.corner_radius = style.corner_radius;
        self.has_arrow = style.has_arrow;
        self.arrow_base_width = style.arrow_base_width;
        self.arrow_height = style.arrow_height;
        self.draws_round_corner_beside_arrow = style.draws_round_corner_beside_arrow;
        self.distance = style.distance;
        self.border_color = style.border_color;
        if let Background::Color(color) = style.background {
            self.background_color = color;
        }
        self.sanitize();
    }
}
