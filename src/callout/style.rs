use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_rgba_array(color: [u8; 4]) -> Self {
        Self::rgba(color[0], color[1], color[2], color[3])
    }
}

/// How a background image covers the outline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageMode {
    #[default]
    Tile,
    Stretch,
}

/// Decoded RGBA8 image used as a pattern behind the content.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundImage {
    width: u32,
    height: u32,
    pixels: Arc<Vec<u8>>,
    pub mode: ImageMode,
}

impl BackgroundImage {
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>, mode: ImageMode) -> Result<Self> {
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if width == 0 || height == 0 {
            return Err(anyhow!("background image must not be empty"));
        }
        if pixels.len() != expected {
            return Err(anyhow!(
                "background image buffer has {} bytes, expected {expected} for {width}x{height}",
                pixels.len()
            ));
        }
        Ok(Self {
            width,
            height,
            pixels: Arc::new(pixels),
            mode,
        })
    }

    pub fn open(path: &Path, mode: ImageMode) -> Result<Self> {
        let decoded = image::open(path)
            .with_context(|| format!("decode background image {}", path.display()))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        Self::from_rgba(width, height, decoded.into_raw(), mode)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let idx = rgba_index(self.width, x, y);
        Color::rgba(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        )
    }

    /// True when both handles point at the same decoded buffer and mode.
    /// Cheaper than `==`, which compares every pixel.
    pub fn is_same_image(&self, other: &BackgroundImage) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels) && self.mode == other.mode
    }

    pub fn rgba_pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn mean_color(&self) -> Color {
        let mut sums = [0u64; 4];
        for px in self.pixels.chunks_exact(4) {
            for (sum, channel) in sums.iter_mut().zip(px) {
                *sum += u64::from(*channel);
            }
        }
        let count = u64::from(self.width) * u64::from(self.height);
        let avg = |sum: u64| (sum / count.max(1)) as u8;
        Color::rgba(avg(sums[0]), avg(sums[1]), avg(sums[2]), avg(sums[3]))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    Color(Color),
    Image(BackgroundImage),
}

impl Background {
    /// Flat color that best represents this background.
    pub fn representative_color(&self) -> Color {
        match self {
            Self::Color(color) => *color,
            Self::Image(image) => image.mean_color(),
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::Color(default_background_color())
    }
}

/// Visual parameters of a callout. Numeric fields are sanitized to finite,
/// non-negative values before any layout is computed.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleParameters {
    pub border_width: f32,
    pub view_margin: f32,
    pub corner_radius: f32,
    pub has_arrow: bool,
    pub arrow_base_width: f32,
    pub arrow_height: f32,
    pub draws_round_corner_beside_arrow: bool,
    pub distance: f32,
    pub border_color: Color,
    pub background: Background,
}

impl Default for StyleParameters {
    fn default() -> Self {
        Self {
            border_width: 2.0,
            view_margin: 2.0,
            corner_radius: 8.0,
            has_arrow: true,
            arrow_base_width: 20.0,
            arrow_height: 16.0,
            draws_round_corner_beside_arrow: true,
            distance: 0.0,
            border_color: Color::WHITE,
            background: Background::default(),
        }
    }
}

pub(crate) fn default_background_color() -> Color {
    Color::rgba(25, 25, 25, 191)
}

pub fn clamp_non_negative(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Like [`clamp_non_negative`] but keeps `+inf` as the largest finite value,
/// for fields that layout clamps down to what fits.
pub fn clamp_extent(value: f32) -> f32 {
    if value == f32::INFINITY {
        f32::MAX
    } else {
        clamp_non_negative(value)
    }
}

/// Byte offset of pixel `(x, y)` in a tightly packed RGBA8 buffer.
pub(crate) fn rgba_index(width: u32, x: u32, y: u32) -> usize {
    (y as usize * width as usize + x as usize) * 4
}

impl StyleParameters {
    pub fn sanitized(&self) -> Self {
        let mut out = self.clone();
        out.sanitize();
        out
    }

    /// Floors every numeric field at zero. An infinite corner radius or arrow
    /// base becomes `f32::MAX` and is clamped by layout. Returns true if
    /// anything changed.
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

    pub fn background_color(&self) -> Color {
        self.background.representative_color()
    }
}
