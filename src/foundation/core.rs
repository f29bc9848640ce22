use crate::foundation::error::{RasterError, RasterResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Largest number of channels (color components plus alpha) a pixel may carry.
pub const MAX_COMPONENTS: usize = 16;

/// Non-premultiplied color in the renderer's working model.
///
/// Channels are the color components followed by alpha. Unused slots stay zero so the value
/// can be uploaded as a fixed 16-float parameter block.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct ColorValue {
    channels: [f32; MAX_COMPONENTS],
    count: u8,
}

impl ColorValue {
    /// Build a color from its channels, alpha last.
    pub fn new(channels: &[f32]) -> RasterResult<Self> {
        if channels.len() < 2 || channels.len() > MAX_COMPONENTS {
            return Err(RasterError::validation(format!(
                "color must have 2..={MAX_COMPONENTS} channels, got {}",
                channels.len()
            )));
        }
        let mut out = [0.0; MAX_COMPONENTS];
        out[..channels.len()].copy_from_slice(channels);
        Ok(Self {
            channels: out,
            count: channels.len() as u8,
        })
    }

    /// RGBA color.
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        let mut channels = [0.0; MAX_COMPONENTS];
        channels[..4].copy_from_slice(&[r, g, b, a]);
        Self { channels, count: 4 }
    }

    /// Gray + alpha color, the layout used for clip layers.
    pub fn gray(white: f32, a: f32) -> Self {
        let mut channels = [0.0; MAX_COMPONENTS];
        channels[..2].copy_from_slice(&[white, a]);
        Self { channels, count: 2 }
    }

    /// Number of channels including alpha.
    pub fn count(&self) -> usize {
        usize::from(self.count)
    }

    /// Channels in order, alpha last.
    pub fn as_slice(&self) -> &[f32] {
        &self.channels[..self.count()]
    }

    /// Alpha channel.
    pub fn alpha(&self) -> f32 {
        self.channels[self.count() - 1]
    }

    /// Copy with a replaced alpha channel.
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        let last = self.count() - 1;
        self.channels[last] = alpha;
        self
    }

    /// Full 16-slot parameter block.
    pub(crate) fn padded(&self) -> [f32; MAX_COMPONENTS] {
        self.channels
    }
}

impl TryFrom<Vec<f32>> for ColorValue {
    type Error = RasterError;

    fn try_from(value: Vec<f32>) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ColorValue> for Vec<f32> {
    fn from(value: ColorValue) -> Self {
        value.as_slice().to_vec()
    }
}

/// One gradient color stop.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GradientStop {
    /// Position along the gradient in `[0, 1]`.
    pub offset: f64,
    /// Stop color.
    pub color: ColorValue,
}

impl GradientStop {
    /// Create a stop.
    pub fn new(offset: f64, color: ColorValue) -> Self {
        Self { offset, color }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
