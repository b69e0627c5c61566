//! dp → device-pixel conversion for the render surface.

use crate::models::{Viewport, ViewportCharacteristics, ViewportShape};

/// Baseline density at which one dp equals one device pixel.
const BASELINE_DPI: f64 = 160.0;

// Float-to-int `as` saturates (NaN and negatives become 0), so odd inputs
// clamp instead of panicking.
fn to_device_int(value: f64) -> u32 {
    value.round() as u32
}

fn dp_to_pixel(dp: f64, dpi: f64) -> u32 {
    to_device_int(dpi / BASELINE_DPI * dp)
}

/// Convert a [`Viewport`] into the [`ViewportCharacteristics`] the renderer
/// consumes. Width and height are converted independently.
pub fn to_characteristics(viewport: &Viewport) -> ViewportCharacteristics {
    ViewportCharacteristics {
        is_round: viewport.shape == ViewportShape::Round,
        width: dp_to_pixel(viewport.width, viewport.dpi),
        height: dp_to_pixel(viewport.height, viewport.dpi),
        dpi: to_device_int(viewport.dpi),
    }
}

impl From<&Viewport> for ViewportCharacteristics {
    fn from(viewport: &Viewport) -> Self {
        to_characteristics(viewport)
    }
}
