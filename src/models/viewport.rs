//! Viewport data model.
//!
//! A [`Viewport`] describes a device in density-independent pixels (dp); it is
//! what the user picks and what is persisted. [`ViewportCharacteristics`] is the
//! device-pixel form the render surface consumes, derived on demand by
//! [`crate::viewport::to_characteristics`].

use serde::{Deserialize, Serialize};

/// Screen shape of a device.
///
/// Serialized as `"ROUND"` / `"RECTANGLE"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewportShape {
    Round,
    Rectangle,
}

/// A device-independent viewport descriptor. Dimensions may be fractional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub shape: ViewportShape,
    /// Width in dp.
    pub width: f64,
    /// Height in dp.
    pub height: f64,
    /// Pixel density; 160 is the dp baseline.
    pub dpi: f64,
}

/// Device-pixel viewport as the render surface expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportCharacteristics {
    pub is_round: bool,
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
    pub dpi: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_shape_serializes_upper_case() {
        let value = serde_json::to_value(ViewportShape::Round).expect("serialize");
        assert_eq!(value, "ROUND");
        let shape: ViewportShape = serde_json::from_str("\"RECTANGLE\"").expect("deserialize");
        assert_eq!(shape, ViewportShape::Rectangle);
    }

    #[test]
    fn fractional_viewport_decodes() {
        let viewport: Viewport = serde_json::from_value(serde_json::json!({
            "shape": "RECTANGLE",
            "width": 1279.5,
            "height": 800,
            "dpi": 213.3
        }))
        .expect("fractional dp");
        assert_eq!(viewport.width, 1279.5);
        assert_eq!(viewport.height, 800.0);
    }

    #[test]
    fn characteristics_serialize_camel_case() {
        let c = ViewportCharacteristics {
            is_round: true,
            width: 480,
            height: 480,
            dpi: 160,
        };
        let value = serde_json::to_value(&c).expect("serialize");
        assert_eq!(value["isRound"], true);
        assert!(value.get("is_round").is_none());
        assert_eq!(value["width"], 480);
    }
}
