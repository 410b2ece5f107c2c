use serde::{Deserialize, Serialize};

/// Bounding rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Serializable snapshot of a UI element, decoupled from the lifetime of
/// the live handle it was taken from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_rect: Option<Rect>,
}

/// Top-level window information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowDescriptor {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_id: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_visibility() {
        assert!(Rect::new(0.0, 0.0, 10.0, 10.0).is_visible());
        assert!(!Rect::new(100.0, 100.0, 0.0, 24.0).is_visible());
    }

    #[test]
    fn test_descriptor_skips_absent_fields() {
        let descriptor = ElementDescriptor {
            name: Some("OK".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json, serde_json::json!({"name": "OK"}));
    }
}
