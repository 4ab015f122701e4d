//! Dataset wire types.

use serde::Deserialize;

/// One input coordinate. Any axis missing from the JSON defaults to 0, so a
/// partial `{ "x": 1.0 }` record still lands on the x-axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Point3 {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Response envelope of the data endpoint: `{success, data, count}` on the
/// happy path, `{success: false, error}` otherwise.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Vec<Point3>>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_axes_default_to_zero() {
        let p: Point3 = serde_json::from_str(r#"{"x": 1.5}"#).unwrap();
        assert_eq!(p, Point3::new(1.5, 0.0, 0.0));

        let p: Point3 = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(p, Point3::default());
    }

    #[test]
    fn success_envelope_decodes() {
        let env: DataEnvelope = serde_json::from_str(
            r#"{"success": true, "data": [{"x":0,"y":0,"z":0},{"x":1,"y":1,"z":1}], "count": 2}"#,
        )
        .unwrap();
        assert!(env.success);
        assert_eq!(env.count, Some(2));
        assert_eq!(env.data.unwrap().len(), 2);
    }

    #[test]
    fn error_envelope_decodes() {
        let env: DataEnvelope =
            serde_json::from_str(r#"{"success": false, "error": "Data file not found"}"#).unwrap();
        assert!(!env.success);
        assert!(env.data.is_none());
        assert_eq!(env.error.as_deref(), Some("Data file not found"));
    }
}
