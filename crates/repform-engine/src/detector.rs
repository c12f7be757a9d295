//! Pose detector seam.
//!
//! The detector model itself lives outside the engine. The engine sees it
//! only through [`PoseDetector`], constructed once at startup and shared by
//! every analysis call.

use serde::Deserialize;

use repform_core::{Error, LandmarkSet, Point3D, Result};

/// Maps one frame to the landmarks found on it
pub trait PoseDetector: Send + Sync {
    /// Detector name/identifier
    fn name(&self) -> &str;

    /// `Ok(None)` when the frame was processed but no body was found;
    /// `Err(DetectionFailed)` when the detector itself failed.
    fn detect(&self, frame: &[u8]) -> Result<Option<LandmarkSet>>;

    /// Optional: reject frames that cannot be processed at all
    fn validate_frame(&self, frame: &[u8]) -> Result<()> {
        if frame.is_empty() {
            Err(Error::DetectionFailed("empty frame".to_string()))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawLandmark {
    x: f64,
    y: f64,
    #[serde(default)]
    z: f64,
    #[serde(default = "full_visibility")]
    visibility: f64,
}

fn full_visibility() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    List(Vec<RawLandmark>),
    Wrapped {
        // Present but null means nothing detected; absent is malformed
        #[serde(deserialize_with = "Option::deserialize")]
        landmarks: Option<Vec<RawLandmark>>,
    },
}

/// Detector for frames that already carry pose output as JSON.
///
/// Used when landmark extraction runs upstream (on the client or in a
/// separate inference service). Accepted payloads are an array of
/// `{x, y, z, visibility}` in detector index order, or an object with a
/// `landmarks` array. `null`, an empty array or a null `landmarks` field
/// mean nothing was detected.
#[derive(Debug, Clone, Copy, Default)]
pub struct LandmarkJsonDetector;

impl LandmarkJsonDetector {
    pub fn new() -> Self {
        Self
    }
}

impl PoseDetector for LandmarkJsonDetector {
    fn name(&self) -> &str {
        "landmark-json"
    }

    fn detect(&self, frame: &[u8]) -> Result<Option<LandmarkSet>> {
        self.validate_frame(frame)?;

        let payload: Option<Payload> = serde_json::from_slice(frame)
            .map_err(|e| Error::DetectionFailed(format!("malformed landmark payload: {e}")))?;

        let raw = match payload {
            Some(Payload::List(raw)) | Some(Payload::Wrapped { landmarks: Some(raw) }) => raw,
            Some(Payload::Wrapped { landmarks: None }) | None => return Ok(None),
        };
        if raw.is_empty() {
            return Ok(None);
        }

        let points: Vec<(Point3D, f64)> = raw
            .into_iter()
            .map(|lm| (Point3D::new(lm.x, lm.y, lm.z), lm.visibility))
            .collect();
        LandmarkSet::from_indexed(&points).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repform_core::BodyPart;

    #[test]
    fn test_plain_array_in_index_order() {
        let frame = br#"[
            {"x": 0.50, "y": 0.10, "z": -0.2, "visibility": 0.99},
            {"x": 0.48, "y": 0.08, "z": -0.2, "visibility": 0.95}
        ]"#;

        let set = LandmarkJsonDetector.detect(frame).unwrap().unwrap();
        assert_eq!(set.len(), 2);
        let eye = set.get(BodyPart::LeftEyeInner).unwrap();
        assert_eq!(eye.position, Point3D::new(0.48, 0.08, -0.2));
        assert_eq!(eye.visibility, 0.95);
    }

    #[test]
    fn test_wrapped_payload_defaults() {
        let frame = br#"{"landmarks": [{"x": 0.5, "y": 0.1}]}"#;
        let set = LandmarkJsonDetector.detect(frame).unwrap().unwrap();
        let nose = set.get(BodyPart::Nose).unwrap();
        assert_eq!(nose.position.z, 0.0);
        assert_eq!(nose.visibility, 1.0);
    }

    #[test]
    fn test_nothing_detected() {
        for frame in [&b"[]"[..], b"null", br#"{"landmarks": null}"#] {
            assert_eq!(LandmarkJsonDetector.detect(frame).unwrap(), None);
        }
    }

    #[test]
    fn test_malformed_payload_is_detection_failure() {
        for frame in [&b""[..], b"not json", br#"[{"x": "left"}]"#] {
            assert!(matches!(
                LandmarkJsonDetector.detect(frame),
                Err(Error::DetectionFailed(_))
            ));
        }
    }

    #[test]
    fn test_object_without_landmarks_key_is_detection_failure() {
        for frame in [
            &br#"{"landmark": [{"x": 0.5, "y": 0.1}]}"#[..],
            br#"{}"#,
            br#"{"pose": null}"#,
        ] {
            assert!(matches!(
                LandmarkJsonDetector.detect(frame),
                Err(Error::DetectionFailed(_))
            ));
        }
    }
}
