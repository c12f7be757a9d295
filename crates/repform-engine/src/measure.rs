//! Per-frame measurement computation.

use std::collections::BTreeMap;

use repform_core::{angle, distance, inclination, Error, LandmarkSet, Result};

use crate::profile::{ExerciseProfile, Measurement};

impl Measurement {
    /// Evaluate against one frame's landmarks
    pub fn evaluate(&self, landmarks: &LandmarkSet) -> Result<f64> {
        match *self {
            Self::Angle { a, vertex, c } => angle(
                &landmarks.point(a)?,
                &landmarks.point(vertex)?,
                &landmarks.point(c)?,
            ),
            Self::Distance { from, to } => {
                Ok(distance(&landmarks.point(from)?, &landmarks.point(to)?))
            }
            Self::Inclination { from, to } => {
                inclination(&landmarks.point(from)?, &landmarks.point(to)?)
            }
        }
    }
}

/// Named measurement values for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measurements {
    values: BTreeMap<String, f64>,
}

impl Measurements {
    /// Compute every measurement the profile declares
    pub fn compute(profile: &ExerciseProfile, landmarks: &LandmarkSet) -> Result<Self> {
        let mut values = BTreeMap::new();
        for named in &profile.measurements {
            let value = named.measurement.evaluate(landmarks).map_err(|e| match e {
                Error::Geometry(msg) => Error::Geometry(format!("{}: {msg}", named.name)),
                other => other,
            })?;
            values.insert(named.name.clone(), value);
        }
        Ok(Self { values })
    }

    pub fn from_values<'a>(values: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Result<f64> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| Error::Config(format!("measurement '{name}' was not computed")))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repform_core::{BodyPart, Landmark, Point3D};

    fn landmarks(points: &[(BodyPart, Point3D)]) -> LandmarkSet {
        LandmarkSet::new(points.iter().map(|(p, pos)| Landmark::new(*p, *pos, 1.0)))
    }

    #[test]
    fn test_compute_declared_measurements() {
        let profile = ExerciseProfile::new(
            "bench",
            &[BodyPart::LeftShoulder, BodyPart::RightShoulder, BodyPart::LeftHip],
        )
        .with_measurement(
            "shoulder_width",
            Measurement::distance(BodyPart::LeftShoulder, BodyPart::RightShoulder),
        )
        .with_measurement(
            "torso",
            Measurement::inclination(BodyPart::LeftShoulder, BodyPart::LeftHip),
        );

        let set = landmarks(&[
            (BodyPart::LeftShoulder, Point3D::new(0.6, 0.3, 0.0)),
            (BodyPart::RightShoulder, Point3D::new(0.3, 0.3, 0.0)),
            (BodyPart::LeftHip, Point3D::new(0.6, 0.7, 0.0)),
        ]);

        let m = Measurements::compute(&profile, &set).unwrap();
        assert_eq!(m.len(), 2);
        assert!((m.get("shoulder_width").unwrap() - 0.3).abs() < 1e-12);
        assert!(m.get("torso").unwrap().abs() < 1e-9);
        assert!(matches!(m.get("elbow"), Err(Error::Config(_))));
    }

    #[test]
    fn test_degenerate_angle_names_the_measurement() {
        let profile = ExerciseProfile::new(
            "curl",
            &[BodyPart::LeftShoulder, BodyPart::LeftElbow, BodyPart::LeftWrist],
        )
        .with_measurement(
            "left_elbow",
            Measurement::angle(BodyPart::LeftShoulder, BodyPart::LeftElbow, BodyPart::LeftWrist),
        );

        let same = Point3D::new(0.5, 0.5, 0.0);
        let set = landmarks(&[
            (BodyPart::LeftShoulder, Point3D::new(0.5, 0.3, 0.0)),
            (BodyPart::LeftElbow, same),
            (BodyPart::LeftWrist, same),
        ]);

        let err = Measurements::compute(&profile, &set).unwrap_err();
        assert!(matches!(err, Error::Geometry(msg) if msg.starts_with("left_elbow")));
    }
}
