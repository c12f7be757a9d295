//! Exercise profiles: the static configuration describing one exercise.
//!
//! A profile is pure data. It names the landmarks an exercise needs, the
//! measurements taken from them, the conditions that mark the initial
//! position and the breakpoint, the mistake rules, and optionally the
//! classifier artifact consulted for the exercise.

use std::collections::HashSet;

use repform_core::{BodyPart, Error, Result};
use serde::{Deserialize, Serialize};

/// Flag names the report reserves for the phase signal
pub const RESERVED_FLAGS: [&str; 2] = ["initial_position", "breakpoint"];

/// Geometric quantity computed once per frame from landmark positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Measurement {
    /// Angle in degrees at `vertex` between `a` and `c`
    Angle {
        a: BodyPart,
        vertex: BodyPart,
        c: BodyPart,
    },
    /// Euclidean distance between two landmarks
    Distance { from: BodyPart, to: BodyPart },
    /// Deviation in degrees of the segment `to`→`from` from the image vertical
    Inclination { from: BodyPart, to: BodyPart },
}

impl Measurement {
    pub fn angle(a: BodyPart, vertex: BodyPart, c: BodyPart) -> Self {
        Self::Angle { a, vertex, c }
    }

    pub fn distance(from: BodyPart, to: BodyPart) -> Self {
        Self::Distance { from, to }
    }

    pub fn inclination(from: BodyPart, to: BodyPart) -> Self {
        Self::Inclination { from, to }
    }

    /// Landmarks this measurement reads
    pub fn parts(&self) -> Vec<BodyPart> {
        match *self {
            Self::Angle { a, vertex, c } => vec![a, vertex, c],
            Self::Distance { from, to } | Self::Inclination { from, to } => vec![from, to],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedMeasurement {
    pub name: String,
    pub measurement: Measurement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    LessThan,
    GreaterThan,
}

impl Comparison {
    pub fn holds(&self, left: f64, right: f64) -> bool {
        match self {
            Self::LessThan => left < right,
            Self::GreaterThan => left > right,
        }
    }
}

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Constant(f64),
    /// Another measurement multiplied by `factor`
    Scaled { measure: String, factor: f64 },
}

/// Phase signal a rule may depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseMarker {
    Initial,
    Breakpoint,
}

/// Boolean condition over the measurements of one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Compare {
        measure: String,
        op: Comparison,
        operand: Operand,
    },
    /// Every child holds (AND)
    All(Vec<Predicate>),
    /// At least one child holds (OR)
    Any(Vec<Predicate>),
    /// The frame's resolved phase carries this marker
    InPhase(PhaseMarker),
}

impl Predicate {
    pub fn lt(measure: &str, value: f64) -> Self {
        Self::Compare {
            measure: measure.to_string(),
            op: Comparison::LessThan,
            operand: Operand::Constant(value),
        }
    }

    pub fn gt(measure: &str, value: f64) -> Self {
        Self::Compare {
            measure: measure.to_string(),
            op: Comparison::GreaterThan,
            operand: Operand::Constant(value),
        }
    }

    /// `measure < factor * other`
    pub fn lt_scaled(measure: &str, other: &str, factor: f64) -> Self {
        Self::Compare {
            measure: measure.to_string(),
            op: Comparison::LessThan,
            operand: Operand::Scaled {
                measure: other.to_string(),
                factor,
            },
        }
    }

    pub fn all(children: impl IntoIterator<Item = Predicate>) -> Self {
        Self::All(children.into_iter().collect())
    }

    pub fn any(children: impl IntoIterator<Item = Predicate>) -> Self {
        Self::Any(children.into_iter().collect())
    }

    pub fn in_phase(marker: PhaseMarker) -> Self {
        Self::InPhase(marker)
    }

    /// Names of every measurement referenced anywhere in the tree
    pub fn measures(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_measures(&mut names);
        names
    }

    fn collect_measures<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Compare {
                measure, operand, ..
            } => {
                names.push(measure);
                if let Operand::Scaled { measure, .. } = operand {
                    names.push(measure);
                }
            }
            Self::All(children) | Self::Any(children) => {
                for child in children {
                    child.collect_measures(names);
                }
            }
            Self::InPhase(_) => {}
        }
    }

    pub fn depends_on_phase(&self) -> bool {
        match self {
            Self::InPhase(_) => true,
            Self::All(children) | Self::Any(children) => {
                children.iter().any(Predicate::depends_on_phase)
            }
            Self::Compare { .. } => false,
        }
    }
}

/// Conditions marking the two ends of a repetition.
///
/// An exercise without a repetition cycle (a plank hold) declares neither.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseThresholds {
    #[serde(default)]
    pub initial: Option<Predicate>,
    #[serde(default)]
    pub breakpoint: Option<Predicate>,
}

/// Named mistake flag raised when its predicate holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MistakeRule {
    pub flag: String,
    pub predicate: Predicate,
}

/// Reference to a pretrained classifier and the shape of its input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierBinding {
    /// Artifact name in the classifier store
    pub artifact: String,
    /// Landmarks whose (x, y, z) form the feature vector, in this order
    pub features: Vec<BodyPart>,
    /// Flag raised for each label; label `i` maps to `labels[i]`
    pub labels: Vec<String>,
}

impl ClassifierBinding {
    pub fn new(artifact: &str, features: &[BodyPart], labels: &[&str]) -> Self {
        Self {
            artifact: artifact.to_string(),
            features: features.to_vec(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn feature_len(&self) -> usize {
        self.features.len() * 3
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProfile {
    pub id: String,
    /// Required landmarks, in the order missing ones are reported
    pub required: Vec<BodyPart>,
    #[serde(default)]
    pub measurements: Vec<NamedMeasurement>,
    #[serde(default)]
    pub phases: PhaseThresholds,
    #[serde(default)]
    pub rules: Vec<MistakeRule>,
    #[serde(default)]
    pub classifier: Option<ClassifierBinding>,
}

impl ExerciseProfile {
    pub fn new(id: &str, required: &[BodyPart]) -> Self {
        Self {
            id: id.to_string(),
            required: required.to_vec(),
            measurements: Vec::new(),
            phases: PhaseThresholds::default(),
            rules: Vec::new(),
            classifier: None,
        }
    }

    pub fn with_measurement(mut self, name: &str, measurement: Measurement) -> Self {
        self.measurements.push(NamedMeasurement {
            name: name.to_string(),
            measurement,
        });
        self
    }

    pub fn with_initial(mut self, predicate: Predicate) -> Self {
        self.phases.initial = Some(predicate);
        self
    }

    pub fn with_breakpoint(mut self, predicate: Predicate) -> Self {
        self.phases.breakpoint = Some(predicate);
        self
    }

    pub fn with_rule(mut self, flag: &str, predicate: Predicate) -> Self {
        self.rules.push(MistakeRule {
            flag: flag.to_string(),
            predicate,
        });
        self
    }

    pub fn with_classifier(mut self, binding: ClassifierBinding) -> Self {
        self.classifier = Some(binding);
        self
    }

    /// Check internal consistency so that analysis never meets a
    /// configuration problem at runtime.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(Error::Config(format!("profile '{}': {msg}", self.id)));

        if self.id.trim().is_empty() {
            return Err(Error::Config("profile id is empty".to_string()));
        }

        let mut required = HashSet::new();
        for part in &self.required {
            if !required.insert(*part) {
                return fail(format!("landmark {part} listed twice"));
            }
        }

        let mut declared = HashSet::new();
        for named in &self.measurements {
            if !declared.insert(named.name.as_str()) {
                return fail(format!("measurement '{}' declared twice", named.name));
            }
            if let Some(part) = named
                .measurement
                .parts()
                .into_iter()
                .find(|p| !required.contains(p))
            {
                return fail(format!(
                    "measurement '{}' reads {part}, which is not required",
                    named.name
                ));
            }
        }

        let check_refs = |what: &str, predicate: &Predicate| -> Result<()> {
            match predicate.measures().into_iter().find(|m| !declared.contains(m)) {
                Some(unknown) => fail(format!("{what} references undeclared measurement '{unknown}'")),
                None => Ok(()),
            }
        };

        for (what, condition) in [
            ("initial condition", &self.phases.initial),
            ("breakpoint condition", &self.phases.breakpoint),
        ] {
            if let Some(predicate) = condition {
                check_refs(what, predicate)?;
                if predicate.depends_on_phase() {
                    return fail(format!("{what} cannot depend on the phase it defines"));
                }
            }
        }

        let mut flags = HashSet::new();
        for rule in &self.rules {
            check_refs(&format!("rule '{}'", rule.flag), &rule.predicate)?;
            check_flag_name(&rule.flag).or_else(|e| fail(e))?;
            if !flags.insert(rule.flag.as_str()) {
                return fail(format!("rule flag '{}' declared twice", rule.flag));
            }
        }

        if let Some(binding) = &self.classifier {
            if binding.features.is_empty() {
                return fail("classifier has no feature landmarks".to_string());
            }
            if binding.labels.is_empty() {
                return fail("classifier has no labels".to_string());
            }
            if let Some(part) = binding.features.iter().find(|p| !required.contains(*p)) {
                return fail(format!("classifier feature {part} is not required"));
            }

            let mut labels = HashSet::new();
            for label in &binding.labels {
                check_flag_name(label).or_else(|e| fail(e))?;
                if !labels.insert(label.as_str()) {
                    return fail(format!("classifier label '{label}' declared twice"));
                }
                if flags.contains(label.as_str()) {
                    return fail(format!(
                        "classifier flag '{label}' collides with a rule flag"
                    ));
                }
            }
        }

        Ok(())
    }
}

fn check_flag_name(flag: &str) -> std::result::Result<(), String> {
    if flag.trim().is_empty() {
        Err("empty flag name".to_string())
    } else if RESERVED_FLAGS.contains(&flag) {
        Err(format!("flag name '{flag}' is reserved for the phase signal"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arm_profile() -> ExerciseProfile {
        ExerciseProfile::new(
            "test-curl",
            &[BodyPart::LeftShoulder, BodyPart::LeftElbow, BodyPart::LeftWrist],
        )
        .with_measurement(
            "elbow",
            Measurement::angle(BodyPart::LeftShoulder, BodyPart::LeftElbow, BodyPart::LeftWrist),
        )
        .with_initial(Predicate::gt("elbow", 160.0))
        .with_breakpoint(Predicate::lt("elbow", 50.0))
    }

    #[test]
    fn test_valid_profile_passes() {
        let profile = arm_profile().with_rule(
            "half_rep",
            Predicate::all([
                Predicate::in_phase(PhaseMarker::Breakpoint),
                Predicate::gt("elbow", 40.0),
            ]),
        );
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_undeclared_measurement_is_rejected() {
        let profile = arm_profile().with_rule("swing", Predicate::gt("hip", 20.0));
        let err = profile.validate().unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("'hip'")));
    }

    #[test]
    fn test_measurement_must_use_required_landmarks() {
        let profile = arm_profile().with_measurement(
            "torso",
            Measurement::inclination(BodyPart::LeftShoulder, BodyPart::LeftHip),
        );
        assert!(matches!(profile.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rule_and_classifier_flag_collision_is_rejected() {
        let profile = arm_profile()
            .with_rule("leaned_back", Predicate::gt("elbow", 170.0))
            .with_classifier(ClassifierBinding::new(
                "curl",
                &[BodyPart::LeftShoulder],
                &["leaned_back", "correct"],
            ));
        let err = profile.validate().unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("collides")));
    }

    #[test]
    fn test_reserved_flag_names_are_rejected() {
        let profile = arm_profile().with_rule("breakpoint", Predicate::gt("elbow", 1.0));
        assert!(matches!(profile.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_phase_condition_cannot_reference_phase() {
        let profile = arm_profile().with_breakpoint(Predicate::in_phase(PhaseMarker::Initial));
        assert!(matches!(profile.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_profile_json_shape() {
        let json = r#"{
            "id": "wall-sit",
            "required": ["LEFT_HIP", "LEFT_KNEE", "LEFT_ANKLE"],
            "measurements": [
                {"name": "knee", "measurement": {"kind": "angle", "a": "LEFT_HIP", "vertex": "LEFT_KNEE", "c": "LEFT_ANKLE"}}
            ],
            "rules": [
                {"flag": "too_shallow", "predicate": {"compare": {"measure": "knee", "op": "greater_than", "operand": {"constant": 110.0}}}}
            ]
        }"#;

        let profile: ExerciseProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.id, "wall-sit");
        assert_eq!(profile.phases, PhaseThresholds::default());
        assert_eq!(profile.rules[0].predicate, Predicate::gt("knee", 110.0));
        assert!(profile.validate().is_ok());
    }
}
