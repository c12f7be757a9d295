//! Built-in exercise profiles.
//!
//! Angles are in degrees. Left/right pairs share thresholds; "both" means
//! the condition must hold on each side, "either" on at least one.

use repform_core::BodyPart::{self, *};

use crate::profile::{ClassifierBinding, ExerciseProfile, Measurement, PhaseMarker, Predicate};

pub const PLANK: &str = "plank";
pub const BICEP_CURL: &str = "bicep-curl";
pub const LUNGE: &str = "lunge";
pub const LATERAL_RAISE: &str = "lateral-raise";
pub const SHOULDER_PRESS: &str = "shoulder-press";
pub const CABLE_LATERAL_RAISE: &str = "cable-lateral-raise";
pub const BENCH_PRESS: &str = "bench-press";
pub const INCLINED_PRESS: &str = "inclined-press";
pub const CABLE_CROSSOVER: &str = "cable-crossover";
pub const ROPE_EXTENSION: &str = "rope-extension";

const ARMS: [BodyPart; 6] = [
    LeftShoulder,
    LeftElbow,
    LeftWrist,
    RightShoulder,
    RightElbow,
    RightWrist,
];

const ARMS_AND_HIPS: [BodyPart; 8] = [
    LeftShoulder,
    LeftElbow,
    LeftWrist,
    LeftHip,
    RightShoulder,
    RightElbow,
    RightWrist,
    RightHip,
];

/// Every built-in profile
pub fn builtin_profiles() -> Vec<ExerciseProfile> {
    vec![
        plank(),
        bicep_curl(),
        lunge(),
        lateral_raise(),
        shoulder_press(),
        cable_lateral_raise(),
        bench_press(),
        inclined_press(),
        cable_crossover(),
        rope_extension(),
    ]
}

fn both_lt(measure: &str, value: f64) -> Predicate {
    Predicate::all([
        Predicate::lt(&format!("left_{measure}"), value),
        Predicate::lt(&format!("right_{measure}"), value),
    ])
}

fn both_gt(measure: &str, value: f64) -> Predicate {
    Predicate::all([
        Predicate::gt(&format!("left_{measure}"), value),
        Predicate::gt(&format!("right_{measure}"), value),
    ])
}

fn either_lt(measure: &str, value: f64) -> Predicate {
    Predicate::any([
        Predicate::lt(&format!("left_{measure}"), value),
        Predicate::lt(&format!("right_{measure}"), value),
    ])
}

fn either_gt(measure: &str, value: f64) -> Predicate {
    Predicate::any([
        Predicate::gt(&format!("left_{measure}"), value),
        Predicate::gt(&format!("right_{measure}"), value),
    ])
}

/// Shoulder-elbow-wrist angle per side: 180 with the arm straight
fn with_elbow_angles(profile: ExerciseProfile) -> ExerciseProfile {
    profile
        .with_measurement("left_elbow", Measurement::angle(LeftShoulder, LeftElbow, LeftWrist))
        .with_measurement("right_elbow", Measurement::angle(RightShoulder, RightElbow, RightWrist))
}

/// Elbow-shoulder-hip angle per side: 0 with the upper arm along the torso
fn with_shoulder_angles(profile: ExerciseProfile) -> ExerciseProfile {
    profile
        .with_measurement("left_shoulder", Measurement::angle(LeftElbow, LeftShoulder, LeftHip))
        .with_measurement("right_shoulder", Measurement::angle(RightElbow, RightShoulder, RightHip))
}

/// Upper arm against the shoulder line: opposite shoulder, shoulder, elbow
fn with_shoulder_spread(profile: ExerciseProfile) -> ExerciseProfile {
    profile
        .with_measurement(
            "left_spread",
            Measurement::angle(RightShoulder, LeftShoulder, LeftElbow),
        )
        .with_measurement(
            "right_spread",
            Measurement::angle(LeftShoulder, RightShoulder, RightElbow),
        )
}

pub fn plank() -> ExerciseProfile {
    let features = [
        Nose,
        LeftShoulder,
        RightShoulder,
        LeftElbow,
        RightElbow,
        LeftWrist,
        RightWrist,
        LeftHip,
        RightHip,
    ];

    ExerciseProfile::new(PLANK, &features).with_classifier(ClassifierBinding::new(
        PLANK,
        &features,
        &["correct", "back_too_high", "back_too_low"],
    ))
}

pub fn bicep_curl() -> ExerciseProfile {
    let profile = ExerciseProfile::new(
        BICEP_CURL,
        &[
            LeftShoulder,
            RightShoulder,
            LeftElbow,
            RightElbow,
            LeftWrist,
            RightWrist,
            LeftHip,
            RightHip,
        ],
    );

    with_elbow_angles(profile)
        .with_measurement("left_upper_arm", Measurement::angle(LeftHip, LeftShoulder, LeftElbow))
        .with_measurement("right_upper_arm", Measurement::angle(RightHip, RightShoulder, RightElbow))
        .with_initial(Predicate::all([both_gt("elbow", 160.0), both_lt("upper_arm", 25.0)]))
        .with_breakpoint(both_lt("elbow", 50.0))
        .with_rule("elbows_drifting", either_gt("upper_arm", 35.0))
        .with_classifier(ClassifierBinding::new(
            BICEP_CURL,
            &[LeftShoulder, RightShoulder, LeftElbow, RightElbow, LeftWrist, RightWrist],
            &["leaned_back", "correct"],
        ))
}

pub fn lunge() -> ExerciseProfile {
    let legs = [LeftHip, RightHip, LeftKnee, RightKnee, LeftAnkle, RightAnkle];

    ExerciseProfile::new(LUNGE, &legs)
        .with_measurement("left_knee", Measurement::angle(LeftHip, LeftKnee, LeftAnkle))
        .with_measurement("right_knee", Measurement::angle(RightHip, RightKnee, RightAnkle))
        .with_initial(both_gt("knee", 160.0))
        .with_breakpoint(either_lt("knee", 100.0))
        .with_classifier(ClassifierBinding::new(
            LUNGE,
            &legs,
            &["knee_over_toe", "correct"],
        ))
}

pub fn lateral_raise() -> ExerciseProfile {
    let profile = ExerciseProfile::new(
        LATERAL_RAISE,
        &[
            LeftShoulder,
            LeftElbow,
            LeftWrist,
            LeftHip,
            LeftKnee,
            RightShoulder,
            RightElbow,
            RightWrist,
            RightHip,
            RightKnee,
        ],
    );

    with_shoulder_angles(with_elbow_angles(profile))
        .with_measurement("hip", Measurement::angle(RightShoulder, RightHip, RightKnee))
        .with_initial(both_lt("shoulder", 30.0))
        .with_breakpoint(both_gt("shoulder", 75.0))
        .with_rule("curved_arms", either_lt("elbow", 100.0))
        .with_rule("standing_upright", Predicate::gt("hip", 160.0))
}

pub fn shoulder_press() -> ExerciseProfile {
    with_shoulder_spread(with_elbow_angles(ExerciseProfile::new(SHOULDER_PRESS, &ARMS)))
        .with_initial(both_lt("elbow", 90.0))
        .with_breakpoint(both_gt("elbow", 160.0))
        .with_rule("arms_too_wide", either_gt("spread", 150.0))
}

pub fn cable_lateral_raise() -> ExerciseProfile {
    with_shoulder_angles(with_elbow_angles(ExerciseProfile::new(
        CABLE_LATERAL_RAISE,
        &ARMS_AND_HIPS,
    )))
    .with_measurement("torso_lean", Measurement::inclination(LeftShoulder, LeftHip))
    .with_initial(both_lt("shoulder", 30.0))
    .with_breakpoint(either_gt("shoulder", 75.0))
    .with_rule("bent_arms", either_lt("elbow", 100.0))
    .with_rule("leaning_body", Predicate::gt("torso_lean", 10.0))
}

pub fn bench_press() -> ExerciseProfile {
    with_elbow_angles(ExerciseProfile::new(BENCH_PRESS, &ARMS))
        .with_measurement("shoulder_width", Measurement::distance(LeftShoulder, RightShoulder))
        .with_measurement("wrist_width", Measurement::distance(LeftWrist, RightWrist))
        .with_initial(both_lt("elbow", 90.0))
        .with_breakpoint(both_gt("elbow", 160.0))
        .with_rule(
            "wrists_too_narrow",
            Predicate::lt_scaled("wrist_width", "shoulder_width", 1.1),
        )
}

pub fn inclined_press() -> ExerciseProfile {
    with_shoulder_angles(with_elbow_angles(ExerciseProfile::new(
        INCLINED_PRESS,
        &ARMS_AND_HIPS,
    )))
    .with_initial(both_lt("elbow", 90.0))
    .with_breakpoint(both_gt("elbow", 170.0))
    .with_rule("flared_elbows", either_gt("shoulder", 45.0))
}

pub fn cable_crossover() -> ExerciseProfile {
    with_shoulder_angles(with_elbow_angles(ExerciseProfile::new(
        CABLE_CROSSOVER,
        &ARMS_AND_HIPS,
    )))
    .with_initial(both_gt("shoulder", 90.0))
    .with_breakpoint(both_lt("shoulder", 60.0))
    .with_rule(
        "bent_arms_at_breakpoint",
        Predicate::all([
            Predicate::in_phase(PhaseMarker::Breakpoint),
            either_lt("elbow", 160.0),
        ]),
    )
}

pub fn rope_extension() -> ExerciseProfile {
    with_shoulder_spread(with_elbow_angles(ExerciseProfile::new(ROPE_EXTENSION, &ARMS)))
        .with_initial(both_lt("elbow", 80.0))
        .with_breakpoint(both_gt("elbow", 170.0))
        .with_rule("flared_elbows", either_gt("spread", 90.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_profiles_are_valid_and_unique() {
        let profiles = builtin_profiles();
        assert_eq!(profiles.len(), 10);

        let mut ids = HashSet::new();
        for profile in &profiles {
            profile.validate().unwrap();
            assert!(ids.insert(profile.id.clone()), "duplicate {}", profile.id);
        }
    }

    #[test]
    fn test_classifier_feature_lengths() {
        assert_eq!(plank().classifier.unwrap().feature_len(), 27);
        assert_eq!(bicep_curl().classifier.unwrap().feature_len(), 18);
        assert_eq!(lunge().classifier.unwrap().feature_len(), 18);
    }

    #[test]
    fn test_plank_has_no_cycle() {
        let profile = plank();
        assert!(profile.phases.initial.is_none());
        assert!(profile.phases.breakpoint.is_none());
        assert!(profile.rules.is_empty());
    }
}
