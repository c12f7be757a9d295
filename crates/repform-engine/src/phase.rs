//! Repetition phase detection.
//!
//! A repetition moves from the initial position through motion to the
//! breakpoint (full extension or full flexion, depending on the exercise)
//! and back. Each frame is classified on its own; callers that want
//! continuity thread the previous phase back in.

use serde::{Deserialize, Serialize};

use repform_core::Result;

use crate::measure::Measurements;
use crate::profile::{ExerciseProfile, PhaseMarker, Predicate};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No frame has been classified yet
    #[default]
    AwaitingInitial,
    AtInitial,
    InMotion,
    AtBreakpoint,
}

impl Phase {
    pub fn signal(&self) -> PhaseSignal {
        PhaseSignal {
            initial_position: *self == Phase::AtInitial,
            breakpoint: *self == Phase::AtBreakpoint,
        }
    }
}

/// The two booleans reported for a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseSignal {
    pub initial_position: bool,
    pub breakpoint: bool,
}

impl PhaseSignal {
    pub fn has(&self, marker: PhaseMarker) -> bool {
        match marker {
            PhaseMarker::Initial => self.initial_position,
            PhaseMarker::Breakpoint => self.breakpoint,
        }
    }
}

/// Phase of one frame relative to the phase the caller last saw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReading {
    pub phase: Phase,
    pub previous: Phase,
    /// The frame moved into a different phase than `previous`
    pub entered: bool,
}

/// Classify one frame's measurements.
///
/// A frame meeting both the initial and the breakpoint condition is
/// reported at the initial position. A condition the profile does not
/// declare never holds.
pub fn phase_of(
    measurements: &Measurements,
    profile: &ExerciseProfile,
    previous: Phase,
) -> Result<PhaseReading> {
    let holds = |condition: &Option<Predicate>| -> Result<bool> {
        match condition {
            Some(predicate) => crate::rules::evaluate(predicate, measurements, None),
            None => Ok(false),
        }
    };

    let at_initial = holds(&profile.phases.initial)?;
    let at_breakpoint = holds(&profile.phases.breakpoint)?;

    let phase = if at_initial {
        Phase::AtInitial
    } else if at_breakpoint {
        Phase::AtBreakpoint
    } else {
        Phase::InMotion
    };

    Ok(PhaseReading {
        phase,
        previous,
        entered: phase != previous,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use repform_core::BodyPart;

    fn curl_profile() -> ExerciseProfile {
        ExerciseProfile::new("curl", &[BodyPart::LeftElbow])
            .with_initial(Predicate::gt("elbow", 160.0))
            .with_breakpoint(Predicate::lt("elbow", 50.0))
    }

    fn read(elbow: f64, previous: Phase) -> PhaseReading {
        let m = Measurements::from_values([("elbow", elbow)]);
        phase_of(&m, &curl_profile(), previous).unwrap()
    }

    #[test]
    fn test_phases_by_threshold() {
        assert_eq!(read(175.0, Phase::AwaitingInitial).phase, Phase::AtInitial);
        assert_eq!(read(100.0, Phase::AtInitial).phase, Phase::InMotion);
        assert_eq!(read(35.0, Phase::InMotion).phase, Phase::AtBreakpoint);
    }

    #[test]
    fn test_initial_wins_tie() {
        // Overlapping thresholds: every elbow angle between 40 and 60 satisfies both
        let profile = ExerciseProfile::new("noisy", &[BodyPart::LeftElbow])
            .with_initial(Predicate::gt("elbow", 40.0))
            .with_breakpoint(Predicate::lt("elbow", 60.0));
        let m = Measurements::from_values([("elbow", 50.0)]);

        let reading = phase_of(&m, &profile, Phase::InMotion).unwrap();
        assert_eq!(reading.phase, Phase::AtInitial);
        assert_eq!(
            reading.phase.signal(),
            PhaseSignal {
                initial_position: true,
                breakpoint: false
            }
        );
    }

    #[test]
    fn test_entered_tracks_previous() {
        let first = read(175.0, Phase::AwaitingInitial);
        assert!(first.entered);

        let held = read(170.0, first.phase);
        assert!(!held.entered);
        assert_eq!(held.previous, Phase::AtInitial);
    }

    #[test]
    fn test_undeclared_conditions_never_hold() {
        let hold = ExerciseProfile::new("plank", &[BodyPart::Nose]);
        let reading = phase_of(&Measurements::default(), &hold, Phase::AwaitingInitial).unwrap();
        assert_eq!(reading.phase, Phase::InMotion);
        assert_eq!(reading.phase.signal(), PhaseSignal::default());
    }
}
