//! # Repform-Engine
//!
//! Per-frame exercise form analysis.
//!
//! ## Pipeline
//!
//! Each frame passes through the same stages regardless of exercise:
//!
//! 1. **Detect** - pose landmarks are extracted from the frame
//! 2. **Validate** - the exercise's required landmarks must be present
//! 3. **Measure** - joint angles, distances and inclinations are computed
//! 4. **Phase** - the frame is placed in the repetition cycle
//! 5. **Judge** - mistake rules and the exercise classifier raise flags
//!
//! What differs between exercises lives in [`ExerciseProfile`] data held by
//! the [`ProfileRegistry`]. Adding an exercise means registering a profile.

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod detector;
pub mod engine;
pub mod measure;
pub mod phase;
pub mod profile;
pub mod registry;
pub mod report;
pub mod rules;

pub use classifier::{
    Classifier, ClassifierAdapter, ClassifierStore, ExclusiveModel, LinearClassifier,
    SerializedClassifier,
};
pub use config::{ArtifactConfig, EngineConfig};
pub use detector::{LandmarkJsonDetector, PoseDetector};
pub use engine::FormEngine;
pub use measure::Measurements;
pub use phase::{phase_of, Phase, PhaseReading, PhaseSignal};
pub use profile::{
    ClassifierBinding, Comparison, ExerciseProfile, Measurement, MistakeRule, NamedMeasurement,
    Operand, PhaseMarker, PhaseThresholds, Predicate,
};
pub use registry::ProfileRegistry;
pub use report::{Analysis, AttemptContext, MistakeReport, ReportSink};
