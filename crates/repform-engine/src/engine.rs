//! Frame analysis orchestrator.
//!
//! Composes detection, validation, measurement, phase detection, mistake
//! rules and classification for one frame. Everything it holds is read-only
//! after construction, so one engine serves concurrent calls without locks.

use std::collections::BTreeMap;
use std::sync::Arc;

use repform_core::{Error, LandmarkSet, Result};

use crate::classifier::{ClassifierAdapter, ClassifierStore};
use crate::config::EngineConfig;
use crate::detector::PoseDetector;
use crate::measure::Measurements;
use crate::phase::{phase_of, Phase};
use crate::registry::ProfileRegistry;
use crate::report::{Analysis, AttemptContext, MistakeReport, ReportSink};
use crate::rules::evaluate_rules;

/// Exercise-agnostic form analysis engine
pub struct FormEngine {
    detector: Arc<dyn PoseDetector>,
    registry: Arc<ProfileRegistry>,
    classifiers: Arc<ClassifierStore>,
    min_visibility: f64,
}

impl FormEngine {
    /// Assemble an engine from already-loaded collaborators.
    ///
    /// Every classifier a profile references must be present and accept
    /// exactly the feature length the profile produces.
    pub fn new(
        detector: Arc<dyn PoseDetector>,
        registry: Arc<ProfileRegistry>,
        classifiers: Arc<ClassifierStore>,
    ) -> Result<Self> {
        for profile in registry.profiles() {
            let Some(binding) = &profile.classifier else {
                continue;
            };

            let classifier = classifiers.get(&binding.artifact).ok_or_else(|| {
                Error::Config(format!(
                    "exercise '{}' needs classifier '{}', which is not loaded",
                    profile.id, binding.artifact
                ))
            })?;

            if classifier.input_len() != binding.feature_len() {
                return Err(Error::Config(format!(
                    "classifier '{}' takes {} inputs, exercise '{}' produces {}",
                    binding.artifact,
                    classifier.input_len(),
                    profile.id,
                    binding.feature_len()
                )));
            }
        }

        tracing::info!(
            "Form engine ready: detector '{}', {} exercises, {} classifiers",
            detector.name(),
            registry.len(),
            classifiers.len()
        );

        Ok(Self {
            detector,
            registry,
            classifiers,
            min_visibility: 0.0,
        })
    }

    /// Build the registry and classifier store described by `config`
    pub fn from_config(config: &EngineConfig, detector: Arc<dyn PoseDetector>) -> Result<Self> {
        let mut registry = ProfileRegistry::builtin()?;
        if let Some(path) = &config.extra_profiles {
            registry.load_json(path)?;
        }
        let classifiers = ClassifierStore::from_config(config)?;

        Ok(Self::new(detector, Arc::new(registry), Arc::new(classifiers))?
            .with_min_visibility(config.min_visibility))
    }

    pub fn with_min_visibility(mut self, min_visibility: f64) -> Self {
        self.min_visibility = min_visibility;
        self
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// Analyse one frame for one exercise
    pub fn analyze(&self, frame: &[u8], exercise_id: &str) -> Result<MistakeReport> {
        self.analyze_with_phase(frame, exercise_id, Phase::AwaitingInitial)
            .map(|analysis| analysis.report)
    }

    /// Analyse one frame, relating its phase to the phase the caller last saw
    pub fn analyze_with_phase(
        &self,
        frame: &[u8],
        exercise_id: &str,
        previous: Phase,
    ) -> Result<Analysis> {
        let landmarks = self.detect(frame)?;
        self.analyze_landmarks(&landmarks, exercise_id, previous)
    }

    /// Run detection, mapping an empty result to `NoLandmarksDetected`
    pub fn detect(&self, frame: &[u8]) -> Result<LandmarkSet> {
        let detected = self.detector.detect(frame).map_err(|e| match e {
            Error::DetectionFailed(_) => e,
            other => Error::DetectionFailed(other.to_string()),
        })?;

        match detected {
            Some(set) if !set.is_empty() => {
                tracing::debug!("Detected {} landmarks", set.len());
                Ok(set)
            }
            _ => Err(Error::NoLandmarksDetected),
        }
    }

    /// Analyse landmarks that were already detected
    pub fn analyze_landmarks(
        &self,
        landmarks: &LandmarkSet,
        exercise_id: &str,
        previous: Phase,
    ) -> Result<Analysis> {
        let profile = self.registry.get(exercise_id)?;

        landmarks.require(&profile.required, self.min_visibility)?;

        let measurements = Measurements::compute(profile, landmarks)?;
        tracing::debug!(
            "Exercise '{}': computed {} measurements",
            profile.id,
            measurements.len()
        );

        let reading = phase_of(&measurements, profile, previous)?;
        let signal = reading.phase.signal();

        let mut flags = evaluate_rules(&profile.rules, &measurements, signal)?;

        if let Some(binding) = &profile.classifier {
            let classifier = self.classifiers.get(&binding.artifact).ok_or_else(|| {
                Error::Config(format!("classifier '{}' is not loaded", binding.artifact))
            })?;
            let predicted = ClassifierAdapter::new(binding, classifier.as_ref()).run(landmarks)?;
            merge_flags(&mut flags, predicted)?;
        }

        tracing::debug!(
            "Exercise '{}': phase {:?}, {} flags",
            profile.id,
            reading.phase,
            flags.len()
        );

        Ok(Analysis {
            report: MistakeReport {
                exercise: profile.id.clone(),
                flags,
                initial_position: signal.initial_position,
                breakpoint: signal.breakpoint,
                phase: reading.phase,
            },
            reading,
        })
    }

    /// Analyse one frame and hand the report to a persistence sink
    pub fn analyze_and_record(
        &self,
        frame: &[u8],
        context: &AttemptContext,
        sink: &dyn ReportSink,
    ) -> Result<MistakeReport> {
        let report = self.analyze(frame, &context.exercise_name)?;
        sink.record(context, &report)?;
        Ok(report)
    }
}

/// Rule and classifier flags never overlap in a validated profile
fn merge_flags(flags: &mut BTreeMap<String, bool>, predicted: BTreeMap<String, bool>) -> Result<()> {
    for (flag, raised) in predicted {
        if flags.contains_key(&flag) {
            return Err(Error::Config(format!(
                "flag '{flag}' is defined by both a rule and a classifier"
            )));
        }
        flags.insert(flag, raised);
    }
    Ok(())
}
