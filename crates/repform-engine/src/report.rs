//! Analysis results and the hand-off to session persistence.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use repform_core::Result;

use crate::phase::{Phase, PhaseReading};

/// Outcome of analysing one frame.
///
/// Serializes as a flat object: one boolean per mistake flag plus
/// `initial_position` and `breakpoint`. Flags are kept sorted by name so
/// identical inputs serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MistakeReport {
    #[serde(skip)]
    pub exercise: String,
    #[serde(flatten)]
    pub flags: BTreeMap<String, bool>,
    pub initial_position: bool,
    pub breakpoint: bool,
    #[serde(skip)]
    pub phase: Phase,
}

impl MistakeReport {
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.flags.get(name).copied()
    }

    /// Names of the flags raised on this frame
    pub fn raised(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|(_, raised)| **raised)
            .map(|(name, _)| name.as_str())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Report plus the phase reading it was derived from
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub report: MistakeReport,
    pub reading: PhaseReading,
}

/// Identifies the workout a report belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptContext {
    pub user_id: i64,
    pub exercise_name: String,
    pub workout_date: NaiveDate,
}

impl AttemptContext {
    pub fn new(user_id: i64, exercise_name: &str, workout_date: NaiveDate) -> Self {
        Self {
            user_id,
            exercise_name: exercise_name.to_string(),
            workout_date,
        }
    }

    /// Attempt dated today (UTC)
    pub fn today(user_id: i64, exercise_name: &str) -> Self {
        Self::new(user_id, exercise_name, Utc::now().date_naive())
    }
}

/// Receives reports for aggregation into session statistics.
///
/// Attempt counting and mistake percentages belong to the implementor;
/// the engine only hands over per-frame booleans.
pub trait ReportSink: Send + Sync {
    fn record(&self, context: &AttemptContext, report: &MistakeReport) -> Result<()>;
}
