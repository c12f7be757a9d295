//! Mistake rule evaluation.

use std::collections::BTreeMap;

use repform_core::{Error, Result};

use crate::measure::Measurements;
use crate::phase::PhaseSignal;
use crate::profile::{MistakeRule, Operand, Predicate};

/// Evaluate one predicate.
///
/// `signal` is `None` while the phase itself is being decided; a predicate
/// that asks for the phase at that point is a configuration error.
/// Children of `All`/`Any` are all evaluated so a bad reference is never
/// hidden behind an earlier result.
pub fn evaluate(
    predicate: &Predicate,
    measurements: &Measurements,
    signal: Option<PhaseSignal>,
) -> Result<bool> {
    match predicate {
        Predicate::Compare {
            measure,
            op,
            operand,
        } => {
            let left = measurements.get(measure)?;
            let right = match operand {
                Operand::Constant(value) => *value,
                Operand::Scaled { measure, factor } => measurements.get(measure)? * factor,
            };
            Ok(op.holds(left, right))
        }
        Predicate::All(children) => {
            let results = evaluate_children(children, measurements, signal)?;
            Ok(results.into_iter().all(|held| held))
        }
        Predicate::Any(children) => {
            let results = evaluate_children(children, measurements, signal)?;
            Ok(results.into_iter().any(|held| held))
        }
        Predicate::InPhase(marker) => signal
            .map(|s| s.has(*marker))
            .ok_or_else(|| Error::Config("phase referenced before it is known".to_string())),
    }
}

fn evaluate_children(
    children: &[Predicate],
    measurements: &Measurements,
    signal: Option<PhaseSignal>,
) -> Result<Vec<bool>> {
    children
        .iter()
        .map(|child| evaluate(child, measurements, signal))
        .collect()
}

/// Evaluate every rule, in declared order, into a complete flag set
pub fn evaluate_rules(
    rules: &[MistakeRule],
    measurements: &Measurements,
    signal: PhaseSignal,
) -> Result<BTreeMap<String, bool>> {
    let mut flags = BTreeMap::new();
    for rule in rules {
        let raised = evaluate(&rule.predicate, measurements, Some(signal))?;
        flags.insert(rule.flag.clone(), raised);
    }
    Ok(flags)
}
