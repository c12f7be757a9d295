//! Exercise profile registry.
//!
//! Loaded once at startup and shared read-only afterwards. Adding an
//! exercise means registering a profile; analysis code never branches on
//! the exercise identifier.

use std::collections::BTreeMap;
use std::path::Path;

use repform_core::{Error, Result};

use crate::catalog;
use crate::profile::ExerciseProfile;

#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, ExerciseProfile>,
}

impl ProfileRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in profile
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        for profile in catalog::builtin_profiles() {
            registry.register(profile)?;
        }
        Ok(registry)
    }

    /// Validate and add a profile
    pub fn register(&mut self, profile: ExerciseProfile) -> Result<()> {
        profile.validate()?;

        if self.profiles.contains_key(&profile.id) {
            return Err(Error::Config(format!(
                "exercise '{}' is already registered",
                profile.id
            )));
        }

        tracing::debug!(
            "Registered exercise '{}' ({} landmarks, {} rules, classifier: {})",
            profile.id,
            profile.required.len(),
            profile.rules.len(),
            profile.classifier.is_some()
        );
        self.profiles.insert(profile.id.clone(), profile);
        Ok(())
    }

    /// Register every profile in a JSON array; nothing is added on error
    pub fn extend_from_json(&mut self, json: &str) -> Result<usize> {
        let profiles: Vec<ExerciseProfile> = serde_json::from_str(json)?;

        let mut staged = self.clone();
        for profile in profiles.iter().cloned() {
            staged.register(profile)?;
        }
        *self = staged;

        Ok(profiles.len())
    }

    pub fn load_json<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let added = self.extend_from_json(&json)?;
        tracing::info!(
            "Loaded {} exercise profiles from {}",
            added,
            path.as_ref().display()
        );
        Ok(added)
    }

    pub fn get(&self, id: &str) -> Result<&ExerciseProfile> {
        self.profiles
            .get(id)
            .ok_or_else(|| Error::UnknownExercise(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.profiles.contains_key(id)
    }

    /// Registered identifiers in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &ExerciseProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
