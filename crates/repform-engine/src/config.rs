//! Engine configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Complete engine configuration.
///
/// Keys missing from the file or environment keep their `Default` values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Landmarks with a lower visibility score count as missing
    pub min_visibility: f64,

    /// Classifier artifacts loaded once at startup
    pub classifiers: Vec<ArtifactConfig>,

    /// JSON file with additional exercise profiles
    pub extra_profiles: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Name profiles use to reference the artifact
    pub name: String,

    /// Path to the linear classifier JSON file
    pub path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_visibility: 0.0,
            classifiers: vec![
                ArtifactConfig {
                    name: "plank".to_string(),
                    path: PathBuf::from("models/plank.json"),
                },
                ArtifactConfig {
                    name: "bicep-curl".to_string(),
                    path: PathBuf::from("models/bicep_curl.json"),
                },
                ArtifactConfig {
                    name: "lunge".to_string(),
                    path: PathBuf::from("models/lunge.json"),
                },
            ],
            extra_profiles: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from file
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("REPFORM"))
            .build()?;

        settings.try_deserialize()
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("REPFORM"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.min_visibility, 0.0);
        assert_eq!(config.classifiers.len(), 3);
        assert!(config.extra_profiles.is_none());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("repform-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
min_visibility = 0.5

[[classifiers]]
name = "plank"
path = "/opt/models/plank.json"
"#,
        )
        .unwrap();

        let config = EngineConfig::from_file(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.min_visibility, 0.5);
        assert_eq!(config.classifiers.len(), 1);
        assert_eq!(config.classifiers[0].path, PathBuf::from("/opt/models/plank.json"));
    }

    #[test]
    fn test_omitted_keys_keep_defaults() {
        let path = std::env::temp_dir().join(format!(
            "repform-config-partial-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "min_visibility = 0.3\n").unwrap();

        let config = EngineConfig::from_file(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.min_visibility, 0.3);
        let names: Vec<_> = config.classifiers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["plank", "bicep-curl", "lunge"]);
        assert!(config.extra_profiles.is_none());
    }
}
