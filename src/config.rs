//! Configuration management for the resolver
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (resolver.toml)
//! - Environment variables (RESOLVER__*)
//!
//! ## Example config file (resolver.toml):
//! ```toml
//! cycle_policy = "break"
//! record_traces = false
//!
//! [locator]
//! mode = "separate"
//! folder = "definitions"
//! extension = "adoc"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::locator::{DocumentLocator, InlineLocator, SeparateFileLocator};

/// Resolver settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// What to do when a `$ref` re-enters a definition being expanded
    #[serde(default)]
    pub cycle_policy: CyclePolicy,

    /// Keep trace events in the diagnostics collector
    #[serde(default)]
    pub record_traces: bool,

    /// Locator used by the CLI
    #[serde(default)]
    pub locator: LocatorConfig,
}

/// Reference cycle handling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Replace the re-entering reference with a name-only placeholder
    #[default]
    Break,
    /// Abort resolution with `ResolveError::ReferenceCycle`
    Fail,
}

/// Locator style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorMode {
    /// Anchors in a single document
    #[default]
    Inline,
    /// One file per definition
    Separate,
}

/// Locator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatorConfig {
    #[serde(default)]
    pub mode: LocatorMode,

    /// Anchor prefix for inline mode
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Target folder for separate mode
    #[serde(default = "default_folder")]
    pub folder: String,

    /// File extension for separate mode
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_prefix() -> String {
    "definitions-".to_string()
}

fn default_folder() -> String {
    "definitions".to_string()
}

fn default_extension() -> String {
    "adoc".to_string()
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            mode: LocatorMode::Inline,
            prefix: default_prefix(),
            folder: default_folder(),
            extension: default_extension(),
        }
    }
}

impl LocatorConfig {
    /// Build the configured locator
    pub fn build(&self) -> Box<dyn DocumentLocator> {
        match self.mode {
            LocatorMode::Inline => Box::new(InlineLocator::new(self.prefix.clone())),
            LocatorMode::Separate => Box::new(SeparateFileLocator::new(
                self.folder.clone(),
                self.extension.clone(),
            )),
        }
    }
}

impl ResolverConfig {
    /// Load configuration, adding a required file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = ["resolver.toml", ".resolver.toml", "config/resolver.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "schema-resolver") {
            let xdg_config = config_dir.config_dir().join("resolver.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (RESOLVER__*)
        builder = builder.add_source(
            Environment::with_prefix("RESOLVER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResolverConfig::default();
        assert_eq!(config.cycle_policy, CyclePolicy::Break);
        assert!(!config.record_traces);
        assert_eq!(config.locator.mode, LocatorMode::Inline);
    }

    #[test]
    fn test_serialize_config() {
        let config = ResolverConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("cycle_policy = \"break\""));
        assert!(toml_str.contains("[locator]"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "cycle_policy = \"fail\"\n[locator]\nmode = \"separate\"\nfolder = \"defs\"\n",
        )
        .unwrap();

        let config = ResolverConfig::load_from(path.to_str()).unwrap();
        assert_eq!(config.cycle_policy, CyclePolicy::Fail);
        assert_eq!(config.locator.mode, LocatorMode::Separate);
        assert_eq!(config.locator.folder, "defs");
        assert_eq!(config.locator.extension, "adoc");
        assert_eq!(config.locator.build().locate("Pet"), "defs/pet.adoc");
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = ResolverConfig::load_from(path.to_str()).unwrap_err();
        assert!(matches!(err, crate::error::ResolveError::Config(_)));
    }

    #[test]
    fn test_save_into_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("saved.toml");
        let err = ResolverConfig::default().save(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, crate::error::ResolveError::Io(_)));
    }

    #[test]
    fn test_save_round_trips_through_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let config = ResolverConfig {
            record_traces: true,
            ..ResolverConfig::default()
        };
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = ResolverConfig::load_from(path.to_str()).unwrap();
        assert!(loaded.record_traces);
    }
}
