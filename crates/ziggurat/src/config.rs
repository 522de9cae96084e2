//! Configuration types for Ziggurat compilation.
//!
//! This module provides configuration structures that control which
//! generators run. All types implement [`serde::Deserialize`] for flexible
//! loading from external sources (the CLI loads them from TOML).
//!
//! # Example
//!
//! ```
//! # use ziggurat::config::AppConfig;
//! // Use default configuration: every generator enabled
//! let config = AppConfig::default();
//! assert!(config.generators().schema());
//! ```

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Generator toggle section.
    #[serde(default)]
    generators: GeneratorsConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified generator toggles.
    pub fn new(generators: GeneratorsConfig) -> Self {
        Self { generators }
    }

    /// Returns the generator configuration.
    pub fn generators(&self) -> &GeneratorsConfig {
        &self.generators
    }
}

/// Per-generator enable toggles. Every generator defaults to enabled;
/// disabling one suppresses exactly that artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorsConfig {
    #[serde(default = "enabled")]
    schema: bool,

    #[serde(default = "enabled")]
    domain_models: bool,

    #[serde(default = "enabled")]
    actors: bool,

    #[serde(default = "enabled")]
    view_models: bool,

    #[serde(default = "enabled")]
    project: bool,
}

fn enabled() -> bool {
    true
}

impl Default for GeneratorsConfig {
    fn default() -> Self {
        Self {
            schema: true,
            domain_models: true,
            actors: true,
            view_models: true,
            project: true,
        }
    }
}

impl GeneratorsConfig {
    /// Whether the SQL schema generator is enabled.
    pub fn schema(&self) -> bool {
        self.schema
    }

    /// Whether the C# domain-model generator is enabled.
    pub fn domain_models(&self) -> bool {
        self.domain_models
    }

    /// Whether the actor-skeleton generator is enabled.
    pub fn actors(&self) -> bool {
        self.actors
    }

    /// Whether the view-model generator is enabled.
    pub fn view_models(&self) -> bool {
        self.view_models
    }

    /// Whether the build-descriptor generator is enabled.
    pub fn project(&self) -> bool {
        self.project
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enables_everything() {
        let config = AppConfig::default();
        let generators = config.generators();
        assert!(generators.schema());
        assert!(generators.domain_models());
        assert!(generators.actors());
        assert!(generators.view_models());
        assert!(generators.project());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            "[generators]\n\
             actors = false\n",
        )
        .expect("should deserialize");
        assert!(!config.generators().actors());
        assert!(config.generators().schema());
        assert!(config.generators().view_models());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: AppConfig = toml::from_str("").expect("should deserialize");
        assert!(config.generators().project());
    }
}
