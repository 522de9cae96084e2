//! Ziggurat - a modeling language compiler for master-data platforms.
//!
//! One compile run turns a Ziggurat source file into several independent
//! generated artifacts: a Data-Vault SQL schema, C# domain records,
//! Akka.NET actor skeletons, Avalonia view-model skeletons, and a build
//! descriptor with fixed ahead-of-time flags.

pub mod config;

mod error;
mod generate;

pub use error::ZigguratError;
pub use ziggurat_core::{ast, audit, casing, hashkey, types};

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info, trace};

use ziggurat_core::ast::Program;

use config::AppConfig;

/// The compile pipeline: parse a source file, run every enabled generator
/// over the resulting program.
///
/// # Examples
///
/// ```
/// use ziggurat::{Compiler, config::AppConfig};
///
/// let source = "CONTEXT Sales { STORAGE { HUB hub_customer WITH { k: UUID } } }";
///
/// let compiler = Compiler::new(AppConfig::default());
/// let artifacts = compiler.compile(source).expect("failed to compile");
///
/// assert!(artifacts.schema.is_some());
/// assert!(artifacts.actors.is_none()); // no commands declared
/// ```
#[derive(Default)]
pub struct Compiler {
    config: AppConfig,
}

impl Compiler {
    /// Create a new compiler with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Parse source code into a semantic program.
    ///
    /// # Errors
    ///
    /// Returns `ZigguratError::Parse` carrying every diagnostic the
    /// pipeline collected, together with the source text for rendering.
    pub fn parse(&self, source: &str) -> Result<Program, ZigguratError> {
        info!("Parsing program");

        let program = ziggurat_parser::parse(source)
            .map_err(|err| ZigguratError::new_parse_error(err, source))?;

        debug!(contexts = program.contexts.len(); "Program parsed successfully");
        trace!(program:?; "Parsed program");

        Ok(program)
    }

    /// Compile source code into the full artifact bundle.
    ///
    /// Parsing failures abort before any generator runs; generation itself
    /// cannot fail — a back end with nothing to consume simply produces no
    /// artifact.
    pub fn compile(&self, source: &str) -> Result<Artifacts, ZigguratError> {
        let program = self.parse(source)?;
        Ok(self.generate(&program))
    }

    /// Run every enabled generator over an already-parsed program.
    pub fn generate(&self, program: &Program) -> Artifacts {
        let generators = self.config.generators();

        let artifacts = Artifacts {
            schema: generators
                .schema()
                .then(|| generate::schema::generate(program))
                .flatten(),
            domain_models: generators
                .domain_models()
                .then(|| generate::domain::generate(program))
                .flatten(),
            actors: generators
                .actors()
                .then(|| generate::actors::generate(program))
                .flatten(),
            view_models: generators
                .view_models()
                .then(|| generate::view_models::generate(program))
                .flatten(),
            project: generators
                .project()
                .then(|| generate::project::generate(program))
                .flatten(),
        };

        info!(count = artifacts.count(); "Artifacts generated");
        artifacts
    }
}

/// The generated artifact bundle of one compile run.
///
/// Each field is `None` when the program had nothing for that back end
/// (or the generator was disabled) — never an empty string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Artifacts {
    /// Data-Vault SQL schema (`.sql`).
    pub schema: Option<String>,
    /// C# domain records (`.cs`).
    pub domain_models: Option<String>,
    /// Akka.NET actor skeletons (`.Actors.cs`).
    pub actors: Option<String>,
    /// Avalonia view-model skeletons (`.ViewModels.cs`).
    pub view_models: Option<String>,
    /// Build descriptor (`.csproj`).
    pub project: Option<String>,
}

impl Artifacts {
    fn entries(&self) -> [(&Option<String>, &'static str); 5] {
        [
            (&self.schema, "sql"),
            (&self.domain_models, "cs"),
            (&self.actors, "Actors.cs"),
            (&self.view_models, "ViewModels.cs"),
            (&self.project, "csproj"),
        ]
    }

    /// Number of produced artifacts.
    pub fn count(&self) -> usize {
        self.entries()
            .iter()
            .filter(|(content, _)| content.is_some())
            .count()
    }

    /// Whether no generator produced anything.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Write every produced artifact into `dir`, sharing the file stem.
    ///
    /// All generation already happened, so this is the only step with side
    /// effects: one `fs::write` per artifact. Returns the written paths.
    pub fn write_to(&self, dir: &Path, stem: &str) -> io::Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for (content, extension) in self.entries() {
            if let Some(content) = content {
                let path = dir.join(format!("{stem}.{extension}"));
                fs::write(&path, content)?;
                info!(path:? = path; "Artifact written");
                written.push(path);
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_produces_expected_artifacts() {
        let compiler = Compiler::default();
        let artifacts = compiler
            .compile(
                "CONTEXT Najaf {
                    STORAGE { HUB hub_customer WITH { customer_key: UUID PRIMARY KEY } }
                    COMMAND Ingest { EXECUTION { ACTION: a -> TARGET: hub_customer; } }
                }",
            )
            .expect("should compile");

        assert!(artifacts.schema.is_some());
        assert!(artifacts.domain_models.is_some());
        assert!(artifacts.actors.is_some());
        assert!(artifacts.view_models.is_some());
        assert!(artifacts.project.is_some());
        assert_eq!(artifacts.count(), 5);
    }

    #[test]
    fn test_compile_propagates_parse_errors() {
        let compiler = Compiler::default();
        let err = compiler
            .compile("CONTEXT Broken {")
            .expect_err("should fail");
        assert!(matches!(err, ZigguratError::Parse { .. }));
    }

    #[test]
    fn test_disabled_generator_suppresses_artifact() {
        let config: AppConfig =
            toml::from_str("[generators]\nschema = false\n").expect("config");
        let compiler = Compiler::new(config);
        let artifacts = compiler
            .compile("CONTEXT C { STORAGE { HUB h WITH { k: UUID } } }")
            .expect("should compile");

        assert!(artifacts.schema.is_none());
        assert!(artifacts.domain_models.is_some());
    }

    #[test]
    fn test_empty_program_produces_no_artifacts() {
        let compiler = Compiler::default();
        let artifacts = compiler.compile("").expect("should compile");
        assert!(artifacts.is_empty());
    }
}
