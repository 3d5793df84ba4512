//! Component accessor synthesis.
//!
//! Given a schema of entities and component kinds, produce for every entity
//! a flattened, inheritance-aware accessor surface over an opaque component
//! store, together with its archetype and default initializer.

pub mod accessor;
pub mod classify;
pub mod defaults;
pub mod diagnostic;
pub mod emit;
pub mod flatten;
pub mod fragment;
pub mod plan;
pub mod resolve;

mod macros;

pub use accessor::{NestedObject, Placement, ResolvedAccessor, ShadowField};
pub use classify::MemberDescriptor;
pub use defaults::DefaultSource;
pub use diagnostic::{Diagnostic, Severity, SynthError};
pub use plan::{EntityPlan, InitStep};
pub use resolve::ResolvedAttachment;

use convert_case::{Case, Casing};
use emit::EntityBuilder;
use entigen_config::{CONFIG_FILE, Config, ConfigError, SynthesisConfig};
use entigen_schema::node::{Entity, Schema};
use flatten::ChainCache;
use plan::Planner;
use serde::Serialize;
use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};
use thiserror::Error as ThisError;

/// First line of every rendered source file.
pub const GENERATED_HEADER: &str = "// @generated by entigen, do not edit\n";

///
/// Artifact
/// generated code for one entity
///

#[derive(Clone, Debug, Serialize)]
pub struct Artifact {
    pub entity: String,
    pub plan: EntityPlan,
    pub code: String,
}

impl Artifact {
    /// File name used when writing one file per entity.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.rs", self.plan.ident.to_case(Case::Snake))
    }
}

///
/// Synthesis
///
/// Result of one invocation: artifacts keyed by entity path plus every
/// diagnostic raised on the way. A failed entity has no artifact.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct Synthesis {
    pub artifacts: BTreeMap<String, Artifact>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Synthesis {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    #[must_use]
    pub fn artifact(&self, entity: &str) -> Option<&Artifact> {
        self.artifacts.get(entity)
    }

    /// Every artifact in path order, as one Rust source file.
    #[must_use]
    pub fn render_all(&self) -> String {
        let mut out = String::from(GENERATED_HEADER);
        for artifact in self.artifacts.values() {
            out.push_str(&artifact.code);
            out.push('\n');
        }

        out
    }

    fn record(&mut self, entity: &str, outcome: Outcome) {
        self.diagnostics.extend(outcome.diagnostics);
        if let Some(artifact) = outcome.artifact {
            self.artifacts.insert(entity.to_string(), artifact);
        }
    }

    // Every artifact lands in one module, so generated type names must be
    // unique across entities. Later paths lose, along with their descendants.
    fn reject_type_clashes(&mut self) {
        let mut owners: BTreeMap<&str, &str> = self
            .artifacts
            .values()
            .map(|a| (a.plan.ident.as_str(), a.entity.as_str()))
            .collect();
        let mut clashes = Vec::new();

        for artifact in self.artifacts.values() {
            let entity = artifact.entity.as_str();
            let views = || artifact.plan.type_idents().skip(1);
            let clash = views().find_map(|name| {
                owners
                    .get(name)
                    .filter(|&&owner| owner != entity)
                    .map(|&owner| (name, owner))
            });

            match clash {
                Some((name, owner)) => clashes.push(Diagnostic::new(
                    entity,
                    SynthError::TypeCollision {
                        name: name.to_string(),
                        existing: owner.to_string(),
                    },
                )),
                None => owners.extend(views().map(|name| (name, entity))),
            }
        }

        let mut failed: BTreeSet<String> = clashes.iter().map(|d| d.entity.clone()).collect();
        self.diagnostics.extend(clashes);

        let descendants: Vec<(String, String)> = self
            .artifacts
            .values()
            .filter(|a| !failed.contains(&a.entity))
            .filter_map(|a| {
                a.plan
                    .chain
                    .iter()
                    .find(|ancestor| failed.contains(*ancestor))
                    .map(|ancestor| (a.entity.clone(), ancestor.clone()))
            })
            .collect();
        for (entity, ancestor) in descendants {
            self.diagnostics
                .push(Diagnostic::new(&entity, SynthError::AncestorFailed { ancestor }));
            failed.insert(entity);
        }

        for entity in &failed {
            tracing::debug!(entity = %entity, "entity failed");
            self.artifacts.remove(entity);
        }
    }

    fn log_summary(&self, entities: usize) {
        tracing::info!(
            entities,
            artifacts = self.artifacts.len(),
            warnings = self.warnings().count(),
            errors = self.errors().count(),
            "synthesis complete"
        );
    }
}

struct Outcome {
    artifact: Option<Artifact>,
    diagnostics: Vec<Diagnostic>,
}

/// Synthesize every entity of `schema`, in path order.
#[must_use]
pub fn generate(schema: &Schema, config: &SynthesisConfig) -> Synthesis {
    let cache = ChainCache::new(schema, config);
    let mut synthesis = Synthesis::default();
    let mut entities = 0;

    for (path, _) in schema.get_nodes::<Entity>() {
        synthesis.record(path, synthesize_entity(&cache, path));
        entities += 1;
    }
    synthesis.reject_type_clashes();
    synthesis.log_summary(entities);

    synthesis
}

/// Same result as `generate`, with entities synthesized on the rayon pool.
#[cfg(feature = "parallel")]
#[must_use]
pub fn generate_parallel(schema: &Schema, config: &SynthesisConfig) -> Synthesis {
    use rayon::prelude::*;

    let cache = ChainCache::new(schema, config);
    let paths: Vec<&str> = schema.get_nodes::<Entity>().map(|(path, _)| path).collect();

    let outcomes: Vec<Outcome> = paths
        .par_iter()
        .map(|path| synthesize_entity(&cache, path))
        .collect();

    let mut synthesis = Synthesis::default();
    for (path, outcome) in paths.iter().zip(outcomes) {
        synthesis.record(path, outcome);
    }
    synthesis.reject_type_clashes();
    synthesis.log_summary(paths.len());

    synthesis
}

/// Archetype of one entity.
pub fn archetype(
    schema: &Schema,
    config: &SynthesisConfig,
    entity: &str,
) -> Result<Vec<String>, SynthError> {
    let cache = ChainCache::new(schema, config);

    cache.flatten(entity).map(|flat| flat.archetype())
}

fn synthesize_entity(cache: &ChainCache<'_>, path: &str) -> Outcome {
    let mut diagnostics = cache
        .own(path)
        .map(|resolution| resolution.warnings.clone())
        .unwrap_or_default();

    let result = Planner::new(cache).plan(path).and_then(|plan| {
        plan.map(|plan| render(plan, &cache.config().runtime_path))
            .transpose()
            .map_err(|e| vec![e])
    });

    match result {
        Ok(artifact) => Outcome {
            artifact,
            diagnostics,
        },
        Err(errors) => {
            for error in errors {
                tracing::debug!(entity = path, %error, "entity failed");
                diagnostics.push(Diagnostic::new(path, error));
            }

            Outcome {
                artifact: None,
                diagnostics,
            }
        }
    }
}

fn render(plan: EntityPlan, runtime_path: &str) -> Result<Artifact, SynthError> {
    let code = EntityBuilder::new(&plan, runtime_path)?.generate()?.to_string();

    Ok(Artifact {
        entity: plan.entity.clone(),
        plan,
        code,
    })
}

///
/// BuildError
///

#[derive(Debug, ThisError)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] entigen_schema::Error),

    #[error("synthesis failed:\n{}", render_diagnostics(.0))]
    Synthesis(Vec<Diagnostic>),
}

fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Load `schema_path` (and `entigen.toml` next to it, when present), run
/// synthesis and return the rendered source. Used by `build!`.
pub fn build_source(schema_path: impl AsRef<Path>) -> Result<String, BuildError> {
    let schema_path = schema_path.as_ref();
    let config_path = schema_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(CONFIG_FILE);

    let config = Config::load_or_default(config_path)?;
    let schema = entigen_schema::load_validated(schema_path)?;
    let synthesis = generate(&schema, &config.synthesis);

    if synthesis.has_errors() {
        return Err(BuildError::Synthesis(synthesis.errors().cloned().collect()));
    }

    Ok(synthesis.render_all())
}
