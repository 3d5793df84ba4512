use crate::cli::{Cli, Command};
use entigen_build::{Artifact, EntityPlan, GENERATED_HEADER, SynthError, Synthesis};
use entigen_config::{CONFIG_FILE, Config, ConfigError};
use entigen_schema::node::{Entity, Schema};
use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

///
/// CliError
///

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] entigen_schema::Error),

    #[error(transparent)]
    Synth(#[from] SynthError),

    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),

    #[error("cannot serialize plan: {0}")]
    Json(#[from] serde_json::Error),

    #[error("synthesis failed: {errors} error(s), {warnings} warning(s)")]
    Failed { errors: usize, warnings: usize },
}

pub fn run(cli: &Cli) -> Result<(), CliError> {
    run_with(cli, &mut io::stdout().lock())
}

pub fn run_with(cli: &Cli, out: &mut dyn Write) -> Result<(), CliError> {
    let schema_path = cli.command.schema();
    let config = load_config(cli.config.as_deref(), schema_path)?;
    let schema = entigen_schema::load_validated(schema_path)?;
    tracing::info!(
        schema = %schema_path.display(),
        nodes = schema.len(),
        "schema loaded"
    );

    match &cli.command {
        Command::Check { deny_warnings, .. } => check(&schema, &config, *deny_warnings, out),
        Command::Generate {
            out: target,
            entity,
            stdout,
            ..
        } => {
            let target = if *stdout {
                Target::Stdout
            } else if config.output.file_per_entity {
                Target::Dir(target.clone().unwrap_or_else(|| config.output.dir.clone()))
            } else {
                Target::File(
                    target
                        .clone()
                        .unwrap_or_else(|| config.output.dir.join("entities.rs")),
                )
            };

            generate(&schema, &config, entity.as_deref(), &target, out)
        }
        Command::Plan { entity, .. } => plan(&schema, &config, entity.as_deref(), out),
        Command::Archetype { entity, .. } => archetype(&schema, &config, entity, out),
    }
}

// explicit --config must exist; the implicit one is optional
fn load_config(explicit: Option<&Path>, schema: &Path) -> Result<Config, CliError> {
    let config = match explicit {
        Some(path) => Config::load(path)?,
        None => {
            let dir = schema.parent().unwrap_or_else(|| Path::new("."));
            Config::load_or_default(dir.join(CONFIG_FILE))?
        }
    };

    Ok(config)
}

fn synthesize(schema: &Schema, config: &Config) -> Synthesis {
    #[cfg(feature = "parallel")]
    let synthesis = entigen_build::generate_parallel(schema, &config.synthesis);
    #[cfg(not(feature = "parallel"))]
    let synthesis = entigen_build::generate(schema, &config.synthesis);

    synthesis
}

fn require_entity(schema: &Schema, entity: &str) -> Result<(), CliError> {
    schema
        .entity(entity)
        .map(|_| ())
        .ok_or_else(|| CliError::UnknownEntity(entity.to_string()))
}

// Diagnostics, one per line.
fn report(synthesis: &Synthesis, w: &mut dyn Write) -> io::Result<()> {
    for diagnostic in &synthesis.diagnostics {
        writeln!(w, "{diagnostic}")?;
    }

    Ok(())
}

const fn failed(errors: usize, warnings: usize) -> CliError {
    CliError::Failed { errors, warnings }
}

//
// check
//

fn check(
    schema: &Schema,
    config: &Config,
    deny_warnings: bool,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let synthesis = synthesize(schema, config);
    report(&synthesis, out)?;

    let errors = synthesis.errors().count();
    let warnings = synthesis.warnings().count();
    writeln!(
        out,
        "checked {} entities: {errors} error(s), {warnings} warning(s)",
        schema.get_nodes::<Entity>().count()
    )?;

    if errors > 0 || (deny_warnings && warnings > 0) {
        return Err(failed(errors, warnings));
    }

    Ok(())
}

//
// generate
//

enum Target {
    Stdout,
    File(PathBuf),
    Dir(PathBuf),
}

fn generate(
    schema: &Schema,
    config: &Config,
    entity: Option<&str>,
    target: &Target,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    if let Some(entity) = entity {
        require_entity(schema, entity)?;
    }

    let synthesis = synthesize(schema, config);
    report(&synthesis, &mut io::stderr().lock())?;

    let artifacts: Vec<&Artifact> = synthesis
        .artifacts
        .values()
        .filter(|a| entity.is_none_or(|e| a.entity == e))
        .collect();

    match target {
        Target::Stdout => out.write_all(render(&artifacts).as_bytes())?,
        Target::File(path) => write_file(path, &render(&artifacts))?,
        Target::Dir(dir) => {
            let mut index = String::from(GENERATED_HEADER);
            for &artifact in &artifacts {
                let file = artifact.file_name();
                write_file(&dir.join(&file), &render(&[artifact]))?;
                index.push_str(&format!("include!(\"{file}\");\n"));
            }
            write_file(&dir.join("mod.rs"), &index)?;
        }
    }
    tracing::info!(artifacts = artifacts.len(), "generated");

    let errors = synthesis
        .errors()
        .filter(|d| entity.is_none_or(|e| d.entity == e))
        .count();
    if errors > 0 {
        return Err(failed(errors, synthesis.warnings().count()));
    }

    Ok(())
}

fn render(artifacts: &[&Artifact]) -> String {
    let mut source = String::from(GENERATED_HEADER);
    for artifact in artifacts {
        source.push_str(&artifact.code);
        source.push('\n');
    }

    source
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    let write = || -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    };

    write().map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "wrote");

    Ok(())
}

//
// plan
//

fn plan(
    schema: &Schema,
    config: &Config,
    entity: Option<&str>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    if let Some(entity) = entity {
        require_entity(schema, entity)?;
    }

    let synthesis = synthesize(schema, config);
    report(&synthesis, &mut io::stderr().lock())?;

    let plans: BTreeMap<&str, &EntityPlan> = synthesis
        .artifacts
        .iter()
        .filter(|(path, _)| entity.is_none_or(|e| path.as_str() == e))
        .map(|(path, artifact)| (path.as_str(), &artifact.plan))
        .collect();

    serde_json::to_writer_pretty(&mut *out, &plans)?;
    writeln!(out)?;

    Ok(())
}

//
// archetype
//

fn archetype(
    schema: &Schema,
    config: &Config,
    entity: &str,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    require_entity(schema, entity)?;

    for kind in entigen_build::archetype(schema, &config.synthesis, entity)? {
        writeln!(out, "{kind}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    const SCHEMA: &str = r#"
        [[component]]
        path = "game::Position"

        [[component.member]]
        name = "x"
        type = "f32"
        initializer = "1.5"

        [[component]]
        path = "game::Collider"

        [[component.member]]
        name = "x"
        type = "f32"

        [[entity]]
        path = "game::Actor"

        [[entity]]
        path = "game::Player"
        parent = "game::Actor"

        [[entity.component]]
        component = "game::Position"
    "#;

    const CLASH: &str = r#"
        [[entity]]
        path = "game::Clash"

        [[entity.component]]
        component = "game::Position"

        [[entity.component]]
        component = "game::Collider"
    "#;

    // scratch directory holding `schema.toml` (and optionally `entigen.toml`)
    fn workspace(schema: &str, config: Option<&str>) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schema.toml"), schema).unwrap();
        if let Some(config) = config {
            fs::write(dir.path().join(CONFIG_FILE), config).unwrap();
        }

        dir
    }

    fn run_args(args: &[&str]) -> (Result<(), CliError>, String) {
        let cli = Cli::try_parse_from(std::iter::once("entigen").chain(args.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        let result = run_with(&cli, &mut out);

        (result, String::from_utf8(out).unwrap())
    }

    fn schema_arg(dir: &Path) -> String {
        dir.join("schema.toml").display().to_string()
    }

    #[test]
    fn check_passes_clean_schema() {
        let dir = workspace(SCHEMA, None);
        let (result, out) = run_args(&["check", &schema_arg(dir.path())]);

        result.unwrap();
        assert!(out.contains("0 error(s), 0 warning(s)"), "{out}");
    }

    #[test]
    fn check_fails_on_collisions() {
        let dir = workspace(&format!("{SCHEMA}\n{CLASH}"), None);
        let (result, out) = run_args(&["check", &schema_arg(dir.path())]);

        assert!(matches!(result, Err(CliError::Failed { errors, .. }) if errors > 0));
        assert!(out.contains("game::Clash"), "{out}");
    }

    #[test]
    fn generate_to_stdout() {
        let dir = workspace(SCHEMA, None);
        let (result, out) = run_args(&["generate", &schema_arg(dir.path()), "--stdout"]);

        result.unwrap();
        assert!(out.starts_with(GENERATED_HEADER));
        assert!(out.contains("pub struct Player"));
        assert!(out.contains("pub struct Actor"));
    }

    #[test]
    fn generate_one_file_per_entity() {
        let config = "[output]\ndir = \"out\"\nfile_per_entity = true\n";
        let dir = workspace(SCHEMA, Some(config));
        let target = dir.path().join("gen");
        let (result, _) = run_args(&[
            "generate",
            &schema_arg(dir.path()),
            "--out",
            &target.display().to_string(),
        ]);

        result.unwrap();
        let index = fs::read_to_string(target.join("mod.rs")).unwrap();
        assert!(index.contains("include!(\"player.rs\");"));
        assert!(index.contains("include!(\"actor.rs\");"));
        assert!(target.join("player.rs").exists());
    }

    #[test]
    fn plan_prints_json() {
        let dir = workspace(SCHEMA, None);
        let schema = schema_arg(dir.path());
        let (result, out) = run_args(&["plan", &schema, "--entity", "game::Player"]);

        result.unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["game::Player"]["archetype"][0], "game::Position");
        assert!(json.get("game::Actor").is_none());
    }

    #[test]
    fn archetype_lists_kinds() {
        let dir = workspace(SCHEMA, None);
        let (result, out) = run_args(&["archetype", &schema_arg(dir.path()), "game::Player"]);

        result.unwrap();
        assert_eq!(out, "game::Position\n");
    }

    #[test]
    fn unknown_entity_is_reported() {
        let dir = workspace(SCHEMA, None);
        let (result, _) = run_args(&["archetype", &schema_arg(dir.path()), "game::Ghost"]);

        assert!(matches!(result, Err(CliError::UnknownEntity(e)) if e == "game::Ghost"));
    }
}
