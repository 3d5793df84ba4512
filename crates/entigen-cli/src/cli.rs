use clap::{Parser, Subcommand};
use std::path::PathBuf;

///
/// Cli
///

#[derive(Debug, Parser)]
#[command(name = "entigen", version, about = "Component accessor synthesis")]
pub struct Cli {
    /// Config file; defaults to `entigen.toml` next to the schema.
    #[arg(long, global = true, env = "ENTIGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

///
/// Command
///

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate the schema and report synthesis diagnostics.
    Check {
        schema: PathBuf,

        /// Treat warnings as errors.
        #[arg(long)]
        deny_warnings: bool,
    },

    /// Synthesize entities and write the generated source.
    Generate {
        schema: PathBuf,

        /// Output file, or directory when writing one file per entity.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Only this entity.
        #[arg(short, long)]
        entity: Option<String>,

        /// Print to stdout instead of writing files.
        #[arg(long, conflicts_with = "out")]
        stdout: bool,
    },

    /// Print resolved plans as JSON.
    Plan {
        schema: PathBuf,

        #[arg(short, long)]
        entity: Option<String>,
    },

    /// Print the archetype of one entity, one kind per line.
    Archetype { schema: PathBuf, entity: String },
}

impl Command {
    pub const fn schema(&self) -> &PathBuf {
        match self {
            Self::Check { schema, .. }
            | Self::Generate { schema, .. }
            | Self::Plan { schema, .. }
            | Self::Archetype { schema, .. } => schema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_generate() {
        let cli = Cli::try_parse_from([
            "entigen",
            "-vv",
            "generate",
            "schema.toml",
            "--out",
            "src/generated.rs",
            "--entity",
            "game::Player",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Command::Generate {
            schema, out, entity, ..
        } = cli.command
        else {
            panic!("expected generate");
        };
        assert_eq!(schema, PathBuf::from("schema.toml"));
        assert_eq!(out, Some(PathBuf::from("src/generated.rs")));
        assert_eq!(entity.as_deref(), Some("game::Player"));
    }

    #[test]
    fn stdout_conflicts_with_out() {
        let result = Cli::try_parse_from([
            "entigen",
            "generate",
            "schema.toml",
            "--out",
            "a.rs",
            "--stdout",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn archetype_takes_positional_entity() {
        let cli = Cli::try_parse_from(["entigen", "archetype", "s.json", "game::Npc"]).unwrap();

        assert_eq!(cli.command.schema(), &PathBuf::from("s.json"));
        assert!(matches!(cli.command, Command::Archetype { entity, .. } if entity == "game::Npc"));
    }
}
