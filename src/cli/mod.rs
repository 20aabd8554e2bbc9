//! CLI module for Retain.
//!
//! Commands:
//! - analyze: run a pass and list what is retained
//! - explain: show the retention chain of a type or member

pub mod analyze;
pub mod explain;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::RetainConfig;
use crate::model::{Entity, Program};

#[derive(Parser)]
#[command(name = "retain")]
#[command(about = "Retain - retained-code analysis for the mobile cross-compiler", long_about = None)]
pub struct Cli {
    /// Config file (default: retain.toml next to the program)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory of foreign class descriptions (overrides config)
    #[arg(long, global = true)]
    pub classes: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the reachable set and list reachable types
    Analyze {
        /// Program graph (JSON)
        program: PathBuf,

        /// Root entity, `Namespace.Type` or `Namespace.Type::member` (repeatable)
        #[arg(short, long)]
        root: Vec<String>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Explain why an entity is retained
    Explain {
        /// Program graph (JSON)
        program: PathBuf,

        /// Entity to explain, `Namespace.Type` or `Namespace.Type::member`
        name: String,

        /// Root entity (repeatable)
        #[arg(short, long)]
        root: Vec<String>,
    },
}

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            program,
            root,
            json,
        } => {
            let session = Session::open(&program, cli.config.as_deref(), cli.classes.as_deref())?;
            analyze::analyze(&session, &root, json)
        }
        Commands::Explain {
            program,
            name,
            root,
        } => {
            let session = Session::open(&program, cli.config.as_deref(), cli.classes.as_deref())?;
            explain::explain(&session, &name, &root)
        }
    }
}

/// Program and settings shared by every command.
pub struct Session {
    pub program: Program,
    pub config: RetainConfig,
    /// Directory the foreign class path is relative to.
    pub base_dir: PathBuf,
}

impl Session {
    pub fn open(program_path: &Path, config: Option<&Path>, classes: Option<&Path>) -> Result<Self> {
        let program = Program::load(program_path)
            .with_context(|| format!("Failed to load program {}", program_path.display()))?;

        let program_dir = program_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let config_path = config
            .map(Path::to_path_buf)
            .unwrap_or_else(|| program_dir.join("retain.toml"));
        let mut config = RetainConfig::load(&config_path)?;
        let mut base_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        if let Some(classes) = classes {
            config.foreign.class_path = classes.to_string_lossy().to_string();
            base_dir = PathBuf::new();
        }

        Ok(Self {
            program,
            config,
            base_dir,
        })
    }

    /// Named roots, or the program's entry points when none are named.
    pub fn roots(&self, names: &[String]) -> Result<Vec<Entity>> {
        if !names.is_empty() {
            return Ok(crate::resolve_roots(&self.program, names)?);
        }
        let entry_points = self.program.entry_points().to_vec();
        if entry_points.is_empty() {
            bail!("No roots given and the program declares no entry points");
        }
        Ok(entry_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reach::fixtures::Fixture;
    use tempfile::tempdir;

    fn write_program(dir: &Path) -> PathBuf {
        let path = dir.join("app.json");
        std::fs::write(&path, Fixture::new().program.to_json()).unwrap();
        path
    }

    #[test]
    fn test_session_uses_config_next_to_program() {
        let dir = tempdir().unwrap();
        let program = write_program(dir.path());
        std::fs::write(dir.path().join("retain.toml"), "[include]\npolicy = \"all\"\n").unwrap();

        let session = Session::open(&program, None, None).unwrap();
        assert_eq!(session.config.include.policy, crate::VisibilityPolicy::All);
        assert_eq!(session.base_dir, dir.path());
    }

    #[test]
    fn test_classes_flag_overrides_config() {
        let dir = tempdir().unwrap();
        let program = write_program(dir.path());
        let session = Session::open(&program, None, Some(Path::new("/opt/classes"))).unwrap();
        assert_eq!(session.config.foreign.class_path, "/opt/classes");
    }

    #[test]
    fn test_roots_fall_back_to_entry_points() {
        let dir = tempdir().unwrap();
        let program = write_program(dir.path());
        let session = Session::open(&program, None, None).unwrap();

        let fx = Fixture::new();
        assert_eq!(session.roots(&[]).unwrap(), vec![Entity::Method(fx.main)]);
        assert!(session.roots(&["Nope.Nothing".to_string()]).is_err());
    }

    #[test]
    fn test_missing_program_is_error() {
        let dir = tempdir().unwrap();
        assert!(Session::open(&dir.path().join("none.json"), None, None).is_err());
    }

    #[test]
    fn test_cli_parses_analyze() {
        let cli = Cli::parse_from([
            "retain", "analyze", "app.json", "--root", "App.Widget", "--json", "--classes", "jars",
        ]);
        assert_eq!(cli.classes, Some(PathBuf::from("jars")));
        match cli.command {
            Commands::Analyze { root, json, .. } => {
                assert_eq!(root, vec!["App.Widget".to_string()]);
                assert!(json);
            }
            _ => panic!("expected analyze"),
        }
    }
}
