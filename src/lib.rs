//! # Retain
//!
//! Retained-code analysis for a cross-compiler that turns a managed,
//! metadata-rich object program into mobile bytecode.
//!
//! Before code generation the compiler needs the closed set of program
//! elements the output requires: everything reachable from the entry points,
//! plus the support helpers that code patterns imply (checked arithmetic,
//! boxing, generics metadata). Members that import pre-compiled foreign
//! classes are followed into the foreign class repository.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use retain::{analyze, Program, RetainConfig};
//! use std::path::Path;
//!
//! let program = Program::load(Path::new("app.json")).unwrap();
//! let roots = program.entry_points().to_vec();
//! let reachable = analyze(&program, &roots, &RetainConfig::default(), Path::new(".")).unwrap();
//!
//! for ty in &reachable.reachable_types {
//!     println!("{}", program.full_name(*ty));
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod foreign;
pub mod model;
pub mod reach;
pub mod report;

// Re-exports for convenience
pub use config::RetainConfig;
pub use error::{Result, RetainError};
pub use foreign::{ClassFile, ClassLoader, ClassRepository, DirectoryLoader, MemoryLoader};
pub use model::{Entity, Program};
pub use reach::{
    Diagnostic, Include, Reachable, ReachableContext, TraversalStrategy, VisibilityPolicy,
};
pub use report::{Explanation, Report};

use std::path::Path;
use tracing::info;

/// Run one reachability pass configured from `config`.
///
/// Roots are marked in order, then assembly and module attributes are walked.
/// `base_dir` anchors the relative foreign class path.
pub fn analyze(
    program: &Program,
    roots: &[Entity],
    config: &RetainConfig,
    base_dir: &Path,
) -> Result<Reachable> {
    let stats = program.stats();
    info!(
        types = stats.type_definitions,
        methods = stats.methods,
        roots = roots.len(),
        strategy = ?config.walk.strategy,
        "Starting reachability pass"
    );
    let mut ctx = ReachableContext::configured(program, config, base_dir);
    ctx.mark_roots(roots)?;
    ctx.walk_program_attributes()?;
    Ok(ctx.finish())
}

/// Resolve root names (`Namespace.Type` or `Namespace.Type::member`).
///
/// A member name selects every overload. Unknown names are an error.
pub fn resolve_roots(program: &Program, names: &[String]) -> Result<Vec<Entity>> {
    let mut roots = Vec::new();
    for name in names {
        let found = program.lookup(name);
        if found.is_empty() {
            return Err(RetainError::UnknownRoot(name.clone()));
        }
        roots.extend(found);
    }
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reach::fixtures::Fixture;
    use tempfile::tempdir;

    #[test]
    fn test_analyze_from_entry_points() {
        let fx = Fixture::new();
        let dir = tempdir().unwrap();
        let roots = fx.program.entry_points().to_vec();

        let reachable = analyze(&fx.program, &roots, &RetainConfig::default(), dir.path()).unwrap();
        assert!(reachable.contains(Entity::Method(fx.main)));
        assert!(reachable.contains(Entity::Method(fx.checked_add)));
        // Assembly attribute names App.Button.
        assert!(reachable.contains(Entity::Type(fx.button)));
        assert!(reachable.foreign_classes.is_empty());
    }

    #[test]
    fn test_analyze_reads_foreign_classes_from_config_dir() {
        let mut fx = Fixture::new();
        let mut activity = model::TypeDef::new("Android.App", "Activity");
        activity.foreign_import = Some("android/app/Activity".to_string());
        let activity = fx.program.add_type(activity);

        let dir = tempdir().unwrap();
        let class_dir = dir.path().join("classes/android/app");
        std::fs::create_dir_all(&class_dir).unwrap();
        std::fs::write(
            class_dir.join("Activity.json"),
            r#"{"name":"android/app/Activity"}"#,
        )
        .unwrap();

        let reachable = analyze(
            &fx.program,
            &[Entity::Type(activity)],
            &RetainConfig::default(),
            dir.path(),
        )
        .unwrap();
        assert_eq!(reachable.foreign_classes.len(), 1);
        assert_eq!(reachable.foreign_classes[0].1, "android/app/Activity");
    }

    #[test]
    fn test_resolve_roots() {
        let fx = Fixture::new();
        let roots = resolve_roots(
            &fx.program,
            &["App.Widget".to_string(), "App.Program::Main".to_string()],
        )
        .unwrap();
        assert_eq!(roots, vec![Entity::Type(fx.widget), Entity::Method(fx.main)]);

        let err = resolve_roots(&fx.program, &["App.Nowhere".to_string()]).unwrap_err();
        assert!(matches!(err, RetainError::UnknownRoot(name) if name == "App.Nowhere"));
    }
}
