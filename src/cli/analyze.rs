//! Analyze command: run a pass and list the retained types.

use anyhow::Result;

use super::Session;
use crate::report::Report;

pub fn analyze(session: &Session, roots: &[String], json: bool) -> Result<()> {
    let roots = session.roots(roots)?;
    let reachable = crate::analyze(&session.program, &roots, &session.config, &session.base_dir)?;
    let report = Report::new(&session.program, &reachable);

    if json {
        println!("{}", report.to_json());
        return Ok(());
    }

    println!("Reachable types ({}):", report.reachable_types.len());
    for name in &report.reachable_types {
        println!("  {}", name);
    }
    if !report.foreign_classes.is_empty() {
        println!("Foreign classes ({}):", report.foreign_classes.len());
        for name in &report.foreign_classes {
            println!("  {}", name);
        }
    }
    for diagnostic in &report.diagnostics {
        println!("warning: {}", describe(diagnostic));
    }
    println!(
        "{} entities reachable from {} roots",
        report.reachable_entities, report.stats.roots
    );
    Ok(())
}

fn describe(diagnostic: &crate::reach::Diagnostic) -> String {
    match diagnostic {
        crate::reach::Diagnostic::ForeignMemberNotFound {
            class_name,
            member_name,
            descriptor,
            ..
        } => format!("{} has no member {} {}", class_name, member_name, descriptor),
    }
}
