//! Explain command: print the chain from a root to an entity.

use anyhow::{bail, Result};

use super::Session;
use crate::report::Explanation;

pub fn explain(session: &Session, name: &str, roots: &[String]) -> Result<()> {
    let targets = session.program.lookup(name);
    if targets.is_empty() {
        bail!("No type or member named '{}'", name);
    }
    let mut config = session.config.clone();
    config.walk.record_retention = true;

    let roots = session.roots(roots)?;
    let reachable = crate::analyze(&session.program, &roots, &config, &session.base_dir)?;

    for target in targets {
        let explanation = Explanation::new(&session.program, &reachable, target);
        if !explanation.is_reachable() {
            println!("{} is not reachable", explanation.entity);
            continue;
        }
        for (depth, step) in explanation.chain.iter().enumerate() {
            println!("{}{}", "  ".repeat(depth), step);
        }
    }
    Ok(())
}
