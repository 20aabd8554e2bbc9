//
//  report.rs
//  Retain
//
//  Created by hak (tharun)
//

use serde::Serialize;

use crate::model::{Entity, Program, ProgramStats};
use crate::reach::{Diagnostic, ReachStats, Reachable};

/// Serializable summary of a pass, with entities rendered by name.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub program: ProgramStats,
    pub reachable_entities: usize,
    pub reachable_types: Vec<String>,
    pub foreign_classes: Vec<String>,
    pub used_in_nullable: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ReachStats,
}

impl Report {
    pub fn new(program: &Program, reachable: &Reachable) -> Self {
        Self {
            program: program.stats(),
            reachable_entities: reachable.len(),
            reachable_types: reachable
                .reachable_types
                .iter()
                .map(|t| program.full_name(*t))
                .collect(),
            foreign_classes: reachable
                .foreign_classes
                .iter()
                .map(|(_, name)| name.clone())
                .collect(),
            used_in_nullable: reachable
                .used_in_nullable
                .iter()
                .map(|t| program.full_name(*t))
                .collect(),
            diagnostics: reachable.diagnostics.clone(),
            stats: reachable.stats.clone(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Retention chain of one entity, rendered by name.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub entity: String,
    /// Root first, the entity last. Empty when the entity is not reachable.
    pub chain: Vec<String>,
}

impl Explanation {
    pub fn new(program: &Program, reachable: &Reachable, entity: Entity) -> Self {
        let chain = reachable
            .explain(entity)
            .unwrap_or_default()
            .into_iter()
            .map(|e| program.describe(e))
            .collect();
        Self {
            entity: program.describe(entity),
            chain,
        }
    }

    pub fn is_reachable(&self) -> bool {
        !self.chain.is_empty()
    }
}
