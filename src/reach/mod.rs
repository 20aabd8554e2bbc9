//! Reachability closure over the program graph.
//!
//! A [`ReachableContext`] is seeded with root entities and walks every kind
//! specific expansion rule until nothing new is reached. Members that import
//! pre-compiled foreign classes are bridged into the [`ClassRepository`], and
//! code patterns in method bodies pull in helpers from the support namespace.
//!
//! [`ClassRepository`]: crate::foreign::ClassRepository

mod body;
mod bridge;
pub mod context;
pub mod helpers;
pub mod include;
pub mod retention;
mod walker;

#[cfg(test)]
pub(crate) mod fixtures;

pub use context::ReachableContext;
pub use helpers::HelperNamespace;
pub use include::{Include, VisibilityPolicy};
pub use retention::Retention;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::model::{ClassId, Entity, EntityKind, MethodId, TypeId};

/// How the driver schedules expansion. Both produce the same result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalStrategy {
    /// Explicit stack; depth is bounded only by memory.
    #[default]
    Worklist,
    /// Native recursion.
    Recursive,
}

/// One dependency produced by an expansion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Mark(Entity),
    /// Mark the overridden base method, but only if its declaring type is
    /// reachable by the time the driver gets here.
    MarkBaseIfDeclaringReachable(MethodId),
}

/// Non-fatal problem found during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An imported member names a foreign member its class does not have.
    ForeignMemberNotFound {
        class_name: String,
        member_name: String,
        descriptor: String,
        referenced_by: Entity,
    },
}

/// Counters for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReachStats {
    pub roots: usize,
    /// Expansion rules applied, per entity kind.
    pub expansions: BTreeMap<EntityKind, usize>,
    pub foreign_classes_loaded: usize,
}

impl ReachStats {
    pub fn total_expansions(&self) -> usize {
        self.expansions.values().sum()
    }
}

/// Result of a completed pass.
#[derive(Debug, Clone)]
pub struct Reachable {
    /// Reachable type definitions in first-reached order.
    pub reachable_types: Vec<TypeId>,
    /// Every reached entity in first-reached order.
    pub order: Vec<Entity>,
    /// Names of reached foreign classes in first-reached order.
    pub foreign_classes: Vec<(ClassId, String)>,
    /// Types used as the argument of a nullable wrapper.
    pub used_in_nullable: BTreeSet<TypeId>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ReachStats,
    pub retention: Option<Retention>,
    pub(crate) reached: HashSet<Entity>,
}

impl Reachable {
    pub fn contains(&self, entity: Entity) -> bool {
        self.reached.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.reached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reached.is_empty()
    }

    /// Why `entity` is retained: the chain from a root, if retention was recorded.
    pub fn explain(&self, entity: Entity) -> Option<Vec<Entity>> {
        self.retention.as_ref()?.explain(entity)
    }
}
