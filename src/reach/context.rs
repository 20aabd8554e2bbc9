//
//  context.rs
//  Retain
//
//  Created by hak (tharun)
//

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use tracing::{debug, info};

use super::helpers::HelperNamespace;
use super::include::{Include, VisibilityPolicy};
use super::retention::Retention;
use super::{Diagnostic, ReachStats, Reachable, Step, TraversalStrategy};
use crate::config::RetainConfig;
use crate::error::Result;
use crate::foreign::{ClassRepository, DirectoryLoader};
use crate::model::*;

/// All mutable state of one reachability pass.
///
/// The program is only borrowed; flags, caches and the reached-type record
/// live here and are dropped (or handed out by [`finish`](Self::finish))
/// when the pass ends.
pub struct ReachableContext<'p> {
    pub(crate) program: &'p Program,
    include: Box<dyn Include + 'p>,
    pub(crate) repository: ClassRepository,
    pub(crate) helpers: HelperNamespace,
    strategy: TraversalStrategy,
    reached: HashSet<Entity>,
    order: Vec<Entity>,
    reachable_types: Vec<TypeId>,
    foreign_classes: Vec<ClassId>,
    pub(crate) used_in_nullable: BTreeSet<TypeId>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    stats: ReachStats,
    retention: Option<Retention>,
}

/// A frame of the explicit worklist.
enum Frame {
    /// Entity waiting to be marked; re-examined until its owner is reachable.
    Pending { target: Entity, from: Option<Entity> },
    /// Steps of an expanded entity, consumed in order.
    Expand {
        entity: Entity,
        steps: Vec<Step>,
        next: usize,
    },
}

impl<'p> ReachableContext<'p> {
    /// A context with the default policy: visible members, no foreign
    /// classes, the default helper namespace, worklist traversal.
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            include: Box::new(VisibilityPolicy::default()),
            repository: ClassRepository::empty(),
            helpers: HelperNamespace::default(),
            strategy: TraversalStrategy::default(),
            reached: HashSet::new(),
            order: Vec::new(),
            reachable_types: Vec::new(),
            foreign_classes: Vec::new(),
            used_in_nullable: BTreeSet::new(),
            diagnostics: Vec::new(),
            stats: ReachStats::default(),
            retention: Some(Retention::new()),
        }
    }

    /// A context set up from config. The foreign class path is resolved
    /// against `base_dir`.
    pub fn configured(program: &'p Program, config: &RetainConfig, base_dir: &Path) -> Self {
        let class_path = base_dir.join(&config.foreign.class_path);
        Self::new(program)
            .with_include(config.include.policy)
            .with_repository(ClassRepository::new(DirectoryLoader::new(class_path)))
            .with_helper_namespace(HelperNamespace::new(config.helpers.namespace.clone()))
            .with_strategy(config.walk.strategy)
            .with_retention(config.walk.record_retention)
    }

    pub fn with_include(mut self, include: impl Include + 'p) -> Self {
        self.include = Box::new(include);
        self
    }

    pub fn with_repository(mut self, repository: ClassRepository) -> Self {
        self.repository = repository;
        self
    }

    pub fn with_helper_namespace(mut self, helpers: HelperNamespace) -> Self {
        self.helpers = helpers;
        self
    }

    pub fn with_strategy(mut self, strategy: TraversalStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_retention(mut self, record: bool) -> Self {
        self.retention = record.then(Retention::new);
        self
    }

    // ─── Queries ────────────────────────────────────────────────

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn is_reachable(&self, entity: Entity) -> bool {
        self.reached.contains(&entity)
    }

    /// Reachable type definitions in first-reached order.
    pub fn reachable_types(&self) -> &[TypeId] {
        &self.reachable_types
    }

    pub fn is_used_in_nullable(&self, ty: TypeId) -> bool {
        self.used_in_nullable.contains(&ty)
    }

    pub fn stats(&self) -> &ReachStats {
        &self.stats
    }

    /// Ask the inclusion predicate about a member.
    pub fn include(&self, member: Member) -> bool {
        self.include.include(self.program, member)
    }

    /// Best-effort foreign class lookup.
    pub fn try_load_class(&mut self, name: &str) -> Option<ClassId> {
        self.repository.try_load(name)
    }

    /// Helper type from the support namespace. A miss is fatal.
    pub fn helper(&mut self, name: &str) -> Result<TypeId> {
        self.helpers.type_id(self.program, name)
    }

    /// Helper methods called `method` on helper type `type_name`. A miss is fatal.
    pub fn helper_methods(&mut self, type_name: &str, method: &str) -> Result<Vec<MethodId>> {
        self.helpers.methods_named(self.program, type_name, method)
    }

    // ─── Marking ────────────────────────────────────────────────

    /// Mark an entity and everything it depends on. Marking twice is a no-op,
    /// as is marking `None`.
    pub fn mark_reachable(&mut self, entity: impl Into<Option<Entity>>) -> Result<()> {
        let Some(entity) = entity.into() else {
            return Ok(());
        };
        match self.strategy {
            TraversalStrategy::Recursive => self.mark_recursive(entity, None),
            TraversalStrategy::Worklist => self.mark_worklist(entity, None),
        }
    }

    /// Seed the pass with externally chosen roots.
    pub fn mark_roots(&mut self, roots: &[Entity]) -> Result<()> {
        debug!(roots = roots.len(), strategy = ?self.strategy, "Marking roots");
        for &root in roots {
            if !self.is_reachable(root) {
                self.stats.roots += 1;
            }
            self.mark_reachable(root)?;
        }
        Ok(())
    }

    /// Walk assembly and module level attributes.
    pub fn walk_program_attributes(&mut self) -> Result<()> {
        let steps = self.attribute_steps(self.program.program_attributes());
        for step in steps {
            if let Some(target) = self.resolve_step(step) {
                self.mark_reachable(target)?;
            }
        }
        Ok(())
    }

    /// End the pass and hand out the result.
    pub fn finish(self) -> Reachable {
        let mut stats = self.stats;
        stats.foreign_classes_loaded = self.repository.len();
        info!(
            entities = self.order.len(),
            types = self.reachable_types.len(),
            foreign_classes = self.foreign_classes.len(),
            diagnostics = self.diagnostics.len(),
            "Reachability pass complete"
        );
        let foreign_classes = self
            .foreign_classes
            .iter()
            .map(|&id| {
                let name = self
                    .repository
                    .class(id)
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                (id, name)
            })
            .collect();
        Reachable {
            reachable_types: self.reachable_types,
            order: self.order,
            foreign_classes,
            used_in_nullable: self.used_in_nullable,
            diagnostics: self.diagnostics,
            stats,
            retention: self.retention,
            reached: self.reached,
        }
    }

    // ─── Drivers ────────────────────────────────────────────────

    fn mark_recursive(&mut self, entity: Entity, from: Option<Entity>) -> Result<()> {
        if self.is_reachable(entity) {
            return Ok(());
        }
        if let Some(owner) = self.unreached_owner(entity) {
            self.mark_recursive(owner, from)?;
            if self.is_reachable(entity) {
                return Ok(());
            }
        }
        self.reach(entity, from);
        for step in self.expand(entity)? {
            if let Some(target) = self.resolve_step(step) {
                self.mark_recursive(target, Some(entity))?;
            }
        }
        Ok(())
    }

    /// Same visiting order as [`mark_recursive`](Self::mark_recursive), with
    /// the call stack made explicit.
    fn mark_worklist(&mut self, entity: Entity, from: Option<Entity>) -> Result<()> {
        let mut stack = vec![Frame::Pending {
            target: entity,
            from,
        }];
        while let Some(frame) = stack.last_mut() {
            match frame {
                Frame::Pending { target, from } => {
                    let (target, from) = (*target, *from);
                    if self.is_reachable(target) {
                        stack.pop();
                        continue;
                    }
                    if let Some(owner) = self.unreached_owner(target) {
                        stack.push(Frame::Pending {
                            target: owner,
                            from,
                        });
                        continue;
                    }
                    stack.pop();
                    self.reach(target, from);
                    let steps = self.expand(target)?;
                    stack.push(Frame::Expand {
                        entity: target,
                        steps,
                        next: 0,
                    });
                }
                Frame::Expand {
                    entity,
                    steps,
                    next,
                } => {
                    let Some(&step) = steps.get(*next) else {
                        stack.pop();
                        continue;
                    };
                    *next += 1;
                    let entity = *entity;
                    if let Some(target) = self.resolve_step(step) {
                        stack.push(Frame::Pending {
                            target,
                            from: Some(entity),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn unreached_owner(&self, entity: Entity) -> Option<Entity> {
        self.program
            .owner_of(entity)
            .filter(|owner| !self.is_reachable(*owner))
    }

    /// Evaluate a step against the current state.
    pub(crate) fn resolve_step(&self, step: Step) -> Option<Entity> {
        match step {
            Step::Mark(entity) => Some(entity),
            Step::MarkBaseIfDeclaringReachable(method) => {
                let base = self.program.base_method(method)?;
                let declaring = self.program.method_declaring_type(base)?;
                self.is_reachable(Entity::Type(declaring))
                    .then_some(Entity::Method(base))
            }
        }
    }

    /// Set the flag and record first-reach bookkeeping.
    fn reach(&mut self, entity: Entity, from: Option<Entity>) {
        self.reached.insert(entity);
        self.order.push(entity);
        match entity {
            Entity::Type(t) if self.program.type_def(t).is_some() => self.reachable_types.push(t),
            Entity::ForeignClass(c) => self.foreign_classes.push(c),
            _ => {}
        }
        *self.stats.expansions.entry(entity.kind()).or_default() += 1;
        if let Some(retention) = self.retention.as_mut() {
            retention.record(from, entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reach::fixtures::Fixture;

    #[test]
    fn test_mark_is_idempotent() {
        let fx = Fixture::new();
        let mut ctx = ReachableContext::new(&fx.program);
        ctx.mark_reachable(Entity::Type(fx.widget)).unwrap();
        let first = ctx.stats().total_expansions();
        let order = ctx.reachable_types().to_vec();

        ctx.mark_reachable(Entity::Type(fx.widget)).unwrap();
        ctx.mark_reachable(None).unwrap();
        assert_eq!(ctx.stats().total_expansions(), first);
        assert_eq!(ctx.reachable_types(), order.as_slice());
    }

    #[test]
    fn test_each_entity_expanded_once() {
        let fx = Fixture::new();
        let mut ctx = ReachableContext::new(&fx.program).with_include(VisibilityPolicy::All);
        ctx.mark_roots(&[Entity::Type(fx.widget), Entity::Method(fx.widget_show)])
            .unwrap();
        let reachable = ctx.finish();

        assert_eq!(reachable.stats.total_expansions(), reachable.len());
        assert_eq!(reachable.order.len(), reachable.len());
        assert_eq!(reachable.stats.roots, 1);
    }

    #[test]
    fn test_flags_are_monotonic() {
        let fx = Fixture::new();
        let mut ctx = ReachableContext::new(&fx.program);
        ctx.mark_reachable(Entity::Method(fx.widget_show)).unwrap();
        let before: Vec<Entity> = fx.all_entities().filter(|e| ctx.is_reachable(*e)).collect();

        ctx.mark_reachable(Entity::Type(fx.widget)).unwrap();
        for entity in before {
            assert!(ctx.is_reachable(entity), "{} lost its flag", entity);
        }
    }

    #[test]
    fn test_owner_marked_before_member() {
        let fx = Fixture::new();
        for strategy in [TraversalStrategy::Worklist, TraversalStrategy::Recursive] {
            let mut ctx = ReachableContext::new(&fx.program).with_strategy(strategy);
            ctx.mark_reachable(Entity::Method(fx.widget_show)).unwrap();
            let reachable = ctx.finish();

            let position = |e: Entity| reachable.order.iter().position(|x| *x == e);
            let ty = position(Entity::Type(fx.widget)).unwrap();
            let method = position(Entity::Method(fx.widget_show)).unwrap();
            assert!(ty < method, "{:?}: type reached after its member", strategy);
            for &entity in &reachable.order {
                if let Some(owner) = fx.program.owner_of(entity) {
                    assert!(position(owner).unwrap() < position(entity).unwrap());
                }
            }
        }
    }

    #[test]
    fn test_strategies_agree_on_order() {
        let fx = Fixture::new();
        let run = |strategy| {
            let mut ctx = ReachableContext::new(&fx.program)
                .with_strategy(strategy)
                .with_include(VisibilityPolicy::All);
            ctx.mark_roots(&[Entity::Method(fx.main)]).unwrap();
            ctx.walk_program_attributes().unwrap();
            ctx.finish()
        };
        let worklist = run(TraversalStrategy::Worklist);
        let recursive = run(TraversalStrategy::Recursive);

        assert!(worklist.reachable_types.len() > 3);
        assert_eq!(worklist.reachable_types, recursive.reachable_types);
        assert_eq!(worklist.order, recursive.order);
        assert_eq!(worklist.stats, recursive.stats);
    }

    #[test]
    fn test_retention_can_be_disabled() {
        let fx = Fixture::new();
        let mut ctx = ReachableContext::new(&fx.program).with_retention(false);
        ctx.mark_reachable(Entity::Type(fx.widget)).unwrap();
        let reachable = ctx.finish();
        assert!(reachable.retention.is_none());
        assert!(reachable.explain(Entity::Type(fx.widget)).is_none());
    }

    #[test]
    fn test_explain_starts_at_root() {
        let fx = Fixture::new();
        let mut ctx = ReachableContext::new(&fx.program);
        ctx.mark_reachable(Entity::Method(fx.main)).unwrap();
        let reachable = ctx.finish();

        let chain = reachable.explain(Entity::Method(fx.widget_show)).unwrap();
        assert_eq!(chain.last(), Some(&Entity::Method(fx.widget_show)));
        let root = chain[0];
        assert!(reachable.retention.as_ref().unwrap().roots().contains(&root));
    }

    #[test]
    fn test_deep_chain_with_worklist() {
        let mut fx = Fixture::new();
        let mut last = fx.object;
        for i in 0..2_000 {
            let mut def = TypeDef::new("Deep", format!("T{}", i));
            def.base_type = Some(last);
            last = fx.program.add_type(def);
        }
        let mut ctx = ReachableContext::new(&fx.program).with_strategy(TraversalStrategy::Worklist);
        ctx.mark_reachable(Entity::Type(last)).unwrap();
        assert!(ctx.reachable_types().len() > 2_000);
    }
}
