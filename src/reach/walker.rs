//
//  walker.rs
//  Retain
//
//  Created by hak (tharun)
//

use tracing::debug;

use super::context::ReachableContext;
use super::helpers::*;
use super::Step;
use crate::error::Result;
use crate::model::*;

/// Ordered dependency list built by one expansion rule.
#[derive(Debug, Default)]
pub(crate) struct Steps(Vec<Step>);

impl Steps {
    pub(crate) fn entity(&mut self, entity: Entity) {
        self.0.push(Step::Mark(entity));
    }

    pub(crate) fn ty(&mut self, id: TypeId) {
        self.entity(Entity::Type(id));
    }

    pub(crate) fn ty_opt(&mut self, id: Option<TypeId>) {
        if let Some(id) = id {
            self.ty(id);
        }
    }

    pub(crate) fn method(&mut self, id: MethodId) {
        self.entity(Entity::Method(id));
    }

    pub(crate) fn method_opt(&mut self, id: Option<MethodId>) {
        if let Some(id) = id {
            self.method(id);
        }
    }

    pub(crate) fn methods(&mut self, ids: impl IntoIterator<Item = MethodId>) {
        for id in ids {
            self.method(id);
        }
    }

    pub(crate) fn push(&mut self, step: Step) {
        self.0.push(step);
    }

    pub(crate) fn extend(&mut self, steps: Vec<Step>) {
        self.0.extend(steps);
    }
}

const SYSTEM_TYPE: &str = "System.Type";

impl<'p> ReachableContext<'p> {
    /// Apply the expansion rule of `entity`'s kind.
    pub(crate) fn expand(&mut self, entity: Entity) -> Result<Vec<Step>> {
        let mut steps = Steps::default();
        match entity {
            Entity::Type(id) => self.expand_type(id, &mut steps)?,
            Entity::Method(id) => self.expand_method(id, &mut steps)?,
            Entity::Field(id) => self.expand_field(id, &mut steps),
            Entity::Property(id) => self.expand_property(id, &mut steps),
            Entity::Event(id) => self.expand_event(id, &mut steps),
            Entity::Parameter(id) => self.expand_parameter(id, &mut steps),
            Entity::GenericParameter(id) => self.expand_generic_parameter(id, &mut steps),
            Entity::Attribute(id) => self.expand_attribute(id, &mut steps),
            Entity::ForeignClass(id) => self.expand_foreign_class(id, &mut steps),
            // Owner precedence already marked the class.
            Entity::ForeignField(..) | Entity::ForeignMethod(..) => {}
        }
        Ok(steps.0)
    }

    // ─── Types ──────────────────────────────────────────────────

    fn expand_type(&mut self, id: TypeId, steps: &mut Steps) -> Result<()> {
        let program = self.program;
        match program.type_node(id) {
            Some(TypeNode::Definition(def)) => self.expand_type_def(id, def, steps)?,
            Some(TypeNode::Specification(spec)) => self.expand_type_spec(spec, steps),
            Some(TypeNode::GenericParameter(gp)) => steps.entity(Entity::GenericParameter(*gp)),
            Some(TypeNode::Reference(_)) => steps.ty_opt(program.resolve_type(id)),
            None => {}
        }
        Ok(())
    }

    fn expand_type_def(&mut self, id: TypeId, def: &'p TypeDef, steps: &mut Steps) -> Result<()> {
        let program = self.program;
        self.generic_steps(GenericOwner::Type(id), &def.generic_parameters, steps)?;

        steps.ty_opt(def.base_type);
        steps.ty_opt(def.declaring_type);
        for &interface in &def.interfaces {
            steps.ty(interface);
        }

        if program.is_attribute(id) {
            for name in [ATTRIBUTE, ATTRIBUTES, ANNOTATION_TYPE] {
                steps.ty(self.helper(name)?);
            }
        } else if program.is_enum(id) {
            for name in ["UnboxInteger", "UnboxLong"] {
                steps.methods(self.helper_methods(BOXING, name)?);
            }
        }

        steps.method_opt(program.default_ctor(id));
        steps.method_opt(program.class_ctor(id));

        for &event in &def.events {
            if self.include(Member::Event(event)) {
                steps.entity(Entity::Event(event));
            }
        }
        for &field in &def.fields {
            if self.include(Member::Field(field)) {
                steps.entity(Entity::Field(field));
            }
        }
        for &method in &def.methods {
            if self.include(Member::Method(method)) {
                steps.method(method);
            }
        }
        for &property in &def.properties {
            if self.include(Member::Property(property)) {
                steps.entity(Entity::Property(property));
            }
        }

        steps.extend(self.attribute_steps(&def.attributes));

        if let Some(class_name) = &def.foreign_import {
            match self.try_load_class(class_name) {
                Some(class) => steps.entity(Entity::ForeignClass(class)),
                None => debug!(class = %class_name, "Imported foreign class not found"),
            }
        }

        // Dispatch on the target needs every method of an imported interface.
        if def.is_interface() && def.flags.imported_interface {
            steps.methods(def.methods.iter().copied());
        }
        Ok(())
    }

    fn expand_type_spec(&mut self, spec: &'p TypeSpec, steps: &mut Steps) {
        let program = self.program;
        steps.ty_opt(spec.element());
        match spec {
            TypeSpec::GenericInstance { element, arguments } => {
                if program.is_nullable(*element) {
                    if let Some(wrapped) = arguments.first().and_then(|a| program.resolve_type(*a)) {
                        self.used_in_nullable.insert(wrapped);
                    }
                }
                for &argument in arguments {
                    steps.ty(argument);
                }
            }
            TypeSpec::FunctionPointer { return_type, .. } => steps.ty(*return_type),
            TypeSpec::RequiredModifier { modifier, .. }
            | TypeSpec::OptionalModifier { modifier, .. } => steps.ty(*modifier),
            TypeSpec::Array { .. } | TypeSpec::ByReference { .. } | TypeSpec::Pointer { .. } => {}
        }
    }

    /// Generic declarations pull in the generics support helpers.
    fn generic_steps(
        &mut self,
        owner: GenericOwner,
        parameters: &[GenericParamId],
        steps: &mut Steps,
    ) -> Result<()> {
        if parameters.is_empty() {
            return Ok(());
        }
        let program = self.program;
        steps.ty(self.helper(TYPE_HELPER)?);
        match owner {
            GenericOwner::Type(t) => {
                if !program.type_def(t).is_some_and(TypeDef::is_static) {
                    steps.ty(self.helper(GENERIC_INSTANCE_ANNOTATION)?);
                    steps.ty(self.helper(GENERIC_TYPE_PARAMETER_ANNOTATION)?);
                }
            }
            GenericOwner::Method(_) => {
                steps.ty(self.helper(GENERIC_METHOD_PARAMETER_ANNOTATION)?);
            }
        }
        for &gp in parameters {
            steps.entity(Entity::GenericParameter(gp));
        }
        Ok(())
    }

    fn expand_generic_parameter(&mut self, id: GenericParamId, steps: &mut Steps) {
        let Some(gp) = self.program.generic_param(id) else {
            return;
        };
        for &constraint in &gp.constraints {
            steps.ty(constraint);
        }
        steps.extend(self.attribute_steps(&gp.attributes));
    }

    // ─── Members ────────────────────────────────────────────────

    fn expand_method(&mut self, id: MethodId, steps: &mut Steps) -> Result<()> {
        let program = self.program;
        match program.method(id) {
            Some(MethodNode::Definition(def)) => {
                steps.ty(def.return_type);
                for &param in &def.parameters {
                    steps.entity(Entity::Parameter(param));
                }
                self.generic_steps(GenericOwner::Method(id), &def.generic_parameters, steps)?;
                if let Some(body) = &def.body {
                    self.body_steps(body, steps)?;
                }
                steps.methods(def.overrides.iter().copied());
                if def.flags.is_virtual {
                    steps.push(Step::MarkBaseIfDeclaringReachable(id));
                }
                steps.extend(self.attribute_steps(&def.attributes));
                if let Some(import) = &def.import {
                    self.bridge_method(Entity::Method(id), import, steps);
                }
                self.accessor_owner_steps(id, def, steps);
            }
            Some(MethodNode::Instance(inst)) => {
                steps.method(inst.element);
                for &argument in &inst.arguments {
                    steps.ty(argument);
                }
            }
            Some(MethodNode::Reference(r)) => {
                steps.ty(r.return_type);
                for &param in &r.parameter_types {
                    steps.ty(param);
                }
                steps.method_opt(program.resolve_method(id));
            }
            None => {}
        }
        Ok(())
    }

    /// An accessor keeps its property or event. The reverse never holds.
    fn accessor_owner_steps(&self, id: MethodId, def: &MethodDef, steps: &mut Steps) {
        let program = self.program;
        let Some(owner) = program.type_def(def.declaring_type) else {
            return;
        };
        match def.semantics {
            Semantics::None => {}
            Semantics::Getter | Semantics::Setter => {
                let property = owner.properties.iter().copied().find(|&p| {
                    program
                        .property(p)
                        .is_some_and(|d| d.getter == Some(id) || d.setter == Some(id))
                });
                if let Some(property) = property {
                    steps.entity(Entity::Property(property));
                }
            }
            Semantics::AddOn | Semantics::RemoveOn | Semantics::Fire => {
                let event = owner.events.iter().copied().find(|&e| {
                    program.event(e).is_some_and(|d| {
                        d.add == Some(id) || d.remove == Some(id) || d.invoke == Some(id)
                    })
                });
                if let Some(event) = event {
                    steps.entity(Entity::Event(event));
                }
            }
        }
    }

    fn expand_field(&mut self, id: FieldId, steps: &mut Steps) {
        let program = self.program;
        match program.field(id) {
            Some(FieldNode::Definition(def)) => {
                steps.ty(def.field_type);
                steps.extend(self.attribute_steps(&def.attributes));
                if let Some(import) = &def.import {
                    self.bridge_field(Entity::Field(id), import, steps);
                }
            }
            Some(FieldNode::Reference(r)) => {
                steps.ty(r.field_type);
                if let Some(def) = program.resolve_field(id) {
                    steps.entity(Entity::Field(def));
                }
            }
            None => {}
        }
    }

    fn expand_property(&mut self, id: PropertyId, steps: &mut Steps) {
        let Some(def) = self.program.property(id) else {
            return;
        };
        steps.ty(def.property_type);
        for &param in &def.parameters {
            steps.entity(Entity::Parameter(param));
        }
        steps.extend(self.attribute_steps(&def.attributes));
    }

    fn expand_event(&mut self, id: EventId, steps: &mut Steps) {
        let Some(def) = self.program.event(id) else {
            return;
        };
        steps.ty(def.event_type);
        steps.extend(self.attribute_steps(&def.attributes));
    }

    fn expand_parameter(&mut self, id: ParamId, steps: &mut Steps) {
        let Some(param) = self.program.param(id) else {
            return;
        };
        steps.ty(param.parameter_type);
        steps.extend(self.attribute_steps(&param.attributes));
    }

    // ─── Attributes ─────────────────────────────────────────────

    /// Steps for an attribute list, skipping compiler-only attribute types.
    pub(crate) fn attribute_steps(&self, attributes: &[AttributeId]) -> Vec<Step> {
        attributes
            .iter()
            .filter(|&&a| !self.is_compiler_only(a))
            .map(|&a| Step::Mark(Entity::Attribute(a)))
            .collect()
    }

    fn is_compiler_only(&self, id: AttributeId) -> bool {
        let program = self.program;
        program
            .attribute(id)
            .and_then(|attr| program.method_declaring_type(attr.constructor))
            .and_then(|t| program.resolve_type(t))
            .and_then(|t| program.type_def(t))
            .is_some_and(|def| def.flags.compiler_only)
    }

    fn expand_attribute(&mut self, id: AttributeId, steps: &mut Steps) {
        let program = self.program;
        let Some(attr) = program.attribute(id) else {
            return;
        };
        steps.method(attr.constructor);

        if let Some((_, parameters)) = program.method_signature(attr.constructor) {
            for (param, argument) in parameters.iter().zip(&attr.arguments) {
                if is_type_valued(&program.full_name(*param)) {
                    type_values(&argument.value, steps);
                }
            }
        }

        let declaring = program
            .method_declaring_type(attr.constructor)
            .and_then(|t| program.resolve_type(t));
        let hierarchy: Vec<TypeId> = declaring
            .map(|d| std::iter::once(d).chain(program.base_types(d)).collect())
            .unwrap_or_default();

        for named in &attr.fields {
            steps.ty(named.argument.value_type);
            for def in hierarchy.iter().filter_map(|t| program.type_def(*t)) {
                for &field in &def.fields {
                    if program.field_def(field).is_some_and(|f| f.name == named.name) {
                        steps.entity(Entity::Field(field));
                    }
                }
            }
            if is_type_valued(&program.full_name(named.argument.value_type)) {
                type_values(&named.argument.value, steps);
            }
        }

        for named in &attr.properties {
            steps.ty(named.argument.value_type);
            for def in hierarchy.iter().filter_map(|t| program.type_def(*t)) {
                for &property in &def.properties {
                    if program.property(property).is_some_and(|p| p.name == named.name) {
                        steps.entity(Entity::Property(property));
                    }
                }
            }
            if is_type_valued(&program.full_name(named.argument.value_type)) {
                type_values(&named.argument.value, steps);
            }
        }
    }
}

fn is_type_valued(declared: &str) -> bool {
    declared == SYSTEM_TYPE || declared.strip_suffix("[]") == Some(SYSTEM_TYPE)
}

fn type_values(value: &ArgumentValue, steps: &mut Steps) {
    match value {
        ArgumentValue::Type(t) => steps.ty(*t),
        ArgumentValue::Array(items) => {
            for item in items {
                type_values(item, steps);
            }
        }
        _ => {}
    }
}
