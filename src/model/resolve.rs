//
//  resolve.rs
//  Retain
//
//  Created by hak (tharun)
//

use std::collections::{HashMap, HashSet};

use super::ids::*;
use super::members::*;
use super::program::Program;
use super::types::*;

const SYSTEM_ATTRIBUTE: &str = "System.Attribute";
const SYSTEM_ENUM: &str = "System.Enum";
const SYSTEM_NULLABLE: &str = "System.Nullable`1";

/// Generic parameter -> display name of the argument bound to it.
type Substitution = HashMap<GenericParamId, String>;

impl Program {
    // ─── Names ──────────────────────────────────────────────────

    /// Display name of any type node, in metadata notation.
    ///
    /// Nested definitions use `Outer/Inner`, generic instances `List`1<System.Int32>`.
    pub fn full_name(&self, id: TypeId) -> String {
        self.name_with(id, &Substitution::new(), 0)
    }

    /// Like [`full_name`](Self::full_name), with bound generic parameters
    /// replaced by their arguments.
    fn name_with(&self, id: TypeId, substitution: &Substitution, depth: usize) -> String {
        // Malformed input can contain specification cycles.
        if depth > 64 {
            return "?".to_string();
        }
        let name = |t: TypeId| self.name_with(t, substitution, depth + 1);
        match self.type_node(id) {
            Some(TypeNode::Definition(def)) => match def.declaring_type {
                Some(outer) => format!("{}/{}", name(outer), def.name),
                None if def.namespace.is_empty() => def.name.clone(),
                None => format!("{}.{}", def.namespace, def.name),
            },
            Some(TypeNode::Reference(r)) => r.full_name.clone(),
            Some(TypeNode::GenericParameter(gp)) => match substitution.get(gp) {
                Some(argument) => argument.clone(),
                None => self
                    .generic_param(*gp)
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
            },
            Some(TypeNode::Specification(spec)) => match spec {
                TypeSpec::GenericInstance { element, arguments } => {
                    let args: Vec<String> = arguments.iter().map(|a| name(*a)).collect();
                    format!("{}<{}>", name(*element), args.join(","))
                }
                TypeSpec::Array { element, rank } => {
                    let commas = ",".repeat(rank.saturating_sub(1) as usize);
                    format!("{}[{}]", name(*element), commas)
                }
                TypeSpec::ByReference { element } => format!("{}&", name(*element)),
                TypeSpec::Pointer { element } => format!("{}*", name(*element)),
                TypeSpec::FunctionPointer {
                    return_type,
                    parameters,
                } => {
                    let params: Vec<String> = parameters.iter().map(|p| name(*p)).collect();
                    format!("method {} *({})", name(*return_type), params.join(","))
                }
                TypeSpec::RequiredModifier { element, modifier } => {
                    format!("{} modreq({})", name(*element), name(*modifier))
                }
                TypeSpec::OptionalModifier { element, modifier } => {
                    format!("{} modopt({})", name(*element), name(*modifier))
                }
            },
            None => String::new(),
        }
    }

    /// Look up a type definition by full name.
    pub fn find_type(&self, full_name: &str) -> Option<TypeId> {
        self.type_index.get(full_name).copied()
    }

    pub fn method_name(&self, id: MethodId) -> Option<&str> {
        match self.method(id)? {
            MethodNode::Definition(def) => Some(&def.name),
            MethodNode::Reference(r) => Some(&r.name),
            MethodNode::Instance(inst) => self.method_name(inst.element),
        }
    }

    pub fn method_declaring_type(&self, id: MethodId) -> Option<TypeId> {
        match self.method(id)? {
            MethodNode::Definition(def) => Some(def.declaring_type),
            MethodNode::Reference(r) => Some(r.declaring_type),
            MethodNode::Instance(inst) => self.method_declaring_type(inst.element),
        }
    }

    /// Return type and parameter types of any method node.
    pub fn method_signature(&self, id: MethodId) -> Option<(TypeId, Vec<TypeId>)> {
        match self.method(id)? {
            MethodNode::Definition(def) => {
                let params = def
                    .parameters
                    .iter()
                    .filter_map(|p| self.param(*p).map(|p| p.parameter_type))
                    .collect();
                Some((def.return_type, params))
            }
            MethodNode::Reference(r) => Some((r.return_type, r.parameter_types.clone())),
            MethodNode::Instance(inst) => self.method_signature(inst.element),
        }
    }

    // ─── Resolution ─────────────────────────────────────────────

    /// Resolve a type node to the definition it denotes.
    ///
    /// Specifications resolve through their element type, as the metadata
    /// resolver does. Generic parameters and unknown references yield `None`.
    pub fn resolve_type(&self, id: TypeId) -> Option<TypeId> {
        let mut current = id;
        for _ in 0..64 {
            match self.type_node(current)? {
                TypeNode::Definition(_) => return Some(current),
                TypeNode::Reference(r) => return self.find_type(&r.full_name),
                TypeNode::GenericParameter(_) => return None,
                TypeNode::Specification(spec) => current = spec.element()?,
            }
        }
        None
    }

    /// Resolve a method node to its definition.
    pub fn resolve_method(&self, id: MethodId) -> Option<MethodId> {
        match self.method(id)? {
            MethodNode::Definition(_) => Some(id),
            MethodNode::Instance(inst) => match self.method(inst.element)? {
                MethodNode::Instance(_) => None,
                _ => self.resolve_method(inst.element),
            },
            MethodNode::Reference(r) => {
                let owner = self.type_def(self.resolve_type(r.declaring_type)?)?;
                let wanted: Vec<String> =
                    r.parameter_types.iter().map(|t| self.full_name(*t)).collect();
                owner.methods.iter().copied().find(|&m| {
                    self.method_def(m).is_some_and(|def| {
                        def.name == r.name && self.param_type_names(def) == wanted
                    })
                })
            }
        }
    }

    /// Resolve a field node to its definition.
    pub fn resolve_field(&self, id: FieldId) -> Option<FieldId> {
        match self.field(id)? {
            FieldNode::Definition(_) => Some(id),
            FieldNode::Reference(r) => {
                let owner = self.type_def(self.resolve_type(r.declaring_type)?)?;
                owner
                    .fields
                    .iter()
                    .copied()
                    .find(|&f| self.field_def(f).is_some_and(|def| def.name == r.name))
            }
        }
    }

    fn param_type_names(&self, def: &MethodDef) -> Vec<String> {
        self.param_type_names_with(def, &Substitution::new())
    }

    fn param_type_names_with(&self, def: &MethodDef, substitution: &Substitution) -> Vec<String> {
        def.parameters
            .iter()
            .filter_map(|p| self.param(*p))
            .map(|p| self.name_with(p.parameter_type, substitution, 0))
            .collect()
    }

    // ─── Type Queries ───────────────────────────────────────────

    /// Definitions of the base type chain, nearest first. Stops on cycles.
    pub fn base_types(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.type_def(id).and_then(|d| d.base_type);
        while let Some(base) = current.and_then(|b| self.resolve_type(b)) {
            if !seen.insert(base) {
                break;
            }
            chain.push(base);
            current = self.type_def(base).and_then(|d| d.base_type);
        }
        chain
    }

    /// Does the type derive from `System.Attribute`?
    pub fn is_attribute(&self, id: TypeId) -> bool {
        let Some(attribute) = self.find_type(SYSTEM_ATTRIBUTE) else {
            return false;
        };
        self.base_types(id).contains(&attribute)
    }

    pub fn is_enum(&self, id: TypeId) -> bool {
        self.type_def(id)
            .and_then(|d| d.base_type)
            .is_some_and(|b| self.full_name(b) == SYSTEM_ENUM)
    }

    /// Is `id` the open `System.Nullable<T>` type (or a reference to it)?
    pub fn is_nullable(&self, id: TypeId) -> bool {
        self.full_name(id) == SYSTEM_NULLABLE
            || self
                .resolve_type(id)
                .is_some_and(|t| self.full_name(t) == SYSTEM_NULLABLE)
    }

    /// Is `id` an array whose element is a generic parameter (`T[]`)?
    pub fn is_generic_parameter_array(&self, id: TypeId) -> bool {
        match self.type_node(id) {
            Some(TypeNode::Specification(TypeSpec::Array { element, .. })) => {
                matches!(self.type_node(*element), Some(TypeNode::GenericParameter(_)))
            }
            _ => false,
        }
    }

    /// Parameterless instance constructor.
    pub fn default_ctor(&self, id: TypeId) -> Option<MethodId> {
        let def = self.type_def(id)?;
        def.methods.iter().copied().find(|&m| {
            self.method_def(m).is_some_and(|md| {
                md.name == ".ctor" && !md.flags.is_static && md.parameters.is_empty()
            })
        })
    }

    /// Static initializer.
    pub fn class_ctor(&self, id: TypeId) -> Option<MethodId> {
        let def = self.type_def(id)?;
        def.methods.iter().copied().find(|&m| {
            self.method_def(m)
                .is_some_and(|md| md.name == ".cctor" && md.flags.is_static)
        })
    }

    /// The nearest virtual method up the base chain this method overrides.
    ///
    /// Base signatures are compared after binding the base type's generic
    /// parameters to the arguments the derived type supplies, so
    /// `Put(System.Int32)` on `IntBox : Base<System.Int32>` overrides `Base<T>::Put(T)`.
    pub fn base_method(&self, id: MethodId) -> Option<MethodId> {
        let def = self.method_def(id)?;
        if !def.flags.is_virtual {
            return None;
        }
        let signature = self.param_type_names(def);
        let mut seen = HashSet::from([def.declaring_type]);
        let mut substitution = Substitution::new();
        let mut current = self.type_def(def.declaring_type)?.base_type;
        while let Some(base_ref) = current {
            let base = self.resolve_type(base_ref)?;
            if !seen.insert(base) {
                return None;
            }
            let base_def = self.type_def(base)?;
            substitution = self.base_substitution(base_ref, base_def, &substitution);
            let found = base_def.methods.iter().copied().find(|&m| {
                self.method_def(m).is_some_and(|candidate| {
                    candidate.flags.is_virtual
                        && candidate.name == def.name
                        && self.param_type_names_with(candidate, &substitution) == signature
                })
            });
            if found.is_some() {
                return found;
            }
            current = base_def.base_type;
        }
        None
    }

    /// Bind the generic parameters of `base_def` to the arguments of the
    /// instance `base_ref` names. `outer` binds the derived type's own
    /// parameters, which may appear in those arguments.
    fn base_substitution(
        &self,
        base_ref: TypeId,
        base_def: &TypeDef,
        outer: &Substitution,
    ) -> Substitution {
        let Some(TypeNode::Specification(TypeSpec::GenericInstance { arguments, .. })) =
            self.type_node(base_ref)
        else {
            return Substitution::new();
        };
        base_def
            .generic_parameters
            .iter()
            .zip(arguments)
            .map(|(&gp, &argument)| (gp, self.name_with(argument, outer, 0)))
            .collect()
    }

    /// Owner that must be reachable no later than the entity itself.
    ///
    /// Members point at their declaring type, parameters at their method or
    /// property, generic parameters at their declarer, foreign members at their class.
    pub fn owner_of(&self, entity: Entity) -> Option<Entity> {
        match entity {
            Entity::Method(m) => match self.method(m)? {
                MethodNode::Definition(def) => Some(Entity::Type(def.declaring_type)),
                MethodNode::Reference(r) => Some(Entity::Type(r.declaring_type)),
                MethodNode::Instance(inst) => self
                    .method_declaring_type(inst.element)
                    .map(Entity::Type),
            },
            Entity::Field(f) => match self.field(f)? {
                FieldNode::Definition(def) => Some(Entity::Type(def.declaring_type)),
                FieldNode::Reference(r) => Some(Entity::Type(r.declaring_type)),
            },
            Entity::Property(p) => Some(Entity::Type(self.property(p)?.declaring_type)),
            Entity::Event(e) => Some(Entity::Type(self.event(e)?.declaring_type)),
            Entity::Parameter(p) => Some(match self.param(p)?.owner {
                ParamOwner::Method(m) => Entity::Method(m),
                ParamOwner::Property(p) => Entity::Property(p),
            }),
            Entity::GenericParameter(g) => Some(match self.generic_param(g)?.owner {
                GenericOwner::Type(t) => Entity::Type(t),
                GenericOwner::Method(m) => Entity::Method(m),
            }),
            Entity::ForeignField(class, _) | Entity::ForeignMethod(class, _) => {
                Some(Entity::ForeignClass(class))
            }
            Entity::Type(_) | Entity::Attribute(_) | Entity::ForeignClass(_) => None,
        }
    }

    /// Find entities by qualified name: `Namespace.Type` or `Namespace.Type::member`.
    ///
    /// A member name matches every overload and every member kind with that name.
    pub fn lookup(&self, qualified: &str) -> Vec<Entity> {
        let Some((type_name, member)) = qualified.split_once("::") else {
            return self
                .find_type(qualified)
                .map(|t| vec![Entity::Type(t)])
                .unwrap_or_default();
        };
        let Some(owner) = self.find_type(type_name) else {
            return Vec::new();
        };
        let Some(def) = self.type_def(owner) else {
            return Vec::new();
        };
        let methods = def
            .methods
            .iter()
            .filter(|m| self.method_name(**m) == Some(member))
            .map(|m| Entity::Method(*m));
        let fields = def
            .fields
            .iter()
            .filter(|f| self.field_def(**f).is_some_and(|d| d.name == member))
            .map(|f| Entity::Field(*f));
        let properties = def
            .properties
            .iter()
            .filter(|p| self.property(**p).is_some_and(|d| d.name == member))
            .map(|p| Entity::Property(*p));
        let events = def
            .events
            .iter()
            .filter(|e| self.event(**e).is_some_and(|d| d.name == member))
            .map(|e| Entity::Event(*e));
        methods.chain(fields).chain(properties).chain(events).collect()
    }

    /// Human readable name of any program entity, for reports and logs.
    pub fn describe(&self, entity: Entity) -> String {
        match entity {
            Entity::Type(t) => self.full_name(t),
            Entity::Method(m) => {
                let owner = self
                    .method_declaring_type(m)
                    .map(|t| self.full_name(t))
                    .unwrap_or_default();
                let params = self
                    .method_signature(m)
                    .map(|(_, ps)| ps.iter().map(|p| self.full_name(*p)).collect::<Vec<_>>())
                    .unwrap_or_default();
                format!(
                    "{}::{}({})",
                    owner,
                    self.method_name(m).unwrap_or("?"),
                    params.join(",")
                )
            }
            Entity::Field(f) => match self.field(f) {
                Some(FieldNode::Definition(d)) => {
                    format!("{}::{}", self.full_name(d.declaring_type), d.name)
                }
                Some(FieldNode::Reference(r)) => {
                    format!("{}::{}", self.full_name(r.declaring_type), r.name)
                }
                None => entity.to_string(),
            },
            Entity::Property(p) => match self.property(p) {
                Some(d) => format!("{}::{}", self.full_name(d.declaring_type), d.name),
                None => entity.to_string(),
            },
            Entity::Event(e) => match self.event(e) {
                Some(d) => format!("{}::{}", self.full_name(d.declaring_type), d.name),
                None => entity.to_string(),
            },
            Entity::Parameter(p) => match self.param(p) {
                Some(d) => format!("param {}: {}", d.name, self.full_name(d.parameter_type)),
                None => entity.to_string(),
            },
            Entity::GenericParameter(g) => match self.generic_param(g) {
                Some(d) => format!("generic {}", d.name),
                None => entity.to_string(),
            },
            Entity::Attribute(a) => match self.attribute(a) {
                Some(attr) => {
                    let owner = self
                        .method_declaring_type(attr.constructor)
                        .map(|t| self.full_name(t))
                        .unwrap_or_default();
                    format!("[{}]", owner)
                }
                None => entity.to_string(),
            },
            Entity::ForeignClass(_) | Entity::ForeignField(..) | Entity::ForeignMethod(..) => {
                entity.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system(program: &mut Program) -> (TypeId, TypeId, TypeId) {
        let object = program.add_type(TypeDef::new("System", "Object"));
        let void = program.add_type(TypeDef::new("System", "Void"));
        let int = program.add_type(TypeDef::new("System", "Int32"));
        (object, void, int)
    }

    #[test]
    fn test_full_names() {
        let mut program = Program::new();
        let (_, _, int) = system(&mut program);
        let list = program.add_type(TypeDef::new("System.Collections", "List`1"));
        let inst = program.add_type_spec(TypeSpec::GenericInstance {
            element: list,
            arguments: vec![int],
        });
        let arr = program.add_type_spec(TypeSpec::Array { element: int, rank: 2 });
        let mut nested = TypeDef::new("", "Node");
        nested.declaring_type = Some(list);
        let nested = program.add_type(nested);

        assert_eq!(program.full_name(inst), "System.Collections.List`1<System.Int32>");
        assert_eq!(program.full_name(arr), "System.Int32[,]");
        assert_eq!(program.full_name(nested), "System.Collections.List`1/Node");
    }

    #[test]
    fn test_resolve_type_reference() {
        let mut program = Program::new();
        let (_, _, int) = system(&mut program);
        let good = program.add_type_ref("System.Int32");
        let bad = program.add_type_ref("System.Missing");
        let by_ref = program.add_type_spec(TypeSpec::ByReference { element: good });

        assert_eq!(program.resolve_type(good), Some(int));
        assert_eq!(program.resolve_type(bad), None);
        assert_eq!(program.resolve_type(by_ref), Some(int));
    }

    #[test]
    fn test_resolve_method_reference_by_signature() {
        let mut program = Program::new();
        let (_, void, int) = system(&mut program);
        let widget = program.add_type(TypeDef::new("App", "Widget"));
        let plain = program.add_method(MethodDef::new(widget, "Resize", void));
        let with_int = program.add_method(MethodDef::new(widget, "Resize", void));
        program.add_param(with_int, "size", int);

        let widget_ref = program.add_type_ref("App.Widget");
        let call = program.add_method_ref(MethodRef {
            declaring_type: widget_ref,
            name: "Resize".to_string(),
            return_type: void,
            parameter_types: vec![int],
        });
        let missing = program.add_method_ref(MethodRef {
            declaring_type: widget_ref,
            name: "Explode".to_string(),
            return_type: void,
            parameter_types: vec![],
        });

        assert_eq!(program.resolve_method(call), Some(with_int));
        assert_ne!(program.resolve_method(call), Some(plain));
        assert_eq!(program.resolve_method(missing), None);
    }

    #[test]
    fn test_base_method_walks_chain() {
        let mut program = Program::new();
        let (object, void, _) = system(&mut program);
        let mut base = TypeDef::new("App", "Base");
        base.base_type = Some(object);
        let base = program.add_type(base);
        let mut derived = TypeDef::new("App", "Derived");
        derived.base_type = Some(base);
        let derived = program.add_type(derived);

        let mut draw = MethodDef::new(base, "Draw", void);
        draw.flags.is_virtual = true;
        let base_draw = program.add_method(draw.clone());
        draw.declaring_type = derived;
        let derived_draw = program.add_method(draw);

        assert_eq!(program.base_method(derived_draw), Some(base_draw));
        assert_eq!(program.base_method(base_draw), None);
    }

    #[test]
    fn test_base_method_binds_generic_arguments() {
        let mut program = Program::new();
        let (object, void, int) = system(&mut program);
        let mut base = TypeDef::new("App", "Base`1");
        base.base_type = Some(object);
        let base = program.add_type(base);
        let (_, t) = program.add_generic_param(GenericOwner::Type(base), "T");
        let mid = program.add_type(TypeDef::new("App", "Mid`1"));
        let (_, u) = program.add_generic_param(GenericOwner::Type(mid), "U");
        let base_of_u = program.add_type_spec(TypeSpec::GenericInstance {
            element: base,
            arguments: vec![u],
        });
        program.type_def_mut(mid).unwrap().base_type = Some(base_of_u);
        let mid_of_int = program.add_type_spec(TypeSpec::GenericInstance {
            element: mid,
            arguments: vec![int],
        });
        let mut leaf = TypeDef::new("App", "IntLeaf");
        leaf.base_type = Some(mid_of_int);
        let leaf = program.add_type(leaf);

        let mut put = MethodDef::new(base, "Put", void);
        put.flags.is_virtual = true;
        let base_put = program.add_method(put.clone());
        program.add_param(base_put, "value", t);
        put.declaring_type = leaf;
        let leaf_put = program.add_method(put.clone());
        program.add_param(leaf_put, "value", int);
        put.declaring_type = mid;
        let mid_put = program.add_method(put);
        program.add_param(mid_put, "value", u);

        // The nearest match wins: Mid<Int32>::Put(U) binds U to Int32.
        assert_eq!(program.base_method(leaf_put), Some(mid_put));
        // Mid<U> passes U on to Base<T>.
        assert_eq!(program.base_method(mid_put), Some(base_put));
    }

    #[test]
    fn test_instance_method_is_owned_by_declaring_type() {
        let mut program = Program::new();
        let (_, void, int) = system(&mut program);
        let widget = program.add_type(TypeDef::new("App", "Widget"));
        let make = program.add_method(MethodDef::new(widget, "Make", void));
        let inst = program.add_method_instance(make, vec![int]);

        assert_eq!(program.owner_of(Entity::Method(inst)), Some(Entity::Type(widget)));
    }

    #[test]
    fn test_base_types_stop_on_cycle() {
        let mut program = Program::new();
        let a = program.add_type(TypeDef::new("App", "A"));
        let mut b = TypeDef::new("App", "B");
        b.base_type = Some(a);
        let b = program.add_type(b);
        program.type_def_mut(a).unwrap().base_type = Some(b);

        assert_eq!(program.base_types(a), vec![b]);
    }

    #[test]
    fn test_attribute_and_enum_detection() {
        let mut program = Program::new();
        let (object, _, _) = system(&mut program);
        let mut attribute = TypeDef::new("System", "Attribute");
        attribute.base_type = Some(object);
        let attribute = program.add_type(attribute);
        let mut marker = TypeDef::new("App", "MarkerAttribute");
        marker.base_type = Some(attribute);
        let marker = program.add_type(marker);
        let enum_base = program.add_type(TypeDef::new("System", "Enum"));
        let mut color = TypeDef::new("App", "Color");
        color.base_type = Some(enum_base);
        let color = program.add_type(color);

        assert!(program.is_attribute(marker));
        assert!(!program.is_attribute(color));
        assert!(program.is_enum(color));
        assert!(!program.is_enum(marker));
    }

    #[test]
    fn test_lookup_members() {
        let mut program = Program::new();
        let (_, void, int) = system(&mut program);
        let widget = program.add_type(TypeDef::new("App", "Widget"));
        let a = program.add_method(MethodDef::new(widget, "Run", void));
        let b = program.add_method(MethodDef::new(widget, "Run", void));
        program.add_param(b, "times", int);

        assert_eq!(program.lookup("App.Widget"), vec![Entity::Type(widget)]);
        assert_eq!(
            program.lookup("App.Widget::Run"),
            vec![Entity::Method(a), Entity::Method(b)]
        );
        assert!(program.lookup("App.Widget::Stop").is_empty());
        assert!(program.lookup("App.Nope::Run").is_empty());
    }
}
