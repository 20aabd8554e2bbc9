//
//  program.rs
//  Retain
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::attribute::Attribute;
use super::ids::*;
use super::members::*;
use super::types::*;
use crate::error::{Result, RetainError};

/// The object-program metadata graph.
///
/// Every entity lives in a per-kind arena and is addressed by its handle.
/// Cross references (declaring type, base type, operands) are plain handles,
/// so cycles in the metadata cost nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub(crate) types: Vec<TypeNode>,
    #[serde(default)]
    pub(crate) methods: Vec<MethodNode>,
    #[serde(default)]
    pub(crate) fields: Vec<FieldNode>,
    #[serde(default)]
    pub(crate) properties: Vec<PropertyDef>,
    #[serde(default)]
    pub(crate) events: Vec<EventDef>,
    #[serde(default)]
    pub(crate) parameters: Vec<Parameter>,
    #[serde(default)]
    pub(crate) generic_parameters: Vec<GenericParam>,
    #[serde(default)]
    pub(crate) attributes: Vec<Attribute>,
    /// Assembly and module level attributes.
    #[serde(default)]
    pub(crate) program_attributes: Vec<AttributeId>,
    /// Entities the front-end flagged as entry points.
    #[serde(default)]
    pub(crate) entry_points: Vec<Entity>,
    /// Index: full name -> type definition.
    #[serde(skip)]
    pub(crate) type_index: HashMap<String, TypeId>,
}

impl Program {
    /// Create a new empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a program from its JSON form and rebuild the name index.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut program: Program = serde_json::from_str(json)?;
        program.rebuild_index();
        Ok(program)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| RetainError::io(path, e))?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Rebuild derived state after deserialization: the name index and the
    /// accessor semantics implied by properties and events.
    fn rebuild_index(&mut self) {
        self.type_index.clear();
        for idx in 0..self.types.len() {
            let id = TypeId::new(idx);
            if let Some(TypeNode::Definition(_)) = self.types.get(idx) {
                let name = self.full_name(id);
                self.type_index.entry(name).or_insert(id);
            }
        }

        let accessors: Vec<_> = self
            .properties
            .iter()
            .flat_map(property_accessors)
            .chain(self.events.iter().flat_map(event_accessors))
            .collect();
        self.tag_accessors(accessors);
    }

    fn tag_accessors(&mut self, accessors: impl IntoIterator<Item = (Option<MethodId>, Semantics)>) {
        for (accessor, semantics) in accessors {
            let Some(m) = accessor else { continue };
            if let Some(def) = self.method_def_mut(m) {
                def.semantics = semantics;
            }
        }
    }

    // ─── Type Operations ────────────────────────────────────────

    /// Add a type definition. Nested types must name their declaring type.
    pub fn add_type(&mut self, def: TypeDef) -> TypeId {
        let id = TypeId::new(self.types.len());
        self.types.push(TypeNode::Definition(def));
        let name = self.full_name(id);
        self.type_index.entry(name).or_insert(id);
        id
    }

    pub fn add_type_spec(&mut self, spec: TypeSpec) -> TypeId {
        let id = TypeId::new(self.types.len());
        self.types.push(TypeNode::Specification(spec));
        id
    }

    /// Add an unresolved by-name type reference.
    pub fn add_type_ref(&mut self, full_name: impl Into<String>) -> TypeId {
        let id = TypeId::new(self.types.len());
        self.types.push(TypeNode::Reference(TypeRef {
            full_name: full_name.into(),
        }));
        id
    }

    /// Declare a generic parameter on a type or method.
    ///
    /// Returns the parameter and the type node standing for it in signatures.
    pub fn add_generic_param(
        &mut self,
        owner: GenericOwner,
        name: impl Into<String>,
    ) -> (GenericParamId, TypeId) {
        let gp = GenericParamId::new(self.generic_parameters.len());
        self.generic_parameters.push(GenericParam {
            owner,
            name: name.into(),
            constraints: Vec::new(),
            attributes: Vec::new(),
        });
        match owner {
            GenericOwner::Type(t) => {
                if let Some(def) = self.type_def_mut(t) {
                    def.generic_parameters.push(gp);
                }
            }
            GenericOwner::Method(m) => {
                if let Some(def) = self.method_def_mut(m) {
                    def.generic_parameters.push(gp);
                }
            }
        }
        let ty = TypeId::new(self.types.len());
        self.types.push(TypeNode::GenericParameter(gp));
        (gp, ty)
    }

    // ─── Member Operations ──────────────────────────────────────

    /// Add a method definition and register it on its declaring type.
    pub fn add_method(&mut self, def: MethodDef) -> MethodId {
        let id = MethodId::new(self.methods.len());
        let owner = def.declaring_type;
        self.methods.push(MethodNode::Definition(def));
        if let Some(td) = self.type_def_mut(owner) {
            td.methods.push(id);
        }
        id
    }

    pub fn add_method_ref(&mut self, reference: MethodRef) -> MethodId {
        let id = MethodId::new(self.methods.len());
        self.methods.push(MethodNode::Reference(reference));
        id
    }

    pub fn add_method_instance(&mut self, element: MethodId, arguments: Vec<TypeId>) -> MethodId {
        let id = MethodId::new(self.methods.len());
        self.methods
            .push(MethodNode::Instance(MethodInstance { element, arguments }));
        id
    }

    /// Append a parameter to a method definition.
    pub fn add_param(&mut self, method: MethodId, name: impl Into<String>, ty: TypeId) -> ParamId {
        let id = ParamId::new(self.parameters.len());
        self.parameters.push(Parameter {
            owner: ParamOwner::Method(method),
            name: name.into(),
            parameter_type: ty,
            attributes: Vec::new(),
        });
        if let Some(def) = self.method_def_mut(method) {
            def.parameters.push(id);
        }
        id
    }

    pub fn add_field(&mut self, def: FieldDef) -> FieldId {
        let id = FieldId::new(self.fields.len());
        let owner = def.declaring_type;
        self.fields.push(FieldNode::Definition(def));
        if let Some(td) = self.type_def_mut(owner) {
            td.fields.push(id);
        }
        id
    }

    pub fn add_field_ref(&mut self, reference: FieldRef) -> FieldId {
        let id = FieldId::new(self.fields.len());
        self.fields.push(FieldNode::Reference(reference));
        id
    }

    /// Add a property and tag its accessors with getter/setter semantics.
    pub fn add_property(&mut self, def: PropertyDef) -> PropertyId {
        let id = PropertyId::new(self.properties.len());
        let owner = def.declaring_type;
        let accessors = property_accessors(&def);
        self.properties.push(def);
        if let Some(td) = self.type_def_mut(owner) {
            td.properties.push(id);
        }
        self.tag_accessors(accessors);
        id
    }

    /// Add an event and tag its accessors with add/remove/fire semantics.
    pub fn add_event(&mut self, def: EventDef) -> EventId {
        let id = EventId::new(self.events.len());
        let owner = def.declaring_type;
        let accessors = event_accessors(&def);
        self.events.push(def);
        if let Some(td) = self.type_def_mut(owner) {
            td.events.push(id);
        }
        self.tag_accessors(accessors);
        id
    }

    // ─── Attributes & Roots ─────────────────────────────────────

    /// Attach an attribute to an entity that can carry attributes.
    pub fn add_attribute(&mut self, owner: Entity, attribute: Attribute) -> AttributeId {
        let id = AttributeId::new(self.attributes.len());
        self.attributes.push(attribute);
        let list = match owner {
            Entity::Type(t) => self.type_def_mut(t).map(|d| &mut d.attributes),
            Entity::Method(m) => self.method_def_mut(m).map(|d| &mut d.attributes),
            Entity::Field(f) => match self.fields.get_mut(f.index()) {
                Some(FieldNode::Definition(d)) => Some(&mut d.attributes),
                _ => None,
            },
            Entity::Property(p) => self.properties.get_mut(p.index()).map(|d| &mut d.attributes),
            Entity::Event(e) => self.events.get_mut(e.index()).map(|d| &mut d.attributes),
            Entity::Parameter(p) => self.parameters.get_mut(p.index()).map(|d| &mut d.attributes),
            Entity::GenericParameter(g) => self
                .generic_parameters
                .get_mut(g.index())
                .map(|d| &mut d.attributes),
            _ => None,
        };
        if let Some(list) = list {
            list.push(id);
        }
        id
    }

    /// Attach an assembly or module level attribute.
    pub fn add_program_attribute(&mut self, attribute: Attribute) -> AttributeId {
        let id = AttributeId::new(self.attributes.len());
        self.attributes.push(attribute);
        self.program_attributes.push(id);
        id
    }

    pub fn add_entry_point(&mut self, entity: Entity) {
        if !self.entry_points.contains(&entity) {
            self.entry_points.push(entity);
        }
    }

    // ─── Accessors ──────────────────────────────────────────────

    pub fn type_node(&self, id: TypeId) -> Option<&TypeNode> {
        self.types.get(id.index())
    }

    /// The definition behind `id`, without resolving references.
    pub fn type_def(&self, id: TypeId) -> Option<&TypeDef> {
        match self.types.get(id.index()) {
            Some(TypeNode::Definition(def)) => Some(def),
            _ => None,
        }
    }

    pub fn type_def_mut(&mut self, id: TypeId) -> Option<&mut TypeDef> {
        match self.types.get_mut(id.index()) {
            Some(TypeNode::Definition(def)) => Some(def),
            _ => None,
        }
    }

    pub fn method(&self, id: MethodId) -> Option<&MethodNode> {
        self.methods.get(id.index())
    }

    pub fn method_def(&self, id: MethodId) -> Option<&MethodDef> {
        match self.methods.get(id.index()) {
            Some(MethodNode::Definition(def)) => Some(def),
            _ => None,
        }
    }

    pub fn method_def_mut(&mut self, id: MethodId) -> Option<&mut MethodDef> {
        match self.methods.get_mut(id.index()) {
            Some(MethodNode::Definition(def)) => Some(def),
            _ => None,
        }
    }

    pub fn field(&self, id: FieldId) -> Option<&FieldNode> {
        self.fields.get(id.index())
    }

    pub fn field_def(&self, id: FieldId) -> Option<&FieldDef> {
        match self.fields.get(id.index()) {
            Some(FieldNode::Definition(def)) => Some(def),
            _ => None,
        }
    }

    pub fn property(&self, id: PropertyId) -> Option<&PropertyDef> {
        self.properties.get(id.index())
    }

    pub fn event(&self, id: EventId) -> Option<&EventDef> {
        self.events.get(id.index())
    }

    pub fn param(&self, id: ParamId) -> Option<&Parameter> {
        self.parameters.get(id.index())
    }

    pub fn generic_param(&self, id: GenericParamId) -> Option<&GenericParam> {
        self.generic_parameters.get(id.index())
    }

    pub fn attribute(&self, id: AttributeId) -> Option<&Attribute> {
        self.attributes.get(id.index())
    }

    pub fn program_attributes(&self) -> &[AttributeId] {
        &self.program_attributes
    }

    pub fn entry_points(&self) -> &[Entity] {
        &self.entry_points
    }

    pub fn stats(&self) -> ProgramStats {
        ProgramStats {
            types: self.types.len(),
            type_definitions: self.type_index.len(),
            methods: self.methods.len(),
            fields: self.fields.len(),
            properties: self.properties.len(),
            events: self.events.len(),
            attributes: self.attributes.len(),
        }
    }
}

/// Arena sizes, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgramStats {
    pub types: usize,
    pub type_definitions: usize,
    pub methods: usize,
    pub fields: usize,
    pub properties: usize,
    pub events: usize,
    pub attributes: usize,
}

fn property_accessors(def: &PropertyDef) -> [(Option<MethodId>, Semantics); 2] {
    [(def.getter, Semantics::Getter), (def.setter, Semantics::Setter)]
}

fn event_accessors(def: &EventDef) -> [(Option<MethodId>, Semantics); 3] {
    [
        (def.add, Semantics::AddOn),
        (def.remove, Semantics::RemoveOn),
        (def.invoke, Semantics::Fire),
    ]
}
