//
//  members.rs
//  Retain
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};

use super::body::MethodBody;
use super::ids::*;
use super::types::Visibility;

/// Marker naming the foreign member a managed member is implemented by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberImport {
    pub class_name: String,
    pub member_name: String,
    pub descriptor: String,
}

impl MemberImport {
    pub fn new(
        class_name: impl Into<String>,
        member_name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            member_name: member_name.into(),
            descriptor: descriptor.into(),
        }
    }
}

// ─── Methods ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodNode {
    Definition(MethodDef),
    Instance(MethodInstance),
    Reference(MethodRef),
}

/// Role of a method with respect to a property or event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Semantics {
    #[default]
    None,
    Getter,
    Setter,
    AddOn,
    RemoveOn,
    Fire,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodFlags {
    #[serde(rename = "static")]
    pub is_static: bool,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    /// Implemented by platform glue; references to it are never walked.
    pub native: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDef {
    pub declaring_type: TypeId,
    pub name: String,
    pub return_type: TypeId,
    #[serde(default)]
    pub parameters: Vec<ParamId>,
    #[serde(default)]
    pub generic_parameters: Vec<GenericParamId>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub flags: MethodFlags,
    #[serde(default)]
    pub semantics: Semantics,
    /// Explicit interface implementations.
    #[serde(default)]
    pub overrides: Vec<MethodId>,
    #[serde(default)]
    pub body: Option<MethodBody>,
    #[serde(default)]
    pub attributes: Vec<AttributeId>,
    #[serde(default)]
    pub import: Option<MemberImport>,
}

impl MethodDef {
    pub fn new(declaring_type: TypeId, name: impl Into<String>, return_type: TypeId) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            return_type,
            parameters: Vec::new(),
            generic_parameters: Vec::new(),
            visibility: Visibility::Public,
            flags: MethodFlags::default(),
            semantics: Semantics::None,
            overrides: Vec::new(),
            body: None,
            attributes: Vec::new(),
            import: None,
        }
    }
}

/// Generic instantiation of a method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodInstance {
    pub element: MethodId,
    pub arguments: Vec<TypeId>,
}

/// Call-site reference to a method, resolved by name and parameter types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodRef {
    pub declaring_type: TypeId,
    pub name: String,
    pub return_type: TypeId,
    #[serde(default)]
    pub parameter_types: Vec<TypeId>,
}

// ─── Fields ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldNode {
    Definition(FieldDef),
    Reference(FieldRef),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub declaring_type: TypeId,
    pub name: String,
    pub field_type: TypeId,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Android-style resource identifier, resolved by platform glue.
    #[serde(default)]
    pub resource_id: bool,
    #[serde(default)]
    pub attributes: Vec<AttributeId>,
    #[serde(default)]
    pub import: Option<MemberImport>,
}

impl FieldDef {
    pub fn new(declaring_type: TypeId, name: impl Into<String>, field_type: TypeId) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            field_type,
            visibility: Visibility::Public,
            is_static: false,
            resource_id: false,
            attributes: Vec::new(),
            import: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRef {
    pub declaring_type: TypeId,
    pub name: String,
    pub field_type: TypeId,
}

// ─── Properties & events ────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDef {
    pub declaring_type: TypeId,
    pub name: String,
    pub property_type: TypeId,
    /// Indexer parameters.
    #[serde(default)]
    pub parameters: Vec<ParamId>,
    #[serde(default)]
    pub getter: Option<MethodId>,
    #[serde(default)]
    pub setter: Option<MethodId>,
    #[serde(default)]
    pub attributes: Vec<AttributeId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDef {
    pub declaring_type: TypeId,
    pub name: String,
    pub event_type: TypeId,
    #[serde(default)]
    pub add: Option<MethodId>,
    #[serde(default)]
    pub remove: Option<MethodId>,
    #[serde(default)]
    pub invoke: Option<MethodId>,
    #[serde(default)]
    pub attributes: Vec<AttributeId>,
}

impl PropertyDef {
    /// Properties follow the visibility of their most visible accessor.
    pub fn visibility(&self, methods: impl Fn(MethodId) -> Option<Visibility>) -> Visibility {
        [self.getter, self.setter]
            .into_iter()
            .flatten()
            .filter_map(methods)
            .max()
            .unwrap_or_default()
    }
}

impl EventDef {
    pub fn visibility(&self, methods: impl Fn(MethodId) -> Option<Visibility>) -> Visibility {
        [self.add, self.remove]
            .into_iter()
            .flatten()
            .filter_map(methods)
            .max()
            .unwrap_or_default()
    }
}

// ─── Parameters ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamOwner {
    Method(MethodId),
    Property(PropertyId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub owner: ParamOwner,
    #[serde(default)]
    pub name: String,
    pub parameter_type: TypeId,
    #[serde(default)]
    pub attributes: Vec<AttributeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenericOwner {
    Type(TypeId),
    Method(MethodId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericParam {
    pub owner: GenericOwner,
    pub name: String,
    #[serde(default)]
    pub constraints: Vec<TypeId>,
    #[serde(default)]
    pub attributes: Vec<AttributeId>,
}
