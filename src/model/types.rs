//
//  types.rs
//  Retain
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};

use super::ids::*;

/// Accessibility of a type or member, as seen from outside its assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Private,
    Assembly,
    Family,
    Public,
}

impl Visibility {
    /// Public and protected members can be reached from another assembly.
    pub fn is_external(self) -> bool {
        matches!(self, Visibility::Public | Visibility::Family)
    }
}

/// A node in the type arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeNode {
    Definition(TypeDef),
    Specification(TypeSpec),
    GenericParameter(GenericParamId),
    Reference(TypeRef),
}

/// A type with a body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDef {
    #[serde(default)]
    pub namespace: String,
    pub name: String,
    /// Outer type for nested types.
    #[serde(default)]
    pub declaring_type: Option<TypeId>,
    #[serde(default)]
    pub base_type: Option<TypeId>,
    #[serde(default)]
    pub interfaces: Vec<TypeId>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub flags: TypeFlags,
    #[serde(default)]
    pub methods: Vec<MethodId>,
    #[serde(default)]
    pub fields: Vec<FieldId>,
    #[serde(default)]
    pub properties: Vec<PropertyId>,
    #[serde(default)]
    pub events: Vec<EventId>,
    #[serde(default)]
    pub generic_parameters: Vec<GenericParamId>,
    #[serde(default)]
    pub attributes: Vec<AttributeId>,
    /// Name of the pre-compiled foreign class this type stands for.
    #[serde(default)]
    pub foreign_import: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeFlags {
    pub interface: bool,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    pub sealed: bool,
    /// Interface imported from the foreign repository: every method must exist
    /// on the target for dispatch to work.
    pub imported_interface: bool,
    /// Attribute type that only informs the compiler and never reaches the output.
    pub compiler_only: bool,
}

impl TypeDef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// `abstract sealed` is how static classes are encoded in metadata.
    pub fn is_static(&self) -> bool {
        self.flags.is_abstract && self.flags.sealed
    }

    pub fn is_interface(&self) -> bool {
        self.flags.interface
    }
}

/// A type derived from an element type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeSpec {
    GenericInstance {
        element: TypeId,
        arguments: Vec<TypeId>,
    },
    Array {
        element: TypeId,
        #[serde(default = "default_rank")]
        rank: u32,
    },
    ByReference {
        element: TypeId,
    },
    Pointer {
        element: TypeId,
    },
    FunctionPointer {
        return_type: TypeId,
        #[serde(default)]
        parameters: Vec<TypeId>,
    },
    RequiredModifier {
        element: TypeId,
        modifier: TypeId,
    },
    OptionalModifier {
        element: TypeId,
        modifier: TypeId,
    },
}

fn default_rank() -> u32 {
    1
}

impl TypeSpec {
    /// The transformed type. Function pointers have no element.
    pub fn element(&self) -> Option<TypeId> {
        match self {
            TypeSpec::GenericInstance { element, .. }
            | TypeSpec::Array { element, .. }
            | TypeSpec::ByReference { element }
            | TypeSpec::Pointer { element }
            | TypeSpec::RequiredModifier { element, .. }
            | TypeSpec::OptionalModifier { element, .. } => Some(*element),
            TypeSpec::FunctionPointer { .. } => None,
        }
    }
}

/// A by-name reference to a type defined elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    /// Full name, `Namespace.Name` or `Namespace.Outer/Inner` for nested types.
    pub full_name: String,
}
