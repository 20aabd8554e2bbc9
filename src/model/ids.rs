//
//  ids.rs
//  Retain
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub(crate) fn new(index: usize) -> Self {
                Self(index as u32)
            }

            /// Position of this entity in its arena.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

entity_id!(
    /// Handle of a type node (definition, specification, generic parameter or reference).
    TypeId,
    "t"
);
entity_id!(
    /// Handle of a method node (definition, generic instance or reference).
    MethodId,
    "m"
);
entity_id!(
    /// Handle of a field node (definition or reference).
    FieldId,
    "f"
);
entity_id!(PropertyId, "p");
entity_id!(EventId, "e");
entity_id!(ParamId, "a");
entity_id!(GenericParamId, "g");
entity_id!(AttributeId, "c");
entity_id!(
    /// Handle of a class loaded from the foreign class repository.
    ClassId,
    "j"
);

/// Any node the walker can mark reachable.
///
/// Foreign entities live in their own namespace but share the same flag set,
/// so consumers see one reachable set across both graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Type(TypeId),
    Method(MethodId),
    Field(FieldId),
    Property(PropertyId),
    Event(EventId),
    Parameter(ParamId),
    GenericParameter(GenericParamId),
    Attribute(AttributeId),
    ForeignClass(ClassId),
    ForeignField(ClassId, u32),
    ForeignMethod(ClassId, u32),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Type(_) => EntityKind::Type,
            Entity::Method(_) => EntityKind::Method,
            Entity::Field(_) => EntityKind::Field,
            Entity::Property(_) => EntityKind::Property,
            Entity::Event(_) => EntityKind::Event,
            Entity::Parameter(_) => EntityKind::Parameter,
            Entity::GenericParameter(_) => EntityKind::GenericParameter,
            Entity::Attribute(_) => EntityKind::Attribute,
            Entity::ForeignClass(_) => EntityKind::ForeignClass,
            Entity::ForeignField(..) => EntityKind::ForeignField,
            Entity::ForeignMethod(..) => EntityKind::ForeignMethod,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Type(id) => id.fmt(f),
            Entity::Method(id) => id.fmt(f),
            Entity::Field(id) => id.fmt(f),
            Entity::Property(id) => id.fmt(f),
            Entity::Event(id) => id.fmt(f),
            Entity::Parameter(id) => id.fmt(f),
            Entity::GenericParameter(id) => id.fmt(f),
            Entity::Attribute(id) => id.fmt(f),
            Entity::ForeignClass(id) => id.fmt(f),
            Entity::ForeignField(id, idx) => write!(f, "{}.f{}", id, idx),
            Entity::ForeignMethod(id, idx) => write!(f, "{}.m{}", id, idx),
        }
    }
}

/// Entity category, used for per-kind statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Type,
    Method,
    Field,
    Property,
    Event,
    Parameter,
    GenericParameter,
    Attribute,
    ForeignClass,
    ForeignField,
    ForeignMethod,
}

/// A type member that can be offered to the inclusion predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Member {
    Method(MethodId),
    Field(FieldId),
    Property(PropertyId),
    Event(EventId),
}

impl From<Member> for Entity {
    fn from(member: Member) -> Self {
        match member {
            Member::Method(id) => Entity::Method(id),
            Member::Field(id) => Entity::Field(id),
            Member::Property(id) => Entity::Property(id),
            Member::Event(id) => Entity::Event(id),
        }
    }
}
