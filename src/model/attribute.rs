//
//  attribute.rs
//  Retain
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};

use super::ids::*;

/// A custom attribute instance attached to a type, member, parameter or the program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub constructor: MethodId,
    #[serde(default)]
    pub arguments: Vec<AttributeValue>,
    #[serde(default)]
    pub fields: Vec<NamedArgument>,
    #[serde(default)]
    pub properties: Vec<NamedArgument>,
}

impl Attribute {
    pub fn new(constructor: MethodId) -> Self {
        Self {
            constructor,
            arguments: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedArgument {
    pub name: String,
    pub argument: AttributeValue,
}

/// A typed constant stored in an attribute blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeValue {
    pub value_type: TypeId,
    pub value: ArgumentValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentValue {
    Null,
    Bool(bool),
    Int(i64),
    String(String),
    /// A `typeof(...)` value.
    Type(TypeId),
    Array(Vec<ArgumentValue>),
}
