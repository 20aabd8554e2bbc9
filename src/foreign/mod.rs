//! Foreign class repository.
//!
//! Pre-compiled classes the program calls into directly. Classes are described
//! by name, super class, interfaces and their members keyed by name and
//! descriptor. They are loaded on demand through a [`ClassLoader`] and cached
//! by a [`ClassRepository`] for the lifetime of one pass.

pub mod loader;
pub mod repository;

pub use loader::{ClassLoader, DirectoryLoader, MemoryLoader};
pub use repository::ClassRepository;

use serde::{Deserialize, Serialize};

/// A member of a foreign class, addressed by name plus type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignMember {
    pub name: String,
    pub descriptor: String,
}

impl ForeignMember {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    pub fn matches(&self, name: &str, descriptor: &str) -> bool {
        self.name == name && self.descriptor == descriptor
    }
}

/// Decoded description of one foreign class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassFile {
    /// Binary name with `/` separators, e.g. `android/app/Activity`.
    pub name: String,
    #[serde(default)]
    pub super_class: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub fields: Vec<ForeignMember>,
    #[serde(default)]
    pub methods: Vec<ForeignMember>,
}

impl ClassFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_class: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_super(mut self, super_class: impl Into<String>) -> Self {
        self.super_class = Some(super_class.into());
        self
    }

    pub fn with_field(mut self, name: &str, descriptor: &str) -> Self {
        self.fields.push(ForeignMember::new(name, descriptor));
        self
    }

    pub fn with_method(mut self, name: &str, descriptor: &str) -> Self {
        self.methods.push(ForeignMember::new(name, descriptor));
        self
    }

    pub fn find_field(&self, name: &str, descriptor: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.matches(name, descriptor))
    }

    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<usize> {
        self.methods.iter().position(|m| m.matches(name, descriptor))
    }
}

/// Accept both `a.b.C` and `a/b/C` spellings of a class name.
pub fn normalize_class_name(name: &str) -> String {
    name.replace('.', "/")
}
