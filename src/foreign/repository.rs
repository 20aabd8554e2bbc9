//
//  repository.rs
//  Retain
//
//  Created by hak (tharun)
//

use std::collections::HashMap;

use tracing::{debug, warn};

use super::{normalize_class_name, ClassFile, ClassLoader};
use crate::model::ClassId;

/// Cache-backed view of the foreign class repository.
///
/// Each name is asked of the loader at most once; misses are cached too.
pub struct ClassRepository {
    loader: Box<dyn ClassLoader>,
    by_name: HashMap<String, Option<ClassId>>,
    classes: Vec<ClassFile>,
}

impl ClassRepository {
    pub fn new(loader: impl ClassLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            by_name: HashMap::new(),
            classes: Vec::new(),
        }
    }

    /// A repository with no classes; every lookup misses.
    pub fn empty() -> Self {
        Self::new(super::MemoryLoader::new())
    }

    /// Best-effort lookup. Missing and undecodable classes both yield `None`.
    pub fn try_load(&mut self, name: &str) -> Option<ClassId> {
        let key = normalize_class_name(name);
        if let Some(cached) = self.by_name.get(&key) {
            return *cached;
        }
        let loaded = match self.loader.load(&key) {
            Ok(Some(class)) => {
                let id = ClassId::new(self.classes.len());
                debug!(class = %key, id = %id, "Loaded foreign class");
                self.classes.push(class);
                Some(id)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(class = %key, error = %e, "Foreign class could not be decoded");
                None
            }
        };
        self.by_name.insert(key, loaded);
        loaded
    }

    pub fn class(&self, id: ClassId) -> Option<&ClassFile> {
        self.classes.get(id.index())
    }

    pub fn find_field(&self, id: ClassId, name: &str, descriptor: &str) -> Option<u32> {
        self.class(id)?
            .find_field(name, descriptor)
            .map(|idx| idx as u32)
    }

    pub fn find_method(&self, id: ClassId, name: &str, descriptor: &str) -> Option<u32> {
        self.class(id)?
            .find_method(name, descriptor)
            .map(|idx| idx as u32)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl std::fmt::Debug for ClassRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassRepository")
            .field("cached", &self.by_name.len())
            .field("loaded", &self.classes.len())
            .finish()
    }
}
