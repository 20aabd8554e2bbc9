//
//  loader.rs
//  Retain
//
//  Created by hak (tharun)
//

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{normalize_class_name, ClassFile};
use crate::error::{Result, RetainError};

/// Source of foreign class descriptions.
///
/// `Ok(None)` means the class does not exist. An error means it exists but
/// could not be read or decoded.
pub trait ClassLoader {
    fn load(&self, name: &str) -> Result<Option<ClassFile>>;
}

/// Reads one JSON class description per file: `a/b/C.json` for class `a/b/C`.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn class_path(&self, name: &str) -> PathBuf {
        let mut path = self.root.clone();
        for segment in normalize_class_name(name).split('/') {
            path.push(segment);
        }
        path.set_extension("json");
        path
    }
}

impl ClassLoader for DirectoryLoader {
    fn load(&self, name: &str) -> Result<Option<ClassFile>> {
        let path = self.class_path(name);
        if !path.is_file() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&path).map_err(|e| RetainError::io(&path, e))?;
        Ok(Some(serde_json::from_str(&json)?))
    }
}

/// Serves classes registered up front.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    classes: HashMap<String, ClassFile>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: ClassFile) {
        self.classes.insert(normalize_class_name(&class.name), class);
    }

    pub fn with(mut self, class: ClassFile) -> Self {
        self.insert(class);
        self
    }
}

impl ClassLoader for MemoryLoader {
    fn load(&self, name: &str) -> Result<Option<ClassFile>> {
        Ok(self.classes.get(&normalize_class_name(name)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_class(dir: &Path, relative: &str, contents: &str) {
        let path = dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_directory_loader_reads_nested_path() {
        let dir = TempDir::new().unwrap();
        write_class(
            dir.path(),
            "android/app/Activity.json",
            r#"{"name":"android/app/Activity","methods":[{"name":"onCreate","descriptor":"(Landroid/os/Bundle;)V"}]}"#,
        );
        let loader = DirectoryLoader::new(dir.path());

        let class = loader.load("android.app.Activity").unwrap().unwrap();
        assert_eq!(class.name, "android/app/Activity");
        assert_eq!(class.methods.len(), 1);
    }

    #[test]
    fn test_directory_loader_missing_class() {
        let dir = TempDir::new().unwrap();
        let loader = DirectoryLoader::new(dir.path());
        assert!(loader.load("java/lang/Missing").unwrap().is_none());
    }

    #[test]
    fn test_directory_loader_bad_json_is_error() {
        let dir = TempDir::new().unwrap();
        write_class(dir.path(), "broken/Thing.json", "{ not json");
        let loader = DirectoryLoader::new(dir.path());
        assert!(matches!(
            loader.load("broken/Thing"),
            Err(RetainError::Json(_))
        ));
    }

    #[test]
    fn test_memory_loader() {
        let loader = MemoryLoader::new().with(ClassFile::new("java/lang/Object"));
        assert!(loader.load("java.lang.Object").unwrap().is_some());
        assert!(loader.load("java/lang/String").unwrap().is_none());
    }
}
