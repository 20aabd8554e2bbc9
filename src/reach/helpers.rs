//
//  helpers.rs
//  Retain
//
//  Created by hak (tharun)
//

use std::collections::HashMap;

use crate::error::{Result, RetainError};
use crate::model::{MethodId, Program, TypeId};

pub const DEFAULT_NAMESPACE: &str = "Compiler.Internal";

pub const BOXING: &str = "Boxing";
pub const CHECKED: &str = "Checked";
pub const ATTRIBUTE: &str = "IAttribute";
pub const ATTRIBUTES: &str = "IAttributes";
pub const ANNOTATION_TYPE: &str = "IAnnotationType";
pub const TYPE_HELPER: &str = "TypeHelper";
pub const GENERIC_INSTANCE_ANNOTATION: &str = "GenericInstanceAnnotation";
pub const GENERIC_TYPE_PARAMETER_ANNOTATION: &str = "GenericTypeParameterAnnotation";
pub const GENERIC_METHOD_PARAMETER_ANNOTATION: &str = "GenericMethodParameterAnnotation";

/// Support types the emitter relies on, looked up by logical name.
///
/// The namespace must be present in every program; a missing type or member
/// means the support library is broken and the pass stops.
#[derive(Debug, Clone)]
pub struct HelperNamespace {
    namespace: String,
    types: HashMap<String, TypeId>,
}

impl Default for HelperNamespace {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl HelperNamespace {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            types: HashMap::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Definition of helper type `name`.
    pub fn type_id(&mut self, program: &Program, name: &str) -> Result<TypeId> {
        if let Some(&id) = self.types.get(name) {
            return Ok(id);
        }
        let full_name = format!("{}.{}", self.namespace, name);
        let id = program
            .find_type(&full_name)
            .ok_or(RetainError::MissingHelper(full_name))?;
        self.types.insert(name.to_string(), id);
        Ok(id)
    }

    /// Every method of helper type `type_name` accepted by `filter`.
    ///
    /// `member` names the expected member in the error when nothing matches.
    pub fn methods_where(
        &mut self,
        program: &Program,
        type_name: &str,
        member: &str,
        filter: impl Fn(&str, usize) -> bool,
    ) -> Result<Vec<MethodId>> {
        let id = self.type_id(program, type_name)?;
        let methods: Vec<MethodId> = program
            .type_def(id)
            .map(|def| def.methods.as_slice())
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(|&m| {
                program
                    .method_def(m)
                    .is_some_and(|d| filter(&d.name, d.parameters.len()))
            })
            .collect();
        if methods.is_empty() {
            return Err(RetainError::MissingHelperMember {
                type_name: format!("{}.{}", self.namespace, type_name),
                member: member.to_string(),
            });
        }
        Ok(methods)
    }

    /// Every overload of `type_name.member`.
    pub fn methods_named(
        &mut self,
        program: &Program,
        type_name: &str,
        member: &str,
    ) -> Result<Vec<MethodId>> {
        self.methods_where(program, type_name, member, |name, _| name == member)
    }
}
