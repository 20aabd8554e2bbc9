//
//  bridge.rs
//  Retain
//
//  Created by hak (tharun)
//

use tracing::{debug, warn};

use super::context::ReachableContext;
use super::walker::Steps;
use super::Diagnostic;
use crate::model::{ClassId, Entity, MemberImport};

#[derive(Debug, Clone, Copy)]
enum ForeignKind {
    Field,
    Method,
}

impl<'p> ReachableContext<'p> {
    pub(crate) fn bridge_method(&mut self, referenced_by: Entity, import: &MemberImport, steps: &mut Steps) {
        self.bridge(referenced_by, import, ForeignKind::Method, steps);
    }

    pub(crate) fn bridge_field(&mut self, referenced_by: Entity, import: &MemberImport, steps: &mut Steps) {
        self.bridge(referenced_by, import, ForeignKind::Field, steps);
    }

    /// Mark the foreign class and member an imported member stands for.
    ///
    /// An unknown class is skipped silently. A known class without the member
    /// keeps the class and reports a diagnostic.
    fn bridge(
        &mut self,
        referenced_by: Entity,
        import: &MemberImport,
        kind: ForeignKind,
        steps: &mut Steps,
    ) {
        let Some(class) = self.try_load_class(&import.class_name) else {
            debug!(class = %import.class_name, "Imported foreign class not found");
            return;
        };
        steps.entity(Entity::ForeignClass(class));

        let member = match kind {
            ForeignKind::Field => self
                .repository
                .find_field(class, &import.member_name, &import.descriptor)
                .map(|idx| Entity::ForeignField(class, idx)),
            ForeignKind::Method => self
                .repository
                .find_method(class, &import.member_name, &import.descriptor)
                .map(|idx| Entity::ForeignMethod(class, idx)),
        };
        match member {
            Some(member) => steps.entity(member),
            None => {
                warn!(
                    class = %import.class_name,
                    member = %import.member_name,
                    descriptor = %import.descriptor,
                    "Imported member not found in foreign class"
                );
                self.diagnostics.push(Diagnostic::ForeignMemberNotFound {
                    class_name: import.class_name.clone(),
                    member_name: import.member_name.clone(),
                    descriptor: import.descriptor.clone(),
                    referenced_by,
                });
            }
        }
    }

    /// A foreign class keeps its super class and interfaces when the
    /// repository knows them.
    pub(crate) fn expand_foreign_class(&mut self, id: ClassId, steps: &mut Steps) {
        let Some(class) = self.repository.class(id) else {
            return;
        };
        let parents: Vec<String> = class
            .super_class
            .iter()
            .chain(&class.interfaces)
            .cloned()
            .collect();
        for parent in parents {
            if let Some(parent) = self.try_load_class(&parent) {
                steps.entity(Entity::ForeignClass(parent));
            }
        }
    }
}
