//
//  include.rs
//  Retain
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};

use crate::model::{Member, Program, Visibility};

/// Decides which members of a reachable type are kept even when nothing
/// references them. Supplied by the caller; the walker only asks.
pub trait Include {
    fn include(&self, program: &Program, member: Member) -> bool;
}

impl<F> Include for F
where
    F: Fn(&Program, Member) -> bool,
{
    fn include(&self, program: &Program, member: Member) -> bool {
        self(program, member)
    }
}

/// Built-in inclusion policies selectable from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityPolicy {
    /// Keep public and protected members of reachable types.
    #[default]
    Visible,
    /// Keep every member of a reachable type.
    All,
    /// Keep only what is referenced.
    None,
}

impl VisibilityPolicy {
    fn visibility(program: &Program, member: Member) -> Option<Visibility> {
        let accessor = |m| program.method_def(m).map(|d| d.visibility);
        match member {
            Member::Method(m) => program.method_def(m).map(|d| d.visibility),
            Member::Field(f) => program.field_def(f).map(|d| d.visibility),
            Member::Property(p) => program.property(p).map(|d| d.visibility(accessor)),
            Member::Event(e) => program.event(e).map(|d| d.visibility(accessor)),
        }
    }
}

impl Include for VisibilityPolicy {
    fn include(&self, program: &Program, member: Member) -> bool {
        match self {
            VisibilityPolicy::All => true,
            VisibilityPolicy::None => false,
            VisibilityPolicy::Visible => {
                Self::visibility(program, member).is_some_and(Visibility::is_external)
            }
        }
    }
}
