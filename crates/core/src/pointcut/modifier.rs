use super::{MatchTarget, Pointcut, PointcutKind};
use crate::error::Result;
use crate::reflection::Modifiers;

/// Matches member modifiers against three masks
///
/// Every bit of `and` must be present, at least one bit of `or` must be
/// present when `or` is not empty, and no bit of `not` may be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifierPointcut {
    kind: PointcutKind,
    and_mask: Modifiers,
    or_mask: Modifiers,
    not_mask: Modifiers,
}

impl ModifierPointcut {
    pub fn new(kind: PointcutKind) -> Self {
        Self {
            kind,
            and_mask: Modifiers::empty(),
            or_mask: Modifiers::empty(),
            not_mask: Modifiers::empty(),
        }
    }

    pub fn and_match(mut self, modifiers: Modifiers) -> Self {
        self.and_mask |= modifiers;
        self
    }

    pub fn or_match(mut self, modifiers: Modifiers) -> Self {
        self.or_mask |= modifiers;
        self
    }

    pub fn not_match(mut self, modifiers: Modifiers) -> Self {
        self.not_mask |= modifiers;
        self
    }

    /// Combine two filters by OR-ing their respective masks
    pub fn merge(&self, other: &ModifierPointcut) -> Self {
        Self {
            kind: self.kind | other.kind,
            and_mask: self.and_mask | other.and_mask,
            or_mask: self.or_mask | other.or_mask,
            not_mask: self.not_mask | other.not_mask,
        }
    }

    pub fn accepts(&self, modifiers: Modifiers) -> bool {
        !modifiers.intersects(self.not_mask)
            && modifiers.contains(self.and_mask)
            && (self.or_mask.is_empty() || modifiers.intersects(self.or_mask))
    }
}

impl Pointcut for ModifierPointcut {
    fn kind(&self) -> PointcutKind {
        self.kind
    }

    fn point_matches(&self, target: &MatchTarget<'_>) -> Result<bool> {
        Ok(target
            .member
            .and_then(|member| member.modifiers())
            .is_some_and(|modifiers| self.accepts(modifiers)))
    }
}
