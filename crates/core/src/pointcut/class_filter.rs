//! Class-level filtering

use super::{MatchTarget, Pointcut, PointcutKind};
use crate::error::Result;
use crate::reflection::Reflector;

/// Matches a class that is the named class, one of its subclasses, or an
/// implementor of the named interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritancePointcut {
    parent: String,
}

impl InheritancePointcut {
    pub fn new(parent: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
        }
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }
}

impl Pointcut for InheritancePointcut {
    fn kind(&self) -> PointcutKind {
        PointcutKind::CLASS
    }

    fn point_matches(&self, target: &MatchTarget<'_>) -> Result<bool> {
        let Reflector::Class(class) = target.context else {
            return Ok(false);
        };
        Ok(class.name == self.parent
            || class.is_subclass_of(&self.parent)
            || class.implements_interface(&self.parent))
    }
}

/// A member pointcut guarded by a class filter
///
/// The class filter is evaluated against the context of the join point (the
/// class, or the namespace for functions); the member pointcut against the
/// join point itself.
#[derive(Debug)]
pub struct ClassMemberPointcut {
    kind: PointcutKind,
    class_filter: Box<dyn Pointcut>,
    member: Box<dyn Pointcut>,
}

impl ClassMemberPointcut {
    pub fn new(kind: PointcutKind, class_filter: Box<dyn Pointcut>, member: Box<dyn Pointcut>) -> Self {
        Self {
            kind: kind.conjunction(member.kind()),
            class_filter,
            member,
        }
    }

    pub fn class_filter(&self) -> &dyn Pointcut {
        self.class_filter.as_ref()
    }

    pub fn member(&self) -> &dyn Pointcut {
        self.member.as_ref()
    }
}

impl Pointcut for ClassMemberPointcut {
    fn kind(&self) -> PointcutKind {
        self.kind
    }

    fn class_filter_matches(&self, context: Reflector<'_>) -> Result<bool> {
        self.class_filter.matches(&MatchTarget::context(context))
    }

    fn point_matches(&self, target: &MatchTarget<'_>) -> Result<bool> {
        self.member.matches(target)
    }
}
