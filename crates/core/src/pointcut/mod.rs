//! Pointcuts: predicates selecting join points
//!
//! A pointcut is evaluated in two stages. The class filter decides whether
//! the pointcut can apply to a class (or namespace) at all; the point filter
//! then decides for one member of that class. [`Pointcut::matches`] combines
//! both stages with the kind check and is what callers normally use.

pub mod annotation;
pub mod cflow;
pub mod class_filter;
pub mod glob;
pub mod inherited;
pub mod logical;
pub mod magic;
pub mod modifier;
pub mod name;
pub mod reference;
pub mod return_type;

pub use annotation::AnnotationPointcut;
pub use cflow::CFlowBelowPointcut;
pub use class_filter::{ClassMemberPointcut, InheritancePointcut};
pub use glob::GlobPattern;
pub use inherited::MatchInheritedPointcut;
pub use logical::{AndPointcut, FALSE, FalsePointcut, NotPointcut, OrPointcut, TRUE, TruePointcut};
pub use magic::{CALL_HOOK, MagicMethodPointcut, STATIC_CALL_HOOK};
pub use modifier::ModifierPointcut;
pub use name::NamePointcut;
pub use reference::{NamedPointcuts, PointcutReference};
pub use return_type::ReturnTypePointcut;

use crate::error::Result;
use crate::reflection::{
    ClassReflection, FunctionReflection, MethodReflection, NamespaceReflection, PropertyReflection,
    Reflector,
};
use crate::value::{ObjectRef, Value};
use std::fmt;

bitflags::bitflags! {
    /// Join point kinds a pointcut can claim to match
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PointcutKind: u32 {
        const METHOD = 1;
        const PROPERTY = 1 << 1;
        const CLASS = 1 << 2;
        const TRAIT = 1 << 3;
        const FUNCTION = 1 << 4;
        const INIT = 1 << 5;
        const STATIC_INIT = 1 << 6;
        /// Needs re-evaluation with live call data
        const DYNAMIC = 1 << 8;

        const ALL = Self::METHOD.bits()
            | Self::PROPERTY.bits()
            | Self::CLASS.bits()
            | Self::TRAIT.bits()
            | Self::FUNCTION.bits()
            | Self::INIT.bits()
            | Self::STATIC_INIT.bits();
    }
}

impl PointcutKind {
    pub const NONE: PointcutKind = PointcutKind::empty();

    /// Kind of a conjunction: static kinds intersect, the dynamic marker is kept
    /// if any side carries it
    pub fn conjunction(self, other: PointcutKind) -> PointcutKind {
        (self & other & PointcutKind::ALL) | ((self | other) & PointcutKind::DYNAMIC)
    }

    pub fn is_dynamic(self) -> bool {
        self.contains(PointcutKind::DYNAMIC)
    }
}

/// A join point candidate handed to pointcuts
#[derive(Debug, Clone, Copy)]
pub struct MatchTarget<'a> {
    /// Kind of join point under evaluation; exactly one static kind
    pub kind: PointcutKind,
    /// Class (or namespace, for functions) being woven
    pub context: Reflector<'a>,
    /// Member under evaluation, absent for class-level join points
    pub member: Option<Reflector<'a>>,
    /// Receiver of a live call
    pub instance: Option<&'a ObjectRef>,
    /// Arguments of a live call; present only during dynamic re-evaluation
    pub arguments: Option<&'a [Value]>,
}

impl<'a> MatchTarget<'a> {
    fn new(kind: PointcutKind, context: Reflector<'a>, member: Option<Reflector<'a>>) -> Self {
        Self {
            kind,
            context,
            member,
            instance: None,
            arguments: None,
        }
    }

    /// Class-level evaluation, used for class filters
    pub fn context(context: Reflector<'a>) -> Self {
        Self::new(PointcutKind::CLASS, context, None)
    }

    pub fn class(class: &'a ClassReflection) -> Self {
        Self::context(Reflector::Class(class))
    }

    pub fn method(class: &'a ClassReflection, method: &'a MethodReflection) -> Self {
        Self::new(PointcutKind::METHOD, Reflector::Class(class), Some(Reflector::Method(method)))
    }

    pub fn property(class: &'a ClassReflection, property: &'a PropertyReflection) -> Self {
        Self::new(
            PointcutKind::PROPERTY,
            Reflector::Class(class),
            Some(Reflector::Property(property)),
        )
    }

    pub fn function(namespace: &'a NamespaceReflection, function: &'a FunctionReflection) -> Self {
        Self::new(
            PointcutKind::FUNCTION,
            Reflector::Namespace(namespace),
            Some(Reflector::Function(function)),
        )
    }

    pub fn initialization(class: &'a ClassReflection) -> Self {
        Self::new(PointcutKind::INIT, Reflector::Class(class), None)
    }

    pub fn static_initialization(class: &'a ClassReflection) -> Self {
        Self::new(PointcutKind::STATIC_INIT, Reflector::Class(class), None)
    }

    /// Attach live call data for dynamic re-evaluation
    pub fn with_invocation(mut self, instance: Option<&'a ObjectRef>, arguments: &'a [Value]) -> Self {
        self.instance = instance;
        self.arguments = Some(arguments);
        self
    }

    pub fn is_dynamic(&self) -> bool {
        self.arguments.is_some()
    }

    /// The reflector that names this join point: the member when there is one,
    /// otherwise the context
    pub fn subject(&self) -> Reflector<'a> {
        self.member.unwrap_or(self.context)
    }
}

/// A predicate over join point candidates
pub trait Pointcut: fmt::Debug + Send + Sync {
    /// Union of the join point kinds this pointcut can match
    fn kind(&self) -> PointcutKind;

    /// Whether the pointcut can apply to members of `context` at all
    fn class_filter_matches(&self, _context: Reflector<'_>) -> Result<bool> {
        Ok(true)
    }

    /// Member-level predicate; callers must have checked the kind
    fn point_matches(&self, target: &MatchTarget<'_>) -> Result<bool>;

    /// Full evaluation: kind, class filter, then point filter
    fn matches(&self, target: &MatchTarget<'_>) -> Result<bool> {
        if !self.kind().contains(target.kind) {
            return Ok(false);
        }
        Ok(self.class_filter_matches(target.context)? && self.point_matches(target)?)
    }
}
