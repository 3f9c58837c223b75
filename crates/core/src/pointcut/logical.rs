//! Logical combinators over pointcuts

use super::{MatchTarget, Pointcut, PointcutKind};
use crate::error::Result;
use crate::reflection::Reflector;

/// Matches every join point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TruePointcut;

/// Matches nothing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FalsePointcut;

pub const TRUE: TruePointcut = TruePointcut;
pub const FALSE: FalsePointcut = FalsePointcut;

impl Pointcut for TruePointcut {
    fn kind(&self) -> PointcutKind {
        PointcutKind::ALL
    }

    fn point_matches(&self, _target: &MatchTarget<'_>) -> Result<bool> {
        Ok(true)
    }
}

impl Pointcut for FalsePointcut {
    fn kind(&self) -> PointcutKind {
        PointcutKind::NONE
    }

    fn class_filter_matches(&self, _context: Reflector<'_>) -> Result<bool> {
        Ok(false)
    }

    fn point_matches(&self, _target: &MatchTarget<'_>) -> Result<bool> {
        Ok(false)
    }
}

/// Conjunction; children are evaluated left to right and evaluation stops at
/// the first non-match
#[derive(Debug)]
pub struct AndPointcut {
    kind: PointcutKind,
    children: Vec<Box<dyn Pointcut>>,
}

impl AndPointcut {
    pub fn new(first: Box<dyn Pointcut>, second: Box<dyn Pointcut>) -> Self {
        Self::all(vec![first, second])
    }

    /// Conjunction of every pointcut in `children`; empty means always true
    pub fn all(children: Vec<Box<dyn Pointcut>>) -> Self {
        let kind = children
            .iter()
            .map(|child| child.kind())
            .reduce(PointcutKind::conjunction)
            .unwrap_or(PointcutKind::ALL);
        Self { kind, children }
    }

    pub fn children(&self) -> &[Box<dyn Pointcut>] {
        &self.children
    }
}

impl Pointcut for AndPointcut {
    fn kind(&self) -> PointcutKind {
        self.kind
    }

    fn class_filter_matches(&self, context: Reflector<'_>) -> Result<bool> {
        for child in &self.children {
            if !child.class_filter_matches(context)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn point_matches(&self, target: &MatchTarget<'_>) -> Result<bool> {
        for child in &self.children {
            if !child.matches(target)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Disjunction; evaluation stops at the first match
#[derive(Debug)]
pub struct OrPointcut {
    kind: PointcutKind,
    children: Vec<Box<dyn Pointcut>>,
}

impl OrPointcut {
    pub fn new(first: Box<dyn Pointcut>, second: Box<dyn Pointcut>) -> Self {
        Self::any(vec![first, second])
    }

    /// Disjunction of every pointcut in `children`; empty means never
    pub fn any(children: Vec<Box<dyn Pointcut>>) -> Self {
        let kind = children
            .iter()
            .fold(PointcutKind::NONE, |kind, child| kind | child.kind());
        Self { kind, children }
    }

    pub fn children(&self) -> &[Box<dyn Pointcut>] {
        &self.children
    }
}

impl Pointcut for OrPointcut {
    fn kind(&self) -> PointcutKind {
        self.kind
    }

    fn class_filter_matches(&self, context: Reflector<'_>) -> Result<bool> {
        for child in &self.children {
            if child.class_filter_matches(context)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn point_matches(&self, target: &MatchTarget<'_>) -> Result<bool> {
        for child in &self.children {
            if child.matches(target)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Negation
///
/// A join point outside the wrapped pointcut's kind never matches; a join
/// point in a class rejected by the wrapped class filter does.
#[derive(Debug)]
pub struct NotPointcut {
    inner: Box<dyn Pointcut>,
}

impl NotPointcut {
    pub fn new(inner: Box<dyn Pointcut>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &dyn Pointcut {
        self.inner.as_ref()
    }
}

impl Pointcut for NotPointcut {
    fn kind(&self) -> PointcutKind {
        self.inner.kind()
    }

    fn point_matches(&self, target: &MatchTarget<'_>) -> Result<bool> {
        // A dynamic operand only says "may match" before the call; defer
        // the negation to the call-time recheck
        if self.inner.kind().is_dynamic() && !target.is_dynamic() {
            return Ok(true);
        }
        Ok(!self.inner.matches(target)?)
    }
}
