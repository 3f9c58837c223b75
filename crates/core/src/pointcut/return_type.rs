use super::{GlobPattern, MatchTarget, Pointcut, PointcutKind};
use crate::error::Result;

/// Matches the declared return type of methods and functions
#[derive(Debug, Clone)]
pub struct ReturnTypePointcut {
    pattern: GlobPattern,
}

impl ReturnTypePointcut {
    pub fn new(pattern: GlobPattern) -> Self {
        Self { pattern }
    }
}

impl Pointcut for ReturnTypePointcut {
    fn kind(&self) -> PointcutKind {
        PointcutKind::METHOD | PointcutKind::FUNCTION
    }

    fn point_matches(&self, target: &MatchTarget<'_>) -> Result<bool> {
        Ok(target
            .member
            .and_then(|member| member.return_type())
            .is_some_and(|return_type| self.pattern.is_match(return_type)))
    }
}
