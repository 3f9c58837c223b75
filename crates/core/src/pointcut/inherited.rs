use super::{MatchTarget, Pointcut, PointcutKind};
use crate::error::Result;
use crate::reflection::Reflector;

/// Matches members the woven class inherits rather than declares
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchInheritedPointcut;

impl Pointcut for MatchInheritedPointcut {
    fn kind(&self) -> PointcutKind {
        PointcutKind::METHOD | PointcutKind::PROPERTY
    }

    fn point_matches(&self, target: &MatchTarget<'_>) -> Result<bool> {
        let Reflector::Class(class) = target.context else {
            return Ok(false);
        };
        let Some(declaring) = target.member.and_then(|member| member.declaring_class()) else {
            return Ok(false);
        };
        Ok(declaring != class.name && class.is_subclass_of(declaring))
    }
}
