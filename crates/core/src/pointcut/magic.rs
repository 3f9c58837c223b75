//! Interception of calls routed through the magic dispatch hooks

use super::{GlobPattern, MatchTarget, ModifierPointcut, Pointcut, PointcutKind};
use crate::error::Result;
use crate::value::Value;

/// Hook receiving calls to undefined instance methods
pub const CALL_HOOK: &str = "__call";
/// Hook receiving calls to undefined static methods
pub const STATIC_CALL_HOOK: &str = "__callStatic";

/// Matches calls to undefined methods by the name actually invoked
///
/// At weaving time only the dispatch hooks themselves can match. At call time
/// the first argument handed to the hook (the invoked method name) is tested
/// against the pattern.
#[derive(Debug, Clone)]
pub struct MagicMethodPointcut {
    pattern: GlobPattern,
    modifiers: ModifierPointcut,
}

impl MagicMethodPointcut {
    pub fn new(pattern: GlobPattern, modifiers: ModifierPointcut) -> Self {
        Self { pattern, modifiers }
    }
}

impl Pointcut for MagicMethodPointcut {
    fn kind(&self) -> PointcutKind {
        PointcutKind::METHOD | PointcutKind::DYNAMIC
    }

    fn point_matches(&self, target: &MatchTarget<'_>) -> Result<bool> {
        let Some(member) = target.member else {
            return Ok(false);
        };
        if !matches!(member.name(), CALL_HOOK | STATIC_CALL_HOOK) {
            return Ok(false);
        }
        if !self.modifiers.point_matches(target)? {
            return Ok(false);
        }

        match target.arguments {
            None => Ok(true),
            Some([Value::Str(invoked), ..]) => Ok(self.pattern.is_match(invoked)),
            Some(_) => Ok(false),
        }
    }
}
