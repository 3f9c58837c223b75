//! Advice: behavior attached to join points

use crate::joinpoint::Invocation;
use crate::pointcut::Pointcut;
use crate::value::{Exception, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// User callback run at a join point
pub type AdviceCallback = Arc<dyn Fn(&mut Invocation<'_>) -> Result<Value, Exception> + Send + Sync>;

/// When an advice runs relative to the advised operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceKind {
    Before,
    /// Runs once the operation completed, whether it succeeded or not
    After,
    /// Runs only when the operation failed
    AfterThrowing,
    /// Wraps the operation and decides whether and how often to proceed
    Around,
}

impl AdviceKind {
    /// Position of the kind in the execution order of a chain
    fn rank(self) -> u8 {
        match self {
            AdviceKind::Before => 0,
            AdviceKind::After | AdviceKind::AfterThrowing => 1,
            AdviceKind::Around => 2,
        }
    }
}

impl fmt::Display for AdviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdviceKind::Before => "before",
            AdviceKind::After => "after",
            AdviceKind::AfterThrowing => "after_throwing",
            AdviceKind::Around => "around",
        };
        write!(f, "{name}")
    }
}

/// A piece of advice
#[derive(Clone)]
pub struct Advice {
    kind: AdviceKind,
    order: Option<i32>,
    aspect: Option<String>,
    callback: AdviceCallback,
    matcher: Option<Arc<dyn Pointcut>>,
}

impl Advice {
    pub fn new<F>(kind: AdviceKind, callback: F) -> Self
    where
        F: Fn(&mut Invocation<'_>) -> Result<Value, Exception> + Send + Sync + 'static,
    {
        Self {
            kind,
            order: None,
            aspect: None,
            callback: Arc::new(callback),
            matcher: None,
        }
    }

    pub fn before<F>(callback: F) -> Self
    where
        F: Fn(&mut Invocation<'_>) -> Result<Value, Exception> + Send + Sync + 'static,
    {
        Self::new(AdviceKind::Before, callback)
    }

    pub fn after<F>(callback: F) -> Self
    where
        F: Fn(&mut Invocation<'_>) -> Result<Value, Exception> + Send + Sync + 'static,
    {
        Self::new(AdviceKind::After, callback)
    }

    pub fn after_throwing<F>(callback: F) -> Self
    where
        F: Fn(&mut Invocation<'_>) -> Result<Value, Exception> + Send + Sync + 'static,
    {
        Self::new(AdviceKind::AfterThrowing, callback)
    }

    pub fn around<F>(callback: F) -> Self
    where
        F: Fn(&mut Invocation<'_>) -> Result<Value, Exception> + Send + Sync + 'static,
    {
        Self::new(AdviceKind::Around, callback)
    }

    /// Explicit position among advice of the same kind; lower runs first
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// Bind the advice to the aspect that declared it
    pub fn for_aspect(mut self, aspect: impl Into<String>) -> Self {
        self.aspect = Some(aspect.into());
        self
    }

    /// Re-check `matcher` with live call data before every run
    pub(crate) fn with_matcher(mut self, matcher: Arc<dyn Pointcut>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn kind(&self) -> AdviceKind {
        self.kind
    }

    pub fn order(&self) -> Option<i32> {
        self.order
    }

    pub fn aspect(&self) -> Option<&str> {
        self.aspect.as_deref()
    }

    /// Pointcut to re-evaluate at call time, for dynamic advice
    pub fn matcher(&self) -> Option<&Arc<dyn Pointcut>> {
        self.matcher.as_ref()
    }

    pub(crate) fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value, Exception> {
        (self.callback)(invocation)
    }
}

impl fmt::Debug for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Advice")
            .field("kind", &self.kind)
            .field("order", &self.order)
            .field("aspect", &self.aspect)
            .field("dynamic", &self.matcher.is_some())
            .finish()
    }
}

/// Sort advice into execution order
///
/// Before advice comes first, then After and AfterThrowing, then Around.
/// Within a group explicit orders ascend (unordered advice counts as 0) and
/// ties keep their registration order.
pub fn sort_advices(advices: &mut [Advice]) {
    advices.sort_by_key(|advice| (advice.kind.rank(), advice.order.unwrap_or(0)));
}
