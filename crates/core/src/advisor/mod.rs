//! Advisors: a pointcut paired with an advice
//!
//! Advisors come in two flavors. A [`PointcutAdvisor`] is handed a compiled
//! pointcut; a [`LazyPointcutAdvisor`] keeps the expression and compiles it on
//! first use, exactly once.

pub mod aspect;
pub mod container;

pub use aspect::{Aspect, AspectAdvice};
pub use container::{AspectContainer, PointcutSource};

use crate::advice::Advice;
use crate::error::Result;
use crate::parser::PointcutCompiler;
use crate::pointcut::Pointcut;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// Pairs one pointcut with one advice
pub trait Advisor: fmt::Debug + Send + Sync {
    /// Stable identifier of the advisor
    fn id(&self) -> &str;

    /// The compiled pointcut
    fn pointcut(&self) -> Result<Arc<dyn Pointcut>>;

    /// The advice as registered, without runtime matching
    fn raw_advice(&self) -> &Advice;

    /// The advice to bind into interceptor chains
    ///
    /// Advice for a dynamic pointcut re-checks the pointcut against the live
    /// arguments of every call and only runs when it matches.
    fn advice(&self) -> Result<Advice> {
        let pointcut = self.pointcut()?;
        let advice = self.raw_advice().clone();
        if pointcut.kind().is_dynamic() {
            Ok(advice.with_matcher(pointcut))
        } else {
            Ok(advice)
        }
    }
}

/// Advisor built from an already compiled pointcut
#[derive(Debug, Clone)]
pub struct PointcutAdvisor {
    id: String,
    pointcut: Arc<dyn Pointcut>,
    advice: Advice,
}

impl PointcutAdvisor {
    pub fn new(id: impl Into<String>, pointcut: Arc<dyn Pointcut>, advice: Advice) -> Self {
        Self {
            id: id.into(),
            pointcut,
            advice,
        }
    }
}

impl Advisor for PointcutAdvisor {
    fn id(&self) -> &str {
        &self.id
    }

    fn pointcut(&self) -> Result<Arc<dyn Pointcut>> {
        Ok(self.pointcut.clone())
    }

    fn raw_advice(&self) -> &Advice {
        &self.advice
    }
}

/// Advisor compiling its pointcut expression on first access
pub struct LazyPointcutAdvisor {
    id: String,
    expression: String,
    compiler: Arc<dyn PointcutCompiler>,
    pointcut: OnceCell<Arc<dyn Pointcut>>,
    advice: Advice,
}

impl LazyPointcutAdvisor {
    pub fn new(
        id: impl Into<String>,
        expression: impl Into<String>,
        compiler: Arc<dyn PointcutCompiler>,
        advice: Advice,
    ) -> Self {
        Self {
            id: id.into(),
            expression: expression.into(),
            compiler,
            pointcut: OnceCell::new(),
            advice,
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Whether the expression has been compiled yet
    pub fn is_compiled(&self) -> bool {
        self.pointcut.get().is_some()
    }
}

impl Advisor for LazyPointcutAdvisor {
    fn id(&self) -> &str {
        &self.id
    }

    fn pointcut(&self) -> Result<Arc<dyn Pointcut>> {
        self.pointcut
            .get_or_try_init(|| {
                tracing::debug!(advisor = %self.id, expression = %self.expression, "Compiling lazy pointcut");
                self.compiler.compile(&self.expression)
            })
            .cloned()
    }

    fn raw_advice(&self) -> &Advice {
        &self.advice
    }
}

impl fmt::Debug for LazyPointcutAdvisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyPointcutAdvisor")
            .field("id", &self.id)
            .field("expression", &self.expression)
            .field("compiled", &self.is_compiled())
            .field("advice", &self.advice)
            .finish()
    }
}
