use crate::advice::Advice;

/// A named group of advice declarations
///
/// Advice callbacks usually capture the aspect itself (it is handed over as an
/// `Arc`) so state such as caches lives on the aspect instance.
pub trait Aspect: Send + Sync {
    /// Qualified name, used as the prefix of advisor and pointcut ids
    fn name(&self) -> &str;

    /// Named pointcuts as `(label, expression)`, registered as
    /// `<aspect>-><label>` before the aspect's advice
    fn pointcuts(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Advice declared by the aspect
    fn advices(self: std::sync::Arc<Self>) -> Vec<AspectAdvice>;
}

/// One advice declaration of an aspect
#[derive(Debug, Clone)]
pub struct AspectAdvice {
    pub label: String,
    pub expression: String,
    pub advice: Advice,
}

impl AspectAdvice {
    pub fn new(label: impl Into<String>, expression: impl Into<String>, advice: Advice) -> Self {
        Self {
            label: label.into(),
            expression: expression.into(),
            advice,
        }
    }
}
