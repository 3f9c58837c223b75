//! Registry of advisors and named pointcuts

use super::{Advisor, Aspect, LazyPointcutAdvisor, PointcutAdvisor};
use crate::advice::Advice;
use crate::error::{Error, Result};
use crate::parser::{PointcutCompiler, PointcutParser};
use crate::pointcut::{NamedPointcuts, Pointcut};
use crate::reflection::{AnnotationReader, AttributeReader};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What an advisor is registered with: an expression compiled lazily, or a
/// pointcut object used as is
#[derive(Debug, Clone)]
pub enum PointcutSource {
    Expression(String),
    Pointcut(Arc<dyn Pointcut>),
}

impl From<&str> for PointcutSource {
    fn from(expression: &str) -> Self {
        PointcutSource::Expression(expression.to_string())
    }
}

impl From<String> for PointcutSource {
    fn from(expression: String) -> Self {
        PointcutSource::Expression(expression)
    }
}

impl From<Arc<dyn Pointcut>> for PointcutSource {
    fn from(pointcut: Arc<dyn Pointcut>) -> Self {
        PointcutSource::Pointcut(pointcut)
    }
}

/// Holds every advisor of the application
///
/// Populated during configuration and read-only once weaving starts.
/// Advisors are kept in registration order.
pub struct AspectContainer {
    compiler: Arc<dyn PointcutCompiler>,
    named: Arc<NamedPointcuts>,
    advisors: RwLock<Vec<Arc<dyn Advisor>>>,
    next_id: AtomicUsize,
}

impl AspectContainer {
    /// Create a container reading annotations from the class model
    pub fn new() -> Self {
        Self::with_reader(Arc::new(AttributeReader))
    }

    /// Create a container with a custom annotation reader
    pub fn with_reader(reader: Arc<dyn AnnotationReader>) -> Self {
        let named = Arc::new(NamedPointcuts::new());
        let parser = Arc::new(PointcutParser::new(reader, named.clone()));
        Self::with_compiler(parser, named)
    }

    /// Create a container with injected collaborators
    pub fn with_compiler(compiler: Arc<dyn PointcutCompiler>, named: Arc<NamedPointcuts>) -> Self {
        Self {
            compiler,
            named,
            advisors: RwLock::new(Vec::new()),
            next_id: AtomicUsize::new(0),
        }
    }

    pub fn compiler(&self) -> &Arc<dyn PointcutCompiler> {
        &self.compiler
    }

    /// Register an advice for a pointcut and return the advisor id
    ///
    /// Without an explicit id one is generated. Registering an id twice is an
    /// error; the first registration is kept.
    pub fn register(
        &self,
        source: impl Into<PointcutSource>,
        advice: Advice,
        id: Option<&str>,
    ) -> Result<String> {
        let id = match id {
            Some(id) => id.to_string(),
            None => self.generate_id(),
        };
        let advisor: Arc<dyn Advisor> = match source.into() {
            PointcutSource::Expression(expression) => Arc::new(LazyPointcutAdvisor::new(
                id.clone(),
                expression,
                self.compiler.clone(),
                advice,
            )),
            PointcutSource::Pointcut(pointcut) => Arc::new(PointcutAdvisor::new(id.clone(), pointcut, advice)),
        };
        self.register_advisor(advisor)?;
        Ok(id)
    }

    /// Next `advisor.<n>` id not already taken by an explicit registration
    fn generate_id(&self) -> String {
        let advisors = self.advisors.read();
        loop {
            let id = format!("advisor.{}", self.next_id.fetch_add(1, Ordering::Relaxed));
            if !advisors.iter().any(|existing| existing.id() == id) {
                return id;
            }
        }
    }

    /// Register a fully built advisor
    pub fn register_advisor(&self, advisor: Arc<dyn Advisor>) -> Result<()> {
        let mut advisors = self.advisors.write();
        if advisors.iter().any(|existing| existing.id() == advisor.id()) {
            return Err(Error::DuplicateAdvisor(advisor.id().to_string()));
        }
        tracing::debug!(advisor = advisor.id(), "Registered advisor");
        advisors.push(advisor);
        Ok(())
    }

    /// Compile `expression` and store it under `name` for references
    pub fn register_pointcut(&self, name: &str, expression: &str) -> Result<()> {
        if self.named.contains(name) {
            return Err(Error::ConfigError(format!("pointcut `{name}` is already registered")));
        }
        let pointcut = self.compiler.compile(expression)?;
        self.named.insert(name, pointcut);
        Ok(())
    }

    /// Register the named pointcuts and advice of an aspect
    ///
    /// Ids are `<aspect>-><label>`. Returns the advisor ids in declaration
    /// order.
    pub fn register_aspect(&self, aspect: Arc<dyn Aspect>) -> Result<Vec<String>> {
        let name = aspect.name().to_string();
        for (label, expression) in aspect.pointcuts() {
            self.register_pointcut(&format!("{name}->{label}"), &expression)?;
        }

        let mut ids = Vec::new();
        for declaration in aspect.advices() {
            let id = format!("{name}->{}", declaration.label);
            let advice = declaration.advice.for_aspect(name.clone());
            ids.push(self.register(declaration.expression, advice, Some(&id))?);
        }
        tracing::debug!(aspect = %name, advisors = ids.len(), "Registered aspect");
        Ok(ids)
    }

    pub fn advisor(&self, id: &str) -> Result<Arc<dyn Advisor>> {
        self.advisors
            .read()
            .iter()
            .find(|advisor| advisor.id() == id)
            .cloned()
            .ok_or_else(|| Error::UnknownAdvisor(id.to_string()))
    }

    /// Snapshot of every advisor in registration order
    pub fn advisors(&self) -> Vec<Arc<dyn Advisor>> {
        self.advisors.read().clone()
    }

    pub fn pointcut(&self, name: &str) -> Result<Arc<dyn Pointcut>> {
        self.named
            .get(name)
            .ok_or_else(|| Error::UnknownPointcut(name.to_string()))
    }

    pub fn named_pointcuts(&self) -> &Arc<NamedPointcuts> {
        &self.named
    }

    /// Compile every lazy pointcut now, failing on the first broken one
    pub fn warm_up(&self) -> Result<()> {
        for advisor in self.advisors() {
            advisor.pointcut()?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.advisors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AspectContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AspectContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let advisors = self.advisors.read();
        f.debug_struct("AspectContainer")
            .field("advisors", &advisors.iter().map(|a| a.id().to_string()).collect::<Vec<_>>())
            .field("pointcuts", &self.named.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::AspectAdvice;
    use crate::pointcut::{PointcutKind, TRUE};
    use crate::value::Value;

    fn noop() -> Advice {
        Advice::before(|_| Ok(Value::Null))
    }

    struct LoggingAspect;

    impl Aspect for LoggingAspect {
        fn name(&self) -> &str {
            "Demo\\Aspect\\LoggingAspect"
        }

        fn pointcuts(&self) -> Vec<(String, String)> {
            vec![("publicMethods".into(), "execution(public Demo\\**->*(*))".into())]
        }

        fn advices(self: Arc<Self>) -> Vec<AspectAdvice> {
            vec![
                AspectAdvice::new("beforeMethod", "Demo\\Aspect\\LoggingAspect->publicMethods", noop()),
                AspectAdvice::new("afterMethod", "execution(public Demo\\**->*(*))", noop()),
            ]
        }
    }

    #[test]
    fn test_register_generates_ids() {
        let container = AspectContainer::new();
        let first = container.register("within(Demo\\*)", noop(), None).unwrap();
        let second = container.register("within(Demo\\*)", noop(), None).unwrap();
        assert_ne!(first, second);
        assert_eq!(container.len(), 2);
    }

    #[test]
    fn test_generated_ids_skip_explicit_ones() {
        let container = AspectContainer::new();
        container.register("within(Demo\\*)", noop(), Some("advisor.0")).unwrap();
        container.register("within(Demo\\*)", noop(), Some("advisor.1")).unwrap();
        let generated = container.register("within(Demo\\*)", noop(), None).unwrap();
        assert_eq!(generated, "advisor.2");
        assert_eq!(container.len(), 3);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let container = AspectContainer::new();
        container.register("within(Demo\\*)", noop(), Some("log")).unwrap();
        let err = container.register("within(Other\\*)", noop(), Some("log")).unwrap_err();
        assert!(matches!(err, Error::DuplicateAdvisor(id) if id == "log"));
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_expression_is_compiled_lazily() {
        let container = AspectContainer::new();
        container.register("execution(private Demo->x(*))", noop(), Some("broken")).unwrap();
        assert!(container.advisor("broken").is_ok());
        assert!(matches!(container.warm_up(), Err(Error::ParseError { .. })));
    }

    #[test]
    fn test_pointcut_object_registration() {
        let container = AspectContainer::new();
        let pointcut: Arc<dyn Pointcut> = Arc::new(TRUE);
        container.register(pointcut, noop(), Some("everything")).unwrap();
        let advisor = container.advisor("everything").unwrap();
        assert_eq!(advisor.pointcut().unwrap().kind(), PointcutKind::ALL);
        assert!(matches!(container.advisor("missing"), Err(Error::UnknownAdvisor(_))));
    }

    #[test]
    fn test_named_pointcuts() {
        let container = AspectContainer::new();
        container.register_pointcut("Demo->all", "within(Demo\\**)").unwrap();
        assert!(container.pointcut("Demo->all").is_ok());
        assert!(matches!(container.pointcut("Demo->none"), Err(Error::UnknownPointcut(_))));
        assert!(matches!(
            container.register_pointcut("Demo->all", "within(Other\\**)"),
            Err(Error::ConfigError(_))
        ));

        container.register("Demo->all", noop(), Some("by-reference")).unwrap();
        container.warm_up().unwrap();
    }

    #[test]
    fn test_register_aspect() {
        let container = AspectContainer::new();
        let ids = container.register_aspect(Arc::new(LoggingAspect)).unwrap();
        assert_eq!(
            ids,
            vec![
                "Demo\\Aspect\\LoggingAspect->beforeMethod".to_string(),
                "Demo\\Aspect\\LoggingAspect->afterMethod".to_string(),
            ]
        );
        container.warm_up().unwrap();

        let advisor = container.advisor(&ids[0]).unwrap();
        assert_eq!(advisor.raw_advice().aspect(), Some("Demo\\Aspect\\LoggingAspect"));
        assert!(container.pointcut("Demo\\Aspect\\LoggingAspect->publicMethods").is_ok());
    }
}
