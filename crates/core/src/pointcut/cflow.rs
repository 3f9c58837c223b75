use super::{MatchTarget, Pointcut, PointcutKind};
use crate::error::{Error, Result};
use crate::joinpoint::flow;

/// Matches join points reached from within a matching method call
///
/// Statically every join point matches; at call time the pointcut looks at
/// the woven method calls enclosing the current one on this thread.
#[derive(Debug)]
pub struct CFlowBelowPointcut {
    inner: Box<dyn Pointcut>,
}

impl CFlowBelowPointcut {
    pub fn new(inner: Box<dyn Pointcut>) -> Result<Self> {
        if !inner.kind().contains(PointcutKind::METHOD) {
            return Err(Error::ConstructionError(format!(
                "cflowbelow only accepts method pointcuts, got {:?}",
                inner.kind()
            )));
        }
        Ok(Self { inner })
    }
}

impl Pointcut for CFlowBelowPointcut {
    fn kind(&self) -> PointcutKind {
        PointcutKind::ALL | PointcutKind::DYNAMIC
    }

    fn point_matches(&self, target: &MatchTarget<'_>) -> Result<bool> {
        if !target.is_dynamic() {
            return Ok(true);
        }
        // Only method join points push a frame of their own
        for frame in flow::enclosing(target.kind == PointcutKind::METHOD) {
            let Some(method) = frame.class.method(&frame.method) else {
                continue;
            };
            if self.inner.matches(&MatchTarget::method(&frame.class, method))? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointcut::{GlobPattern, NamePointcut};
    use crate::reflection::{ClassReflection, MethodReflection, Modifiers, PropertyReflection};
    use std::sync::Arc;

    fn method_named(name: &str) -> Box<dyn Pointcut> {
        Box::new(NamePointcut::new(PointcutKind::METHOD, GlobPattern::new(name).unwrap()))
    }

    #[test]
    fn test_requires_method_pointcut() {
        let property = Box::new(NamePointcut::new(PointcutKind::PROPERTY, GlobPattern::new("x").unwrap()));
        assert!(matches!(CFlowBelowPointcut::new(property), Err(Error::ConstructionError(_))));
        assert!(CFlowBelowPointcut::new(method_named("x")).is_ok());
    }

    #[test]
    fn test_enclosing_frames() {
        let class = Arc::new(
            ClassReflection::new("Demo\\Controller")
                .with_method(MethodReflection::new("handle", Modifiers::PUBLIC))
                .with_method(MethodReflection::new("render", Modifiers::PUBLIC)),
        );
        let pointcut = CFlowBelowPointcut::new(method_named("handle")).unwrap();
        let render = MatchTarget::method(&class, class.method("render").unwrap());
        assert!(pointcut.matches(&render).unwrap());

        let live = render.with_invocation(None, &[]);
        {
            let _render = flow::enter(class.clone(), "render");
            assert!(!pointcut.matches(&live).unwrap());
        }
        {
            let _handle = flow::enter(class.clone(), "handle");
            let _render = flow::enter(class.clone(), "render");
            assert!(pointcut.matches(&live).unwrap());
        }
        {
            // The current call itself does not count
            let _handle = flow::enter(class.clone(), "handle");
            assert!(!pointcut.matches(&live).unwrap());
        }
    }

    #[test]
    fn test_property_read_inside_matching_method() {
        let class = Arc::new(
            ClassReflection::new("Demo\\Controller")
                .with_method(MethodReflection::new("handle", Modifiers::PUBLIC))
                .with_property(PropertyReflection::new("title", Modifiers::PUBLIC)),
        );
        let pointcut = CFlowBelowPointcut::new(method_named("handle")).unwrap();
        let title = MatchTarget::property(&class, class.property("title").unwrap()).with_invocation(None, &[]);
        assert!(!pointcut.matches(&title).unwrap());

        let _handle = flow::enter(class.clone(), "handle");
        assert!(pointcut.matches(&title).unwrap());
    }
}
