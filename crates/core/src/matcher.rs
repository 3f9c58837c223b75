//! Weaving-time advice matching
//!
//! Runs every advisor against every member of a class and groups the matching
//! advice by join point key. The result is what the weaver turns into
//! interceptor chains.

use crate::advice::{Advice, sort_advices};
use crate::advisor::Advisor;
use crate::error::Result;
use crate::joinpoint::JoinpointId;
use crate::pointcut::{MatchTarget, Pointcut};
use crate::reflection::{ClassReflection, Modifiers, NamespaceReflection, Reflector};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Advice lists keyed by join point, each sorted in execution order
pub type AdviceMap = BTreeMap<JoinpointId, Vec<Advice>>;

/// Matches advisors against class and namespace models
#[derive(Debug, Clone, Default)]
pub struct AdviceMatcher {
    intercept_functions: bool,
}

impl AdviceMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable function join points; off by default
    pub fn with_function_interception(mut self, enabled: bool) -> Self {
        self.intercept_functions = enabled;
        self
    }

    pub fn intercepts_functions(&self) -> bool {
        self.intercept_functions
    }

    /// Collect the advice of every advisor matching a member of `class`
    ///
    /// Interfaces produce nothing, as do abstract and private methods and
    /// static or private properties. A pointcut failing to evaluate aborts
    /// matching for the whole class.
    pub fn advices_for_class(&self, class: &ClassReflection, advisors: &[Arc<dyn Advisor>]) -> Result<AdviceMap> {
        let mut map = AdviceMap::new();
        if class.is_interface {
            return Ok(map);
        }

        for advisor in advisors {
            let pointcut = advisor.pointcut()?;
            if !pointcut.class_filter_matches(Reflector::Class(class))? {
                continue;
            }

            for method in &class.methods {
                if method.is_abstract() || method.modifiers.contains(Modifiers::PRIVATE) {
                    continue;
                }
                let id = if method.is_static() {
                    JoinpointId::static_method(&method.name)
                } else {
                    JoinpointId::method(&method.name)
                };
                collect(&mut map, id, advisor.as_ref(), &*pointcut, MatchTarget::method(class, method))?;
            }

            for property in &class.properties {
                if property.is_static() || property.modifiers.contains(Modifiers::PRIVATE) {
                    continue;
                }
                let id = JoinpointId::property(&property.name);
                collect(&mut map, id, advisor.as_ref(), &*pointcut, MatchTarget::property(class, property))?;
            }

            collect(
                &mut map,
                JoinpointId::initialization(),
                advisor.as_ref(),
                &*pointcut,
                MatchTarget::initialization(class),
            )?;
            collect(
                &mut map,
                JoinpointId::static_initialization(),
                advisor.as_ref(),
                &*pointcut,
                MatchTarget::static_initialization(class),
            )?;
        }

        map.values_mut().for_each(|advices| sort_advices(advices));
        Ok(map)
    }

    /// Collect the advice for plain functions of `namespace`
    ///
    /// Empty unless function interception is enabled.
    pub fn advices_for_functions(
        &self,
        namespace: &NamespaceReflection,
        advisors: &[Arc<dyn Advisor>],
    ) -> Result<AdviceMap> {
        let mut map = AdviceMap::new();
        if !self.intercept_functions {
            return Ok(map);
        }

        for advisor in advisors {
            let pointcut = advisor.pointcut()?;
            if !pointcut.class_filter_matches(Reflector::Namespace(namespace))? {
                continue;
            }
            for function in &namespace.functions {
                let id = JoinpointId::function(&function.name);
                collect(
                    &mut map,
                    id,
                    advisor.as_ref(),
                    &*pointcut,
                    MatchTarget::function(namespace, function),
                )?;
            }
        }

        map.values_mut().for_each(|advices| sort_advices(advices));
        Ok(map)
    }
}

/// Append the advisor's advice under `id` when the pointcut selects `target`;
/// the class filter has already been checked
fn collect(
    map: &mut AdviceMap,
    id: JoinpointId,
    advisor: &dyn Advisor,
    pointcut: &dyn Pointcut,
    target: MatchTarget<'_>,
) -> Result<()> {
    if !pointcut.kind().contains(target.kind) || !pointcut.point_matches(&target)? {
        return Ok(());
    }
    tracing::debug!(advisor = advisor.id(), joinpoint = %id, context = target.context.name(), "Matched join point");
    map.entry(id).or_default().push(advisor.advice()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::AdviceKind;
    use crate::advisor::{AspectContainer, PointcutAdvisor};
    use crate::error::Error;
    use crate::pointcut::{
        ClassMemberPointcut, GlobPattern, InheritancePointcut, NamePointcut, PointcutKind, TRUE,
    };
    use crate::reflection::{
        AnnotationReader, AnnotationValue, FunctionReflection, MethodReflection, PropertyReflection,
    };
    use crate::value::Value;

    fn noop(kind: AdviceKind) -> Advice {
        Advice::new(kind, |_| Ok(Value::Null))
    }

    fn example() -> ClassReflection {
        ClassReflection::new("Demo\\Example")
            .with_method(MethodReflection::new("hello", Modifiers::PUBLIC))
            .with_method(MethodReflection::new("secret", Modifiers::PRIVATE))
            .with_method(MethodReflection::new("create", Modifiers::PUBLIC | Modifiers::STATIC))
            .with_method(MethodReflection::new("template", Modifiers::PROTECTED | Modifiers::ABSTRACT))
            .with_property(PropertyReflection::new("name", Modifiers::PUBLIC))
            .with_property(PropertyReflection::new("counter", Modifiers::PUBLIC | Modifiers::STATIC))
    }

    fn container(registrations: &[(&str, AdviceKind)]) -> AspectContainer {
        let container = AspectContainer::new();
        for (expression, kind) in registrations {
            container.register(*expression, noop(*kind), None).unwrap();
        }
        container
    }

    fn keys(map: &AdviceMap) -> Vec<String> {
        map.keys().map(ToString::to_string).collect()
    }

    #[test]
    fn test_no_advisors_yields_empty_map() {
        let map = AdviceMatcher::new().advices_for_class(&example(), &[]).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_member_keys() {
        let container = container(&[
            ("execution(public Demo\\Example->*(*))", AdviceKind::Before),
            ("execution(public Demo\\Example::*(*))", AdviceKind::Before),
            ("access(public Demo\\Example->*)", AdviceKind::Around),
            ("initialization(Demo\\*)", AdviceKind::After),
            ("staticinitialization(Demo\\*)", AdviceKind::After),
        ]);
        let map = AdviceMatcher::new()
            .advices_for_class(&example(), &container.advisors())
            .unwrap();
        assert_eq!(
            keys(&map),
            vec!["method:hello", "static:create", "property:name", "init:root", "staticinit:root"]
        );
    }

    #[test]
    fn test_protected_members_are_advised() {
        let class = example()
            .with_method(MethodReflection::new("validate", Modifiers::PROTECTED))
            .with_property(PropertyReflection::new("cache", Modifiers::PROTECTED));
        let container = container(&[
            ("execution(Demo\\Example->*(*))", AdviceKind::Before),
            ("access(protected Demo\\Example->*)", AdviceKind::After),
        ]);
        let map = AdviceMatcher::new()
            .advices_for_class(&class, &container.advisors())
            .unwrap();
        insta::assert_snapshot!(keys(&map).join("\n"), @r"
        method:hello
        method:validate
        property:cache
        ");
    }

    #[test]
    fn test_private_and_abstract_methods_are_skipped() {
        let container = container(&[("within(Demo\\Example)", AdviceKind::Before)]);
        let map = AdviceMatcher::new()
            .advices_for_class(&example(), &container.advisors())
            .unwrap();
        let keys = keys(&map);
        assert!(!keys.contains(&"method:secret".to_string()));
        assert!(!keys.contains(&"method:template".to_string()));
        assert!(!keys.contains(&"property:counter".to_string()));
        assert!(keys.contains(&"method:hello".to_string()));
    }

    #[test]
    fn test_interfaces_are_not_woven() {
        let interface = ClassReflection::new("Demo\\Greeter")
            .interface()
            .with_method(MethodReflection::new("hello", Modifiers::PUBLIC | Modifiers::ABSTRACT));
        let container = container(&[("within(Demo\\**)", AdviceKind::Before)]);
        let map = AdviceMatcher::new()
            .advices_for_class(&interface, &container.advisors())
            .unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_lists_are_sorted() {
        let container = AspectContainer::new();
        let expression = "execution(public Demo\\Example->hello(*))";
        container.register(expression, noop(AdviceKind::Around), None).unwrap();
        container.register(expression, noop(AdviceKind::After), None).unwrap();
        container.register(expression, noop(AdviceKind::Before).with_order(4), None).unwrap();
        container.register(expression, noop(AdviceKind::Before).with_order(1), None).unwrap();

        let map = AdviceMatcher::new()
            .advices_for_class(&example(), &container.advisors())
            .unwrap();
        let advices = &map[&JoinpointId::method("hello")];
        let order: Vec<_> = advices.iter().map(|a| (a.kind(), a.order())).collect();
        assert_eq!(
            order,
            vec![
                (AdviceKind::Before, Some(1)),
                (AdviceKind::Before, Some(4)),
                (AdviceKind::After, None),
                (AdviceKind::Around, None),
            ]
        );
    }

    #[test]
    fn test_class_filter_gating() {
        let hello = || -> Box<dyn Pointcut> {
            Box::new(NamePointcut::new(PointcutKind::METHOD, GlobPattern::new("hello").unwrap()))
        };
        let anywhere: Arc<dyn Advisor> = Arc::new(PointcutAdvisor::new(
            "anywhere",
            Arc::new(ClassMemberPointcut::new(PointcutKind::METHOD, Box::new(TRUE), hello())),
            noop(AdviceKind::Before),
        ));
        let inherited: Arc<dyn Advisor> = Arc::new(PointcutAdvisor::new(
            "inherited",
            Arc::new(ClassMemberPointcut::new(
                PointcutKind::METHOD,
                Box::new(InheritancePointcut::new("Demo\\Base")),
                hello(),
            )),
            noop(AdviceKind::After),
        ));

        let map = AdviceMatcher::new()
            .advices_for_class(&example(), &[anywhere, inherited])
            .unwrap();
        let advices = &map[&JoinpointId::method("hello")];
        assert_eq!(advices.len(), 1);
        assert_eq!(advices[0].kind(), AdviceKind::Before);
    }

    #[derive(Debug)]
    struct FailingReader;

    impl AnnotationReader for FailingReader {
        fn annotation(&self, _reflector: Reflector<'_>, name: &str) -> Result<Option<AnnotationValue>> {
            Err(Error::MatchError(format!("cannot read `{name}`")))
        }
    }

    #[test]
    fn test_match_errors_propagate() {
        let container = AspectContainer::with_reader(Arc::new(FailingReader));
        container
            .register("@execution(Demo\\Cacheable)", noop(AdviceKind::Around), None)
            .unwrap();
        let err = AdviceMatcher::new()
            .advices_for_class(&example(), &container.advisors())
            .unwrap_err();
        assert!(matches!(err, Error::MatchError(_)));
    }

    #[test]
    fn test_functions_need_interception_enabled() {
        let namespace = NamespaceReflection::new("Demo\\Util")
            .with_function(FunctionReflection::new("strlen"))
            .with_function(FunctionReflection::new("array_map"));
        let container = container(&[("execution(Demo\\Util\\str*(*))", AdviceKind::Before)]);

        let disabled = AdviceMatcher::new()
            .advices_for_functions(&namespace, &container.advisors())
            .unwrap();
        assert!(disabled.is_empty());

        let enabled = AdviceMatcher::new()
            .with_function_interception(true)
            .advices_for_functions(&namespace, &container.advisors())
            .unwrap();
        assert_eq!(keys(&enabled), vec!["func:strlen"]);
    }
}
