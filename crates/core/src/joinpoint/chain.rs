use super::flow::{self, FrameGuard};
use super::{AccessType, Invocation, JoinpointContext, JoinpointId, JoinpointType};
use crate::advice::{Advice, AdviceKind, sort_advices};
use crate::pointcut::MatchTarget;
use crate::value::{Exception, ObjectRef, Value};
use std::fmt;
use std::sync::Arc;

/// The real operation behind a join point: method body, field access,
/// function body or constructor
pub type Operation = Arc<dyn Fn(&Invocation<'_>) -> Result<Value, Exception> + Send + Sync>;

/// Dispatches one join point through its advice
///
/// Immutable once built. Execution order for every call is: Before advice,
/// then Around advice nested around the real operation, then After advice
/// (AfterThrowing only while the outcome is an exception).
pub struct InterceptorChain {
    joinpoint: JoinpointId,
    context: JoinpointContext,
    befores: Vec<Advice>,
    afters: Vec<Advice>,
    arounds: Vec<Advice>,
    operation: Operation,
}

impl InterceptorChain {
    pub fn new(
        joinpoint: JoinpointId,
        context: JoinpointContext,
        mut advices: Vec<Advice>,
        operation: Operation,
    ) -> Self {
        sort_advices(&mut advices);

        let mut befores = Vec::new();
        let mut afters = Vec::new();
        let mut arounds = Vec::new();
        for advice in advices {
            match advice.kind() {
                AdviceKind::Before => befores.push(advice),
                AdviceKind::After | AdviceKind::AfterThrowing => afters.push(advice),
                AdviceKind::Around => arounds.push(advice),
            }
        }

        Self {
            joinpoint,
            context,
            befores,
            afters,
            arounds,
            operation,
        }
    }

    pub fn joinpoint(&self) -> &JoinpointId {
        &self.joinpoint
    }

    pub fn context(&self) -> &JoinpointContext {
        &self.context
    }

    /// Advice in execution order
    pub fn advices(&self) -> impl Iterator<Item = &Advice> {
        self.befores.iter().chain(&self.afters).chain(&self.arounds)
    }

    pub fn is_advised(&self) -> bool {
        !(self.befores.is_empty() && self.afters.is_empty() && self.arounds.is_empty())
    }

    /// Call a method, function or constructor through the chain
    pub fn invoke(&self, this: Option<ObjectRef>, arguments: Vec<Value>) -> Result<Value, Exception> {
        self.run(Invocation::new(self, this, arguments, None))
    }

    /// Read or write a field through the chain; `value` is the value to write
    pub fn access(&self, this: ObjectRef, access: AccessType, value: Option<Value>) -> Result<Value, Exception> {
        let arguments = value.into_iter().collect();
        self.run(Invocation::new(self, Some(this), arguments, Some(access)))
    }

    fn run(&self, mut invocation: Invocation<'_>) -> Result<Value, Exception> {
        let _frame = self.enter_frame();

        for advice in &self.befores {
            if invocation.applies(advice)? {
                tracing::trace!(joinpoint = %self.joinpoint, "before");
                advice.invoke(&mut invocation)?;
            }
        }

        let outcome = invocation.proceed();
        invocation.set_outcome(outcome);

        for advice in &self.afters {
            if advice.kind() == AdviceKind::AfterThrowing && invocation.exception().is_none() {
                continue;
            }
            let result = match invocation.applies(advice) {
                Ok(true) => {
                    tracing::trace!(joinpoint = %self.joinpoint, kind = %advice.kind(), "after");
                    advice.invoke(&mut invocation)
                }
                Ok(false) => continue,
                Err(exception) => Err(exception),
            };
            if let Err(exception) = result {
                invocation.set_outcome(Err(exception));
            }
        }

        invocation.take_outcome()
    }

    fn enter_frame(&self) -> Option<FrameGuard> {
        if !self.joinpoint.is_method() {
            return None;
        }
        let class = self.context.class()?;
        Some(flow::enter(class.clone(), self.joinpoint.name()))
    }

    pub(crate) fn arounds(&self) -> &[Advice] {
        &self.arounds
    }

    pub(crate) fn call_operation(&self, invocation: &Invocation<'_>) -> Result<Value, Exception> {
        (self.operation)(invocation)
    }

    pub(crate) fn creates_instance(&self) -> bool {
        self.joinpoint.kind() == JoinpointType::Initialization
    }

    /// Evaluate `f` against the static description of this join point;
    /// `None` when the member is missing from the class model
    pub(crate) fn with_match_target<R>(&self, f: impl FnOnce(MatchTarget<'_>) -> R) -> Option<R> {
        let name = self.joinpoint.name();
        let target = match (&self.context, self.joinpoint.kind()) {
            (JoinpointContext::Class(class), JoinpointType::Method | JoinpointType::StaticMethod) => {
                MatchTarget::method(class, class.method(name)?)
            }
            (JoinpointContext::Class(class), JoinpointType::Property) => {
                MatchTarget::property(class, class.property(name)?)
            }
            (JoinpointContext::Class(class), JoinpointType::Initialization) => {
                MatchTarget::initialization(class)
            }
            (JoinpointContext::Class(class), JoinpointType::StaticInitialization) => {
                MatchTarget::static_initialization(class)
            }
            (JoinpointContext::Namespace(namespace), JoinpointType::Function) => {
                MatchTarget::function(namespace, namespace.function(name)?)
            }
            _ => return None,
        };
        Some(f(target))
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("joinpoint", &self.joinpoint)
            .field("context", &self.context.name())
            .field("befores", &self.befores.len())
            .field("afters", &self.afters.len())
            .field("arounds", &self.arounds.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointcut::{GlobPattern, MagicMethodPointcut, ModifierPointcut, PointcutKind};
    use crate::reflection::{ClassReflection, MethodReflection, Modifiers};
    use crate::value::Object;
    use parking_lot::Mutex;

    type Recorder = Arc<Mutex<Vec<String>>>;

    fn recorder() -> Recorder {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn mark(recorder: &Recorder, marker: &str) {
        recorder.lock().push(marker.to_string());
    }

    fn class() -> Arc<ClassReflection> {
        Arc::new(
            ClassReflection::new("Demo\\Example")
                .with_method(MethodReflection::new("hello", Modifiers::PUBLIC))
                .with_method(MethodReflection::new("__call", Modifiers::PUBLIC)),
        )
    }

    fn recording_advice(kind: AdviceKind, recorder: &Recorder, marker: &str) -> Advice {
        let recorder = recorder.clone();
        let marker = marker.to_string();
        Advice::new(kind, move |_| {
            mark(&recorder, &marker);
            Ok(Value::Null)
        })
    }

    fn operation(recorder: &Recorder, fail: bool) -> Operation {
        let recorder = recorder.clone();
        Arc::new(move |_| {
            mark(&recorder, "invocation");
            if fail {
                Err(Exception::new("RuntimeException", "boom"))
            } else {
                Ok(Value::from("real"))
            }
        })
    }

    fn chain(advices: Vec<Advice>, operation: Operation) -> InterceptorChain {
        InterceptorChain::new(
            JoinpointId::method("hello"),
            JoinpointContext::Class(class()),
            advices,
            operation,
        )
    }

    #[test]
    fn test_unadvised_chain_calls_operation() {
        let recorder = recorder();
        let chain = chain(vec![], operation(&recorder, false));
        assert!(!chain.is_advised());
        assert_eq!(chain.invoke(None, vec![]).unwrap(), Value::from("real"));
        assert_eq!(*recorder.lock(), vec!["invocation"]);
    }

    #[test]
    fn test_execution_order() {
        let recorder = recorder();
        let around = {
            let recorder = recorder.clone();
            Advice::around(move |invocation| {
                mark(&recorder, "around:enter");
                let result = invocation.proceed();
                mark(&recorder, "around:exit");
                result
            })
        };
        let chain = chain(
            vec![
                recording_advice(AdviceKind::After, &recorder, "after"),
                around,
                recording_advice(AdviceKind::Before, &recorder, "before"),
            ],
            operation(&recorder, false),
        );

        assert_eq!(chain.invoke(None, vec![]).unwrap(), Value::from("real"));
        assert_eq!(
            *recorder.lock(),
            vec!["before", "around:enter", "invocation", "around:exit", "after"]
        );
    }

    #[test]
    fn test_around_without_proceed_short_circuits() {
        let recorder = recorder();
        let around = {
            let recorder = recorder.clone();
            Advice::around(move |_| {
                mark(&recorder, "advice");
                Ok(Value::from("from advice"))
            })
        };
        let chain = chain(vec![around], operation(&recorder, false));

        assert_eq!(chain.invoke(None, vec![]).unwrap(), Value::from("from advice"));
        assert_eq!(*recorder.lock(), vec!["advice"]);
    }

    #[test]
    fn test_after_runs_on_exception() {
        let recorder = recorder();
        let chain = chain(
            vec![recording_advice(AdviceKind::After, &recorder, "advice")],
            operation(&recorder, true),
        );

        let err = chain.invoke(None, vec![]).unwrap_err();
        assert_eq!(err.class, "RuntimeException");
        assert_eq!(*recorder.lock(), vec!["invocation", "advice"]);
    }

    #[test]
    fn test_after_throwing_skipped_without_exception() {
        let recorder = recorder();
        let chain = chain(
            vec![recording_advice(AdviceKind::AfterThrowing, &recorder, "advice")],
            operation(&recorder, false),
        );

        chain.invoke(None, vec![]).unwrap();
        assert_eq!(*recorder.lock(), vec!["invocation"]);
    }

    #[test]
    fn test_after_throwing_sees_exception_and_rethrows() {
        let recorder = recorder();
        let seen = recorder.clone();
        let advice = Advice::after_throwing(move |invocation| {
            let class = invocation.exception().map(|e| e.class.clone()).unwrap_or_default();
            mark(&seen, &format!("caught {class}"));
            Ok(Value::Null)
        });
        let chain = chain(vec![advice], operation(&recorder, true));

        assert!(chain.invoke(None, vec![]).is_err());
        assert_eq!(*recorder.lock(), vec!["invocation", "caught RuntimeException"]);
    }

    #[test]
    fn test_after_advice_can_recover() {
        let recorder = recorder();
        let advice = Advice::after_throwing(|invocation| {
            invocation.recover(Value::from("fallback"));
            Ok(Value::Null)
        });
        let chain = chain(vec![advice], operation(&recorder, true));
        assert_eq!(chain.invoke(None, vec![]).unwrap(), Value::from("fallback"));
    }

    #[test]
    fn test_around_can_swallow_exception() {
        let recorder = recorder();
        let advice = Advice::around(|invocation| invocation.proceed().or(Ok(Value::from(0))));
        let chain = chain(vec![advice], operation(&recorder, true));
        assert_eq!(chain.invoke(None, vec![]).unwrap(), Value::from(0));
    }

    #[test]
    fn test_before_exception_vetoes_call() {
        let recorder = recorder();
        let veto = Advice::before(|_| Err(Exception::new("AccessDenied", "not allowed")));
        let chain = chain(
            vec![veto, recording_advice(AdviceKind::After, &recorder, "after")],
            operation(&recorder, false),
        );

        let err = chain.invoke(None, vec![]).unwrap_err();
        assert_eq!(err.class, "AccessDenied");
        assert!(recorder.lock().is_empty());
    }

    #[test]
    fn test_after_exception_replaces_result() {
        let recorder = recorder();
        let failing = Advice::after(|_| Err(Exception::new("LogicException", "after failed")));
        let chain = chain(vec![failing], operation(&recorder, false));
        assert_eq!(chain.invoke(None, vec![]).unwrap_err().class, "LogicException");
    }

    #[test]
    fn test_nested_arounds_and_repeated_proceed() {
        let recorder = recorder();
        let outer = {
            let recorder = recorder.clone();
            Advice::around(move |invocation| {
                mark(&recorder, "outer");
                invocation.proceed()?;
                invocation.proceed()
            })
            .with_order(1)
        };
        let inner = {
            let recorder = recorder.clone();
            Advice::around(move |invocation| {
                mark(&recorder, "inner");
                invocation.proceed()
            })
            .with_order(2)
        };
        let chain = chain(vec![inner, outer], operation(&recorder, false));

        chain.invoke(None, vec![]).unwrap();
        assert_eq!(
            *recorder.lock(),
            vec!["outer", "inner", "invocation", "inner", "invocation"]
        );
    }

    #[test]
    fn test_around_rewrites_arguments() {
        let advice = Advice::around(|invocation| {
            invocation.arguments_mut()[0] = Value::from("rewritten");
            invocation.proceed()
        });
        let echo: Operation = Arc::new(|invocation| Ok(invocation.arguments()[0].clone()));
        let chain = chain(vec![advice], echo);
        assert_eq!(chain.invoke(None, vec![Value::from("x")]).unwrap(), Value::from("rewritten"));
    }

    #[test]
    fn test_recursive_calls_do_not_share_cursor() {
        let slot: Arc<once_cell::sync::OnceCell<Arc<InterceptorChain>>> = Arc::default();
        let calls = recorder();

        let around = {
            let calls = calls.clone();
            Advice::around(move |invocation| {
                mark(&calls, "around");
                invocation.proceed()
            })
        };
        let factorial: Operation = {
            let slot = slot.clone();
            Arc::new(move |invocation| {
                let n = invocation.arguments()[0].as_int().unwrap_or(0);
                if n <= 1 {
                    return Ok(Value::from(1));
                }
                let chain = slot.get().ok_or_else(|| Exception::new("Error", "unbound"))?;
                let rest = chain.invoke(None, vec![Value::from(n - 1)])?;
                Ok(Value::from(n * rest.as_int().unwrap_or(0)))
            })
        };
        let chain = Arc::new(chain(vec![around], factorial));
        slot.set(chain.clone()).unwrap();

        assert_eq!(chain.invoke(None, vec![Value::from(5)]).unwrap(), Value::from(120));
        assert_eq!(calls.lock().len(), 5);
    }

    #[test]
    fn test_constructor_has_no_this_until_created() {
        let recorder = recorder();
        let observed = recorder.clone();
        let around = Advice::around(move |invocation| {
            mark(&observed, &format!("before: {}", invocation.this().is_some()));
            let result = invocation.proceed();
            mark(&observed, &format!("after: {}", invocation.this().is_some()));
            result
        });
        let seen = recorder.clone();
        let before = Advice::before(move |invocation| {
            mark(&seen, &format!("this: {}", invocation.this().is_some()));
            Ok(Value::Null)
        });
        let constructor: Operation = Arc::new(|_| Ok(Value::from(Object::new("Demo\\Example"))));
        let chain = InterceptorChain::new(
            JoinpointId::initialization(),
            JoinpointContext::Class(class()),
            vec![around, before],
            constructor,
        );

        let created = chain.invoke(None, vec![]).unwrap();
        assert_eq!(created.as_object().map(|o| o.class().to_string()), Some("Demo\\Example".to_string()));
        assert_eq!(*recorder.lock(), vec!["this: false", "before: false", "after: true"]);
    }

    #[test]
    fn test_dynamic_advice_rechecked_per_call() {
        let recorder = recorder();
        let pointcut = Arc::new(MagicMethodPointcut::new(
            GlobPattern::new("get*").unwrap(),
            ModifierPointcut::new(PointcutKind::METHOD).or_match(Modifiers::PUBLIC),
        ));
        let advice = recording_advice(AdviceKind::Before, &recorder, "advice").with_matcher(pointcut);
        let chain = InterceptorChain::new(
            JoinpointId::method("__call"),
            JoinpointContext::Class(class()),
            vec![advice],
            operation(&recorder, false),
        );

        chain.invoke(None, vec![Value::from("getTitle"), Value::List(vec![])]).unwrap();
        chain.invoke(None, vec![Value::from("setTitle"), Value::List(vec![])]).unwrap();
        chain.invoke(None, vec![Value::from("getName"), Value::List(vec![])]).unwrap();
        assert_eq!(
            *recorder.lock(),
            vec!["advice", "invocation", "invocation", "advice", "invocation"]
        );
    }

    #[test]
    fn test_field_access() {
        let object = Object::new("Demo\\Example");
        let field: Operation = Arc::new(|invocation| {
            let this = invocation.this().ok_or_else(|| Exception::new("Error", "no instance"))?;
            match invocation.access_type() {
                Some(AccessType::Write) => {
                    let value = invocation.arguments().first().cloned().unwrap_or_default();
                    this.set("title", value.clone());
                    Ok(value)
                }
                _ => Ok(this.get("title")),
            }
        });
        let upper = Advice::before(|invocation| {
            if let Some(Value::Str(s)) = invocation.arguments_mut().first_mut() {
                *s = s.to_uppercase();
            }
            Ok(Value::Null)
        });
        let chain = InterceptorChain::new(
            JoinpointId::property("title"),
            JoinpointContext::Class(class()),
            vec![upper],
            field,
        );

        chain.access(object.clone(), AccessType::Write, Some(Value::from("draft"))).unwrap();
        assert_eq!(object.get("title"), Value::from("DRAFT"));
        assert_eq!(chain.access(object, AccessType::Read, None).unwrap(), Value::from("DRAFT"));
    }

    #[test]
    fn test_chain_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InterceptorChain>();
    }
}
