use super::{InterceptorChain, JoinpointContext, JoinpointId};
use crate::advice::Advice;
use crate::value::{Exception, ObjectRef, Value};

/// Direction of a field access join point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessType {
    Read,
    Write,
}

/// One call travelling through an interceptor chain
///
/// Each call gets a fresh invocation, so a chain re-entered recursively (or
/// from several threads) never shares a cursor.
pub struct Invocation<'a> {
    chain: &'a InterceptorChain,
    this: Option<ObjectRef>,
    arguments: Vec<Value>,
    access: Option<AccessType>,
    /// Index of the next Around advice `proceed` will consider
    cursor: usize,
    outcome: Option<Result<Value, Exception>>,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(
        chain: &'a InterceptorChain,
        this: Option<ObjectRef>,
        arguments: Vec<Value>,
        access: Option<AccessType>,
    ) -> Self {
        Self {
            chain,
            this,
            arguments,
            access,
            cursor: 0,
            outcome: None,
        }
    }

    /// Receiver of the call
    ///
    /// `None` for static members and functions, and for constructors until the
    /// real constructor has returned.
    pub fn this(&self) -> Option<&ObjectRef> {
        self.this.as_ref()
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// Arguments as they will be handed to the next layer
    pub fn arguments_mut(&mut self) -> &mut Vec<Value> {
        &mut self.arguments
    }

    pub fn joinpoint(&self) -> &JoinpointId {
        self.chain.joinpoint()
    }

    pub fn context(&self) -> &JoinpointContext {
        self.chain.context()
    }

    /// Read or write, for field access join points
    pub fn access_type(&self) -> Option<AccessType> {
        self.access
    }

    /// Outcome of the advised operation; set once Around advice and the real
    /// operation have completed
    pub fn outcome(&self) -> Option<&Result<Value, Exception>> {
        self.outcome.as_ref()
    }

    pub fn exception(&self) -> Option<&Exception> {
        self.outcome.as_ref().and_then(|outcome| outcome.as_ref().err())
    }

    pub fn result(&self) -> Option<&Value> {
        self.outcome.as_ref().and_then(|outcome| outcome.as_ref().ok())
    }

    /// Replace the outcome with a successful `value`, suppressing any exception
    pub fn recover(&mut self, value: Value) {
        self.outcome = Some(Ok(value));
    }

    /// Run the next Around advice, or the real operation once none are left
    ///
    /// May be called any number of times; each call runs the inner layers
    /// again with the current arguments.
    pub fn proceed(&mut self) -> Result<Value, Exception> {
        let chain = self.chain;
        let start = self.cursor;
        let mut index = start;
        while let Some(advice) = chain.arounds().get(index) {
            index += 1;
            if !self.applies(advice)? {
                continue;
            }
            tracing::trace!(joinpoint = %chain.joinpoint(), index = index - 1, "around");
            self.cursor = index;
            let result = advice.invoke(self);
            self.cursor = start;
            return result;
        }

        tracing::trace!(joinpoint = %chain.joinpoint(), "invoke operation");
        let result = chain.call_operation(self);
        if chain.creates_instance() {
            if let Ok(Value::Object(instance)) = &result {
                self.this = Some(instance.clone());
            }
        }
        result
    }

    /// Whether `advice` should run for this call; dynamic advice re-evaluates
    /// its pointcut against the live arguments
    pub(crate) fn applies(&self, advice: &Advice) -> Result<bool, Exception> {
        let Some(matcher) = advice.matcher() else {
            return Ok(true);
        };
        let matched = self
            .chain
            .with_match_target(|target| {
                matcher.matches(&target.with_invocation(self.this.as_ref(), &self.arguments))
            })
            .transpose()?
            .unwrap_or(false);
        Ok(matched)
    }

    pub(crate) fn set_outcome(&mut self, outcome: Result<Value, Exception>) {
        self.outcome = Some(outcome);
    }

    pub(crate) fn take_outcome(&mut self) -> Result<Value, Exception> {
        self.outcome.take().unwrap_or(Ok(Value::Null))
    }
}
