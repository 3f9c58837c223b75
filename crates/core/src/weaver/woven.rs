//! Woven classes and functions: the runtime surface a generated proxy calls

use crate::joinpoint::{AccessType, InterceptorChain, Invocation, JoinpointContext, JoinpointId, Operation};
use crate::matcher::AdviceMap;
use crate::pointcut::{CALL_HOOK, STATIC_CALL_HOOK};
use crate::reflection::{ClassReflection, Modifiers, NamespaceReflection};
use crate::value::{Exception, Object, ObjectRef, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

fn operation<F>(f: F) -> Operation
where
    F: Fn(&Invocation<'_>) -> Result<Value, Exception> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Real implementations of a class's methods, constructor and static
/// initializer
///
/// Members without a body raise `BadMethodCallException` when called. The
/// default constructor creates an empty instance; the default static
/// initializer does nothing. Property access needs no body.
#[derive(Clone, Default)]
pub struct ClassBodies {
    methods: HashMap<String, Operation>,
    constructor: Option<Operation>,
    static_initializer: Option<Operation>,
}

impl ClassBodies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<Value, Exception> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), operation(body));
        self
    }

    /// The constructor must return the new instance as `Value::Object`
    pub fn constructor<F>(mut self, body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<Value, Exception> + Send + Sync + 'static,
    {
        self.constructor = Some(operation(body));
        self
    }

    pub fn static_initializer<F>(mut self, body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<Value, Exception> + Send + Sync + 'static,
    {
        self.static_initializer = Some(operation(body));
        self
    }
}

impl fmt::Debug for ClassBodies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("ClassBodies")
            .field("methods", &methods)
            .field("constructor", &self.constructor.is_some())
            .field("static_initializer", &self.static_initializer.is_some())
            .finish()
    }
}

fn missing_body(owner: &str, name: &str) -> Operation {
    let message = format!("{owner}::{name}() has no implementation");
    operation(move |_| Err(Exception::new("BadMethodCallException", message.clone())))
}

fn property_access(name: &str) -> Operation {
    let name = name.to_string();
    operation(move |invocation| {
        let Some(this) = invocation.this() else {
            return Err(Exception::new("Error", format!("property `{name}` accessed without an instance")));
        };
        match invocation.access_type() {
            Some(AccessType::Write) => {
                let value = invocation.arguments().first().cloned().unwrap_or_default();
                this.set(name.clone(), value.clone());
                Ok(value)
            }
            _ => Ok(this.get(&name)),
        }
    })
}

/// A class with one interceptor chain per interceptable member
pub struct WovenClass {
    class: Arc<ClassReflection>,
    chains: BTreeMap<JoinpointId, InterceptorChain>,
}

impl WovenClass {
    /// Bind `advices` to the members of `class`
    ///
    /// Members without matching advice still get a chain so every call takes
    /// the same path. Constructor and static initializer advice is only bound
    /// when `intercept_initializations` is set.
    pub(crate) fn assemble(
        class: Arc<ClassReflection>,
        mut bodies: ClassBodies,
        mut advices: AdviceMap,
        intercept_initializations: bool,
    ) -> Self {
        if !intercept_initializations {
            advices.remove(&JoinpointId::initialization());
            advices.remove(&JoinpointId::static_initialization());
        }
        let context = JoinpointContext::Class(class.clone());
        let mut chains = BTreeMap::new();
        let mut bind = |id: JoinpointId, operation: Operation| {
            let advice = advices.remove(&id).unwrap_or_default();
            let chain = InterceptorChain::new(id.clone(), context.clone(), advice, operation);
            chains.insert(id, chain);
        };

        for method in &class.methods {
            if method.is_abstract() || method.modifiers.contains(Modifiers::PRIVATE) {
                continue;
            }
            let id = if method.is_static() {
                JoinpointId::static_method(&method.name)
            } else {
                JoinpointId::method(&method.name)
            };
            let body = bodies
                .methods
                .remove(&method.name)
                .unwrap_or_else(|| missing_body(&class.name, &method.name));
            bind(id, body);
        }

        for property in &class.properties {
            if property.is_static() || property.modifiers.contains(Modifiers::PRIVATE) {
                continue;
            }
            bind(JoinpointId::property(&property.name), property_access(&property.name));
        }

        let class_name = class.name.clone();
        let constructor = bodies
            .constructor
            .take()
            .unwrap_or_else(|| operation(move |_| Ok(Value::Object(Object::new(class_name.clone())))));
        bind(JoinpointId::initialization(), constructor);
        let static_initializer = bodies
            .static_initializer
            .take()
            .unwrap_or_else(|| operation(|_| Ok(Value::Null)));
        bind(JoinpointId::static_initialization(), static_initializer);

        Self { class, chains }
    }

    pub fn class(&self) -> &Arc<ClassReflection> {
        &self.class
    }

    pub fn chain(&self, id: &JoinpointId) -> Option<&InterceptorChain> {
        self.chains.get(id)
    }

    /// Every bound join point, in key order
    pub fn joinpoints(&self) -> impl Iterator<Item = &JoinpointId> {
        self.chains.keys()
    }

    /// Join points carrying at least one advice
    pub fn advised_joinpoints(&self) -> impl Iterator<Item = &JoinpointId> {
        self.chains
            .iter()
            .filter(|(_, chain)| chain.is_advised())
            .map(|(id, _)| id)
    }

    /// Call an instance method
    ///
    /// Unknown methods are routed to `__call` with the method name and the
    /// argument list, when the class has one.
    pub fn call(&self, this: &ObjectRef, method: &str, arguments: Vec<Value>) -> Result<Value, Exception> {
        if let Some(chain) = self.chains.get(&JoinpointId::method(method)) {
            return chain.invoke(Some(this.clone()), arguments);
        }
        match self.chains.get(&JoinpointId::method(CALL_HOOK)) {
            Some(hook) => hook.invoke(Some(this.clone()), vec![Value::from(method), Value::List(arguments)]),
            None => Err(self.undefined(method)),
        }
    }

    /// Call a static method, falling back to `__callStatic`
    pub fn call_static(&self, method: &str, arguments: Vec<Value>) -> Result<Value, Exception> {
        if let Some(chain) = self.chains.get(&JoinpointId::static_method(method)) {
            return chain.invoke(None, arguments);
        }
        match self.chains.get(&JoinpointId::static_method(STATIC_CALL_HOOK)) {
            Some(hook) => hook.invoke(None, vec![Value::from(method), Value::List(arguments)]),
            None => Err(self.undefined(method)),
        }
    }

    /// Read a property; properties without a chain are read directly
    pub fn read(&self, this: &ObjectRef, property: &str) -> Result<Value, Exception> {
        match self.chains.get(&JoinpointId::property(property)) {
            Some(chain) => chain.access(this.clone(), AccessType::Read, None),
            None => Ok(this.get(property)),
        }
    }

    /// Write a property and return the value actually stored
    pub fn write(&self, this: &ObjectRef, property: &str, value: Value) -> Result<Value, Exception> {
        match self.chains.get(&JoinpointId::property(property)) {
            Some(chain) => chain.access(this.clone(), AccessType::Write, Some(value)),
            None => {
                this.set(property, value.clone());
                Ok(value)
            }
        }
    }

    /// Create an instance through the constructor chain
    pub fn construct(&self, arguments: Vec<Value>) -> Result<ObjectRef, Exception> {
        let value = match self.chains.get(&JoinpointId::initialization()) {
            Some(chain) => chain.invoke(None, arguments)?,
            None => Value::Object(Object::new(self.class.name.clone())),
        };
        match value {
            Value::Object(instance) => Ok(instance),
            other => Err(Exception::new(
                "TypeError",
                format!("constructor of {} returned {other} instead of an instance", self.class.name),
            )),
        }
    }

    /// Run the static initializer through its chain
    pub fn initialize_static(&self) -> Result<Value, Exception> {
        match self.chains.get(&JoinpointId::static_initialization()) {
            Some(chain) => chain.invoke(None, Vec::new()),
            None => Ok(Value::Null),
        }
    }

    fn undefined(&self, method: &str) -> Exception {
        Exception::new(
            "BadMethodCallException",
            format!("Call to undefined method {}::{method}()", self.class.name),
        )
    }
}

impl fmt::Debug for WovenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WovenClass")
            .field("class", &self.class.name)
            .field("joinpoints", &self.chains.keys().map(ToString::to_string).collect::<Vec<_>>())
            .finish()
    }
}

/// Real implementations of the functions of a namespace
#[derive(Clone, Default)]
pub struct FunctionBodies {
    functions: HashMap<String, Operation>,
}

impl FunctionBodies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn function<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<Value, Exception> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), operation(body));
        self
    }
}

impl fmt::Debug for FunctionBodies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut functions: Vec<_> = self.functions.keys().collect();
        functions.sort();
        f.debug_struct("FunctionBodies").field("functions", &functions).finish()
    }
}

/// The functions of one namespace, each behind an interceptor chain
pub struct WovenFunctions {
    namespace: Arc<NamespaceReflection>,
    chains: BTreeMap<JoinpointId, InterceptorChain>,
}

impl WovenFunctions {
    pub(crate) fn assemble(namespace: Arc<NamespaceReflection>, mut bodies: FunctionBodies, mut advices: AdviceMap) -> Self {
        let context = JoinpointContext::Namespace(namespace.clone());
        let chains = namespace
            .functions
            .iter()
            .map(|function| {
                let id = JoinpointId::function(&function.name);
                let body = bodies
                    .functions
                    .remove(&function.name)
                    .unwrap_or_else(|| missing_body(&namespace.name, &function.name));
                let advice = advices.remove(&id).unwrap_or_default();
                (id.clone(), InterceptorChain::new(id, context.clone(), advice, body))
            })
            .collect();
        Self { namespace, chains }
    }

    pub fn namespace(&self) -> &Arc<NamespaceReflection> {
        &self.namespace
    }

    pub fn chain(&self, id: &JoinpointId) -> Option<&InterceptorChain> {
        self.chains.get(id)
    }

    pub fn joinpoints(&self) -> impl Iterator<Item = &JoinpointId> {
        self.chains.keys()
    }

    pub fn call(&self, function: &str, arguments: Vec<Value>) -> Result<Value, Exception> {
        match self.chains.get(&JoinpointId::function(function)) {
            Some(chain) => chain.invoke(None, arguments),
            None => Err(Exception::new(
                "Error",
                format!("Call to undefined function {}\\{function}()", self.namespace.name),
            )),
        }
    }
}

impl fmt::Debug for WovenFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WovenFunctions")
            .field("namespace", &self.namespace.name)
            .field("joinpoints", &self.chains.keys().map(ToString::to_string).collect::<Vec<_>>())
            .finish()
    }
}
