//! aop-weaver-core - pointcut matching and advice dispatch for aspect weaving
//!
//! This crate provides:
//! - A pointcut expression language (`execution(public Demo\**->get*(*))`,
//!   `within(...)`, `@execution(...)`, `dynamic(...)`, `cflowbelow(...)`)
//!   compiled into composable matcher trees
//! - Advisors pairing pointcuts with advice, compiled lazily and registered in
//!   an aspect container
//! - An advice matcher computing, per class, which advice applies to which
//!   join point
//! - Interceptor chains running Before, Around and After advice around the
//!   real operation of a join point
pub mod advice;
pub mod advisor;
pub mod config;
pub mod error;
pub mod joinpoint;
pub mod matcher;
pub mod parser;
pub mod pointcut;
pub mod reflection;
pub mod utils;
pub mod value;
pub mod weaver;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use value::{Exception, Object, ObjectRef, Value};

pub use advice::{Advice, AdviceKind, sort_advices};
pub use advisor::{Advisor, Aspect, AspectAdvice, AspectContainer, LazyPointcutAdvisor, PointcutAdvisor};
pub use config::{Feature, KernelOptions};
pub use joinpoint::{AccessType, InterceptorChain, Invocation, JoinpointId, JoinpointType};
pub use matcher::{AdviceMap, AdviceMatcher};
pub use parser::{PointcutCompiler, PointcutParser};
pub use pointcut::{MatchTarget, Pointcut, PointcutKind};
pub use reflection::{
    AnnotationReader, Attribute, ClassReflection, FunctionReflection, MethodReflection, Modifiers,
    NamespaceReflection, PropertyReflection, Reflector,
};
pub use weaver::{AspectKernel, ClassBodies, FunctionBodies, WovenClass, WovenFunctions};
