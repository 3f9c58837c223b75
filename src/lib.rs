//! aop-weaver - aspect-oriented weaving engine
//!
//! Re-exports [`aop_weaver_core`]; see that crate for the pointcut language,
//! the aspect container and the interceptor chains.
pub use aop_weaver_core::*;
