//! Join points and their runtime dispatch
//!
//! An [`InterceptorChain`] is built once per join point from the sorted advice
//! list and the real operation. Every call through the chain gets its own
//! [`Invocation`], which carries the arguments, the cursor over Around advice
//! and the outcome seen by After advice.

pub mod chain;
pub mod flow;
pub mod id;
pub mod invocation;

pub use chain::{InterceptorChain, Operation};
pub use id::{JoinpointContext, JoinpointId, JoinpointType};
pub use invocation::{AccessType, Invocation};
