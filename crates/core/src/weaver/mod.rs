//! Binding advice to classes and functions
//!
//! The [`AspectKernel`] runs the advice matcher over a class model and builds
//! a [`WovenClass`]: one interceptor chain per member, each wrapping the real
//! implementation supplied in [`ClassBodies`]. Generated proxies call into the
//! woven class instead of the original members.

pub mod kernel;
pub mod woven;

pub use kernel::{AspectKernel, WeaveReport};
pub use woven::{ClassBodies, FunctionBodies, WovenClass, WovenFunctions};
