//! Read-only class model consumed by the matching engine
//!
//! The weaver never inspects host-language objects directly. Whatever layer
//! produces class information (a reflection API, an AST walker, a JSON dump)
//! hands it over as the plain data structures defined here, and matchers see
//! a candidate through the tagged [`Reflector`] view.

pub mod annotation;
pub mod class;
pub mod function;

pub use annotation::{AnnotationReader, AnnotationValue, Attribute, AttributeReader};
pub use class::{ClassReflection, MethodReflection, Parameter, PropertyReflection};
pub use function::{FunctionReflection, NamespaceReflection};

use serde::{Deserialize, Serialize};

/// Separator between namespace segments in qualified names
pub const NAMESPACE_SEPARATOR: char = '\\';

bitflags::bitflags! {
    /// Member modifiers as reported by the class model
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Modifiers: u32 {
        const PUBLIC = 1;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const ABSTRACT = 1 << 5;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Modifiers::PUBLIC
    }
}

/// A join point candidate as seen by matchers
#[derive(Debug, Clone, Copy)]
pub enum Reflector<'a> {
    Class(&'a ClassReflection),
    Method(&'a MethodReflection),
    Property(&'a PropertyReflection),
    Function(&'a FunctionReflection),
    Namespace(&'a NamespaceReflection),
}

impl<'a> Reflector<'a> {
    /// Name used for pattern matching: qualified for classes and namespaces,
    /// simple for members and functions
    pub fn name(&self) -> &'a str {
        match self {
            Reflector::Class(class) => &class.name,
            Reflector::Method(method) => &method.name,
            Reflector::Property(property) => &property.name,
            Reflector::Function(function) => &function.name,
            Reflector::Namespace(namespace) => &namespace.name,
        }
    }

    /// Modifiers of class members; `None` for entities without modifiers
    pub fn modifiers(&self) -> Option<Modifiers> {
        match self {
            Reflector::Method(method) => Some(method.modifiers),
            Reflector::Property(property) => Some(property.modifiers),
            _ => None,
        }
    }

    pub fn attributes(&self) -> &'a [Attribute] {
        match self {
            Reflector::Class(class) => &class.attributes,
            Reflector::Method(method) => &method.attributes,
            Reflector::Property(property) => &property.attributes,
            Reflector::Function(function) => &function.attributes,
            Reflector::Namespace(_) => &[],
        }
    }

    /// Declared return type of methods and functions
    pub fn return_type(&self) -> Option<&'a str> {
        match self {
            Reflector::Method(method) => method.return_type.as_deref(),
            Reflector::Function(function) => function.return_type.as_deref(),
            _ => None,
        }
    }

    /// Class that declares a method or property
    pub fn declaring_class(&self) -> Option<&'a str> {
        match self {
            Reflector::Method(method) => Some(&method.declaring_class),
            Reflector::Property(property) => Some(&property.declaring_class),
            _ => None,
        }
    }
}

/// Split a qualified name into its namespace and short name
pub fn split_qualified(name: &str) -> (&str, &str) {
    match name.rfind(NAMESPACE_SEPARATOR) {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => ("", name),
    }
}
