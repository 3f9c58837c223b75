use crate::reflection::{ClassReflection, NamespaceReflection};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Category of a join point; determines the key prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JoinpointType {
    Method,
    StaticMethod,
    Property,
    Initialization,
    StaticInitialization,
    Function,
}

impl JoinpointType {
    pub fn prefix(self) -> &'static str {
        match self {
            JoinpointType::Method => "method",
            JoinpointType::StaticMethod => "static",
            JoinpointType::Property => "property",
            JoinpointType::Initialization => "init",
            JoinpointType::StaticInitialization => "staticinit",
            JoinpointType::Function => "func",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Some(match prefix {
            "method" => JoinpointType::Method,
            "static" => JoinpointType::StaticMethod,
            "property" => JoinpointType::Property,
            "init" => JoinpointType::Initialization,
            "staticinit" => JoinpointType::StaticInitialization,
            "func" => JoinpointType::Function,
            _ => return None,
        })
    }
}

/// Stable key grouping the advice of one member: `<prefix>:<name>`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JoinpointId {
    kind: JoinpointType,
    name: String,
}

/// Member name used by the class-level pseudo join points
const ROOT: &str = "root";

impl JoinpointId {
    pub fn new(kind: JoinpointType, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn method(name: impl Into<String>) -> Self {
        Self::new(JoinpointType::Method, name)
    }

    pub fn static_method(name: impl Into<String>) -> Self {
        Self::new(JoinpointType::StaticMethod, name)
    }

    pub fn property(name: impl Into<String>) -> Self {
        Self::new(JoinpointType::Property, name)
    }

    pub fn initialization() -> Self {
        Self::new(JoinpointType::Initialization, ROOT)
    }

    pub fn static_initialization() -> Self {
        Self::new(JoinpointType::StaticInitialization, ROOT)
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::new(JoinpointType::Function, name)
    }

    pub fn kind(&self) -> JoinpointType {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, JoinpointType::Method | JoinpointType::StaticMethod)
    }
}

impl fmt::Display for JoinpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.prefix(), self.name)
    }
}

impl FromStr for JoinpointId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (prefix, name) = s
            .split_once(':')
            .ok_or_else(|| Error::ConfigError(format!("join point key `{s}` has no prefix")))?;
        let kind = JoinpointType::from_prefix(prefix)
            .ok_or_else(|| Error::ConfigError(format!("unknown join point prefix `{prefix}`")))?;
        Ok(Self::new(kind, name))
    }
}

/// Where a join point lives
#[derive(Debug, Clone)]
pub enum JoinpointContext {
    Class(Arc<ClassReflection>),
    Namespace(Arc<NamespaceReflection>),
}

impl JoinpointContext {
    /// Qualified name of the class or namespace
    pub fn name(&self) -> &str {
        match self {
            JoinpointContext::Class(class) => &class.name,
            JoinpointContext::Namespace(namespace) => &namespace.name,
        }
    }

    pub fn class(&self) -> Option<&Arc<ClassReflection>> {
        match self {
            JoinpointContext::Class(class) => Some(class),
            JoinpointContext::Namespace(_) => None,
        }
    }
}
