use super::{Attribute, Parameter};
use serde::{Deserialize, Serialize};

/// A namespace and the plain functions declared in it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceReflection {
    pub name: String,
    #[serde(default)]
    pub functions: Vec<FunctionReflection>,
}

impl NamespaceReflection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    pub fn with_function(mut self, function: FunctionReflection) -> Self {
        self.functions.push(function);
        self
    }

    pub fn function(&self, name: &str) -> Option<&FunctionReflection> {
        self.functions.iter().find(|function| function.name == name)
    }
}

/// A plain (non-member) function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionReflection {
    /// Short name, without namespace
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl FunctionReflection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn returning(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }
}
