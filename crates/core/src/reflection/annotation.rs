//! Annotation/attribute lookup
//!
//! Annotation matchers never read attributes themselves; they ask an
//! [`AnnotationReader`]. The reader is injected into the pointcut parser so a
//! host can plug in whatever metadata source it has.

use super::Reflector;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value carried by an annotation
pub type AnnotationValue = serde_json::Value;

/// An attribute attached to a class, member or function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Fully-qualified attribute type name
    pub name: String,
    #[serde(default)]
    pub value: AnnotationValue,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: AnnotationValue::Null,
        }
    }

    pub fn with_value(mut self, value: AnnotationValue) -> Self {
        self.value = value;
        self
    }
}

/// Source of annotation information for reflectors
pub trait AnnotationReader: fmt::Debug + Send + Sync {
    /// Look up the annotation of type `annotation` on `reflector`
    fn annotation(&self, reflector: Reflector<'_>, annotation: &str) -> Result<Option<AnnotationValue>>;

    /// Whether `reflector` carries an annotation of type `annotation`
    fn has_annotation(&self, reflector: Reflector<'_>, annotation: &str) -> Result<bool> {
        Ok(self.annotation(reflector, annotation)?.is_some())
    }
}

/// Reads the attribute lists stored in the class model
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeReader;

impl AnnotationReader for AttributeReader {
    fn annotation(&self, reflector: Reflector<'_>, annotation: &str) -> Result<Option<AnnotationValue>> {
        Ok(reflector
            .attributes()
            .iter()
            .find(|attribute| attribute.name == annotation)
            .map(|attribute| attribute.value.clone()))
    }
}
