use super::{MatchTarget, Pointcut, PointcutKind};
use crate::error::Result;
use crate::reflection::AnnotationReader;
use std::sync::Arc;

/// Matches join points carrying an annotation of the given type
///
/// The annotation type name is compared exactly. A class-kind pointcut looks
/// at the class being woven; member kinds look at the member itself. Errors
/// raised by the reader propagate to the caller.
#[derive(Debug, Clone)]
pub struct AnnotationPointcut {
    kind: PointcutKind,
    annotation: String,
    reader: Arc<dyn AnnotationReader>,
}

impl AnnotationPointcut {
    pub fn new(kind: PointcutKind, annotation: impl Into<String>, reader: Arc<dyn AnnotationReader>) -> Self {
        Self {
            kind,
            annotation: annotation.into(),
            reader,
        }
    }

    pub fn annotation(&self) -> &str {
        &self.annotation
    }
}

impl Pointcut for AnnotationPointcut {
    fn kind(&self) -> PointcutKind {
        self.kind
    }

    fn point_matches(&self, target: &MatchTarget<'_>) -> Result<bool> {
        let reflector = if target.kind == PointcutKind::CLASS {
            target.context
        } else {
            match target.member {
                Some(member) => member,
                None => return Ok(false),
            }
        };
        self.reader.has_annotation(reflector, &self.annotation)
    }
}
