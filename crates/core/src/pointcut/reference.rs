//! Named pointcuts and references to them

use super::{MatchTarget, Pointcut, PointcutKind};
use crate::error::Result;
use crate::reflection::Reflector;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of named pointcuts, keyed by `Aspect->name`
#[derive(Debug, Default)]
pub struct NamedPointcuts {
    pointcuts: RwLock<HashMap<String, Arc<dyn Pointcut>>>,
}

impl NamedPointcuts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a pointcut under `name`, replacing any previous one
    pub fn insert(&self, name: impl Into<String>, pointcut: Arc<dyn Pointcut>) {
        self.pointcuts.write().insert(name.into(), pointcut);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Pointcut>> {
        self.pointcuts.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pointcuts.read().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pointcuts.read().keys().cloned().collect();
        names.sort();
        names
    }
}

/// A pointcut expression naming another, already registered pointcut
#[derive(Debug, Clone)]
pub struct PointcutReference {
    name: String,
    target: Arc<dyn Pointcut>,
}

impl PointcutReference {
    pub fn new(name: impl Into<String>, target: Arc<dyn Pointcut>) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Pointcut for PointcutReference {
    fn kind(&self) -> PointcutKind {
        self.target.kind()
    }

    fn class_filter_matches(&self, context: Reflector<'_>) -> Result<bool> {
        self.target.class_filter_matches(context)
    }

    fn point_matches(&self, target: &MatchTarget<'_>) -> Result<bool> {
        self.target.point_matches(target)
    }
}
