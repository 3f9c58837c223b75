//! Kernel options

use crate::error::{Error, Result};
use crate::impl_case_insensitive_deserialize;
use crate::pointcut::GlobPattern;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Optional weaving features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Match and bind plain function join points
    InterceptFunctions,
    /// Bind `init:root` and `staticinit:root` chains into woven classes
    InterceptInitializations,
}

impl_case_insensitive_deserialize!(
    Feature,
    InterceptFunctions => "intercept_functions",
    InterceptInitializations => "intercept_initializations",
);

/// Options of an [`AspectKernel`](crate::weaver::AspectKernel)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelOptions {
    pub debug: bool,
    pub features: Vec<Feature>,
    /// Class name globs to weave; empty means every class
    pub include: Vec<String>,
    /// Class name globs never woven
    pub exclude: Vec<String>,
    /// Named pointcuts registered at kernel init
    pub pointcuts: BTreeMap<String, String>,
}

impl KernelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read options from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let options = Self::from_json_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded kernel options");
        Ok(options)
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        if !self.features.contains(&feature) {
            self.features.push(feature);
        }
        self
    }

    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn with_pointcut(mut self, name: impl Into<String>, expression: impl Into<String>) -> Self {
        self.pointcuts.insert(name.into(), expression.into());
        self
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// Compile the include and exclude globs
    pub fn class_filter(&self) -> Result<ClassFilter> {
        let compile = |patterns: &[String]| -> Result<Vec<GlobPattern>> {
            patterns
                .iter()
                .map(|pattern| {
                    GlobPattern::new(pattern.trim_start_matches('\\'))
                        .map_err(|e| Error::ConfigError(format!("invalid class pattern `{pattern}`: {e}")))
                })
                .collect()
        };
        Ok(ClassFilter {
            include: compile(&self.include)?,
            exclude: compile(&self.exclude)?,
        })
    }
}

/// Compiled include and exclude lists
#[derive(Debug, Clone, Default)]
pub struct ClassFilter {
    include: Vec<GlobPattern>,
    exclude: Vec<GlobPattern>,
}

impl ClassFilter {
    /// Whether the class named `name` should receive advice
    pub fn accepts(&self, name: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|p| p.is_match(name));
        included && !self.exclude.iter().any(|p| p.is_match(name))
    }
}
