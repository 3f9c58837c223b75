use super::woven::{ClassBodies, FunctionBodies, WovenClass, WovenFunctions};
use crate::advisor::{Aspect, AspectContainer};
use crate::config::{ClassFilter, Feature, KernelOptions};
use crate::error::{Error, Result};
use crate::matcher::{AdviceMap, AdviceMatcher};
use crate::reflection::{ClassReflection, NamespaceReflection};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Outcome of weaving a batch of classes
#[derive(Debug, Default)]
pub struct WeaveReport {
    pub woven: Vec<WovenClass>,
    /// Classes that failed, with the error that stopped them
    pub failures: Vec<(String, Error)>,
}

impl WeaveReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Entry point of the weaver
///
/// Owns the options, the aspect container and the advice matcher. Aspects
/// are registered inside [`init`](Self::init); weaving starts afterwards and
/// treats the container as read-only.
#[derive(Debug)]
pub struct AspectKernel {
    options: KernelOptions,
    container: Arc<AspectContainer>,
    matcher: AdviceMatcher,
    class_filter: ClassFilter,
    initialized: OnceCell<()>,
}

impl AspectKernel {
    pub fn new(options: KernelOptions) -> Result<Self> {
        Self::with_container(options, Arc::new(AspectContainer::new()))
    }

    /// Create a kernel around an existing container
    pub fn with_container(options: KernelOptions, container: Arc<AspectContainer>) -> Result<Self> {
        let class_filter = options.class_filter()?;
        let matcher = AdviceMatcher::new().with_function_interception(options.has_feature(Feature::InterceptFunctions));
        Ok(Self {
            options,
            container,
            matcher,
            class_filter,
            initialized: OnceCell::new(),
        })
    }

    pub fn options(&self) -> &KernelOptions {
        &self.options
    }

    pub fn container(&self) -> &Arc<AspectContainer> {
        &self.container
    }

    pub fn matcher(&self) -> &AdviceMatcher {
        &self.matcher
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get().is_some()
    }

    /// Configure the kernel
    ///
    /// Registers the configured named pointcuts, lets `configure` register
    /// aspects and advisors, then compiles every pointcut so a broken
    /// expression fails here rather than during weaving. Runs once.
    pub fn init<F>(&self, configure: F) -> Result<()>
    where
        F: FnOnce(&AspectContainer) -> Result<()>,
    {
        if self.is_initialized() {
            return Err(Error::ConfigError("kernel is already initialized".to_string()));
        }

        for (name, expression) in &self.options.pointcuts {
            self.container.register_pointcut(name, expression)?;
        }
        configure(&self.container)?;
        self.container.warm_up()?;
        let _ = self.initialized.set(());

        tracing::info!(
            advisors = self.container.len(),
            pointcuts = self.container.named_pointcuts().names().len(),
            debug = self.options.debug,
            "Aspect kernel initialized"
        );
        Ok(())
    }

    /// Convenience for `init` with a fixed list of aspects
    pub fn init_with_aspects(&self, aspects: Vec<Arc<dyn Aspect>>) -> Result<()> {
        self.init(|container| {
            for aspect in aspects {
                container.register_aspect(aspect)?;
            }
            Ok(())
        })
    }

    /// Whether `class` falls inside the include and exclude lists
    pub fn is_woven(&self, class: &str) -> bool {
        self.class_filter.accepts(class)
    }

    /// Bind the advice matching `class` and return its runtime surface
    pub fn weave(&self, class: Arc<ClassReflection>, bodies: ClassBodies) -> Result<WovenClass> {
        let advices = if self.is_woven(&class.name) {
            self.matcher.advices_for_class(&class, &self.container.advisors())?
        } else {
            tracing::debug!(class = %class.name, "Class is outside the weaving scope");
            AdviceMap::new()
        };
        if self.options.debug {
            for (id, advices) in &advices {
                tracing::debug!(class = %class.name, joinpoint = %id, advices = advices.len(), "Binding join point");
            }
        }
        Ok(WovenClass::assemble(
            class,
            bodies,
            advices,
            self.options.has_feature(Feature::InterceptInitializations),
        ))
    }

    /// Weave a batch; a failing class is reported and skipped
    pub fn weave_all<I>(&self, classes: I) -> WeaveReport
    where
        I: IntoIterator<Item = (Arc<ClassReflection>, ClassBodies)>,
    {
        let mut report = WeaveReport::default();
        for (class, bodies) in classes {
            let name = class.name.clone();
            match self.weave(class, bodies) {
                Ok(woven) => report.woven.push(woven),
                Err(err) => {
                    tracing::warn!(class = %name, error = %err, "Failed to weave class");
                    report.failures.push((name, err));
                }
            }
        }
        report
    }

    /// Bind the advice matching the functions of `namespace`
    pub fn weave_functions(&self, namespace: Arc<NamespaceReflection>, bodies: FunctionBodies) -> Result<WovenFunctions> {
        let advices = self
            .matcher
            .advices_for_functions(&namespace, &self.container.advisors())?;
        Ok(WovenFunctions::assemble(namespace, bodies, advices))
    }
}
