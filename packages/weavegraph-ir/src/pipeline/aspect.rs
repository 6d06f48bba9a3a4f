use crate::errors::Result;
use crate::features::advice::AdviceFactory;
use crate::shared::models::LayerId;
use std::fmt;
use std::sync::Arc;

/// Source of advices
///
/// `build` registers advices through the factory; registration order is
/// resolution order. Returning an error discards everything the aspect
/// registered.
pub trait Aspect: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &str;

    fn build(&self, factory: &mut AdviceFactory<'_>) -> Result<()>;
}

/// Aspect built from a closure
pub struct FnAspect<F> {
    name: String,
    build: F,
}

impl<F> FnAspect<F>
where
    F: Fn(&mut AdviceFactory<'_>) -> Result<()> + Send + Sync,
{
    pub fn new(name: impl Into<String>, build: F) -> Self {
        Self {
            name: name.into(),
            build,
        }
    }
}

impl<F> Aspect for FnAspect<F>
where
    F: Fn(&mut AdviceFactory<'_>) -> Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, factory: &mut AdviceFactory<'_>) -> Result<()> {
        (self.build)(factory)
    }
}

/// One aspect applied in one layer
#[derive(Clone)]
pub struct AspectApplication {
    pub aspect: Arc<dyn Aspect>,
    pub layer: LayerId,
}

impl AspectApplication {
    pub fn new(aspect: Arc<dyn Aspect>, layer: LayerId) -> Self {
        Self { aspect, layer }
    }
}

impl fmt::Debug for AspectApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AspectApplication")
            .field("aspect", &self.aspect.name())
            .field("layer", &self.layer)
            .finish()
    }
}
