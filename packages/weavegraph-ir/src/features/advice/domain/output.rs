use crate::features::compilation::Transformation;
use crate::shared::models::{AdviceId, Diagnostic};

/// Successful resolution of one advice
#[derive(Debug, Clone)]
pub struct AdviceOutput {
    pub advice: AdviceId,
    /// In creation order; orders are strictly increasing
    pub transformations: Vec<Transformation>,
    /// Non-blocking diagnostics (strategy warnings)
    pub warnings: Vec<Diagnostic>,
}

impl AdviceOutput {
    pub fn new(advice: AdviceId) -> Self {
        Self {
            advice,
            transformations: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transformations.len()
    }
}

/// Resolution outcome: transformations, or the diagnostics that failed it
pub type AdviceResult = Result<AdviceOutput, Vec<Diagnostic>>;
