//! Workflow registry
//!
//! Provides [`WorkflowRegistry`], the static lookup table from data product
//! to workflow.

use crate::error::WorkflowError;
use crate::workflow::Workflow;
use crate::workflows::{
    AirQualityWorkflow, NightlightsWorkflow, PrecipitationWorkflow, TemperatureWorkflow,
    VegetationWorkflow, WaterWorkflow,
};
use geo_plan::DataProduct;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Data product → workflow lookup
#[derive(Debug, Default, Clone)]
pub struct WorkflowRegistry {
    workflows: BTreeMap<DataProduct, Arc<dyn Workflow>>,
}

impl WorkflowRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            workflows: BTreeMap::new(),
        }
    }

    /// Create registry with built-in workflows
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(VegetationWorkflow));
        registry.register(Arc::new(WaterWorkflow));
        registry.register(Arc::new(TemperatureWorkflow));
        registry.register(Arc::new(PrecipitationWorkflow));
        registry.register(Arc::new(AirQualityWorkflow));
        registry.register(Arc::new(NightlightsWorkflow));
        registry
    }

    /// Register a workflow under its product, replacing any previous one
    pub fn register(&mut self, workflow: Arc<dyn Workflow>) {
        self.workflows.insert(workflow.product(), workflow);
    }

    /// Workflow for a product
    ///
    /// # Errors
    /// Returns [`WorkflowError::UnsupportedWorkflow`] listing every
    /// registered product.
    pub fn resolve(&self, product: DataProduct) -> Result<Arc<dyn Workflow>, WorkflowError> {
        self.workflows
            .get(&product)
            .cloned()
            .ok_or_else(|| WorkflowError::UnsupportedWorkflow {
                product,
                supported: self.supported(),
            })
    }

    /// Check if a product is served
    #[inline]
    #[must_use]
    pub fn contains(&self, product: DataProduct) -> bool {
        self.workflows.contains_key(&product)
    }

    /// Registered products in declaration order
    #[must_use]
    pub fn supported(&self) -> Vec<DataProduct> {
        self.workflows.keys().copied().collect()
    }

    /// Get number of registered workflows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}
