//! Pipeline configuration.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for running a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct PipelineConfig {
    /// Label attached to the tracing events of this pipeline.
    #[builder(default = "String::from(\"pipeline\")")]
    #[serde(default = "default_name")]
    pub name: String,

    /// Rejects raw inputs that do not name an input node of the graph.
    ///
    /// When disabled, such inputs are ignored with a warning.
    #[builder(default = "false")]
    #[serde(default)]
    pub strict_inputs: bool,
}

impl PipelineConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err("name must not be empty".into());
            }
        }
        Ok(())
    }
}

impl PipelineConfig {
    /// Returns a builder for creating a pipeline configuration.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            strict_inputs: false,
        }
    }
}

fn default_name() -> String {
    String::from("pipeline")
}
