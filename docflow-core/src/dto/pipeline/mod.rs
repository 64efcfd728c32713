//! Pipeline DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::pipeline::{Pipeline, PipelineDefinition, UseCase};

/// Request to register a new pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePipeline {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub use_case: UseCase,
    #[serde(default)]
    pub definition: PipelineDefinition,
}

/// Partial update of a pipeline; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePipeline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_case: Option<UseCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<PipelineDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdatePipeline {
    /// Applies the present fields onto `pipeline`
    pub fn apply_to(self, pipeline: &mut Pipeline) {
        if let Some(name) = self.name {
            pipeline.name = name;
        }
        if let Some(description) = self.description {
            pipeline.description = Some(description);
        }
        if let Some(use_case) = self.use_case {
            pipeline.use_case = use_case;
        }
        if let Some(definition) = self.definition {
            pipeline.definition = definition;
        }
        if let Some(is_active) = self.is_active {
            pipeline.is_active = is_active;
        }
    }
}

/// Query filters for listing pipelines
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_case: Option<UseCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_only: Option<bool>,
}

impl PipelineFilter {
    /// Only active pipelines are listed unless explicitly asked otherwise
    pub fn active_only(&self) -> bool {
        self.active_only.unwrap_or(true)
    }

    pub fn matches(&self, pipeline: &Pipeline) -> bool {
        if let Some(use_case) = self.use_case {
            if pipeline.use_case != use_case {
                return false;
            }
        }
        !self.active_only() || pipeline.is_active
    }
}

/// Lightweight pipeline summary for listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub id: Uuid,
    pub name: String,
    pub use_case: UseCase,
    pub description: Option<String>,
    pub is_active: bool,
    pub node_count: usize,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Pipeline> for PipelineSummary {
    fn from(pipeline: Pipeline) -> Self {
        Self {
            id: pipeline.id,
            name: pipeline.name,
            use_case: pipeline.use_case,
            description: pipeline.description,
            is_active: pipeline.is_active,
            node_count: pipeline.definition.nodes.len(),
            created_at: pipeline.created_at,
        }
    }
}
