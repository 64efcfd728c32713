//! Run DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::run::{PipelineRun, RunStatus};

pub const DEFAULT_RUN_LIST_LIMIT: usize = 50;
pub const MAX_RUN_LIST_LIMIT: usize = 100;

/// Request to trigger a run of a registered pipeline
///
/// At least one of `document_id`, `file_path` or `text_payload` must be given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateRun {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_payload: Option<String>,
}

impl CreateRun {
    /// Returns the request with blank strings treated as absent
    pub fn normalized(self) -> Self {
        fn non_blank(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        Self {
            input_ref: non_blank(self.input_ref),
            document_id: self.document_id,
            file_path: non_blank(self.file_path),
            text_payload: non_blank(self.text_payload),
        }
    }

    pub fn has_input(&self) -> bool {
        self.document_id.is_some()
            || self.file_path.as_deref().is_some_and(|p| !p.is_empty())
            || self.text_payload.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Query filters for listing runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RunStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl RunFilter {
    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_RUN_LIST_LIMIT)
            .min(MAX_RUN_LIST_LIMIT)
    }

    pub fn matches(&self, run: &PipelineRun) -> bool {
        self.pipeline_id.is_none_or(|id| run.pipeline_id == id)
            && self.status.is_none_or(|status| run.status == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_input_ignores_blank_strings() {
        assert!(!CreateRun::default().has_input());

        let blank = CreateRun {
            file_path: Some(String::new()),
            text_payload: Some(String::new()),
            ..Default::default()
        };
        assert!(!blank.has_input());

        let text = CreateRun {
            text_payload: Some("hello".to_string()),
            ..Default::default()
        };
        assert!(text.has_input());

        let doc = CreateRun {
            document_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(doc.has_input());
    }

    #[test]
    fn test_normalized_drops_blank_strings() {
        let req = CreateRun {
            input_ref: Some(String::new()),
            text_payload: Some("x".to_string()),
            ..Default::default()
        }
        .normalized();

        assert!(req.input_ref.is_none());
        assert_eq!(req.text_payload.as_deref(), Some("x"));
    }

    #[test]
    fn test_limit_is_defaulted_and_capped() {
        assert_eq!(RunFilter::default().limit(), DEFAULT_RUN_LIST_LIMIT);
        let big = RunFilter {
            limit: Some(1000),
            ..Default::default()
        };
        assert_eq!(big.limit(), MAX_RUN_LIST_LIMIT);
    }
}
