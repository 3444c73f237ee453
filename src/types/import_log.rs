//! Record of the steps a profile run dispatched, for debugging and summaries.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ContentType;

/// How a dispatched node ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
  Success,
  /// No registered handler was eligible for the node.
  Skipped,
  Fail,
}

impl fmt::Display for StepStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StepStatus::Success => write!(f, "success"),
      StepStatus::Skipped => write!(f, "skipped"),
      StepStatus::Fail => write!(f, "fail"),
    }
  }
}

/// One dispatched node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportStep {
  /// 1-based step index.
  pub step: u32,
  pub node_id: String,
  pub content_type: ContentType,
  /// Name of the handler that processed the node.
  pub handler: Option<String>,
  pub event_type_before: String,
  pub event_type_after: String,
  pub status: StepStatus,
  pub failure_reason: Option<String>,
}

impl ImportStep {
  #[allow(clippy::too_many_arguments)]
  pub fn new(
    step: u32,
    node_id: impl Into<String>,
    content_type: ContentType,
    handler: Option<String>,
    event_type_before: impl Into<String>,
    event_type_after: impl Into<String>,
    status: StepStatus,
    failure_reason: Option<String>,
  ) -> Self {
    Self {
      step,
      node_id: node_id.into(),
      content_type,
      handler,
      event_type_before: event_type_before.into(),
      event_type_after: event_type_after.into(),
      status,
      failure_reason,
    }
  }
}

/// All steps of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportLog {
  pub job_execution_id: Option<String>,
  pub steps: Vec<ImportStep>,
}

impl ImportLog {
  pub fn push(&mut self, step: ImportStep) {
    self.steps.push(step);
  }

  pub fn next_step_index(&self) -> u32 {
    self.steps.len() as u32 + 1
  }

  pub fn failed(&self) -> bool {
    self.steps.iter().any(|s| s.status == StepStatus::Fail)
  }
}
