//! Profile runner: walks a profile snapshot and dispatches each action and match node.
//!
//! Nodes run depth-first in child order. After a match node only the children reacting
//! to its outcome run; mapping nodes are consumed by their parent action and never
//! dispatched on their own.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::error::HandlerError;
use crate::handlers::EventDispatcher;
use crate::types::{
  ContentType, DataImportEventPayload, DataImportEventType, ImportLog, ImportStep,
  ProfileSnapshotWrapper, ReactTo, StepStatus,
};

/// Upper bound on dispatched nodes per run.
pub const DEFAULT_MAX_STEPS: usize = 1000;

/// Final payload of a run with the steps that produced it.
#[derive(Debug, Clone)]
pub struct ImportResult {
  pub payload: DataImportEventPayload,
  pub log: ImportLog,
}

#[derive(Debug, Error)]
pub enum RunError {
  #[error("payload has no profile snapshot")]
  NoSnapshot,
  #[error("max steps exceeded ({0})")]
  MaxStepsExceeded(usize),
  /// A handler failed; `partial` holds the payload as it was before the failing node.
  #[error("node {node_id} failed: {source}")]
  Handler {
    node_id: String,
    #[source]
    source: HandlerError,
    partial: Box<ImportResult>,
  },
}

/// Outcome of a dispatched match node, from the event it emitted.
#[instrument(level = "trace")]
pub(crate) fn match_outcome(event_type: &str) -> ReactTo {
  match DataImportEventType::from_token(event_type) {
    Some(t) if t.is_not_matched() => ReactTo::NonMatch,
    _ => ReactTo::Match,
  }
}

/// Nodes a run dispatches directly below `node`, in order.
fn runnable_children(node: &ProfileSnapshotWrapper) -> Vec<Arc<ProfileSnapshotWrapper>> {
  node
    .children()
    .iter()
    .filter(|c| {
      matches!(
        c.content_type(),
        ContentType::ActionProfile | ContentType::MatchProfile
      )
    })
    .cloned()
    .collect()
}

pub struct ImportRunner {
  dispatcher: Arc<EventDispatcher>,
  max_steps: usize,
}

impl ImportRunner {
  pub fn new(dispatcher: Arc<EventDispatcher>) -> Self {
    Self {
      dispatcher,
      max_steps: DEFAULT_MAX_STEPS,
    }
  }

  pub fn with_max_steps(mut self, max_steps: usize) -> Self {
    self.max_steps = max_steps;
    self
  }

  /// Runs every reachable node of the payload's snapshot, starting below its root.
  pub async fn run(&self, payload: DataImportEventPayload) -> Result<ImportResult, RunError> {
    let root = payload.profile_snapshot.clone().ok_or(RunError::NoSnapshot)?;
    let mut log = ImportLog {
      job_execution_id: payload.job_execution_id.clone(),
      steps: vec![],
    };
    let mut payload = payload;
    let mut pending: Vec<Arc<ProfileSnapshotWrapper>> = if matches!(
      root.content_type(),
      ContentType::ActionProfile | ContentType::MatchProfile
    ) {
      vec![Arc::clone(&root)]
    } else {
      runnable_children(&root).into_iter().rev().collect()
    };

    while let Some(node) = pending.pop() {
      if log.steps.len() >= self.max_steps {
        return Err(RunError::MaxStepsExceeded(self.max_steps));
      }
      let node_id = node.display_id();
      let step = log.next_step_index();
      let before = payload.event_type.clone();
      payload.current_node = Some(Arc::clone(&node));
      info!(node_id = %node_id, step, event_type = %before, "dispatching node");

      match self.dispatcher.dispatch(&payload).await {
        Ok((handler, next)) => {
          log.push(ImportStep::new(
            step,
            &node_id,
            node.content_type(),
            Some(handler),
            &before,
            &next.event_type,
            StepStatus::Success,
            None,
          ));
          payload = next;
          if node.content_type() == ContentType::MatchProfile {
            let outcome = match_outcome(&payload.event_type);
            for child in node.children_reacting_to(outcome).into_iter().rev() {
              pending.push(child);
            }
          }
        }
        Err(HandlerError::NoEligibleHandler(_)) => {
          warn!(node_id = %node_id, "no eligible handler; node skipped");
          log.push(ImportStep::new(
            step,
            &node_id,
            node.content_type(),
            None,
            &before,
            &before,
            StepStatus::Skipped,
            None,
          ));
        }
        Err(source) => {
          warn!(node_id = %node_id, kind = ?source.kind(), error = %source, "node failed");
          log.push(ImportStep::new(
            step,
            &node_id,
            node.content_type(),
            None,
            &before,
            &before,
            StepStatus::Fail,
            Some(source.to_string()),
          ));
          return Err(RunError::Handler {
            node_id,
            source,
            partial: Box::new(ImportResult { payload, log }),
          });
        }
      }
    }

    info!(
      event_type = %payload.event_type,
      steps = log.steps.len(),
      chain = ?payload.events_chain,
      "import run complete"
    );
    Ok(ImportResult { payload, log })
  }
}
