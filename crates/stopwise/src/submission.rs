//! Last-submission-wins bookkeeping for repeated runs

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{PipelineError, Result};

/// Hands out monotonically numbered tickets; only the newest is current
#[derive(Debug, Clone, Default)]
pub struct Submissions {
  latest: Arc<AtomicU64>,
}

/// One submitted run
#[derive(Debug, Clone)]
pub struct Ticket {
  id: u64,
  latest: Arc<AtomicU64>,
}

impl Submissions {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start a new submission, superseding every earlier ticket
  pub fn submit(&self) -> Ticket {
    let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
    Ticket { id, latest: Arc::clone(&self.latest) }
  }

  pub fn latest(&self) -> u64 {
    self.latest.load(Ordering::SeqCst)
  }
}

impl Ticket {
  pub fn id(&self) -> u64 {
    self.id
  }

  pub fn is_current(&self) -> bool {
    self.latest.load(Ordering::SeqCst) == self.id
  }

  pub fn ensure_current(&self) -> Result<()> {
    let latest = self.latest.load(Ordering::SeqCst);
    if latest == self.id {
      Ok(())
    } else {
      Err(PipelineError::Superseded { ticket: self.id, latest })
    }
  }
}
