use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use super::Coordinator;
use crate::error::CoordinatorError;

/// Shared in-process set of aborted groups.
///
/// Clones share the same set, so one clone can play the sibling process
/// posting the abort while another is handed to the handler under test.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCoordinator {
    aborted: Arc<Mutex<HashSet<String>>>,
}

impl InMemoryCoordinator {
    /// Creates an empty coordinator (no group aborted).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `group` as aborted.
    pub fn abort(&self, group: &str) {
        self.aborted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(group.to_string());
    }

    /// Returns `true` if `group` was aborted.
    pub fn contains(&self, group: &str) -> bool {
        self.aborted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(group)
    }
}

#[async_trait]
impl Coordinator for InMemoryCoordinator {
    async fn is_aborted(&self, group: &str) -> Result<bool, CoordinatorError> {
        Ok(self.contains(group))
    }

    async fn post_abort(&self, group: &str) -> Result<(), CoordinatorError> {
        self.abort(group);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
