//! Fulfilment task tracking.

use crate::error::{CommerceError, Result};
use clientdesk_core::Actor;
use clientdesk_core::commerce::{Task, TimelineEntry};
use clientdesk_core::environment::Clock;
use clientdesk_core::store::{Collection, Filter};
use clientdesk_core::validation::non_blank;
use serde::Deserialize;
use std::sync::Arc;

/// Admin changes to a task; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    /// Index of the step to toggle.
    pub step_index: Option<usize>,
    /// New completion state for `step_index`.
    pub completed: Option<bool>,
    /// Note appended to the timeline.
    pub note: Option<String>,
    /// Progress override, 0-100. Ignored when a step changes in the same call.
    pub progress: Option<u8>,
}

/// Reads and updates tasks with ownership checks.
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn Collection<Task>>,
    clock: Arc<dyn Clock>,
}

impl TaskService {
    /// Create a task service.
    #[must_use]
    pub fn new(tasks: Arc<dyn Collection<Task>>, clock: Arc<dyn Clock>) -> Self {
        Self { tasks, clock }
    }

    /// Tasks visible to `actor`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Store`] on storage failures.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<Task>> {
        let filter = if actor.is_admin() {
            Filter::new()
        } else {
            Filter::new().eq("accountId", actor.account_id.as_str())
        };
        let mut tasks = self.tasks.find(&filter).await?;
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    /// One task.
    ///
    /// # Errors
    ///
    /// - [`CommerceError::NotFound`] for an unknown id
    /// - [`CommerceError::Forbidden`] when a client reads someone else's task
    pub async fn get(&self, actor: &Actor, id: &str) -> Result<Task> {
        let task = self.load(id).await?;
        if !actor.can_access(&task.account_id) {
            return Err(CommerceError::Forbidden(
                "task belongs to another account".to_string(),
            ));
        }
        Ok(task)
    }

    /// Apply an admin update.
    ///
    /// # Errors
    ///
    /// - [`CommerceError::NotFound`] for an unknown id
    /// - [`CommerceError::Validation`] for a bad step index, a missing
    ///   `completed` flag, progress above 100 or an empty update
    pub async fn update(&self, id: &str, update: TaskUpdate) -> Result<Task> {
        let mut task = self.load(id).await?;
        let now = self.clock.now();
        let mut changed = false;

        if let Some(index) = update.step_index {
            let completed = update
                .completed
                .ok_or_else(|| CommerceError::validation("completed is required with stepIndex"))?;
            let step = task.steps.get_mut(index).ok_or_else(|| {
                CommerceError::Validation(format!("task has no step {index}"))
            })?;
            step.completed = completed;
            step.completed_at = completed.then_some(now);
            task.recompute_progress();
            changed = true;
        } else if let Some(progress) = update.progress {
            if progress > 100 {
                return Err(CommerceError::validation("progress must be between 0 and 100"));
            }
            task.set_progress(progress);
            changed = true;
        }

        if let Some(note) = non_blank(update.note.as_deref()) {
            task.timeline.push(TimelineEntry {
                at: now,
                message: note.to_string(),
            });
            changed = true;
        }

        if !changed {
            return Err(CommerceError::validation("nothing to update"));
        }
        task.updated_at = now;
        self.tasks.replace(&task).await?;
        tracing::debug!(task_id = %task.id, progress = task.progress, "Task updated");
        Ok(task)
    }

    /// Delete a task.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotFound`] for an unknown id.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.tasks.delete(id).await? {
            return Err(CommerceError::not_found("Task", id));
        }
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Task> {
        self.tasks
            .get(id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Task", id))
    }
}
