use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::tasks::repo::{Task, TaskStatus};

fn default_priority() -> String {
    "Normal".to_string()
}

/// Request body for task creation. Status always starts incomplete.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: String,
}

/// Request body for a full update; every mutable field is overwritten, so a
/// field left out falls back to its form default.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default)]
    pub status: TaskStatus,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: String,
    pub status: TaskStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Task> for TaskResponse {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            due_date: t.due_date,
            priority: t.priority,
            status: t.status,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub status: TaskStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults() {
        let req: CreateTaskRequest = serde_json::from_str(r#"{"title": "Buy milk"}"#).unwrap();
        assert_eq!(req.title, "Buy milk");
        assert_eq!(req.priority, "Normal");
        assert!(req.description.is_none());
        assert!(req.due_date.is_none());
    }

    #[test]
    fn update_request_status_defaults_to_incomplete() {
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"title": "t"}"#).unwrap();
        assert_eq!(req.status, TaskStatus::Incomplete);
    }
}
