use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

/// Completion state of a task. Closed two-state enum; stored as lowercase
/// text, flipped in place by toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TaskStatus {
    Incomplete,
    Complete,
}

impl TaskStatus {
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Incomplete => TaskStatus::Complete,
            TaskStatus::Complete => TaskStatus::Incomplete,
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Incomplete
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: String,
    pub status: TaskStatus,
    pub created_at: OffsetDateTime,
}

impl Task {
    pub async fn insert(
        db: &SqlitePool,
        owner_id: i64,
        title: &str,
        description: Option<&str>,
        due_date: Option<&str>,
        priority: &str,
    ) -> sqlx::Result<Task> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (owner_id, title, description, due_date, priority)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, owner_id, title, description, due_date, priority, status, created_at
            "#,
        )
        .bind(owner_id)
        .bind(title)
        .bind(description)
        .bind(due_date)
        .bind(priority)
        .fetch_one(db)
        .await
    }

    /// Newest first; id breaks ties within the same second.
    pub async fn list_for_owner(db: &SqlitePool, owner_id: i64) -> sqlx::Result<Vec<Task>> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, title, description, due_date, priority, status, created_at
            FROM tasks
            WHERE owner_id = ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(db)
        .await
    }

    /// Owner-constrained fetch. A miss does not say whether the row exists at
    /// all or belongs to someone else.
    pub async fn find_owned(
        db: &SqlitePool,
        task_id: i64,
        owner_id: i64,
    ) -> sqlx::Result<Option<Task>> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, title, description, due_date, priority, status, created_at
            FROM tasks
            WHERE id = ?1 AND owner_id = ?2
            "#,
        )
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(db)
        .await
    }

    /// Full-row overwrite of the five mutable fields. Owner and creation time
    /// never change.
    pub async fn overwrite(
        db: &SqlitePool,
        task_id: i64,
        title: &str,
        description: Option<&str>,
        due_date: Option<&str>,
        priority: &str,
        status: TaskStatus,
    ) -> sqlx::Result<Task> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = ?2, description = ?3, due_date = ?4, priority = ?5, status = ?6
            WHERE id = ?1
            RETURNING id, owner_id, title, description, due_date, priority, status, created_at
            "#,
        )
        .bind(task_id)
        .bind(title)
        .bind(description)
        .bind(due_date)
        .bind(priority)
        .bind(status)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &SqlitePool, task_id: i64) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE id = ?1
            "#,
        )
        .bind(task_id)
        .execute(db)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_is_an_involution() {
        assert_eq!(TaskStatus::Incomplete.toggled(), TaskStatus::Complete);
        assert_eq!(TaskStatus::Complete.toggled(), TaskStatus::Incomplete);
        assert_eq!(TaskStatus::Incomplete.toggled().toggled(), TaskStatus::Incomplete);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Incomplete).unwrap(),
            "\"incomplete\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Complete).unwrap(),
            "\"complete\""
        );
    }
}
