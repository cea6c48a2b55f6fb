use sqlx::SqlitePool;
use tracing::info;

use crate::error::ApiError;
use crate::tasks::repo::{Task, TaskStatus};

/// Mutable task fields as they arrive from the client.
#[derive(Debug)]
pub struct TaskFields<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub due_date: Option<&'a str>,
    pub priority: &'a str,
}

fn validated_title(title: &str) -> Result<&str, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("Title is required".into()));
    }
    Ok(title)
}

pub async fn create(
    db: &SqlitePool,
    owner_id: i64,
    fields: TaskFields<'_>,
) -> Result<Task, ApiError> {
    let title = validated_title(fields.title)?;
    let task = Task::insert(
        db,
        owner_id,
        title,
        fields.description,
        fields.due_date,
        fields.priority,
    )
    .await?;
    info!(task_id = task.id, owner_id, "task created");
    Ok(task)
}

pub async fn list_for_owner(db: &SqlitePool, owner_id: i64) -> Result<Vec<Task>, ApiError> {
    Ok(Task::list_for_owner(db, owner_id).await?)
}

/// The ownership guard every targeted operation goes through: re-fetch the
/// row constrained to the caller, and collapse "absent" and "not yours" into
/// one outcome.
pub async fn get_if_owned(db: &SqlitePool, task_id: i64, owner_id: i64) -> Result<Task, ApiError> {
    Task::find_owned(db, task_id, owner_id)
        .await?
        .ok_or(ApiError::NotFound)
}

pub async fn update(
    db: &SqlitePool,
    task_id: i64,
    owner_id: i64,
    fields: TaskFields<'_>,
    status: TaskStatus,
) -> Result<Task, ApiError> {
    let task = get_if_owned(db, task_id, owner_id).await?;
    let title = validated_title(fields.title)?;
    let updated = Task::overwrite(
        db,
        task.id,
        title,
        fields.description,
        fields.due_date,
        fields.priority,
        status,
    )
    .await?;
    info!(task_id = task.id, owner_id, "task updated");
    Ok(updated)
}

pub async fn delete(db: &SqlitePool, task_id: i64, owner_id: i64) -> Result<(), ApiError> {
    let task = get_if_owned(db, task_id, owner_id).await?;
    Task::delete(db, task.id).await?;
    info!(task_id = task.id, owner_id, "task deleted");
    Ok(())
}

/// Flip the status and persist the row otherwise unchanged.
pub async fn toggle_status(
    db: &SqlitePool,
    task_id: i64,
    owner_id: i64,
) -> Result<TaskStatus, ApiError> {
    let task = get_if_owned(db, task_id, owner_id).await?;
    let status = task.status.toggled();
    Task::overwrite(
        db,
        task.id,
        &task.title,
        task.description.as_deref(),
        task.due_date.as_deref(),
        &task.priority,
        status,
    )
    .await?;
    info!(task_id = task.id, owner_id, status = ?status, "task status toggled");
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_pool;

    async fn registered_user(db: &SqlitePool, email: &str) -> i64 {
        crate::auth::service::register(db, email, "pw")
            .await
            .expect("register")
            .id
    }

    fn fields(title: &str) -> TaskFields<'_> {
        TaskFields {
            title,
            description: None,
            due_date: None,
            priority: "Normal",
        }
    }

    #[tokio::test]
    async fn create_then_list_shows_incomplete_task() {
        let db = test_pool().await;
        let owner = registered_user(&db, "a@x.com").await;
        create(&db, owner, fields("Buy milk")).await.expect("create");
        let tasks = list_for_owner(&db, owner).await.expect("list");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Buy milk");
        assert_eq!(tasks[0].status, TaskStatus::Incomplete);
    }

    #[tokio::test]
    async fn create_trims_title_and_rejects_blank() {
        let db = test_pool().await;
        let owner = registered_user(&db, "a@x.com").await;
        let err = create(&db, owner, fields("   ")).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        // Nothing was persisted.
        assert!(list_for_owner(&db, owner).await.expect("list").is_empty());

        let task = create(&db, owner, fields("  padded  ")).await.expect("create");
        assert_eq!(task.title, "padded");
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let db = test_pool().await;
        let owner = registered_user(&db, "a@x.com").await;
        for title in ["T1", "T2", "T3"] {
            create(&db, owner, fields(title)).await.expect("create");
        }
        let titles: Vec<_> = list_for_owner(&db, owner)
            .await
            .expect("list")
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["T3", "T2", "T1"]);
    }

    #[tokio::test]
    async fn list_only_returns_own_tasks() {
        let db = test_pool().await;
        let a = registered_user(&db, "a@x.com").await;
        let b = registered_user(&db, "b@x.com").await;
        create(&db, a, fields("mine")).await.expect("create");
        assert!(list_for_owner(&db, b).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn every_targeted_operation_hides_foreign_tasks() {
        let db = test_pool().await;
        let a = registered_user(&db, "a@x.com").await;
        let b = registered_user(&db, "b@x.com").await;
        let task = create(&db, a, fields("private")).await.expect("create");

        assert!(matches!(
            get_if_owned(&db, task.id, b).await.unwrap_err(),
            ApiError::NotFound
        ));
        assert!(matches!(
            update(&db, task.id, b, fields("stolen"), TaskStatus::Complete)
                .await
                .unwrap_err(),
            ApiError::NotFound
        ));
        assert!(matches!(
            delete(&db, task.id, b).await.unwrap_err(),
            ApiError::NotFound
        ));
        assert!(matches!(
            toggle_status(&db, task.id, b).await.unwrap_err(),
            ApiError::NotFound
        ));

        // The owner still sees the task untouched.
        let unchanged = get_if_owned(&db, task.id, a).await.expect("get");
        assert_eq!(unchanged.title, "private");
        assert_eq!(unchanged.status, TaskStatus::Incomplete);
    }

    #[tokio::test]
    async fn missing_task_is_the_same_error_as_foreign_task() {
        let db = test_pool().await;
        let owner = registered_user(&db, "a@x.com").await;
        assert!(matches!(
            get_if_owned(&db, 9999, owner).await.unwrap_err(),
            ApiError::NotFound
        ));
    }

    #[tokio::test]
    async fn toggle_flips_and_flips_back() {
        let db = test_pool().await;
        let owner = registered_user(&db, "a@x.com").await;
        let task = create(&db, owner, fields("Buy milk")).await.expect("create");

        let status = toggle_status(&db, task.id, owner).await.expect("toggle");
        assert_eq!(status, TaskStatus::Complete);
        let status = toggle_status(&db, task.id, owner).await.expect("toggle");
        assert_eq!(status, TaskStatus::Incomplete);

        let stored = get_if_owned(&db, task.id, owner).await.expect("get");
        assert_eq!(stored.status, TaskStatus::Incomplete);
        assert_eq!(stored.title, "Buy milk");
    }

    #[tokio::test]
    async fn update_overwrites_all_mutable_fields() {
        let db = test_pool().await;
        let owner = registered_user(&db, "a@x.com").await;
        let task = create(
            &db,
            owner,
            TaskFields {
                title: "old",
                description: Some("old notes"),
                due_date: Some("2026-08-01"),
                priority: "Low",
            },
        )
        .await
        .expect("create");

        let updated = update(
            &db,
            task.id,
            owner,
            TaskFields {
                title: "new",
                description: None,
                due_date: Some("2026-09-01"),
                priority: "High",
            },
            TaskStatus::Complete,
        )
        .await
        .expect("update");

        assert_eq!(updated.title, "new");
        assert_eq!(updated.description, None);
        assert_eq!(updated.due_date.as_deref(), Some("2026-09-01"));
        assert_eq!(updated.priority, "High");
        assert_eq!(updated.status, TaskStatus::Complete);
        assert_eq!(updated.owner_id, owner);
        assert_eq!(updated.created_at, task.created_at);
    }

    #[tokio::test]
    async fn update_rejects_blank_title_without_writing() {
        let db = test_pool().await;
        let owner = registered_user(&db, "a@x.com").await;
        let task = create(&db, owner, fields("keep me")).await.expect("create");

        let err = update(&db, task.id, owner, fields(" "), TaskStatus::Complete)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let stored = get_if_owned(&db, task.id, owner).await.expect("get");
        assert_eq!(stored.title, "keep me");
        assert_eq!(stored.status, TaskStatus::Incomplete);
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let db = test_pool().await;
        let owner = registered_user(&db, "a@x.com").await;
        let task = create(&db, owner, fields("done with this")).await.expect("create");
        delete(&db, task.id, owner).await.expect("delete");
        assert!(matches!(
            get_if_owned(&db, task.id, owner).await.unwrap_err(),
            ApiError::NotFound
        ));
        assert!(list_for_owner(&db, owner).await.expect("list").is_empty());
    }
}
