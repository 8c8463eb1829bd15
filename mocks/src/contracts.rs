//! Contract test helpers for validating trait implementations
//!
//! Provides standardized tests that any TaskRepository implementation should
//! pass. Each contract tags its rows with a unique token so the suite can run
//! against a store that already holds other rows.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use scheduler_core::{Context, Filter, Task, TaskError, TaskInput, TaskRepository};

use crate::assertions::{
    assert_matches_filter, assert_not_found, assert_prefix_of, assert_sorted_by_date,
    assert_task_fields_eq,
};

/// Id that no repository will have assigned during a test run
pub const MISSING_ID: i64 = i64::MAX;

static TOKEN_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Lowercase alphanumeric token unique within and across test runs
pub fn unique_token(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let n = TOKEN_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{prefix}{nanos:x}n{n}")
}

/// Test any TaskRepository implementation with comprehensive contract tests
///
/// Leaves the repository open; run [`test_close_contract`] afterwards.
pub async fn test_repository_contract<R: TaskRepository>(repo: &R) {
    test_health_check_contract(repo).await;
    test_create_contract(repo).await;
    test_find_all_contract(repo).await;
    test_ordering_and_limit_contract(repo).await;
    test_search_contract(repo).await;
    test_conjunction_contract(repo).await;
    test_update_contract(repo).await;
    test_patch_contract(repo).await;
    test_delete_contract(repo).await;
    test_cancellation_contract(repo).await;
}

async fn create_all<R: TaskRepository>(repo: &R, tasks: &[Task]) -> Vec<i64> {
    let ctx = Context::background();
    let mut ids = Vec::with_capacity(tasks.len());
    for task in tasks {
        ids.push(repo.create_task(&ctx, task).await.expect("Create should succeed"));
    }
    ids
}

/// Test health check contract
pub async fn test_health_check_contract<R: TaskRepository>(repo: &R) {
    repo.health_check(&Context::background())
        .await
        .expect("Health check should pass for healthy repository");
}

/// Test task creation contract
pub async fn test_create_contract<R: TaskRepository>(repo: &R) {
    let ctx = Context::background();
    let task = Task::default().with_date("2024-05-01").with_title("X");

    let id = repo.create_task(&ctx, &task).await.expect("Create should succeed");
    assert!(id > 0, "Created task should have positive ID");

    let found = repo
        .find_task(&ctx, &Filter::by_id(id))
        .await
        .expect("Find should succeed");
    assert_eq!(found.len(), 1, "Find by id should return exactly one row");
    assert_eq!(found[0].id, id);
    assert_task_fields_eq(&found[0], &task);

    let second = repo.create_task(&ctx, &task).await.expect("Create should succeed");
    assert_ne!(second, id, "Every create should get a fresh id");
}

/// Test that an empty filter returns every row in date order
pub async fn test_find_all_contract<R: TaskRepository>(repo: &R) {
    let ctx = Context::background();
    let token = unique_token("all");
    let ids = create_all(
        repo,
        &[
            Task::default().with_date("2031-03-01").with_title(token.clone()),
            Task::default().with_date("2001-03-01").with_title(token.clone()),
        ],
    )
    .await;

    let all = repo.find_task(&ctx, &Filter::new()).await.expect("Find should succeed");
    assert_sorted_by_date(&all);
    for id in ids {
        assert!(all.iter().any(|t| t.id == id), "Unfiltered find should include task {id}");
    }

    let none = repo
        .find_task(&ctx, &Filter::new().with_search(unique_token("absent")))
        .await
        .expect("Find with no matches should succeed");
    assert!(none.is_empty(), "No matches should give an empty list");
}

/// Test ordering and limit contract
pub async fn test_ordering_and_limit_contract<R: TaskRepository>(repo: &R) {
    let ctx = Context::background();
    let token = unique_token("ord");
    let dates = ["2024-03-05", "2024-01-09", "2024-02-01", "2024-01-09", "2024-12-31"];
    let tasks: Vec<Task> = dates
        .iter()
        .map(|d| Task::default().with_date(*d).with_title(format!("{token} {d}")))
        .collect();
    create_all(repo, &tasks).await;

    let filter = Filter::new().with_search(token.clone());
    let full = repo.find_task(&ctx, &filter).await.expect("Find should succeed");
    assert_eq!(full.len(), dates.len());
    assert_sorted_by_date(&full);
    assert_eq!(full[0].date, "2024-01-09");
    assert_eq!(full[4].date, "2024-12-31");

    for limit in 1..=6 {
        let limited_filter = filter.clone().with_limit(limit);
        let limited = repo
            .find_task(&ctx, &limited_filter)
            .await
            .expect("Limited find should succeed");
        assert_eq!(limited.len(), (limit as usize).min(dates.len()));
        assert_prefix_of(&limited, &full);
    }

    for limit in [0, -1] {
        let unlimited = repo
            .find_task(&ctx, &filter.clone().with_limit(limit))
            .await
            .expect("Find should succeed");
        assert_eq!(unlimited.len(), dates.len(), "Non-positive limit means unlimited");
    }
}

/// Test case-insensitive search over title and comment
pub async fn test_search_contract<R: TaskRepository>(repo: &R) {
    let ctx = Context::background();
    let token = unique_token("srch");
    let upper = token.to_uppercase();
    let tasks = vec![
        Task::default().with_date("2024-01-01").with_title(format!("Buy {token}")),
        Task::default().with_date("2024-01-02").with_title(format!("{upper}shake")),
        Task::default()
            .with_date("2024-01-03")
            .with_title("Bread")
            .with_comment(format!("buy {token}")),
    ];
    let ids = create_all(repo, &tasks).await;

    let filter = Filter::new().with_search(token.clone());
    let found = repo.find_task(&ctx, &filter).await.expect("Search should succeed");
    assert_eq!(found.iter().map(|t| t.id).collect::<Vec<_>>(), ids);
    assert_matches_filter(&found, &filter);

    let limited = repo
        .find_task(&ctx, &filter.clone().with_limit(2))
        .await
        .expect("Search with limit should succeed");
    assert_eq!(limited.iter().map(|t| t.id).collect::<Vec<_>>(), ids[..2].to_vec());

    let literal = repo
        .find_task(&ctx, &Filter::new().with_search(format!("{token}%")))
        .await
        .expect("Search should succeed");
    assert!(literal.is_empty(), "LIKE wildcards in the term must match literally");
}

/// Test that id, search and date predicates combine with AND
pub async fn test_conjunction_contract<R: TaskRepository>(repo: &R) {
    let ctx = Context::background();
    let token = unique_token("conj");
    let ids = create_all(
        repo,
        &[
            Task::default().with_date("2025-06-01").with_title(token.clone()),
            Task::default().with_date("2025-06-02").with_title(token.clone()),
            Task::default().with_date("2025-06-01").with_title("unrelated"),
        ],
    )
    .await;

    let both = Filter::by_id(ids[0]).with_search(token.clone()).with_date("2025-06-01");
    let found = repo.find_task(&ctx, &both).await.expect("Find should succeed");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, ids[0]);

    let wrong_date = Filter::by_id(ids[0]).with_search(token.clone()).with_date("2025-06-02");
    assert!(repo.find_task(&ctx, &wrong_date).await.expect("Find should succeed").is_empty());

    let wrong_term = Filter::by_id(ids[2]).with_search(token.clone()).with_date("2025-06-01");
    assert!(repo.find_task(&ctx, &wrong_term).await.expect("Find should succeed").is_empty());

    let term_and_date = Filter::new().with_search(token).with_date("2025-06-01");
    let found = repo.find_task(&ctx, &term_and_date).await.expect("Find should succeed");
    assert_eq!(found.iter().map(|t| t.id).collect::<Vec<_>>(), vec![ids[0]]);
}

/// Test task update contract
pub async fn test_update_contract<R: TaskRepository>(repo: &R) {
    let ctx = Context::background();
    let id = create_all(repo, &[Task::default().with_date("2024-07-01").with_title("Original")]).await[0];

    let updated = Task::default()
        .with_id(id)
        .with_date("2024-07-02")
        .with_title("Updated")
        .with_comment("now with comment")
        .with_repeat("d 7");
    repo.update_task(&ctx, &updated).await.expect("Update should succeed");

    let stored = repo
        .get_task(&ctx, id)
        .await
        .expect("Get should succeed")
        .expect("Updated task should exist");
    assert_eq!(stored, updated);

    let missing = updated.clone().with_id(MISSING_ID);
    assert_not_found(repo.update_task(&ctx, &missing).await);
}

/// Test that a patch only overwrites present fields
pub async fn test_patch_contract<R: TaskRepository>(repo: &R) {
    let ctx = Context::background();
    let original = Task::default()
        .with_date("2024-08-01")
        .with_title("Water plants")
        .with_comment("balcony")
        .with_repeat("d 3");
    let id = create_all(repo, &[original.clone()]).await[0];

    let stored = repo
        .get_task(&ctx, id)
        .await
        .expect("Get should succeed")
        .expect("Task should exist");
    let patch = TaskInput {
        title: Some("Water all plants".to_string()),
        repeat: Some(String::new()),
        ..Default::default()
    };
    repo.update_task(&ctx, &patch.apply(stored))
        .await
        .expect("Update should succeed");

    let patched = repo
        .get_task(&ctx, id)
        .await
        .expect("Get should succeed")
        .expect("Task should exist");
    assert_eq!(patched.title, "Water all plants");
    assert_eq!(patched.repeat, "");
    assert_eq!(patched.date, original.date);
    assert_eq!(patched.comment, original.comment);
}

/// Test task deletion contract
pub async fn test_delete_contract<R: TaskRepository>(repo: &R) {
    let ctx = Context::background();
    let id = create_all(repo, &[Task::default().with_date("2024-09-01").with_title("Temporary")]).await[0];

    repo.delete_task(&ctx, id).await.expect("Delete should succeed");
    assert!(repo.get_task(&ctx, id).await.expect("Get should succeed").is_none());

    assert_not_found(repo.delete_task(&ctx, id).await);
    assert_not_found(repo.delete_task(&ctx, MISSING_ID).await);
}

/// Test that a cancelled context fails every operation with `Cancelled`
pub async fn test_cancellation_contract<R: TaskRepository>(repo: &R) {
    let ctx = Context::background();
    ctx.cancel();
    let task = Task::default().with_date("2024-10-01").with_title("never stored");

    assert_eq!(repo.find_task(&ctx, &Filter::new()).await.unwrap_err(), TaskError::Cancelled);
    assert_eq!(repo.create_task(&ctx, &task).await.unwrap_err(), TaskError::Cancelled);
    assert_eq!(
        repo.update_task(&ctx, &task.clone().with_id(1)).await.unwrap_err(),
        TaskError::Cancelled
    );
    assert_eq!(repo.delete_task(&ctx, 1).await.unwrap_err(), TaskError::Cancelled);
    assert_eq!(repo.health_check(&ctx).await.unwrap_err(), TaskError::Cancelled);
}

/// Test that closing is idempotent and takes effect under a done context
pub async fn test_close_contract<R: TaskRepository>(repo: &R) {
    // A close started under a done context still shuts the repository
    let cancelled = Context::background();
    cancelled.cancel();
    if let Err(e) = repo.close(&cancelled).await {
        assert!(e.is_cancellation(), "Interrupted close should report cancellation, got {e:?}");
    }

    let ctx = Context::background();
    let err = repo
        .find_task(&ctx, &Filter::new())
        .await
        .expect_err("Closed repository must reject operations");
    assert!(err.is_database(), "Use after close should be a database error, got {err:?}");

    repo.close(&ctx).await.expect("Close after an interrupted close should succeed");
    repo.close(&ctx).await.expect("Second close should be a no-op");
}
