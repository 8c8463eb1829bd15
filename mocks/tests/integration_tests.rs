//! Integration tests for the mocks crate
//!
//! Tests the mock implementations and utilities to ensure they work correctly
//! and provide the expected testing capabilities.

use mocks::*;
use proptest::prelude::*;
use scheduler_core::{Context, Filter, TaskError, TaskRepository};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_mock_repository_passes_contract() {
    let repo = MockTaskRepository::new();
    test_repository_contract(&repo).await;
    test_close_contract(&repo).await;
}

#[tokio::test]
async fn test_milk_search_with_limit() {
    let repo = MockTaskRepository::new();
    let ctx = Context::background();
    for task in milk_tasks() {
        repo.create_task(&ctx, &task).await.unwrap();
    }

    let found = repo
        .find_task(&ctx, &Filter::new().with_search("milk").with_limit(2))
        .await
        .unwrap();

    let titles: Vec<&str> = found.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Buy milk", "Milkshake"]);
    assert_eq!(found[0].date, "2024-01-01");
    assert_eq!(found[1].date, "2024-01-02");
}

#[tokio::test]
async fn test_milk_search_without_limit_includes_comment_match() {
    let repo = MockTaskRepository::new();
    let ctx = Context::background();
    for task in milk_tasks() {
        repo.create_task(&ctx, &task).await.unwrap();
    }

    let found = repo
        .find_task(&ctx, &Filter::new().with_search("MILK"))
        .await
        .unwrap();
    assert_eq!(found.len(), 3);
    assert_eq!(found[2].comment, "buy milk");
}

#[tokio::test]
async fn test_mock_repository_call_tracking() {
    let repo = MockTaskRepository::new();
    let ctx = Context::background();

    let id = repo.create_task(&ctx, &create_test_task()).await.unwrap();
    repo.get_task(&ctx, id).await.unwrap();

    repo.assert_called("create_task");
    repo.assert_called("find_task");
    assert_eq!(repo.call_history().len(), 2);

    repo.clear_history();
    assert!(repo.call_history().is_empty());
}

#[tokio::test]
async fn test_mock_repository_error_injection() {
    let repo = MockTaskRepository::new();
    let ctx = Context::background();

    repo.inject_error(TaskError::Database("connection reset".to_string()));

    // Next operation should fail with the injected error, unchanged
    let result = repo.find_task(&ctx, &Filter::new()).await;
    assert_eq!(
        result.unwrap_err(),
        TaskError::Database("connection reset".to_string())
    );

    // Injection is consumed by a single call
    assert!(repo.find_task(&ctx, &Filter::new()).await.is_ok());

    repo.inject_error(TaskError::Database("unused".to_string()));
    repo.clear_error();
    assert!(repo.health_check(&ctx).await.is_ok());
}

#[tokio::test]
async fn test_not_found_is_distinct_from_other_errors() {
    let repo = MockTaskRepository::new();
    let ctx = Context::background();

    let err = repo
        .update_task(&ctx, &create_stored_task(404))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.is_database());

    let err = repo.delete_task(&ctx, 404).await.unwrap_err();
    assert_eq!(err, TaskError::not_found_id(404));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_abandons_slow_operation() {
    let repo = MockTaskRepository::new();
    repo.set_latency(Some(Duration::from_secs(5)));

    let ctx = Context::background().with_timeout(Duration::from_millis(100));
    let err = repo.create_task(&ctx, &create_test_task()).await.unwrap_err();
    assert_eq!(err, TaskError::DeadlineExceeded);
    assert!(repo.stored_tasks().is_empty(), "Abandoned create must not store a row");

    repo.set_latency(None);
    let ctx = Context::background();
    assert!(repo.create_task(&ctx, &create_test_task()).await.is_ok());
}

#[tokio::test]
async fn test_cancel_from_another_task() {
    let repo = MockTaskRepository::new();
    repo.set_latency(Some(Duration::from_secs(30)));

    let ctx = Context::background();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        canceller.cancel();
    });

    let err = repo.find_task(&ctx, &Filter::new()).await.unwrap_err();
    assert_eq!(err, TaskError::Cancelled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_get_unique_ids() {
    let repo = Arc::new(MockTaskRepository::new());
    let mut handles = Vec::new();

    for task in create_test_tasks(50) {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            repo.create_task(&Context::background(), &task).await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap());
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 50);

    let all = repo.find_task(&Context::background(), &Filter::new()).await.unwrap();
    assert_eq!(all.len(), 50);
    assert_sorted_by_date(&all);
}

#[tokio::test]
async fn test_generated_tasks_round_trip_through_repository() {
    let repo = MockTaskRepository::new();
    let ctx = Context::background();

    for _ in 0..20 {
        let task = generate_random_task();
        let id = repo.create_task(&ctx, &task).await.unwrap();
        let stored = repo.get_task(&ctx, id).await.unwrap().unwrap();
        assert_task_fields_eq(&stored, &task);
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_find_respects_every_filter(
        tasks in prop::collection::vec(task_strategy(), 0..25),
        filter in filter_strategy(),
    ) {
        runtime().block_on(async {
            let repo = MockTaskRepository::new();
            let ctx = Context::background();
            for task in &tasks {
                repo.create_task(&ctx, task).await.unwrap();
            }

            let found = repo.find_task(&ctx, &filter).await.unwrap();
            assert_matches_filter(&found, &filter);
            assert_sorted_by_date(&found);

            let unlimited = Filter { limit: 0, ..filter.clone() };
            let full = repo.find_task(&ctx, &unlimited).await.unwrap();
            assert_prefix_of(&found, &full);
        });
    }

    #[test]
    fn prop_search_hits_title_or_comment(
        tasks in prop::collection::vec(task_strategy(), 1..25),
        term in "[a-zA-Z]{1,3}",
    ) {
        runtime().block_on(async {
            let repo = MockTaskRepository::new();
            let ctx = Context::background();
            for task in &tasks {
                repo.create_task(&ctx, task).await.unwrap();
            }

            let found = repo.find_task(&ctx, &Filter::new().with_search(term.clone())).await.unwrap();
            let needle = term.to_lowercase();
            for task in &found {
                assert!(
                    task.title.to_lowercase().contains(&needle)
                        || task.comment.to_lowercase().contains(&needle)
                );
            }
            let expected = tasks
                .iter()
                .filter(|t| {
                    t.title.to_lowercase().contains(&needle) || t.comment.to_lowercase().contains(&needle)
                })
                .count();
            assert_eq!(found.len(), expected);
        });
    }
}
