//! Random test data generators using the fake crate
//!
//! Provides realistic random data including:
//! - Calendar dates in the stored `YYYY-MM-DD` form
//! - Task titles, comments and recurrence rules
//! - Property-based testing strategies for tasks and filters

use chrono::{Duration, NaiveDate};
use fake::faker::lorem::en::{Sentence, Words};
use fake::Fake;
use proptest::prelude::*;
use rand::Rng;
use scheduler_core::{Filter, Task};

const REPEAT_RULES: [&str; 6] = ["", "d 1", "d 7", "y", "w 1,3,5", "m 1,15"];

/// Format a day offset from 2024-01-01 as a stored date
pub fn date_from_offset(days: u32) -> String {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    (base + Duration::days(i64::from(days)))
        .format("%Y-%m-%d")
        .to_string()
}

/// Generate a random date within 2024
pub fn generate_date() -> String {
    date_from_offset(rand::thread_rng().gen_range(0..366))
}

/// Generate a realistic task title
pub fn generate_task_title() -> String {
    Sentence(2..6).fake()
}

/// Generate a realistic task comment
pub fn generate_task_comment() -> String {
    let words: Vec<String> = Words(0..12).fake();
    words.join(" ")
}

/// Generate a recurrence rule, possibly empty
pub fn generate_repeat_rule() -> String {
    REPEAT_RULES[rand::thread_rng().gen_range(0..REPEAT_RULES.len())].to_string()
}

/// Generate an unsaved task with realistic data
pub fn generate_random_task() -> Task {
    Task::default()
        .with_date(generate_date())
        .with_title(generate_task_title())
        .with_comment(generate_task_comment())
        .with_repeat(generate_repeat_rule())
}

/// Proptest strategy for stored dates
pub fn date_strategy() -> impl Strategy<Value = String> {
    (0u32..366).prop_map(date_from_offset)
}

/// Proptest strategy for search terms, including LIKE metacharacters
pub fn search_term_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z %_\\\\]{0,10}"
}

/// Proptest strategy for recurrence rules
pub fn repeat_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(REPEAT_RULES.to_vec()).prop_map(str::to_string)
}

/// Proptest strategy for generating unsaved tasks
pub fn task_strategy() -> impl Strategy<Value = Task> {
    (
        date_strategy(),
        "[A-Za-z ]{1,30}",
        "[A-Za-z0-9 .,!?]{0,60}",
        repeat_strategy(),
    )
        .prop_map(|(date, title, comment, repeat)| {
            Task::default()
                .with_date(date)
                .with_title(title)
                .with_comment(comment)
                .with_repeat(repeat)
        })
}

/// Proptest strategy for generating filters over every dimension
///
/// Limits include zero and negative values, which mean "unlimited".
pub fn filter_strategy() -> impl Strategy<Value = Filter> {
    (
        proptest::option::of(1i64..10_000),
        proptest::option::of(search_term_strategy()),
        proptest::option::of(date_strategy()),
        -3i64..50,
    )
        .prop_map(|(id, search_term, date, limit)| Filter {
            id,
            search_term,
            date,
            limit,
        })
}
