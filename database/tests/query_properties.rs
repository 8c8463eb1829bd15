//! Property tests for the filter-to-query compiler
//!
//! These run without a database: they only inspect the compiled SQL text and
//! the bound argument list.

use database::{compile_filter, Filter, QueryArg};
use mocks::{filter_strategy, FilterBuilder};
use proptest::prelude::*;

fn clause_count(filter: &Filter) -> usize {
    usize::from(filter.id.is_some())
        + usize::from(filter.search_term().is_some())
        + usize::from(filter.date().is_some())
}

fn expected_args(filter: &Filter) -> Vec<QueryArg> {
    let mut args = Vec::new();
    if let Some(id) = filter.id {
        args.push(QueryArg::Int(id));
    }
    if let Some(term) = filter.search_term() {
        let pattern = database::query::like_pattern(term);
        args.push(QueryArg::Text(pattern.clone()));
        args.push(QueryArg::Text(pattern));
    }
    if let Some(date) = filter.date() {
        args.push(QueryArg::Text(date.to_string()));
    }
    if let Some(limit) = filter.effective_limit() {
        args.push(QueryArg::Int(limit));
    }
    args
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_placeholders_track_arguments(filter in filter_strategy()) {
        let query = compile_filter(&filter);
        let placeholders = query.placeholders();
        let expected: Vec<usize> = (1..=query.args().len()).collect();
        prop_assert_eq!(placeholders, expected);
    }

    #[test]
    fn prop_arguments_follow_clause_order(filter in filter_strategy()) {
        let query = compile_filter(&filter);
        let expected = expected_args(&filter);
        prop_assert_eq!(query.args(), expected.as_slice());
    }

    #[test]
    fn prop_where_only_when_predicates_apply(filter in filter_strategy()) {
        let query = compile_filter(&filter);
        let sql = query.sql();
        prop_assert_eq!(sql.contains(" WHERE "), clause_count(&filter) > 0);
        prop_assert_eq!(sql.matches(" AND ").count(), clause_count(&filter).saturating_sub(1));
        prop_assert!(sql.starts_with("SELECT id, date, title, comment, repeat FROM scheduler"));
        prop_assert!(sql.contains(" ORDER BY date, id"));
        prop_assert_eq!(sql.ends_with(&format!("LIMIT ${}", query.args().len())), filter.limit > 0);
    }
}

#[test]
fn test_every_dimension_combination_keeps_lock_step() {
    for mask in 0u8..16 {
        let mut builder = FilterBuilder::new();
        if mask & 1 != 0 {
            builder = builder.id(7);
        }
        if mask & 2 != 0 {
            builder = builder.search("milk");
        }
        if mask & 4 != 0 {
            builder = builder.date("2024-01-01");
        }
        if mask & 8 != 0 {
            builder = builder.limit(2);
        }
        let filter = builder.build();
        let query = compile_filter(&filter);

        let expected: Vec<usize> = (1..=query.args().len()).collect();
        assert_eq!(query.placeholders(), expected, "mask {mask:04b}: {}", query.sql());
        let args = expected_args(&filter);
        assert_eq!(query.args(), args.as_slice(), "mask {mask:04b}");
    }
}
