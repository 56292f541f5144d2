use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tally_core::{
    aggregator::compute_stats,
    analytics::{Dimension, HitStore, StatRow},
    hit::{Hit, InsertOutcome},
    ledger::ensure_day,
};
use tally_duckdb::DuckDbBackend;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

fn sample_hit(visitor: &str, path: &str, d: NaiveDate) -> Hit {
    Hit {
        visitor_hash: visitor.to_string(),
        path: path.to_string(),
        action: String::new(),
        day: d,
        country: "Poland".to_string(),
        device: "Mac OSX".to_string(),
        browser: "Chrome".to_string(),
        referrer: "google.com".to_string(),
    }
}

async fn hit_count(db: &DuckDbBackend) -> i64 {
    let conn = db.conn_for_test().await;
    let mut stmt = conn
        .prepare("SELECT COUNT(*) FROM hits")
        .expect("prepare count query");
    stmt.query_row([], |row| row.get(0)).expect("count hits")
}

#[tokio::test]
async fn test_duplicate_hit_is_ignored() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    let hit = sample_hit("abc", "/blog", day("2024-01-01"));

    assert_eq!(db.insert_hit(&hit).await.expect("first"), InsertOutcome::Inserted);
    assert_eq!(db.insert_hit(&hit).await.expect("second"), InsertOutcome::Duplicate);
    assert_eq!(hit_count(&db).await, 1);
}

#[tokio::test]
async fn test_duplicate_key_ignores_non_key_columns() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    let first = sample_hit("abc", "/blog", day("2024-01-01"));
    let mut second = first.clone();
    second.browser = "Firefox".to_string();

    db.insert_hit(&first).await.expect("first");
    assert_eq!(db.insert_hit(&second).await.expect("second"), InsertOutcome::Duplicate);

    let conn = db.conn_for_test().await;
    let browser: String = conn
        .query_row("SELECT browser FROM hits", [], |row| row.get(0))
        .expect("browser");
    assert_eq!(browser, "Chrome");
}

#[tokio::test]
async fn test_day_marker_is_idempotent() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    let d = day("2024-01-01");
    assert_eq!(db.insert_day(d).await.expect("first"), InsertOutcome::Inserted);
    assert_eq!(db.insert_day(d).await.expect("second"), InsertOutcome::Duplicate);
}

#[tokio::test]
async fn test_daily_counts_zero_fill() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    let today = day("2024-03-10");
    for offset in 0..3 {
        db.insert_day(today - Duration::days(offset)).await.expect("day");
    }
    db.insert_hit(&sample_hit("v1", "/home", today))
        .await
        .expect("hit");
    db.insert_hit(&sample_hit("v2", "/other", today - Duration::days(1)))
        .await
        .expect("hit");

    let series = db
        .get_daily_counts("/home", today - Duration::days(30))
        .await
        .expect("series");
    assert_eq!(
        series,
        vec![
            StatRow::new("2024-03-08", 0),
            StatRow::new("2024-03-09", 0),
            StatRow::new("2024-03-10", 1),
        ]
    );
}

#[tokio::test]
async fn test_grouped_counts_respect_window_and_path() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    let today = day("2024-03-31");
    let mut inside = sample_hit("v1", "/home", today - Duration::days(30));
    inside.country = "France".to_string();
    let mut outside = sample_hit("v2", "/home", today - Duration::days(31));
    outside.country = "Spain".to_string();
    let mut other_path = sample_hit("v3", "/other", today);
    other_path.country = "Italy".to_string();
    for hit in [&inside, &outside, &other_path] {
        db.insert_hit(hit).await.expect("insert");
    }

    let countries = db
        .get_grouped_counts("/home", Dimension::Country, today - Duration::days(30))
        .await
        .expect("countries");
    assert_eq!(countries, vec![StatRow::new("France", 1)]);
}

#[tokio::test]
async fn test_grouped_counts_include_page_view_action() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    let d = day("2024-01-01");
    db.insert_hit(&sample_hit("v1", "/blog", d)).await.expect("view");
    let mut signup = sample_hit("v1", "/blog", d);
    signup.action = "signup".to_string();
    db.insert_hit(&signup).await.expect("action");
    db.insert_hit(&sample_hit("v2", "/blog", d)).await.expect("view");

    let actions = db
        .get_grouped_counts("/blog", Dimension::Action, d)
        .await
        .expect("actions");
    assert_eq!(actions, vec![StatRow::new("", 2), StatRow::new("signup", 1)]);
}

#[tokio::test]
async fn test_distinct_paths() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    let d = day("2024-01-01");
    for (visitor, path) in [("v1", "/b"), ("v2", "/a"), ("v3", "/b")] {
        db.insert_hit(&sample_hit(visitor, path, d)).await.expect("insert");
    }
    assert_eq!(
        db.get_distinct_paths().await.expect("paths"),
        vec!["/a".to_string(), "/b".to_string()]
    );
}

#[tokio::test]
async fn test_hit_store_dyn_dispatch_end_to_end() {
    let db = Arc::new(DuckDbBackend::open_in_memory().expect("db"));
    let store: Arc<dyn HitStore> = db.clone();
    let today = day("2024-01-15");

    ensure_day(store.as_ref(), day("2024-01-01")).await.expect("day");
    ensure_day(store.as_ref(), today).await.expect("day");
    for visitor in ["a", "b", "c"] {
        let mut hit = sample_hit(visitor, "/blog", day("2024-01-01"));
        hit.browser = if visitor == "a" { "Firefox" } else { "Chrome" }.to_string();
        store.insert_hit(&hit).await.expect("insert");
    }

    let stats = compute_stats(store.as_ref(), "/blog", today).await;
    assert_eq!(
        stats.series,
        vec![StatRow::new("2024-01-01", 3), StatRow::new("2024-01-15", 0)]
    );
    assert_eq!(stats.actions, vec![StatRow::new("", 3)]);
    assert_eq!(
        stats.browsers,
        vec![StatRow::new("Chrome", 2), StatRow::new("Firefox", 1)]
    );
    assert_eq!(stats.referrers, vec![StatRow::new("google.com", 3)]);
    assert_eq!(store.latest_day().await.expect("latest day"), Some(today));
}

#[tokio::test]
async fn test_latest_day_tracks_newest_marker() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    assert_eq!(db.latest_day().await.expect("empty ledger"), None);

    db.insert_day(day("2024-02-10")).await.expect("day");
    db.insert_day(day("2024-02-12")).await.expect("day");
    db.insert_day(day("2024-02-11")).await.expect("day");
    assert_eq!(
        db.latest_day().await.expect("latest day"),
        Some(day("2024-02-12"))
    );
}
