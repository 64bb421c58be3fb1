use std::sync::Arc;
use std::time::Duration;

use cognilens::config::parse_config;
use cognilens::{CognilensConfig, ComplexityService, ContentChange, Position, Range};
use indoc::indoc;
use tokio::sync::mpsc;

const URI: &str = "file:///project/app.ts";

fn service() -> ComplexityService {
    ComplexityService::with_tree_sitter(&CognilensConfig::default()).unwrap()
}

#[tokio::test]
async fn test_open_then_request() {
    let service = service();
    service.on_open(URI, "typescript", 1, "function f(a) { if (a) {} }");

    let result = service.get_complexity(URI, 1).await;
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].name, "f");
    assert_eq!(result[0].score, 1);

    let again = service.get_complexity(URI, 1).await;
    assert!(Arc::ptr_eq(&result, &again));
    assert_eq!(service.result_stats().hits, 1);
}

#[tokio::test]
async fn test_change_produces_new_version() {
    let service = service();
    service.on_open(URI, "typescript", 1, "function f(a) { if (a) {} }");
    service.get_complexity(URI, 1).await;

    // Wrap the body's if in a loop: `while (a) { if (a) {} }`.
    service.on_change(
        URI,
        2,
        &[
            ContentChange::ranged(
                Range::new(Position::new(0, 25), Position::new(0, 25)),
                " }",
            ),
            ContentChange::ranged(
                Range::new(Position::new(0, 16), Position::new(0, 16)),
                "while (a) { ",
            ),
        ],
    );
    assert_eq!(service.document_version(URI), Some(2));

    let result = service.get_complexity(URI, 2).await;
    // loop +1, if +1 with nesting +1
    assert_eq!(result[0].score, 3);
}

#[tokio::test]
async fn test_request_ahead_of_change_is_not_cached() {
    let service = service();
    service.on_open(URI, "typescript", 3, "function f() {}");

    // The request for v4 arrives before its change notification.
    let early = service.get_complexity(URI, 4).await;
    assert_eq!(early[0].score, 0);

    service.on_change(URI, 4, &[ContentChange::full("function f(a) { if (a) {} }")]);

    let fresh = service.get_complexity(URI, 4).await;
    assert_eq!(fresh[0].score, 1);
    assert_eq!(service.document_version(URI), Some(4));

    let again = service.get_complexity(URI, 4).await;
    assert!(Arc::ptr_eq(&fresh, &again));
}

#[tokio::test]
async fn test_request_behind_tracked_version_is_not_cached() {
    let service = service();
    service.on_open(URI, "typescript", 5, "function f(a) { if (a) {} }");

    let stale = service.get_complexity(URI, 4).await;
    assert_eq!(stale[0].score, 1);
    assert_eq!(service.result_stats().entries, 0);
}

#[tokio::test]
async fn test_unknown_document_yields_empty() {
    let service = service();
    assert!(service.get_complexity("file:///nope.ts", 1).await.is_empty());
}

#[tokio::test]
async fn test_unsupported_language_is_not_tracked() {
    let service = service();
    service.on_open("file:///a.py", "python", 1, "def f(): pass");

    assert!(!service.is_open("file:///a.py"));
    assert!(service.get_complexity("file:///a.py", 1).await.is_empty());
}

#[tokio::test]
async fn test_close_evicts_everything() {
    let service = service();
    service.on_open(URI, "typescript", 1, "function f() {}");
    service.get_complexity(URI, 1).await;

    service.on_close(URI);

    assert!(!service.is_open(URI));
    assert_eq!(service.result_stats().entries, 0);
}

#[tokio::test]
async fn test_reopen_discards_previous_results() {
    let service = service();
    service.on_open(URI, "typescript", 1, "function f() {}");
    assert_eq!(service.get_complexity(URI, 1).await[0].score, 0);

    service.on_open(URI, "typescript", 1, "function f(a) { if (a) {} }");
    assert_eq!(service.get_complexity(URI, 1).await[0].score, 1);
}

#[tokio::test]
async fn test_configured_alias_is_accepted() {
    let config = parse_config(indoc! {r#"
        [languages]
        aliases = { "cs" = "csharp" }
    "#})
    .unwrap();
    let service = ComplexityService::with_tree_sitter(&config).unwrap();
    service.on_open(
        "file:///A.cs",
        "cs",
        1,
        "class A { void B(bool x) { while (x) {} } }",
    );

    let result = service.get_complexity("file:///A.cs", 1).await;
    assert_eq!(result[0].name, "B");
    assert_eq!(result[0].score, 1);
}

#[tokio::test(start_paused = true)]
async fn test_revalidation_coalesces_bursts() {
    let service = Arc::new(service());
    service.on_open(URI, "typescript", 1, "function f(a) { if (a) {} }");
    let (tx, mut rx) = mpsc::unbounded_channel();

    for version in 1..=3 {
        let tx = tx.clone();
        service.schedule_revalidation(URI, version, move |result| {
            let _ = tx.send((version, result[0].score));
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(rx.try_recv().is_err());

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(rx.try_recv().unwrap(), (3, 1));
    assert!(rx.try_recv().is_err());
    assert_eq!(service.pending_revalidations(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_close_cancels_pending_revalidation() {
    let service = Arc::new(service());
    service.on_open(URI, "typescript", 1, "function f() {}");
    let (tx, mut rx) = mpsc::unbounded_channel::<usize>();

    service.schedule_revalidation(URI, 1, move |result| {
        let _ = tx.send(result.len());
    });
    service.on_close(URI);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(rx.try_recv().is_err());
}
