mod common;

use std::sync::Arc;

use common::TestContext;
use hypernav::adjust::IdentityAdjuster;
use hypernav::error::QueryError;
use hypernav::test_support::{dump, RejectingAdjuster, ShiftAdjuster};
use hypernav::types::{Position, Range};

#[tokio::test]
async fn single_dump_hover() {
    let ctx = TestContext::new();
    let d1 = dump(1, 42, "c1", "");
    ctx.lsif.set_hover(
        1,
        "pkg/a.go",
        Position::new(10, 4),
        "type T struct{}",
        Range::new(10, 4, 10, 5),
    );

    let resolver = ctx.query_resolver(Arc::new(IdentityAdjuster), 42, "c1", "pkg/a.go", vec![d1]);
    let hover = resolver.hover(10, 4).await.unwrap();

    assert_eq!(
        hover,
        Some(("type T struct{}".to_string(), Range::new(10, 4, 10, 5)))
    );
}

#[tokio::test]
async fn hover_misses_when_no_candidate_has_text() {
    let ctx = TestContext::new();
    let d1 = dump(1, 42, "c1", "");

    let resolver = ctx.query_resolver(Arc::new(IdentityAdjuster), 42, "c1", "pkg/a.go", vec![d1]);
    assert_eq!(resolver.hover(10, 4).await.unwrap(), None);
}

#[tokio::test]
async fn first_candidate_with_nonempty_text_wins() {
    let ctx = TestContext::new();
    let d1 = dump(1, 42, "c1", "");
    let d2 = dump(2, 42, "c1", "");
    let d3 = dump(3, 42, "c1", "");

    // The first candidate has an empty hover record, the second has none at
    // all; the third is the first with actual text.
    ctx.lsif
        .set_hover(1, "pkg/a.go", Position::new(10, 4), "", Range::new(10, 4, 10, 5));
    ctx.lsif.set_hover(
        3,
        "pkg/a.go",
        Position::new(10, 4),
        "func F()",
        Range::new(10, 4, 10, 5),
    );

    let resolver = ctx.query_resolver(
        Arc::new(IdentityAdjuster),
        42,
        "c1",
        "pkg/a.go",
        vec![d1, d2, d3],
    );
    let hover = resolver.hover(10, 4).await.unwrap();

    assert_eq!(hover.unwrap().0, "func F()");
}

#[tokio::test]
async fn hover_projects_position_in_and_range_back() {
    let ctx = TestContext::new();
    // Indexed two lines above where the user is looking.
    let d1 = dump(1, 42, "c0", "");
    ctx.lsif.set_hover(
        1,
        "pkg/a.go",
        Position::new(12, 4),
        "type T struct{}",
        Range::new(12, 4, 12, 5),
    );

    let resolver = ctx.query_resolver(
        Arc::new(ShiftAdjuster::new(2)),
        42,
        "c1",
        "pkg/a.go",
        vec![d1],
    );
    let hover = resolver.hover(10, 4).await.unwrap();

    assert_eq!(
        hover,
        Some(("type T struct{}".to_string(), Range::new(10, 4, 10, 5)))
    );
}

#[tokio::test]
async fn candidates_without_a_projection_are_skipped() {
    let ctx = TestContext::new();
    let d1 = dump(1, 42, "c0", "");
    ctx.lsif.set_hover(
        1,
        "pkg/a.go",
        Position::new(10, 4),
        "type T struct{}",
        Range::new(10, 4, 10, 5),
    );

    let resolver = ctx.query_resolver(
        Arc::new(RejectingAdjuster),
        42,
        "c1",
        "pkg/a.go",
        vec![d1],
    );
    assert_eq!(resolver.hover(10, 4).await.unwrap(), None);
}

#[tokio::test]
async fn unprojectable_result_range_passes_through_unchanged() {
    // The reverse translation may fail even when the forward one succeeded
    // (the line was rewritten between the commits). The indexed range is
    // then reported as-is rather than dropped.
    let ctx = TestContext::new();
    let d1 = dump(1, 42, "c0", "");
    // The hover record points at line 1, which the reverse shift of -2
    // cannot carry back to the query commit.
    ctx.lsif.set_hover(
        1,
        "pkg/a.go",
        Position::new(12, 4),
        "var x int",
        Range::new(1, 0, 1, 5),
    );

    let resolver = ctx.query_resolver(
        Arc::new(ShiftAdjuster::new(2)),
        42,
        "c1",
        "pkg/a.go",
        vec![d1],
    );
    let hover = resolver.hover(10, 4).await.unwrap();

    assert_eq!(hover, Some(("var x int".to_string(), Range::new(1, 0, 1, 5))));
}

#[tokio::test]
async fn cancelled_query_returns_cancelled() {
    let ctx = TestContext::new();
    let d1 = dump(1, 42, "c1", "");
    let resolver = ctx.query_resolver(Arc::new(IdentityAdjuster), 42, "c1", "pkg/a.go", vec![d1]);

    ctx.cancel.cancel();
    let err = resolver.hover(10, 4).await.unwrap_err();
    assert!(matches!(err, QueryError::Cancelled));
}
