mod common;

use std::sync::Arc;

use common::TestContext;
use hypernav::adjust::IdentityAdjuster;
use hypernav::stores::MonikerTable;
use hypernav::test_support::{dump, location};
use hypernav::types::{
    MonikerData, MonikerKind, PackageInformationData, Position, Range,
};

fn import_moniker(identifier: &str) -> MonikerData {
    MonikerData {
        kind: MonikerKind::Import,
        scheme: "gomod".to_string(),
        identifier: identifier.to_string(),
        package_information_id: Some("p1".to_string()),
    }
}

#[tokio::test]
async fn local_definitions_from_the_first_candidate_win() {
    let ctx = TestContext::new();
    let d1 = dump(1, 42, "c1", "s1/");
    let d2 = dump(2, 42, "c1", "s1/");

    ctx.lsif.set_definitions(
        1,
        "main.go",
        Position::new(10, 4),
        vec![location(1, "def.go", Range::new(3, 0, 3, 7))],
    );
    ctx.lsif.set_definitions(
        2,
        "main.go",
        Position::new(10, 4),
        vec![location(2, "other.go", Range::new(9, 0, 9, 7))],
    );

    let resolver = ctx.query_resolver(
        Arc::new(IdentityAdjuster),
        42,
        "c1",
        "s1/main.go",
        vec![d1.clone(), d2],
    );
    let locations = resolver.definitions(10, 4).await.unwrap();

    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].dump, d1);
    assert_eq!(locations[0].path, "s1/def.go");
    assert_eq!(locations[0].adjusted_commit, "c1");
    assert_eq!(locations[0].adjusted_range, Range::new(3, 0, 3, 7));
    // The local answer short-circuits: the moniker tables are never touched.
    assert_eq!(ctx.db.package_ids_calls(), 0);
}

#[tokio::test]
async fn import_monikers_expand_to_the_defining_dump() {
    let ctx = TestContext::new();
    let d1 = dump(1, 42, "c1", "");
    let d2 = dump(2, 50, "c9", "");
    ctx.db.register_dumps(&[d2.clone()]);

    ctx.lsif.set_monikers(
        1,
        "pkg/a.go",
        Position::new(10, 4),
        vec![vec![import_moniker("github.com/x/y.F")]],
    );
    ctx.lsif.set_package_information(
        1,
        "p1",
        PackageInformationData {
            name: "github.com/x/y".to_string(),
            version: "v1.0".to_string(),
        },
    );
    ctx.db.set_package_ids(vec![2]);
    ctx.lsif.set_bulk_locations(
        MonikerTable::Definitions,
        2,
        "github.com/x/y.F",
        vec![location(2, "y.go", Range::new(1, 0, 1, 1))],
    );

    let resolver =
        ctx.query_resolver(Arc::new(IdentityAdjuster), 42, "c1", "pkg/a.go", vec![d1]);
    let locations = resolver.definitions(10, 4).await.unwrap();

    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].dump, d2);
    // The defining dump lives in another repository: no diff exists, so the
    // range passes through under the dump's own commit.
    assert_eq!(locations[0].adjusted_commit, "c9");
    assert_eq!(locations[0].adjusted_range, Range::new(1, 0, 1, 1));
}

#[tokio::test]
async fn non_import_monikers_do_not_expand() {
    let ctx = TestContext::new();
    let d1 = dump(1, 42, "c1", "");

    let export = MonikerData {
        kind: MonikerKind::Export,
        ..import_moniker("github.com/x/y.F")
    };
    ctx.lsif
        .set_monikers(1, "pkg/a.go", Position::new(10, 4), vec![vec![export]]);

    let resolver =
        ctx.query_resolver(Arc::new(IdentityAdjuster), 42, "c1", "pkg/a.go", vec![d1]);
    let locations = resolver.definitions(10, 4).await.unwrap();

    assert!(locations.is_empty());
    // No import moniker, no package lookup.
    assert_eq!(ctx.db.package_ids_calls(), 0);
}

#[tokio::test]
async fn monikers_without_package_information_are_skipped() {
    let ctx = TestContext::new();
    let d1 = dump(1, 42, "c1", "");

    let unqualified = MonikerData {
        package_information_id: None,
        ..import_moniker("local.symbol")
    };
    ctx.lsif
        .set_monikers(1, "pkg/a.go", Position::new(10, 4), vec![vec![unqualified]]);

    let resolver =
        ctx.query_resolver(Arc::new(IdentityAdjuster), 42, "c1", "pkg/a.go", vec![d1]);
    let locations = resolver.definitions(10, 4).await.unwrap();

    assert!(locations.is_empty());
    assert_eq!(ctx.db.package_ids_calls(), 0);
}

#[tokio::test]
async fn no_monikers_means_no_database_calls_at_all() {
    let ctx = TestContext::new();
    let d1 = dump(1, 42, "c1", "");

    let resolver =
        ctx.query_resolver(Arc::new(IdentityAdjuster), 42, "c1", "pkg/a.go", vec![d1]);
    let locations = resolver.definitions(10, 4).await.unwrap();

    assert!(locations.is_empty());
    assert_eq!(ctx.db.package_ids_calls(), 0);
    assert_eq!(ctx.lsif.bulk_calls(), 0);
}

#[tokio::test]
async fn defining_dumps_on_vanished_commits_are_dropped() {
    let ctx = TestContext::new();
    let d1 = dump(1, 42, "c1", "");
    let d2 = dump(2, 50, "gone", "");
    ctx.db.register_dumps(&[d2]);
    ctx.gitserver.set_commit_exists(50, "gone", false);

    ctx.lsif.set_monikers(
        1,
        "pkg/a.go",
        Position::new(10, 4),
        vec![vec![import_moniker("github.com/x/y.F")]],
    );
    ctx.lsif.set_package_information(
        1,
        "p1",
        PackageInformationData {
            name: "github.com/x/y".to_string(),
            version: "v1.0".to_string(),
        },
    );
    ctx.db.set_package_ids(vec![2]);
    ctx.lsif.set_bulk_locations(
        MonikerTable::Definitions,
        2,
        "github.com/x/y.F",
        vec![location(2, "y.go", Range::new(1, 0, 1, 1))],
    );

    let resolver =
        ctx.query_resolver(Arc::new(IdentityAdjuster), 42, "c1", "pkg/a.go", vec![d1]);
    let locations = resolver.definitions(10, 4).await.unwrap();

    assert!(locations.is_empty());
}
