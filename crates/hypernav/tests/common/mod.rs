#![allow(dead_code)]

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use hypernav::adjust::PositionAdjuster;
use hypernav::resolver::{QueryResolver, Resolver};
use hypernav::test_support::{FakeDbStore, FakeGitserver, FakeLsifStore};
use hypernav::types::Dump;
use hypernav::CachedCommitChecker;

/// One set of fakes wired the way production wires the real stores. Tests
/// configure the fakes, then either go through the `service()` factory or
/// build a `QueryResolver` directly over a fixed candidate list.
pub struct TestContext {
    pub db: Arc<FakeDbStore>,
    pub lsif: Arc<FakeLsifStore>,
    pub gitserver: Arc<FakeGitserver>,
    pub cancel: CancellationToken,
}

impl TestContext {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        TestContext {
            db: Arc::new(FakeDbStore::new()),
            lsif: Arc::new(FakeLsifStore::new()),
            gitserver: Arc::new(FakeGitserver::new()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn service(&self) -> Resolver {
        Resolver::new(self.db.clone(), self.lsif.clone(), self.gitserver.clone())
    }

    pub fn query_resolver(
        &self,
        adjuster: Arc<dyn PositionAdjuster>,
        repository_id: i64,
        commit: &str,
        path: &str,
        uploads: Vec<Dump>,
    ) -> QueryResolver {
        let checker = Arc::new(CachedCommitChecker::new(self.gitserver.clone()));
        checker.set(repository_id, commit);

        QueryResolver::new(
            self.db.clone(),
            self.lsif.clone(),
            checker,
            adjuster,
            repository_id,
            commit.to_string(),
            path.to_string(),
            uploads,
            self.cancel.clone(),
        )
    }
}
