// Copyright 2025 HyperNav Project
// Derived from sourcegraph/sourcegraph (https://github.com/sourcegraph/sourcegraph)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::adjust::PositionAdjuster;
use crate::commits::CachedCommitChecker;
use crate::error::{QueryError, Result};
use crate::resolver::query::QueryResolver;
use crate::stores::{DbStore, GitserverClient, LsifStore};
use crate::types::{CommitGraphOptions, Dump};

/// How many ancestors to fetch from gitserver when approximating visibility
/// for a commit the dump database has not seen. Too low and queries against
/// fast-moving repositories come back empty; too high and the latency of the
/// unknown-commit path climbs.
const NUM_ANCESTORS: usize = 100;

/// Long-lived entry point into the query core. Holds the shared store
/// handles; everything per-query (commit cache, candidate dumps, dedup
/// scratch) is created by `query_resolver` and dropped with the resolver it
/// returns.
pub struct Resolver {
    db_store: Arc<dyn DbStore>,
    lsif_store: Arc<dyn LsifStore>,
    gitserver: Arc<dyn GitserverClient>,
}

impl Resolver {
    pub fn new(
        db_store: Arc<dyn DbStore>,
        lsif_store: Arc<dyn LsifStore>,
        gitserver: Arc<dyn GitserverClient>,
    ) -> Self {
        Resolver {
            db_store,
            lsif_store,
            gitserver,
        }
    }

    /// Build a per-query resolver for the given position in the repository.
    /// Returns `None` when no dump can serve code intelligence for the path,
    /// which is a negative result rather than an error.
    #[allow(clippy::too_many_arguments)]
    pub async fn query_resolver(
        &self,
        position_adjuster: Arc<dyn PositionAdjuster>,
        repository_id: i64,
        commit: &str,
        path: &str,
        exact_path: bool,
        indexer: &str,
        cancel: CancellationToken,
    ) -> Result<Option<QueryResolver>> {
        let commit_checker = Arc::new(CachedCommitChecker::new(self.gitserver.clone()));
        // The user is browsing this commit, so it exists by construction.
        commit_checker.set(repository_id, commit);

        let dumps = self
            .find_closest_dumps(
                &commit_checker,
                repository_id,
                commit,
                path,
                exact_path,
                indexer,
                &cancel,
            )
            .await?;
        if dumps.is_empty() {
            return Ok(None);
        }

        Ok(Some(QueryResolver::new(
            self.db_store.clone(),
            self.lsif_store.clone(),
            commit_checker,
            position_adjuster,
            repository_id,
            commit.to_string(),
            path.to_string(),
            dumps,
            cancel,
        )))
    }

    /// The set of dumps that can most accurately answer code intelligence
    /// queries for the given path. With `exact_path`, only dumps that
    /// definitely contain the document are returned; otherwise any dump
    /// whose root intersects the path qualifies. Dumps whose indexed commit
    /// has vanished are dropped.
    #[allow(clippy::too_many_arguments)]
    pub async fn find_closest_dumps(
        &self,
        commit_checker: &CachedCommitChecker,
        repository_id: i64,
        commit: &str,
        path: &str,
        exact_path: bool,
        indexer: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Dump>> {
        let candidates = self
            .infer_closest_dumps(repository_id, commit, path, exact_path, indexer, cancel)
            .await?;

        let mut dumps = Vec::with_capacity(candidates.len());
        for dump in candidates {
            ensure_live(cancel)?;
            if !commit_checker
                .exists(dump.repository_id, &dump.commit)
                .await?
            {
                continue;
            }

            if exact_path {
                ensure_live(cancel)?;
                if !self
                    .lsif_store
                    .exists(dump.id, dump.strip_root(path))
                    .await?
                {
                    continue;
                }
            }

            dumps.push(dump);
        }

        Ok(dumps)
    }

    /// Visible dumps for the commit. When the commit is newer than the
    /// database's last visibility refresh for this repository, approximate:
    /// fetch a bounded ancestor fragment from gitserver, correlate it with
    /// the dumps on those commits, and mark the repository dirty so the
    /// background pipeline recomputes the real table. The approximation may
    /// miss results a later request will see; it keeps the latency-sensitive
    /// path off the full-graph recomputation.
    async fn infer_closest_dumps(
        &self,
        repository_id: i64,
        commit: &str,
        path: &str,
        exact_path: bool,
        indexer: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Dump>> {
        ensure_live(cancel)?;
        if self.db_store.has_commit(repository_id, commit).await? {
            ensure_live(cancel)?;
            let dumps = self
                .db_store
                .find_closest_dumps(repository_id, commit, path, exact_path, indexer)
                .await?;
            return Ok(dumps);
        }

        ensure_live(cancel)?;
        if !self.db_store.has_repository(repository_id).await? {
            return Ok(Vec::new());
        }

        log::debug!(
            "closest dumps: commit {} unknown for repository {}, approximating from a graph fragment",
            commit,
            repository_id,
        );

        ensure_live(cancel)?;
        let graph = self
            .gitserver
            .commit_graph(
                repository_id,
                &CommitGraphOptions {
                    commit: commit.to_string(),
                    limit: NUM_ANCESTORS,
                },
            )
            .await?;

        ensure_live(cancel)?;
        let dumps = self
            .db_store
            .find_closest_dumps_from_graph_fragment(
                repository_id,
                commit,
                path,
                exact_path,
                indexer,
                &graph,
            )
            .await?;

        ensure_live(cancel)?;
        self.db_store.mark_repository_as_dirty(repository_id).await?;

        Ok(dumps)
    }
}

fn ensure_live(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(QueryError::Cancelled);
    }
    Ok(())
}
