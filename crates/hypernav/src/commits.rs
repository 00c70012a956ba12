// Copyright 2025 HyperNav Project
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

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::stores::GitserverClient;

/// A per-query memo of commit-existence answers. Queries fan out over small
/// candidate dump lists and repeatedly ask whether the same handful of
/// commits still exist; this wrapper collapses those lookups into at most
/// one gitserver round-trip per (repository, commit) pair.
///
/// The cache is scratch for a single query and is discarded at query exit.
/// The mutex only makes `&self` access possible; it is never held across an
/// await point.
pub struct CachedCommitChecker {
    gitserver: Arc<dyn GitserverClient>,
    cache: Mutex<HashMap<i64, HashMap<String, bool>>>,
}

impl CachedCommitChecker {
    pub fn new(gitserver: Arc<dyn GitserverClient>) -> Self {
        CachedCommitChecker {
            gitserver,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Unconditionally record that the commit exists. Used to prime the
    /// cache with commits known to exist by construction.
    pub fn set(&self, repository_id: i64, commit: &str) {
        let mut cache = self.cache.lock();
        cache
            .entry(repository_id)
            .or_default()
            .insert(commit.to_string(), true);
    }

    /// Whether the commit exists, consulting gitserver on the first miss.
    /// A gitserver error is propagated and nothing is cached for the pair.
    pub async fn exists(&self, repository_id: i64, commit: &str) -> anyhow::Result<bool> {
        if let Some(exists) = self
            .cache
            .lock()
            .get(&repository_id)
            .and_then(|commits| commits.get(commit))
        {
            return Ok(*exists);
        }

        let exists = self.gitserver.commit_exists(repository_id, commit).await?;

        self.cache
            .lock()
            .entry(repository_id)
            .or_default()
            .insert(commit.to_string(), exists);
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CommitGraph, CommitGraphOptions};
    use anyhow::bail;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingGitserver {
        exists: bool,
        fail: bool,
        calls: AtomicUsize,
    }

    impl CountingGitserver {
        fn new(exists: bool) -> Self {
            CountingGitserver {
                exists,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GitserverClient for CountingGitserver {
        async fn commit_exists(&self, _repository_id: i64, _commit: &str) -> anyhow::Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                bail!("gitserver unavailable");
            }
            Ok(self.exists)
        }

        async fn commit_graph(
            &self,
            _repository_id: i64,
            _options: &CommitGraphOptions,
        ) -> anyhow::Result<CommitGraph> {
            Ok(CommitGraph::default())
        }
    }

    #[tokio::test]
    async fn exists_issues_at_most_one_gitserver_call_per_pair() {
        let gitserver = Arc::new(CountingGitserver::new(true));
        let checker = CachedCommitChecker::new(gitserver.clone());

        assert!(checker.exists(42, "deadbeef").await.unwrap());
        assert!(checker.exists(42, "deadbeef").await.unwrap());
        assert_eq!(gitserver.calls.load(Ordering::SeqCst), 1);

        // A different commit under the same repository is a fresh pair.
        assert!(checker.exists(42, "cafebabe").await.unwrap());
        assert_eq!(gitserver.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn negative_answers_are_cached_too() {
        let gitserver = Arc::new(CountingGitserver::new(false));
        let checker = CachedCommitChecker::new(gitserver.clone());

        assert!(!checker.exists(42, "deadbeef").await.unwrap());
        assert!(!checker.exists(42, "deadbeef").await.unwrap());
        assert_eq!(gitserver.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn set_primes_without_consulting_gitserver() {
        let gitserver = Arc::new(CountingGitserver::new(false));
        let checker = CachedCommitChecker::new(gitserver.clone());

        checker.set(42, "deadbeef");
        assert!(checker.exists(42, "deadbeef").await.unwrap());
        assert_eq!(gitserver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn delegate_errors_are_not_cached() {
        let gitserver = Arc::new(CountingGitserver {
            exists: true,
            fail: true,
            calls: AtomicUsize::new(0),
        });
        let checker = CachedCommitChecker::new(gitserver.clone());

        assert!(checker.exists(42, "deadbeef").await.is_err());
        assert!(checker.exists(42, "deadbeef").await.is_err());
        assert_eq!(gitserver.calls.load(Ordering::SeqCst), 2);
    }
}
