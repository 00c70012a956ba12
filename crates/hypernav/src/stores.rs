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

//! Capability traits for the external collaborators of the query core.
//!
//! The core is pure in-process composition: everything it needs from the
//! outside world comes through these narrow async traits, so it can run
//! against production stores or the in-memory fakes in `test_support`
//! without change. Handles are shared across queries and must be safe for
//! concurrent use at that layer.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::types::{
    CodeIntelligenceRange, CommitGraph, CommitGraphOptions, Diagnostic, Dump, Location,
    MonikerData, PackageInformationData, QualifiedMoniker, Range,
};

/// Which per-dump symbol table a bulk moniker query reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonikerTable {
    Definitions,
    References,
}

impl MonikerTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonikerTable::Definitions => "definitions",
            MonikerTable::References => "references",
        }
    }
}

/// The dump database: which dumps exist, which commits they cover, and the
/// cross-dump package and reference tables.
#[async_trait]
pub trait DbStore: Send + Sync {
    async fn has_repository(&self, repository_id: i64) -> anyhow::Result<bool>;

    async fn has_commit(&self, repository_id: i64, commit: &str) -> anyhow::Result<bool>;

    /// The dumps that can most accurately answer queries for the given path.
    /// With `root_must_enclose_path` the dump root must strictly enclose the
    /// file; otherwise any dump intersecting the path prefix qualifies.
    async fn find_closest_dumps(
        &self,
        repository_id: i64,
        commit: &str,
        path: &str,
        root_must_enclose_path: bool,
        indexer: &str,
    ) -> anyhow::Result<Vec<Dump>>;

    /// As `find_closest_dumps`, but consistent with a bounded commit-graph
    /// fragment instead of the canonical visibility table. Used when the
    /// query commit is not yet known to the database.
    async fn find_closest_dumps_from_graph_fragment(
        &self,
        repository_id: i64,
        commit: &str,
        path: &str,
        root_must_enclose_path: bool,
        indexer: &str,
        graph: &CommitGraph,
    ) -> anyhow::Result<Vec<Dump>>;

    /// Flag the repository so the background pipeline recomputes its full
    /// visibility table.
    async fn mark_repository_as_dirty(&self, repository_id: i64) -> anyhow::Result<()>;

    async fn get_dumps_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<Dump>>;

    /// Ids of the dumps that define the packages named by the monikers.
    /// An empty moniker slice must yield an empty result without touching
    /// the backend.
    async fn package_ids(&self, monikers: &[QualifiedMoniker]) -> anyhow::Result<Vec<i64>>;

    /// For every dump visible from this (repository, commit) — or visible at
    /// the tip of some other repository — that references any of the given
    /// symbols, the probabilistic identifier filters attached to those
    /// reference records, keyed by dump id. An empty moniker slice must
    /// yield an empty result without touching the backend.
    async fn reference_ids_and_filters(
        &self,
        repository_id: i64,
        commit: &str,
        monikers: &[QualifiedMoniker],
    ) -> anyhow::Result<HashMap<i64, Vec<Vec<u8>>>>;
}

/// The per-dump index data store: documents, result ranges, symbol tables.
#[async_trait]
pub trait LsifStore: Send + Sync {
    /// Whether the dump contains a document at the given dump-relative path.
    async fn exists(&self, dump_id: i64, path: &str) -> anyhow::Result<bool>;

    /// Aggregate code intelligence for the document lines in
    /// `[start_line, end_line)`.
    async fn ranges(
        &self,
        dump_id: i64,
        path: &str,
        start_line: u32,
        end_line: u32,
    ) -> anyhow::Result<Vec<CodeIntelligenceRange>>;

    async fn definitions(
        &self,
        dump_id: i64,
        path: &str,
        line: u32,
        character: u32,
    ) -> anyhow::Result<Vec<Location>>;

    async fn references(
        &self,
        dump_id: i64,
        path: &str,
        line: u32,
        character: u32,
    ) -> anyhow::Result<Vec<Location>>;

    async fn hover(
        &self,
        dump_id: i64,
        path: &str,
        line: u32,
        character: u32,
    ) -> anyhow::Result<Option<(String, Range)>>;

    /// Diagnostics for documents under the dump-relative path prefix, plus
    /// the total count before the limit window was applied.
    async fn diagnostics(
        &self,
        dump_id: i64,
        path_prefix: &str,
        limit: usize,
        offset: usize,
    ) -> anyhow::Result<(Vec<Diagnostic>, usize)>;

    /// The monikers attached to each range enclosing the given position,
    /// innermost first.
    async fn monikers_by_position(
        &self,
        dump_id: i64,
        path: &str,
        line: u32,
        character: u32,
    ) -> anyhow::Result<Vec<Vec<MonikerData>>>;

    async fn package_information(
        &self,
        dump_id: i64,
        path: &str,
        package_information_id: &str,
    ) -> anyhow::Result<Option<PackageInformationData>>;

    /// Locations from the given symbol table for every (dump, moniker) pair,
    /// plus the total count before the limit window was applied. Results are
    /// grouped by dump in the order the ids were given.
    async fn bulk_moniker_results(
        &self,
        table: MonikerTable,
        dump_ids: &[i64],
        monikers: &[MonikerData],
        limit: usize,
        offset: usize,
    ) -> anyhow::Result<(Vec<Location>, usize)>;
}

/// The subset of gitserver the query core consumes.
#[async_trait]
pub trait GitserverClient: Send + Sync {
    async fn commit_exists(&self, repository_id: i64, commit: &str) -> anyhow::Result<bool>;

    /// A bounded ancestor fragment of the repository's commit DAG, starting
    /// at (and including) `options.commit`.
    async fn commit_graph(
        &self,
        repository_id: i64,
        options: &CommitGraphOptions,
    ) -> anyhow::Result<CommitGraph>;
}
