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

//! In-memory fakes for the capability traits, shared between unit tests and
//! the integration tests under `tests/`. This module lives in `src/` so the
//! integration test crates can reach it; it is hidden from documentation and
//! not part of the supported API.
//!
//! The fakes count their backend calls so tests can assert the round-trip
//! economics (one gitserver call per commit pair, no database call for an
//! empty moniker set) and record interesting arguments (the graph fragment,
//! dirty markings) for inspection.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::adjust::PositionAdjuster;
use crate::stores::{DbStore, GitserverClient, LsifStore, MonikerTable};
use crate::types::{
    CodeIntelligenceRange, CommitGraph, CommitGraphOptions, Diagnostic, Dump, Location,
    MonikerData, PackageInformationData, Position, QualifiedMoniker, Range,
};

/// Shorthand dump constructor for tests.
pub fn dump(id: i64, repository_id: i64, commit: &str, root: &str) -> Dump {
    Dump {
        id,
        repository_id,
        commit: commit.to_string(),
        root: root.to_string(),
        indexer: "lsif-go".to_string(),
    }
}

/// Shorthand location constructor for tests.
pub fn location(dump_id: i64, path: &str, range: Range) -> Location {
    Location {
        dump_id,
        path: path.to_string(),
        range,
    }
}

#[derive(Default)]
pub struct FakeGitserver {
    commits: Mutex<HashMap<(i64, String), bool>>,
    graphs: Mutex<HashMap<i64, CommitGraph>>,
    commit_exists_calls: AtomicUsize,
    commit_graph_calls: AtomicUsize,
}

impl FakeGitserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown commits default to existing; call this to pin an answer.
    pub fn set_commit_exists(&self, repository_id: i64, commit: &str, exists: bool) {
        self.commits
            .lock()
            .insert((repository_id, commit.to_string()), exists);
    }

    pub fn set_graph(&self, repository_id: i64, graph: CommitGraph) {
        self.graphs.lock().insert(repository_id, graph);
    }

    pub fn commit_exists_calls(&self) -> usize {
        self.commit_exists_calls.load(Ordering::SeqCst)
    }

    pub fn commit_graph_calls(&self) -> usize {
        self.commit_graph_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GitserverClient for FakeGitserver {
    async fn commit_exists(&self, repository_id: i64, commit: &str) -> anyhow::Result<bool> {
        self.commit_exists_calls.fetch_add(1, Ordering::SeqCst);
        Ok(*self
            .commits
            .lock()
            .get(&(repository_id, commit.to_string()))
            .unwrap_or(&true))
    }

    async fn commit_graph(
        &self,
        repository_id: i64,
        _options: &CommitGraphOptions,
    ) -> anyhow::Result<CommitGraph> {
        self.commit_graph_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .graphs
            .lock()
            .get(&repository_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeDbStore {
    repositories: Mutex<HashMap<i64, bool>>,
    commits: Mutex<HashMap<(i64, String), bool>>,
    closest_dumps: Mutex<Vec<Dump>>,
    graph_fragment_dumps: Mutex<Vec<Dump>>,
    dumps: Mutex<HashMap<i64, Dump>>,
    package_ids: Mutex<Vec<i64>>,
    reference_filters: Mutex<HashMap<i64, Vec<Vec<u8>>>>,
    last_graph: Mutex<Option<CommitGraph>>,
    mark_dirty_calls: AtomicUsize,
    package_ids_calls: AtomicUsize,
    reference_ids_calls: AtomicUsize,
}

impl FakeDbStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_has_repository(&self, repository_id: i64, exists: bool) {
        self.repositories.lock().insert(repository_id, exists);
    }

    pub fn set_has_commit(&self, repository_id: i64, commit: &str, exists: bool) {
        self.commits
            .lock()
            .insert((repository_id, commit.to_string()), exists);
    }

    /// Dumps returned by `find_closest_dumps`. These are also registered for
    /// `get_dumps_by_ids` lookups.
    pub fn set_closest_dumps(&self, dumps: Vec<Dump>) {
        self.register_dumps(&dumps);
        *self.closest_dumps.lock() = dumps;
    }

    /// Dumps returned by `find_closest_dumps_from_graph_fragment`.
    pub fn set_graph_fragment_dumps(&self, dumps: Vec<Dump>) {
        self.register_dumps(&dumps);
        *self.graph_fragment_dumps.lock() = dumps;
    }

    pub fn register_dumps(&self, dumps: &[Dump]) {
        let mut map = self.dumps.lock();
        for dump in dumps {
            map.insert(dump.id, dump.clone());
        }
    }

    pub fn set_package_ids(&self, ids: Vec<i64>) {
        *self.package_ids.lock() = ids;
    }

    pub fn set_reference_filters(&self, dump_id: i64, filters: Vec<Vec<u8>>) {
        self.reference_filters.lock().insert(dump_id, filters);
    }

    /// The graph fragment passed to the most recent
    /// `find_closest_dumps_from_graph_fragment` call.
    pub fn last_graph(&self) -> Option<CommitGraph> {
        self.last_graph.lock().clone()
    }

    pub fn mark_dirty_calls(&self) -> usize {
        self.mark_dirty_calls.load(Ordering::SeqCst)
    }

    pub fn package_ids_calls(&self) -> usize {
        self.package_ids_calls.load(Ordering::SeqCst)
    }

    pub fn reference_ids_calls(&self) -> usize {
        self.reference_ids_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DbStore for FakeDbStore {
    async fn has_repository(&self, repository_id: i64) -> anyhow::Result<bool> {
        Ok(*self.repositories.lock().get(&repository_id).unwrap_or(&false))
    }

    async fn has_commit(&self, repository_id: i64, commit: &str) -> anyhow::Result<bool> {
        Ok(*self
            .commits
            .lock()
            .get(&(repository_id, commit.to_string()))
            .unwrap_or(&false))
    }

    async fn find_closest_dumps(
        &self,
        _repository_id: i64,
        _commit: &str,
        _path: &str,
        _root_must_enclose_path: bool,
        _indexer: &str,
    ) -> anyhow::Result<Vec<Dump>> {
        Ok(self.closest_dumps.lock().clone())
    }

    async fn find_closest_dumps_from_graph_fragment(
        &self,
        _repository_id: i64,
        _commit: &str,
        _path: &str,
        _root_must_enclose_path: bool,
        _indexer: &str,
        graph: &CommitGraph,
    ) -> anyhow::Result<Vec<Dump>> {
        *self.last_graph.lock() = Some(graph.clone());
        Ok(self.graph_fragment_dumps.lock().clone())
    }

    async fn mark_repository_as_dirty(&self, _repository_id: i64) -> anyhow::Result<()> {
        self.mark_dirty_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_dumps_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<Dump>> {
        let map = self.dumps.lock();
        Ok(ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }

    async fn package_ids(&self, monikers: &[QualifiedMoniker]) -> anyhow::Result<Vec<i64>> {
        self.package_ids_calls.fetch_add(1, Ordering::SeqCst);
        if monikers.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.package_ids.lock().clone())
    }

    async fn reference_ids_and_filters(
        &self,
        _repository_id: i64,
        _commit: &str,
        monikers: &[QualifiedMoniker],
    ) -> anyhow::Result<HashMap<i64, Vec<Vec<u8>>>> {
        self.reference_ids_calls.fetch_add(1, Ordering::SeqCst);
        if monikers.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self.reference_filters.lock().clone())
    }
}

type PositionKey = (i64, String, u32, u32);

#[derive(Default)]
pub struct FakeLsifStore {
    exists: Mutex<HashMap<(i64, String), bool>>,
    hovers: Mutex<HashMap<PositionKey, (String, Range)>>,
    definitions: Mutex<HashMap<PositionKey, Vec<Location>>>,
    references: Mutex<HashMap<PositionKey, Vec<Location>>>,
    monikers: Mutex<HashMap<PositionKey, Vec<Vec<MonikerData>>>>,
    package_information: Mutex<HashMap<(i64, String), PackageInformationData>>,
    bulk: Mutex<HashMap<(MonikerTable, i64, String), Vec<Location>>>,
    ranges: Mutex<HashMap<(i64, String), Vec<CodeIntelligenceRange>>>,
    diagnostics: Mutex<HashMap<(i64, String), Vec<Diagnostic>>>,
    bulk_calls: AtomicUsize,
}

impl FakeLsifStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown documents default to existing; call this to pin an answer.
    pub fn set_exists(&self, dump_id: i64, path: &str, exists: bool) {
        self.exists.lock().insert((dump_id, path.to_string()), exists);
    }

    pub fn set_hover(&self, dump_id: i64, path: &str, position: Position, text: &str, range: Range) {
        self.hovers.lock().insert(
            (dump_id, path.to_string(), position.line, position.character),
            (text.to_string(), range),
        );
    }

    pub fn set_definitions(
        &self,
        dump_id: i64,
        path: &str,
        position: Position,
        locations: Vec<Location>,
    ) {
        self.definitions.lock().insert(
            (dump_id, path.to_string(), position.line, position.character),
            locations,
        );
    }

    pub fn set_references(
        &self,
        dump_id: i64,
        path: &str,
        position: Position,
        locations: Vec<Location>,
    ) {
        self.references.lock().insert(
            (dump_id, path.to_string(), position.line, position.character),
            locations,
        );
    }

    pub fn set_monikers(
        &self,
        dump_id: i64,
        path: &str,
        position: Position,
        monikers: Vec<Vec<MonikerData>>,
    ) {
        self.monikers.lock().insert(
            (dump_id, path.to_string(), position.line, position.character),
            monikers,
        );
    }

    pub fn set_package_information(
        &self,
        dump_id: i64,
        package_information_id: &str,
        data: PackageInformationData,
    ) {
        self.package_information
            .lock()
            .insert((dump_id, package_information_id.to_string()), data);
    }

    pub fn set_bulk_locations(
        &self,
        table: MonikerTable,
        dump_id: i64,
        identifier: &str,
        locations: Vec<Location>,
    ) {
        self.bulk
            .lock()
            .insert((table, dump_id, identifier.to_string()), locations);
    }

    pub fn set_ranges(&self, dump_id: i64, path: &str, ranges: Vec<CodeIntelligenceRange>) {
        self.ranges.lock().insert((dump_id, path.to_string()), ranges);
    }

    pub fn set_diagnostics(&self, dump_id: i64, path_prefix: &str, diagnostics: Vec<Diagnostic>) {
        self.diagnostics
            .lock()
            .insert((dump_id, path_prefix.to_string()), diagnostics);
    }

    pub fn bulk_calls(&self) -> usize {
        self.bulk_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LsifStore for FakeLsifStore {
    async fn exists(&self, dump_id: i64, path: &str) -> anyhow::Result<bool> {
        Ok(*self
            .exists
            .lock()
            .get(&(dump_id, path.to_string()))
            .unwrap_or(&true))
    }

    async fn ranges(
        &self,
        dump_id: i64,
        path: &str,
        start_line: u32,
        end_line: u32,
    ) -> anyhow::Result<Vec<CodeIntelligenceRange>> {
        Ok(self
            .ranges
            .lock()
            .get(&(dump_id, path.to_string()))
            .map(|ranges| {
                ranges
                    .iter()
                    .filter(|r| r.range.start.line >= start_line && r.range.start.line < end_line)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn definitions(
        &self,
        dump_id: i64,
        path: &str,
        line: u32,
        character: u32,
    ) -> anyhow::Result<Vec<Location>> {
        Ok(self
            .definitions
            .lock()
            .get(&(dump_id, path.to_string(), line, character))
            .cloned()
            .unwrap_or_default())
    }

    async fn references(
        &self,
        dump_id: i64,
        path: &str,
        line: u32,
        character: u32,
    ) -> anyhow::Result<Vec<Location>> {
        Ok(self
            .references
            .lock()
            .get(&(dump_id, path.to_string(), line, character))
            .cloned()
            .unwrap_or_default())
    }

    async fn hover(
        &self,
        dump_id: i64,
        path: &str,
        line: u32,
        character: u32,
    ) -> anyhow::Result<Option<(String, Range)>> {
        Ok(self
            .hovers
            .lock()
            .get(&(dump_id, path.to_string(), line, character))
            .cloned())
    }

    async fn diagnostics(
        &self,
        dump_id: i64,
        path_prefix: &str,
        limit: usize,
        offset: usize,
    ) -> anyhow::Result<(Vec<Diagnostic>, usize)> {
        let map = self.diagnostics.lock();
        let all = map
            .get(&(dump_id, path_prefix.to_string()))
            .cloned()
            .unwrap_or_default();
        let total = all.len();
        Ok((all.into_iter().skip(offset).take(limit).collect(), total))
    }

    async fn monikers_by_position(
        &self,
        dump_id: i64,
        path: &str,
        line: u32,
        character: u32,
    ) -> anyhow::Result<Vec<Vec<MonikerData>>> {
        Ok(self
            .monikers
            .lock()
            .get(&(dump_id, path.to_string(), line, character))
            .cloned()
            .unwrap_or_default())
    }

    async fn package_information(
        &self,
        dump_id: i64,
        _path: &str,
        package_information_id: &str,
    ) -> anyhow::Result<Option<PackageInformationData>> {
        Ok(self
            .package_information
            .lock()
            .get(&(dump_id, package_information_id.to_string()))
            .cloned())
    }

    async fn bulk_moniker_results(
        &self,
        table: MonikerTable,
        dump_ids: &[i64],
        monikers: &[MonikerData],
        limit: usize,
        _offset: usize,
    ) -> anyhow::Result<(Vec<Location>, usize)> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);

        let map = self.bulk.lock();
        let mut locations = Vec::new();
        for dump_id in dump_ids {
            for moniker in monikers {
                if let Some(found) = map.get(&(table, *dump_id, moniker.identifier.clone())) {
                    locations.extend(found.iter().cloned());
                }
            }
        }

        let total = locations.len();
        locations.truncate(limit);
        Ok((locations, total))
    }
}

/// Shifts lines by a constant: the forward translation adds `lines`, the
/// reverse translation subtracts. A translation that would go negative does
/// not exist. Useful for asserting that positions really are projected in
/// and ranges really are projected back.
#[derive(Debug, Clone, Copy)]
pub struct ShiftAdjuster {
    pub lines: i64,
}

impl ShiftAdjuster {
    pub fn new(lines: i64) -> Self {
        ShiftAdjuster { lines }
    }

    fn shift_line(&self, line: u32, reverse: bool) -> Option<u32> {
        let delta = if reverse { -self.lines } else { self.lines };
        u32::try_from(line as i64 + delta).ok()
    }
}

#[async_trait]
impl PositionAdjuster for ShiftAdjuster {
    async fn adjust_position(
        &self,
        _commit: &str,
        path: &str,
        position: Position,
        reverse: bool,
    ) -> anyhow::Result<Option<(String, Position)>> {
        Ok(self
            .shift_line(position.line, reverse)
            .map(|line| (path.to_string(), Position::new(line, position.character))))
    }

    async fn adjust_range(
        &self,
        _commit: &str,
        path: &str,
        range: Range,
        reverse: bool,
    ) -> anyhow::Result<Option<(String, Range)>> {
        let start = self.shift_line(range.start.line, reverse);
        let end = self.shift_line(range.end.line, reverse);
        Ok(start.zip(end).map(|(start_line, end_line)| {
            (
                path.to_string(),
                Range {
                    start: Position::new(start_line, range.start.character),
                    end: Position::new(end_line, range.end.character),
                },
            )
        }))
    }
}

/// An adjuster for which no translation ever exists. Candidates adjusted
/// through it are dropped on the way in, and ranges pass through unchanged
/// on the way out.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectingAdjuster;

#[async_trait]
impl PositionAdjuster for RejectingAdjuster {
    async fn adjust_position(
        &self,
        _commit: &str,
        _path: &str,
        _position: Position,
        _reverse: bool,
    ) -> anyhow::Result<Option<(String, Position)>> {
        Ok(None)
    }

    async fn adjust_range(
        &self,
        _commit: &str,
        _path: &str,
        _range: Range,
        _reverse: bool,
    ) -> anyhow::Result<Option<(String, Range)>> {
        Ok(None)
    }
}
