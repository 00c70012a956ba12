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

use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::adjust::PositionAdjuster;
use crate::commits::CachedCommitChecker;
use crate::error::{QueryError, Result};
use crate::resolver::sets::QualifiedMonikerSet;
use crate::stores::{DbStore, LsifStore, MonikerTable};
use crate::types::{
    AdjustedLocation, Dump, Location, MonikerKind, Position, QualifiedMoniker, Range,
};

/// One candidate dump with the query position projected into its indexed
/// commit. The worklist every query entry point iterates over.
#[derive(Debug, Clone)]
pub struct CandidateUpload {
    pub dump: Dump,
    /// The query path translated to the dump's commit, repository-absolute.
    pub adjusted_path: String,
    pub adjusted_position: Position,
    /// `adjusted_path` with the dump root stripped; the form the index
    /// store is keyed on.
    pub path_in_dump: String,
}

/// Answers hover / definitions / references / ranges / diagnostics for one
/// (repository, commit, path) against a fixed set of candidate dumps. All
/// scratch state (commit cache, dedup sets, worklists) lives for exactly one
/// query.
pub struct QueryResolver {
    pub(super) db_store: Arc<dyn DbStore>,
    pub(super) lsif_store: Arc<dyn LsifStore>,
    pub(super) commit_checker: Arc<CachedCommitChecker>,
    pub(super) position_adjuster: Arc<dyn PositionAdjuster>,
    pub(super) repository_id: i64,
    pub(super) commit: String,
    pub(super) path: String,
    pub(super) uploads: Vec<Dump>,
    pub(super) cancel: CancellationToken,
}

impl QueryResolver {
    /// The methods of this resolver answer queries for the given repository,
    /// commit, and path, consulting only the given candidate dumps (plus
    /// whatever cross-index expansion discovers).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db_store: Arc<dyn DbStore>,
        lsif_store: Arc<dyn LsifStore>,
        commit_checker: Arc<CachedCommitChecker>,
        position_adjuster: Arc<dyn PositionAdjuster>,
        repository_id: i64,
        commit: String,
        path: String,
        uploads: Vec<Dump>,
        cancel: CancellationToken,
    ) -> Self {
        QueryResolver {
            db_store,
            lsif_store,
            commit_checker,
            position_adjuster,
            repository_id,
            commit,
            path,
            uploads,
            cancel,
        }
    }

    /// The candidate dumps this resolver was constructed over.
    pub fn uploads(&self) -> &[Dump] {
        &self.uploads
    }

    /// Fails with `Cancelled` once the query's token has fired. Checked
    /// immediately before every capability call so nothing is issued after
    /// cancellation.
    pub(super) fn ensure_live(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(QueryError::Cancelled);
        }
        Ok(())
    }

    pub(super) fn log_detail(&self, line: u32, character: u32) -> String {
        let ids: Vec<String> = self.uploads.iter().map(|u| u.id.to_string()).collect();
        format!(
            "repository={} commit={} path={} uploads=[{}] line={} character={}",
            self.repository_id,
            self.commit,
            self.path,
            ids.join(","),
            line,
            character,
        )
    }

    /// Project the query position into each candidate dump's indexed commit.
    /// Candidates for which no translation exists are dropped.
    pub(super) async fn adjust_uploads(
        &self,
        line: u32,
        character: u32,
    ) -> Result<Vec<CandidateUpload>> {
        let position = Position::new(line, character);

        let mut candidates = Vec::with_capacity(self.uploads.len());
        for upload in &self.uploads {
            self.ensure_live()?;
            let adjusted = self
                .position_adjuster
                .adjust_position(&upload.commit, &self.path, position, false)
                .await?;
            let Some((adjusted_path, adjusted_position)) = adjusted else {
                continue;
            };

            let path_in_dump = upload.strip_root(&adjusted_path).to_string();
            candidates.push(CandidateUpload {
                dump: upload.clone(),
                adjusted_path,
                adjusted_position,
                path_in_dump,
            });
        }

        Ok(candidates)
    }

    /// Fetch dump records by id, dropping any whose indexed commit no longer
    /// exists.
    pub(super) async fn uploads_by_ids(&self, ids: &[i64]) -> Result<Vec<Dump>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.ensure_live()?;
        let uploads = self.db_store.get_dumps_by_ids(ids).await?;

        let mut filtered = Vec::with_capacity(uploads.len());
        for upload in uploads {
            self.ensure_live()?;
            if !self
                .commit_checker
                .exists(upload.repository_id, &upload.commit)
                .await?
            {
                continue;
            }
            filtered.push(upload);
        }

        Ok(filtered)
    }

    /// Collect the qualified monikers attached to the adjusted position in
    /// every candidate dump, deduplicated in first-seen order. Monikers
    /// without package information are skipped; `kind` further restricts the
    /// set when given.
    pub(super) async fn ordered_monikers(
        &self,
        candidates: &[CandidateUpload],
        kind: Option<MonikerKind>,
    ) -> Result<Vec<QualifiedMoniker>> {
        let mut set = QualifiedMonikerSet::new();

        for candidate in candidates {
            self.ensure_live()?;
            let range_monikers = self
                .lsif_store
                .monikers_by_position(
                    candidate.dump.id,
                    &candidate.path_in_dump,
                    candidate.adjusted_position.line,
                    candidate.adjusted_position.character,
                )
                .await?;

            for monikers in range_monikers {
                for moniker in monikers {
                    let Some(package_information_id) = moniker.package_information_id.clone()
                    else {
                        continue;
                    };
                    if kind.is_some_and(|k| moniker.kind != k) {
                        continue;
                    }

                    self.ensure_live()?;
                    let package_information = self
                        .lsif_store
                        .package_information(
                            candidate.dump.id,
                            &candidate.path_in_dump,
                            &package_information_id,
                        )
                        .await?
                        .unwrap_or_default();

                    set.add(QualifiedMoniker {
                        moniker,
                        package_information,
                    });
                }
            }
        }

        Ok(set.into_monikers())
    }

    /// One bulk symbol-table query across the given dumps and monikers.
    pub(super) async fn moniker_locations(
        &self,
        uploads: &[Dump],
        monikers: &[QualifiedMoniker],
        table: MonikerTable,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Location>> {
        if uploads.is_empty() || monikers.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = uploads.iter().map(|u| u.id).collect();
        let args: Vec<_> = monikers.iter().map(|m| m.moniker.clone()).collect();

        self.ensure_live()?;
        let (locations, _) = self
            .lsif_store
            .bulk_moniker_results(table, &ids, &args, limit, offset)
            .await?;

        Ok(locations)
    }

    /// Reverse-project a batch of dump-relative locations into the query
    /// commit. Every location's dump must be present in the map; a missing
    /// id means two stores disagree and the query fails.
    pub(super) async fn adjust_locations(
        &self,
        uploads_by_id: &HashMap<i64, Dump>,
        locations: Vec<Location>,
    ) -> Result<Vec<AdjustedLocation>> {
        let mut adjusted = Vec::with_capacity(locations.len());
        for location in locations {
            let dump = uploads_by_id
                .get(&location.dump_id)
                .ok_or(QueryError::UnresolvedDump(location.dump_id))?;
            adjusted.push(self.adjust_location(dump, location).await?);
        }

        Ok(adjusted)
    }

    pub(super) async fn adjust_location(
        &self,
        dump: &Dump,
        location: Location,
    ) -> Result<AdjustedLocation> {
        let path = format!("{}{}", dump.root, location.path);
        let (adjusted_commit, adjusted_range) = self
            .adjust_range(dump.repository_id, &dump.commit, &path, location.range)
            .await?;

        Ok(AdjustedLocation {
            dump: dump.clone(),
            path,
            adjusted_commit,
            adjusted_range,
        })
    }

    /// Translate a range relative to some indexed commit into an equivalent
    /// range in the query commit. Cross-repository results pass through
    /// unchanged under the dump's own commit, as do ranges the diff cannot
    /// carry over.
    pub(super) async fn adjust_range(
        &self,
        repository_id: i64,
        commit: &str,
        path: &str,
        range: Range,
    ) -> Result<(String, Range)> {
        if repository_id != self.repository_id {
            // No diffs exist for translation between repositories.
            return Ok((commit.to_string(), range));
        }

        self.ensure_live()?;
        if let Some((_, adjusted_range)) = self
            .position_adjuster
            .adjust_range(commit, path, range, true)
            .await?
        {
            return Ok((self.commit.clone(), adjusted_range));
        }

        Ok((commit.to_string(), range))
    }
}
