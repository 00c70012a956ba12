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

use std::collections::{HashMap, HashSet};

use crate::error::{QueryError, Result};
use crate::filters::decode_and_test_filter;
use crate::observe::observe;
use crate::resolver::query::{CandidateUpload, QueryResolver};
use crate::resolver::sets::LocationSet;
use crate::stores::MonikerTable;
use crate::types::{AdjustedLocation, Dump, Location, QualifiedMoniker};

/// Internal cap on the single bulk cross-index query. Pagination of the
/// references result is a future extension; until it lands this is the only
/// bound on the fan-out.
const REFERENCES_BULK_LIMIT: usize = 10_000_000;

/// Locations grouped under the dump that produced them, so the final
/// reverse-projection knows which commit each range is relative to.
struct QualifiedLocations {
    dump: Dump,
    locations: Vec<Location>,
}

impl QueryResolver {
    /// The source locations that reference the symbol at the given position,
    /// including references from other dumps and repositories.
    ///
    /// Within one dump results keep the index store's order; across dumps,
    /// local candidates come first (in candidate order), then expansion
    /// dumps. `limit` and `cursor` are accepted for signature stability but
    /// ignored: all results are returned and the out cursor is always empty.
    pub async fn references(
        &self,
        line: u32,
        character: u32,
        _limit: usize,
        _cursor: &str,
    ) -> Result<(Vec<AdjustedLocation>, String)> {
        let _observed = observe("references", self.log_detail(line, character));

        let candidates = self.adjust_uploads(line, character).await?;

        let mut location_set = LocationSet::new();
        let mut qualified_locations: Vec<QualifiedLocations> = Vec::new();

        // Local references from each candidate dump.
        for candidate in &candidates {
            self.ensure_live()?;
            let locations = self
                .lsif_store
                .references(
                    candidate.dump.id,
                    &candidate.path_in_dump,
                    candidate.adjusted_position.line,
                    candidate.adjusted_position.character,
                )
                .await?;

            let mut kept = Vec::with_capacity(locations.len());
            for location in locations {
                if is_source_location(&candidates, &location) {
                    continue;
                }
                if !location_set.add(&location) {
                    continue;
                }
                kept.push(location);
            }

            if !kept.is_empty() {
                qualified_locations.push(QualifiedLocations {
                    dump: candidate.dump.clone(),
                    locations: kept,
                });
            }
        }

        // Continue the search through other indexes: every moniker attached
        // to the position, of any kind, fans out to the dumps that define or
        // reference the same symbol.
        let monikers = self.ordered_monikers(&candidates, None).await?;

        let expansion = self.reference_uploads(&candidates, &monikers).await?;
        let expansion_by_id: HashMap<i64, Dump> =
            expansion.iter().map(|u| (u.id, u.clone())).collect();

        let locations = self
            .moniker_locations(
                &expansion,
                &monikers,
                MonikerTable::References,
                REFERENCES_BULK_LIMIT,
                0,
            )
            .await?;

        for location in locations {
            if is_source_location(&candidates, &location) {
                continue;
            }
            if !location_set.add(&location) {
                log::warn!(
                    "references: duplicate location from dump {} at {} (query path {})",
                    location.dump_id,
                    location.path,
                    self.path,
                );
                continue;
            }

            let dump = expansion_by_id
                .get(&location.dump_id)
                .ok_or(QueryError::UnresolvedDump(location.dump_id))?;

            match qualified_locations.last_mut() {
                Some(last) if last.dump.id == location.dump_id => last.locations.push(location),
                _ => qualified_locations.push(QualifiedLocations {
                    dump: dump.clone(),
                    locations: vec![location],
                }),
            }
        }

        let mut combined = Vec::new();
        for group in qualified_locations {
            for location in group.locations {
                combined.push(self.adjust_location(&group.dump, location).await?);
            }
        }

        Ok((combined, String::new()))
    }

    /// The dumps the cross-index stage will query: every dump defining one of
    /// the moniker packages, plus every visible dump whose probabilistic
    /// filters accept at least one queried identifier. Candidate dumps are
    /// excluded (they were handled locally), as are dumps whose indexed
    /// commit no longer exists.
    async fn reference_uploads(
        &self,
        candidates: &[CandidateUpload],
        monikers: &[QualifiedMoniker],
    ) -> Result<Vec<Dump>> {
        if monikers.is_empty() {
            return Ok(Vec::new());
        }

        self.ensure_live()?;
        let package_ids = self.db_store.package_ids(monikers).await?;

        self.ensure_live()?;
        let filters_by_dump = self
            .db_store
            .reference_ids_and_filters(self.repository_id, &self.commit, monikers)
            .await?;

        let mut ordered_ids: Vec<i64> = Vec::new();
        let mut included: HashSet<i64> = HashSet::new();

        // A defining dump is authoritative; it carries no filter.
        for id in package_ids {
            if included.insert(id) {
                ordered_ids.push(id);
            }
        }

        // A referencing dump is kept iff at least one of its filters accepts
        // at least one queried identifier. A miss on every filter is
        // definitive; an empty filter always matches.
        let mut reference_ids: Vec<i64> = filters_by_dump.keys().copied().collect();
        reference_ids.sort_unstable();

        'dumps: for id in reference_ids {
            if included.contains(&id) {
                continue;
            }
            for filter in &filters_by_dump[&id] {
                for moniker in monikers {
                    if decode_and_test_filter(filter, &moniker.moniker.identifier)? {
                        included.insert(id);
                        ordered_ids.push(id);
                        continue 'dumps;
                    }
                }
            }
        }

        ordered_ids.retain(|id| !candidates.iter().any(|c| c.dump.id == *id));

        self.uploads_by_ids(&ordered_ids).await
    }
}

/// Whether this location is one of the symbol occurrences the user is
/// hovering over, rather than a reference to it.
fn is_source_location(candidates: &[CandidateUpload], location: &Location) -> bool {
    candidates.iter().any(|c| {
        c.dump.id == location.dump_id
            && c.path_in_dump == location.path
            && location.range.contains(c.adjusted_position)
    })
}
