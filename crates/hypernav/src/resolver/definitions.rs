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

use crate::error::Result;
use crate::observe::observe;
use crate::resolver::query::QueryResolver;
use crate::stores::MonikerTable;
use crate::types::{AdjustedLocation, Dump, MonikerKind, QualifiedMoniker};

/// Cap on the bulk definitions query issued for import monikers.
const DEFINITION_MONIKERS_LIMIT: usize = 100;

impl QueryResolver {
    /// The source locations that define the symbol at the given position.
    /// Local definitions from the first candidate dump that has any always
    /// win; only when no candidate answers locally does the search expand
    /// through import monikers into the defining packages' dumps.
    pub async fn definitions(&self, line: u32, character: u32) -> Result<Vec<AdjustedLocation>> {
        let _observed = observe("definitions", self.log_detail(line, character));

        let candidates = self.adjust_uploads(line, character).await?;

        let mut uploads_by_id: HashMap<i64, Dump> = candidates
            .iter()
            .map(|c| (c.dump.id, c.dump.clone()))
            .collect();

        for candidate in &candidates {
            self.ensure_live()?;
            let locations = self
                .lsif_store
                .definitions(
                    candidate.dump.id,
                    &candidate.path_in_dump,
                    candidate.adjusted_position.line,
                    candidate.adjusted_position.character,
                )
                .await?;
            if !locations.is_empty() {
                return self.adjust_locations(&uploads_by_id, locations).await;
            }
        }

        let monikers = self
            .ordered_monikers(&candidates, Some(MonikerKind::Import))
            .await?;

        let uploads = self.uploads_with_definitions(&monikers).await?;
        for upload in &uploads {
            uploads_by_id.insert(upload.id, upload.clone());
        }

        let locations = self
            .moniker_locations(
                &uploads,
                &monikers,
                MonikerTable::Definitions,
                DEFINITION_MONIKERS_LIMIT,
                0,
            )
            .await?;

        self.adjust_locations(&uploads_by_id, locations).await
    }

    /// The dumps that define the packages named by the given monikers, with
    /// vanished-commit dumps already filtered out. No moniker, no database
    /// call.
    async fn uploads_with_definitions(
        &self,
        monikers: &[QualifiedMoniker],
    ) -> Result<Vec<Dump>> {
        if monikers.is_empty() {
            return Ok(Vec::new());
        }

        self.ensure_live()?;
        let package_ids = self.db_store.package_ids(monikers).await?;

        self.uploads_by_ids(&package_ids).await
    }
}
