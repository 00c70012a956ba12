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
use crate::types::{AdjustedCodeIntelligenceRange, Dump};

impl QueryResolver {
    /// Aggregate code intelligence — definition and reference sites plus
    /// hover text — for every indexed range intersecting the given window of
    /// document lines. Window data is local to each candidate dump; there is
    /// no cross-index expansion.
    pub async fn ranges(
        &self,
        start_line: u32,
        end_line: u32,
    ) -> Result<Vec<AdjustedCodeIntelligenceRange>> {
        let _observed = observe("ranges", self.log_detail(start_line, 0));

        let candidates = self.adjust_uploads(start_line, 0).await?;

        let uploads_by_id: HashMap<i64, Dump> = candidates
            .iter()
            .map(|c| (c.dump.id, c.dump.clone()))
            .collect();

        let window = end_line.saturating_sub(start_line);

        let mut adjusted_ranges = Vec::new();
        for candidate in &candidates {
            self.ensure_live()?;
            let adjusted_start = candidate.adjusted_position.line;
            let ranges = self
                .lsif_store
                .ranges(
                    candidate.dump.id,
                    &candidate.path_in_dump,
                    adjusted_start,
                    adjusted_start + window,
                )
                .await?;

            for range in ranges {
                let (_, adjusted_range) = self
                    .adjust_range(
                        candidate.dump.repository_id,
                        &candidate.dump.commit,
                        &self.path,
                        range.range,
                    )
                    .await?;

                let definitions = self
                    .adjust_locations(&uploads_by_id, range.definitions)
                    .await?;
                let references = self
                    .adjust_locations(&uploads_by_id, range.references)
                    .await?;

                adjusted_ranges.push(AdjustedCodeIntelligenceRange {
                    range: adjusted_range,
                    definitions,
                    references,
                    hover_text: range.hover_text,
                });
            }
        }

        Ok(adjusted_ranges)
    }
}
