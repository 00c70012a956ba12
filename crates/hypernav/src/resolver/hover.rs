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

use crate::error::Result;
use crate::observe::observe;
use crate::resolver::query::QueryResolver;
use crate::types::Range;

impl QueryResolver {
    /// The hover text and range for the symbol at the given position, from
    /// the first candidate dump whose index has a non-empty answer. Hover
    /// does not merge across indexes: the deepest-indexed answer wins, and
    /// candidate order already prefers deeper roots.
    pub async fn hover(&self, line: u32, character: u32) -> Result<Option<(String, Range)>> {
        let _observed = observe("hover", self.log_detail(line, character));

        let candidates = self.adjust_uploads(line, character).await?;

        for candidate in &candidates {
            self.ensure_live()?;
            let hover = self
                .lsif_store
                .hover(
                    candidate.dump.id,
                    &candidate.path_in_dump,
                    candidate.adjusted_position.line,
                    candidate.adjusted_position.character,
                )
                .await?;
            let Some((text, range)) = hover else {
                continue;
            };
            if text.is_empty() {
                continue;
            }

            let (_, adjusted_range) = self
                .adjust_range(
                    candidate.dump.repository_id,
                    &candidate.dump.commit,
                    &self.path,
                    range,
                )
                .await?;

            return Ok(Some((text, adjusted_range)));
        }

        Ok(None)
    }
}
