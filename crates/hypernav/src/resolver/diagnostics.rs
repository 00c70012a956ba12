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
use crate::types::AdjustedDiagnostic;

impl QueryResolver {
    /// Diagnostics for documents under the query path in every candidate
    /// dump, capped at `limit` across dumps. The second return value is the
    /// total number of diagnostics before the cap, so callers can render a
    /// "showing N of M" affordance.
    pub async fn diagnostics(&self, limit: usize) -> Result<(Vec<AdjustedDiagnostic>, usize)> {
        let _observed = observe("diagnostics", self.log_detail(0, 0));

        let candidates = self.adjust_uploads(0, 0).await?;

        let mut adjusted_diagnostics = Vec::new();
        let mut total_count = 0;

        for candidate in &candidates {
            self.ensure_live()?;
            let remaining = limit.saturating_sub(adjusted_diagnostics.len());
            let (diagnostics, count) = self
                .lsif_store
                .diagnostics(candidate.dump.id, &candidate.path_in_dump, remaining, 0)
                .await?;
            total_count += count;

            for diagnostic in diagnostics {
                let path = format!("{}{}", candidate.dump.root, diagnostic.path);
                let (adjusted_commit, adjusted_range) = self
                    .adjust_range(
                        candidate.dump.repository_id,
                        &candidate.dump.commit,
                        &path,
                        diagnostic.range,
                    )
                    .await?;

                adjusted_diagnostics.push(AdjustedDiagnostic {
                    diagnostic,
                    dump: candidate.dump.clone(),
                    adjusted_commit,
                    adjusted_range,
                });
            }
        }

        Ok((adjusted_diagnostics, total_count))
    }
}
