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

use async_trait::async_trait;

use crate::types::{Position, Range};

/// Translates paths, positions, and ranges between the commit a query was
/// issued against and the commit a dump was indexed at, via textual diffs.
/// The query commit is fixed at construction; `commit` is always the dump's
/// indexed commit.
///
/// `reverse=false` translates from the query commit into the dump commit (to
/// pose a question to the index); `reverse=true` translates from the dump
/// commit back to the query commit (to present an answer). `None` means no
/// translation exists — the line was deleted or the file moved away — and the
/// caller skips that candidate.
#[async_trait]
pub trait PositionAdjuster: Send + Sync {
    async fn adjust_position(
        &self,
        commit: &str,
        path: &str,
        position: Position,
        reverse: bool,
    ) -> anyhow::Result<Option<(String, Position)>>;

    async fn adjust_range(
        &self,
        commit: &str,
        path: &str,
        range: Range,
        reverse: bool,
    ) -> anyhow::Result<Option<(String, Range)>>;
}

/// The adjuster for same-commit queries: every translation is the identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityAdjuster;

#[async_trait]
impl PositionAdjuster for IdentityAdjuster {
    async fn adjust_position(
        &self,
        _commit: &str,
        path: &str,
        position: Position,
        _reverse: bool,
    ) -> anyhow::Result<Option<(String, Position)>> {
        Ok(Some((path.to_string(), position)))
    }

    async fn adjust_range(
        &self,
        _commit: &str,
        path: &str,
        range: Range,
        _reverse: bool,
    ) -> anyhow::Result<Option<(String, Range)>> {
        Ok(Some((path.to_string(), range)))
    }
}
