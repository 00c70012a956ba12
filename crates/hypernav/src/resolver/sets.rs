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

use std::collections::HashSet;

use crate::types::{Location, QualifiedMoniker};

/// An append-with-dedup set of qualified monikers, preserving insertion
/// order. Identity is (package name, package version, scheme, identifier).
/// Per-query scratch; not concurrency-safe.
pub struct QualifiedMonikerSet {
    monikers: Vec<QualifiedMoniker>,
    hashes: HashSet<String>,
}

impl QualifiedMonikerSet {
    pub fn new() -> Self {
        QualifiedMonikerSet {
            monikers: Vec::new(),
            hashes: HashSet::new(),
        }
    }

    /// Returns true on first insert, false on duplicate.
    pub fn add(&mut self, moniker: QualifiedMoniker) -> bool {
        let hash = [
            moniker.package_information.name.as_str(),
            moniker.package_information.version.as_str(),
            moniker.moniker.scheme.as_str(),
            moniker.moniker.identifier.as_str(),
        ]
        .join("\0");

        if !self.hashes.insert(hash) {
            return false;
        }
        self.monikers.push(moniker);
        true
    }

    pub fn into_monikers(self) -> Vec<QualifiedMoniker> {
        self.monikers
    }
}

impl Default for QualifiedMonikerSet {
    fn default() -> Self {
        Self::new()
    }
}

/// An append-with-dedup set of locations. Identity is (path, range) — the
/// dump id is deliberately excluded so the same source span surfaced by two
/// dumps appears once. Per-query scratch; not concurrency-safe.
pub struct LocationSet {
    hashes: HashSet<String>,
}

impl LocationSet {
    pub fn new() -> Self {
        LocationSet {
            hashes: HashSet::new(),
        }
    }

    /// Returns true on first insert, false on duplicate.
    pub fn add(&mut self, location: &Location) -> bool {
        let hash = format!(
            "{}\0{}\0{}\0{}\0{}",
            location.path,
            location.range.start.line,
            location.range.start.character,
            location.range.end.line,
            location.range.end.character,
        );

        self.hashes.insert(hash)
    }
}

impl Default for LocationSet {
    fn default() -> Self {
        Self::new()
    }
}
