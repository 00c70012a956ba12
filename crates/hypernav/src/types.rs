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

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A completed index artifact for one (repository, commit, root, indexer).
/// Paths stored inside a dump are relative to `root`; the repository-absolute
/// form is `root + relative`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dump {
    pub id: i64,
    pub repository_id: i64,
    pub commit: String,
    /// Path prefix the index was produced under. Either empty or ends in `/`.
    pub root: String,
    pub indexer: String,
}

impl Dump {
    /// Strip this dump's root from a repository-absolute path.
    pub fn strip_root<'a>(&self, path: &'a str) -> &'a str {
        path.strip_prefix(self.root.as_str()).unwrap_or(path)
    }
}

/// A zero-based (line, character) source position.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Position { line, character }
    }
}

/// A half-open span between two positions in one document.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start_line: u32, start_character: u32, end_line: u32, end_character: u32) -> Self {
        Range {
            start: Position::new(start_line, start_character),
            end: Position::new(end_line, end_character),
        }
    }

    /// Whether the given position falls inside this range. The end bound is
    /// exclusive, matching the editor convention for identifier spans.
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position < self.end
    }
}

/// A use or definition site inside one dump. The path is dump-relative.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub dump_id: i64,
    pub path: String,
    pub range: Range,
}

/// A location projected into the commit the user asked about. The path is
/// repository-absolute (root-prefixed).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdjustedLocation {
    pub dump: Dump,
    pub path: String,
    pub adjusted_commit: String,
    pub adjusted_range: Range,
}

/// The role a moniker plays at its attachment site.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MonikerKind {
    Import,
    Export,
    Local,
}

/// A symbolic identifier attached to a range, letting two independent dumps
/// refer to the same symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonikerData {
    pub kind: MonikerKind,
    pub scheme: String,
    pub identifier: String,
    /// Key of the package-information record qualifying this moniker, when
    /// the indexer attached one.
    pub package_information_id: Option<String>,
}

/// Name and version of the package release a moniker belongs to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageInformationData {
    pub name: String,
    pub version: String,
}

/// A moniker joined with its package information. Two qualified monikers are
/// the same symbol iff (package name, package version, scheme, identifier)
/// agree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QualifiedMoniker {
    pub moniker: MonikerData,
    pub package_information: PackageInformationData,
}

/// A diagnostic message attached to a span of one dump document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub dump_id: i64,
    pub path: String,
    pub severity: i32,
    pub code: String,
    pub message: String,
    pub source: String,
    pub range: Range,
}

/// A diagnostic projected into the commit the user asked about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdjustedDiagnostic {
    pub diagnostic: Diagnostic,
    pub dump: Dump,
    pub adjusted_commit: String,
    pub adjusted_range: Range,
}

/// Aggregate code intelligence for one range of a document, as stored in the
/// index: the definition and reference sites of the symbol under the range
/// plus its hover text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeIntelligenceRange {
    pub range: Range,
    pub definitions: Vec<Location>,
    pub references: Vec<Location>,
    pub hover_text: String,
}

/// A window range with its definition and reference locations projected into
/// the commit the user asked about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdjustedCodeIntelligenceRange {
    pub range: Range,
    pub definitions: Vec<AdjustedLocation>,
    pub references: Vec<AdjustedLocation>,
    pub hover_text: String,
}

/// Options for a bounded ancestor walk of a repository's commit DAG.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitGraphOptions {
    pub commit: String,
    pub limit: usize,
}

/// A fragment of a repository's commit DAG: each commit mapped to its parent
/// commits, with the topological output order preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitGraph {
    order: Vec<String>,
    parents: HashMap<String, Vec<String>>,
}

impl CommitGraph {
    pub fn new(parents: HashMap<String, Vec<String>>, order: Vec<String>) -> Self {
        CommitGraph { order, parents }
    }

    /// Parse `git log --topo-order` style output, one commit per line followed
    /// by its parent hashes. Parents that never appear on their own line are
    /// added with an empty parent list so the map is closed over its edges.
    pub fn parse(lines: &[&str]) -> Self {
        let mut order = Vec::with_capacity(lines.len());
        let mut parents: HashMap<String, Vec<String>> = HashMap::new();

        for line in lines {
            let mut fields = line.split_whitespace();
            let commit = match fields.next() {
                Some(commit) => commit.to_string(),
                None => continue,
            };

            let commit_parents: Vec<String> = fields.map(|p| p.to_string()).collect();
            order.push(commit.clone());
            for parent in &commit_parents {
                parents.entry(parent.clone()).or_default();
            }
            parents.insert(commit, commit_parents);
        }

        CommitGraph { order, parents }
    }

    pub fn parents(&self) -> &HashMap<String, Vec<String>> {
        &self.parents
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_contains_is_half_open() {
        let r = Range::new(10, 4, 10, 5);
        assert!(r.contains(Position::new(10, 4)));
        assert!(!r.contains(Position::new(10, 5)));
        assert!(!r.contains(Position::new(10, 3)));
        assert!(!r.contains(Position::new(9, 4)));
    }

    #[test]
    fn range_contains_spans_lines() {
        let r = Range::new(2, 10, 4, 2);
        assert!(r.contains(Position::new(3, 0)));
        assert!(r.contains(Position::new(2, 10)));
        assert!(!r.contains(Position::new(4, 2)));
    }

    #[test]
    fn parse_commit_graph_closes_over_parents() {
        let graph = CommitGraph::parse(&["d", "c", "b d", "a b c"]);

        let mut expected: HashMap<String, Vec<String>> = HashMap::new();
        expected.insert("a".into(), vec!["b".into(), "c".into()]);
        expected.insert("b".into(), vec!["d".into()]);
        expected.insert("c".into(), vec![]);
        expected.insert("d".into(), vec![]);

        assert_eq!(graph.parents(), &expected);
        assert_eq!(graph.order(), &["d", "c", "b", "a"]);
    }

    #[test]
    fn strip_root_leaves_foreign_paths_alone() {
        let dump = Dump {
            root: "cmd/".to_string(),
            ..Default::default()
        };
        assert_eq!(dump.strip_root("cmd/main.go"), "main.go");
        assert_eq!(dump.strip_root("lib/util.go"), "lib/util.go");
    }
}
