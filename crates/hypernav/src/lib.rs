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

//! Precise code-navigation query core.
//!
//! Given a source position in a repository at a commit, answers hover,
//! definitions, references, ranges, and diagnostics questions by correlating
//! precomputed index dumps with the live commit graph: pick the nearest
//! usable dumps (inferring from an ancestor walk when the commit is newer
//! than the last visibility refresh), translate the position into each
//! dump's indexed commit, query the local index, expand through monikers
//! into other dumps when the local index does not answer, and translate the
//! results back.
//!
//! The core is pure in-process composition: databases, the index store,
//! gitserver, and the diff-based position adjuster are consumed through the
//! capability traits in [`stores`] and [`adjust`], so the whole crate runs
//! unchanged against production services or the in-memory fakes used by its
//! tests.

pub mod adjust;
pub mod commits;
pub mod error;
pub mod filters;
pub mod resolver;
pub mod stores;
pub mod types;

mod observe;

// Re-export the main surface for downstream callers that prefer a flat import.
pub use crate::adjust::{IdentityAdjuster, PositionAdjuster};
pub use crate::commits::CachedCommitChecker;
pub use crate::error::{QueryError, Result};
pub use crate::resolver::{QueryResolver, Resolver};
pub use crate::stores::{DbStore, GitserverClient, LsifStore, MonikerTable};
pub use crate::types::{
    AdjustedCodeIntelligenceRange, AdjustedDiagnostic, AdjustedLocation, CommitGraph,
    CommitGraphOptions, Dump, Location, MonikerData, MonikerKind, PackageInformationData,
    Position, QualifiedMoniker, Range,
};

#[doc(hidden)]
pub mod test_support;
