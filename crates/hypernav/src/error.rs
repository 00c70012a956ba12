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

use std::error::Error;
use std::fmt::{self, Display};

/// Typed errors returned by query operations.
#[derive(Debug)]
pub enum QueryError {
    /// An upstream store, gitserver, or the position adjuster failed.
    /// Propagated verbatim; the whole query fails.
    Store(anyhow::Error),
    /// A probabilistic reference filter could not be decoded.
    MalformedFilter(String),
    /// One store returned a dump id that another store cannot resolve.
    UnresolvedDump(i64),
    /// The query's cancellation token fired. No partial result is surfaced.
    Cancelled,
}

impl Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Store(e) => write!(f, "store error: {}", e),
            QueryError::MalformedFilter(s) => write!(f, "malformed reference filter: {}", s),
            QueryError::UnresolvedDump(id) => write!(f, "dump {} not resolvable", id),
            QueryError::Cancelled => write!(f, "query cancelled"),
        }
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            QueryError::Store(e) => e.source(),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for QueryError {
    fn from(e: anyhow::Error) -> Self {
        QueryError::Store(e)
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
