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

use std::time::{Duration, Instant};

/// Advisory threshold above which a request is logged as slow.
pub(crate) const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(1);

/// Logs an operation's duration when dropped, at warn level once it crosses
/// the slow-request threshold. Dropping on the error path still records the
/// attempt, which is the point.
pub(crate) struct Observed {
    operation: &'static str,
    detail: String,
    started: Instant,
    threshold: Duration,
}

pub(crate) fn observe(operation: &'static str, detail: String) -> Observed {
    log::debug!("{}: begin {}", operation, detail);
    Observed {
        operation,
        detail,
        started: Instant::now(),
        threshold: SLOW_REQUEST_THRESHOLD,
    }
}

impl Drop for Observed {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        if elapsed >= self.threshold {
            log::warn!(
                "{}: slow request ({}ms) {}",
                self.operation,
                elapsed.as_millis(),
                self.detail
            );
        } else {
            log::debug!(
                "{}: done ({}ms) {}",
                self.operation,
                elapsed.as_millis(),
                self.detail
            );
        }
    }
}
