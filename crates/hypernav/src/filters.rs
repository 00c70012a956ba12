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

//! Probabilistic identifier filters attached to cross-dump reference records.
//!
//! Each external reference row carries a compact bloom filter over the
//! identifiers the referencing dump actually mentions. The filter is
//! advisory: `true` may be a false positive, `false` is definitive. Testing
//! a filter before fanning out avoids fetching dumps that provably do not
//! reference any of the queried symbols.
//!
//! Wire format: a JSON envelope with the bit array base64-packed LSB-first.
//! Probing is double-hashed FNV-1a. An empty byte string decodes as
//! "definitely matches".

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

#[derive(Debug, Serialize, Deserialize)]
struct FilterEnvelope {
    num_hash_functions: u32,
    num_bits: u64,
    buckets: String,
}

fn fnv1a_hash(data: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for byte in data {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// The bit indices probed for an identifier, Kirsch-Mitzenmacher style:
/// two independent FNV-1a hashes combined as `h1 + i*h2 mod m`.
fn bit_indices(identifier: &str, num_hash_functions: u32, num_bits: u64) -> Vec<u64> {
    let h1 = fnv1a_hash(identifier.as_bytes());
    let mut salted = identifier.as_bytes().to_vec();
    salted.push(0);
    let h2 = fnv1a_hash(&salted);

    (0..num_hash_functions as u64)
        .map(|i| h1.wrapping_add(i.wrapping_mul(h2)) % num_bits)
        .collect()
}

/// Encode a filter over the given identifiers. The ingest pipeline writes
/// these alongside each external reference record; the query core only reads
/// them, but tests and fakes need both halves.
pub fn create_filter(identifiers: &[&str], num_hash_functions: u32, num_bits: u64) -> Vec<u8> {
    let mut buckets = vec![0u8; num_bits.div_ceil(8) as usize];
    for identifier in identifiers {
        for index in bit_indices(identifier, num_hash_functions, num_bits) {
            buckets[(index / 8) as usize] |= 1 << (index % 8);
        }
    }

    let envelope = FilterEnvelope {
        num_hash_functions,
        num_bits,
        buckets: BASE64.encode(&buckets),
    };

    // Serializing a struct of primitives cannot fail.
    serde_json::to_vec(&envelope).unwrap_or_default()
}

/// Decode a filter and test the identifier against it. An empty filter means
/// "definitely matches". Malformed bytes abort the query rather than guess
/// at membership.
pub fn decode_and_test_filter(filter: &[u8], identifier: &str) -> Result<bool, QueryError> {
    if filter.is_empty() {
        return Ok(true);
    }

    let envelope: FilterEnvelope = serde_json::from_slice(filter)
        .map_err(|e| QueryError::MalformedFilter(e.to_string()))?;
    let buckets = BASE64
        .decode(envelope.buckets.as_bytes())
        .map_err(|e| QueryError::MalformedFilter(e.to_string()))?;

    if envelope.num_hash_functions == 0 || envelope.num_bits == 0 {
        return Err(QueryError::MalformedFilter(format!(
            "non-positive dimensions: k={} m={}",
            envelope.num_hash_functions, envelope.num_bits
        )));
    }
    if (buckets.len() as u64) < envelope.num_bits.div_ceil(8) {
        return Err(QueryError::MalformedFilter(format!(
            "bucket array too short: {} bytes for {} bits",
            buckets.len(),
            envelope.num_bits
        )));
    }

    let hit = bit_indices(identifier, envelope.num_hash_functions, envelope.num_bits)
        .into_iter()
        .all(|index| buckets[(index / 8) as usize] & (1 << (index % 8)) != 0);

    Ok(hit)
}
