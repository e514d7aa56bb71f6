//! Record Storage Module
//!
//! Persists one key/value record per person id as a flat text file.
//!
//! ## Core Concepts
//! - **Sharding**: The first three characters of a person id become three
//!   directory levels (`kjirou` -> `k/j/i/kjirou.txt`), bounding fan-out.
//! - **Encoding**: `key TAB base64(value) NEWLINE` per entry, binary-safe.
//! - **Merge-on-update**: An update overwrites the keys it names and keeps
//!   all others, subject to a total data-size quota.
//! - **Atomic replace**: Records are rewritten through a temp file + rename,
//!   and writes to one person id are serialized.

pub mod bootstrap;
pub mod codec;
pub mod engine;
pub mod locks;
pub mod path;
pub mod record;
