//! Easy Key-Value Store Library
//!
//! A per-person key-value store behind a single request/response endpoint.
//! A caller names a person id plus a set of string key/value pairs, and the
//! store fetches, merges or deletes that person's record.
//!
//! ## Architecture Modules
//! - **`config`**: Limits, storage location and reserved parameter names.
//! - **`error`**: The error enum shared by every layer, split into
//!   user-facing and integration failures.
//! - **`request`**: Validation of untrusted parameters into an `Operation`
//!   and an update payload.
//! - **`store`**: The sharded flat-file storage engine and its codec.
//! - **`response`**: The `{status, message, data}` envelope and JSONP wrapping.
//! - **`service`**: Orchestration of a request and the HTTP transport.

pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod service;
pub mod store;
