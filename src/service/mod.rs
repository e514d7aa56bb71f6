//! Request Service Module
//!
//! Runs a request through normalization, storage and rendering, and exposes
//! that over HTTP.
//!
//! ## Flow
//! 1. Parameters are collected into a `KvsRequest` (query string, then body).
//! 2. `RequestNormalizer` resolves mode, person id and callback name.
//! 3. A missing person id short-circuits to an "ng" envelope.
//! 4. The mode is dispatched to `StorageEngine`; user-facing failures become
//!    "ng" envelopes, integration failures are returned as errors.
//!
//! ## Submodules
//! - **`orchestrator`**: `KvsService::execute`, transport-agnostic.
//! - **`handlers`**: Axum handlers and the router.

pub mod handlers;
pub mod orchestrator;

#[cfg(test)]
mod tests;
