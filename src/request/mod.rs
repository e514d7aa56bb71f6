//! Request Normalization Module
//!
//! Validates raw request parameters before anything reaches storage.
//!
//! ## Submodules
//! - **`types`**: Raw parameter containers and the validated request types
//!   (`Mode`, `PersonId`, `CallbackName`, `Operation`).
//! - **`normalizer`**: Extraction of the operation and the update payload.

pub mod normalizer;
pub mod types;
