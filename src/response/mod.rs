//! Response Envelope Module
//!
//! Every outcome, success or user error, is reported as
//! `{"status":"ok"|"ng","message":...,"data":...}` with a success transport
//! status; the envelope's `status` is the only failure signal. With a
//! callback name the envelope is rendered as `callback(<json>)`.

pub mod envelope;
