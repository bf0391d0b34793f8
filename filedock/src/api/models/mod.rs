//! API request and response data models.
//!
//! These are kept separate from [`crate::storage::models`] so the wire format (camelCase keys,
//! `success`/`message` envelopes) can evolve independently of the store.
//!
//! - [`files`]: file listing entries, mutation results, rename payloads

pub mod files;
