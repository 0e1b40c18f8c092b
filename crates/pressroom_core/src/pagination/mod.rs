//! Keyset pagination primitives.
//!
//! # Responsibility
//! - Encode/decode opaque cursors for the canonical article ordering.
//! - Define the connection shape returned to request-layer callers.
//!
//! # Invariants
//! - Canonical ordering is `created_at DESC, id DESC`.
//! - A cursor names a position; the row at that position is never re-returned.

pub mod cursor;
pub mod page;
