//! Usage: Cross-cutting utilities shared across layers (low-level helpers, pure logic).

pub(crate) mod blocking;
pub(crate) mod mutex_ext;
