//! Internal implementation details for cmdtee.

pub mod transport;
