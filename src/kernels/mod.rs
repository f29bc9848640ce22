//! Per-invocation math shared by every compute backend.
//!
//! Device shader sources mirror these functions; the host device calls them directly.

pub(crate) mod blend;
pub(crate) mod coverage;
pub(crate) mod gradient;
pub(crate) mod params;
pub(crate) mod sampling;
