//! Root directory, profile and notifications
//!
//! This module locates the WebDash root, flattens its profile into
//! substitution keywords and provides the side channels a run reports to.

pub mod flatten;
pub mod notify;
pub mod root;

// Re-export main types
pub use flatten::*;
pub use notify::*;
pub use root::*;
