//! Classification policies over completed outcome sets.
//!
//! Both policies are pure functions: no I/O, no clock.

pub mod connectivity;
pub mod credential;

pub use connectivity::{describe, ProbeBadge, ProbeBadgeLine};
pub use credential::classify;
