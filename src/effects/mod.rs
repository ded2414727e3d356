//! The effects themselves.
//!
//! Each effect is a self-contained simulation + renderer pair behind the
//! [`Effect`](crate::lifecycle::Effect) trait. Runtime state lives in an
//! `Option` that `start` fills and `stop` drops, so a stopped (or
//! never-started) effect holds no pools, grids, or rings.

mod smoke;
mod tunnel;

pub use smoke::SmokeEffect;
pub use tunnel::TunnelEffect;
