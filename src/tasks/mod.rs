//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a cache is alive.
//!
//! # Tasks
//! - Expiration sweeper: reclaims expired cache entries at a fixed interval

mod sweeper;

pub use sweeper::{spawn_sweeper, SharedStore, SweeperHandle, SweeperState, MIN_SWEEP_INTERVAL};
