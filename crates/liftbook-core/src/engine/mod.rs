//! Workout engine.
//!
//! Every operation here is a plain function generic over [`EntityStore`] and
//! runs inside whatever transaction the caller bound the store to. None of
//! them commit.
//!
//! [`EntityStore`]: crate::storage::EntityStore

pub mod cascade;
pub mod catalog;
pub mod guard;
pub mod materialize;
pub mod reconcile;
pub mod sessions;
pub mod templates;
pub mod validation;

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at storage precision.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Bring a caller-supplied timestamp to storage precision.
pub(crate) fn at_storage_precision(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(6)
}
