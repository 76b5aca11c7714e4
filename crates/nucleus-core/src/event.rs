//! Marker traits for the two event families.
//!
//! A [`MutationEvent`] is a request to change state. It is consumed by the
//! single handler registered for its type and never seen by anyone else.
//! An [`ObservationEvent`] describes a change that already happened and is
//! routed to every matching subscriber.
//!
//! An event type opts in with an empty `impl`.

use std::any::Any;
use std::fmt::Debug;

/// An internal request to change data-manager state.
pub trait MutationEvent: Any + Debug {}

/// A notification that data-manager state has changed.
pub trait ObservationEvent: Any + Debug {}
