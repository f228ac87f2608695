//! # lexdrift-session
//!
//! Exclusive single-session arbitration.
//!
//! Exactly one session may be active system-wide. The arbiter owns the one
//! optional [`arbiter::Session`] value; every transition is an explicit
//! operation taking the caller's session id, and expiry is evaluated lazily
//! on each access — no background sweep.

#![deny(unsafe_code)]

pub mod arbiter;

pub use arbiter::{
    Clock, CreatedSession, Session, SessionArbiter, SessionInfo, SystemClock, SystemStatus,
    Teardown,
};
