//! Per-user point balances with an append-only transaction history.
//!
//! The [`commands::PointLedger`] service owns all validation and the
//! per-user critical section; [`ports`] define the storage seams and
//! [`adapters`] provide the in-memory stores and the HTTP boundary.

pub mod adapters;
pub mod commands;
pub mod domain;
pub mod ports;
