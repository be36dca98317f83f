//! Business layer for the rental marketplace.
//! - Every operation takes the verified actor id as an explicit argument;
//!   nothing here reads ambient request state.
//! - Multi-step mutations (cascade delete, gated inserts, status flips)
//!   run inside a single transaction so failures leave no partial state.
//! - Reuses validation and entity definitions from the `models` crate.

pub mod errors;
pub mod views;
pub mod auth;
pub mod profile;
pub mod catalog;
pub mod requests;
pub mod ratings;
pub mod uploads;
#[cfg(test)]
pub mod test_support;
