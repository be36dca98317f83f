//! SeaORM entities for the rental marketplace, plus the per-entity
//! validation helpers the workflow layer builds on.

pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod service;
pub mod request;
pub mod rating;

#[cfg(test)]
mod tests;
