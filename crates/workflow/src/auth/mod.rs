//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Centralizes signup and login business logic; the HTTP layer only maps
//! inputs in and sessions out.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::AuthService;
