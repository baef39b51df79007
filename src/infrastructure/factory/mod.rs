//! Factory modules for building infrastructure components.
//!
//! Provides factory functions that construct fully-configured infrastructure
//! components from application configuration.
//!
//! # Submodules
//!
//! - [`exchange`] - Market fetcher construction
//! - [`persistence`] - Database pool and repository construction

pub mod exchange;
pub mod persistence;
