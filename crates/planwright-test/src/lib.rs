//! Shared test fixtures for Planwright crates.
//!
//! Each module is a small domain model with its solution type, descriptor
//! and value helpers:
//!
//! - [`pair`] - entities assigned to facts, for pair-conflict constraints
//! - [`chain`] - a chained variable with singleton inverse shadows
//! - [`roster`] - a basic variable with a collection inverse shadow
//! - [`fleet`] - a list variable with inverse, index and custom shadows
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! planwright-test = { workspace = true }
//! ```

pub mod chain;
pub mod fleet;
pub mod pair;
pub mod roster;

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static LOGGING: OnceLock<()> = OnceLock::new();

/// Installs a test-friendly tracing subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call has effect.
pub fn init_test_logging() {
    LOGGING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub use chain::ChainSolution;
pub use fleet::Fleet;
pub use pair::PairSchedule;
pub use roster::Roster;
