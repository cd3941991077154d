//! Supply chain risk dashboard
//!
//! Loads the DataCo order log and its field descriptions, filters by
//! customer country, flags orders at risk of late delivery and builds a map of
//! where they are. [`loader::load`] and [`view::render`] are the two stages;
//! [`api`] serves the result over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod plot;
pub mod view;

pub use config::DashboardConfig;
pub use error::{DataError, MissingDataFile};
pub use loader::{load, LoadOutcome};
pub use view::{render, CountryFilter, RenderPlan};
