//! Overclouded kernel: cloud-posture acquisition and normalization.
//!
//! Given a subscription id and a bearer credential, [`acquire_dashboard_model`]
//! issues a bounded set of read-only calls against the resource-management API
//! and folds the responses into a single [`DashboardModel`]. Individual call
//! failures degrade to defaults; only an unusable request is an error.

pub mod assembler;
pub mod collectors;
pub mod config;
pub mod derive;
pub mod error;
pub mod fetch;
pub mod health;
pub mod heuristics;
pub mod http;
pub mod inventory;
pub mod model;
pub mod synthetic;

pub use assembler::{acquire_dashboard_model, acquire_with, assemble_at};
pub use error::AcquireError;
pub use fetch::{ArmClient, Fetch};
pub use model::DashboardModel;
pub use synthetic::generate_synthetic_model;
