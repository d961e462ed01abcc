pub mod config;
pub mod correlate;
pub mod error;
pub mod eventlog;
pub mod fleet;
pub mod io;
pub mod lifecycle;
pub mod orchestrator;
pub mod readiness;
pub mod secure;
pub mod store;
pub mod transport;
pub mod types;

pub use error::{Result, VolleyError};
