//! Client for individual Cortex instances.
//!
//! - [`CortexInstance`] - Name, base URL and authentication of one instance
//! - [`CortexClient`] - Remote operations against one instance
//! - [`TransportSettings`] - HTTP transport shared by a fleet of clients

mod cortex;
mod instance;
mod transport;

pub use cortex::CortexClient;
pub use instance::CortexInstance;
pub use transport::{TransportSettings, DEFAULT_USER_AGENT};
