//! Discovery of the configured Cortex instances.
//!
//! Each table under the `cortex` configuration section, except the reserved
//! `ws` table, declares one instance. A missing `url` is fatal: the registry
//! is never built with an instance silently dropped.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cortexbridge::registry::InstanceRegistry;
//!
//! let registry = InstanceRegistry::load(Some("config/cortex.toml"))?;
//! for client in registry.clients() {
//!     println!("{}: {:?}", client.name(), client.health().await);
//! }
//! ```

mod instance_registry;
mod settings;

pub use instance_registry::{InstanceRegistry, InstanceRegistryBuilder};
pub use settings::{
    CortexSettings, InstanceSettings, CORTEX_SECTION, ENV_PREFIX, TRANSPORT_KEY,
};
