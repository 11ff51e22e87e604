// Thu Jan 15 2026 - Alex

pub mod config;
pub mod gecko;
pub mod memory;
pub mod transport;
pub mod ui;
pub mod utils;
pub mod video;

pub use config::Config;
pub use gecko::{Gecko, GeckoError, GeckoResult, SharedGecko};
pub use memory::{AddressValidator, DumpBuffer};
pub use transport::{FtdiTransport, SimulatedGecko, Transport};
