// Tue Jan 13 2026 - Alex

pub mod address;
pub mod dump;
pub mod error;
pub mod range;
pub mod region;
pub mod validator;

pub use address::Address;
pub use dump::DumpBuffer;
pub use error::MemoryError;
pub use range::MemoryRange;
pub use region::{AddressRange, AddressType};
pub use validator::AddressValidator;
