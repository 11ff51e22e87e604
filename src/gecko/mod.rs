// Thu Jan 15 2026 - Alex

pub mod breakpoint;
pub mod cheats;
pub mod command;
pub mod control;
pub mod error;
pub mod memory_ops;
pub mod pointer;
pub mod progress;
pub mod registers;
pub mod screenshot;
pub mod session;
pub mod transfer;

pub use cheats::{normalize_cheat_stream, parse_cheat_text};
pub use command::{BreakpointKind, WiiHookType, WiiLanguage, WiiPatches, WiiStatus};
pub use error::{ErrorKind, GeckoError, GeckoResult};
pub use pointer::PointerChain;
pub use progress::{CancelToken, ChannelObserver, ProgressObserver, ProgressReport, TransferDirection};
pub use registers::{REGISTER_BLOCK_SIZE, REGISTER_BLOCK_SIZE_FP};
pub use session::{CommandResult, Gecko, SharedGecko};
pub use transfer::{ChunkPlan, TransferSummary};
