// Thu Jan 15 2026 - Alex

pub mod bar;

pub use bar::TransferBar;

use crate::gecko::TransferDirection;

/// Hands out transfer bars, or hidden ones when output is quiet.
pub struct ProgressManager {
    quiet: bool,
}

impl ProgressManager {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    pub fn hidden() -> Self {
        Self { quiet: true }
    }

    pub fn is_hidden(&self) -> bool {
        self.quiet
    }

    pub fn create_transfer_bar(&self, direction: TransferDirection, what: &str) -> TransferBar {
        let label = match direction {
            TransferDirection::Dump => format!("Dumping {}", what),
            TransferDirection::Upload => format!("Uploading {}", what),
        };
        if self.quiet {
            TransferBar::hidden(&label)
        } else {
            TransferBar::new(&label)
        }
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}
