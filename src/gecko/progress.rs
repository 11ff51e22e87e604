// Thu Jan 15 2026 - Alex

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Dump,
    Upload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressReport {
    pub current_chunk: u32,
    pub total_chunks: u32,
    pub transferred: u32,
    pub length: u32,
    /// False while the current chunk is being retried.
    pub okay: bool,
    pub direction: TransferDirection,
}

impl ProgressReport {
    pub fn is_final(&self) -> bool {
        self.current_chunk == self.total_chunks
    }

    pub fn is_dump(&self) -> bool {
        self.direction == TransferDirection::Dump
    }

    pub fn fraction(&self) -> f64 {
        if self.length == 0 {
            1.0
        } else {
            self.transferred as f64 / self.length as f64
        }
    }
}

/// Receives one report per chunk plus a final one. Runs on the transfer
/// thread and must not call back into the engine.
pub trait ProgressObserver: Send {
    fn on_progress(&mut self, report: &ProgressReport);
}

impl<F> ProgressObserver for F
where
    F: FnMut(&ProgressReport) + Send,
{
    fn on_progress(&mut self, report: &ProgressReport) {
        self(report)
    }
}

/// Forwards reports to another thread. A hung-up receiver is ignored.
pub struct ChannelObserver {
    sender: Sender<ProgressReport>,
}

impl ChannelObserver {
    pub fn new(sender: Sender<ProgressReport>) -> Self {
        Self { sender }
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_progress(&mut self, report: &ProgressReport) {
        let _ = self.sender.send(*report);
    }
}

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn report(current: u32) -> ProgressReport {
        ProgressReport {
            current_chunk: current,
            total_chunks: 4,
            transferred: current * 0x100,
            length: 0x400,
            okay: true,
            direction: TransferDirection::Dump,
        }
    }

    #[test]
    fn test_closure_observer() {
        let mut seen = Vec::new();
        {
            let mut observer = |r: &ProgressReport| seen.push(r.current_chunk);
            observer.on_progress(&report(0));
            observer.on_progress(&report(1));
        }
        assert_eq!(seen, vec![0, 1]);
    }

    #[test]
    fn test_channel_observer() {
        let (tx, rx) = mpsc::channel();
        let mut observer = ChannelObserver::new(tx);
        observer.on_progress(&report(4));
        let received = rx.recv().unwrap();
        assert!(received.is_final());
        assert_eq!(received.fraction(), 1.0);
        drop(rx);
        observer.on_progress(&report(1));
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let other = token.clone();
        other.cancel();
        assert!(token.is_cancelled());
        token.reset();
        assert!(!other.is_cancelled());
    }
}
