// Thu Jan 15 2026 - Alex

use crate::gecko::{ProgressObserver, ProgressReport};
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}";

/// Byte progress for one dump or upload, driven by the engine's reports.
pub struct TransferBar {
    bar: IndicatifBar,
    label: String,
}

impl TransferBar {
    pub fn new(label: &str) -> Self {
        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ ");

        let bar = IndicatifBar::new(0);
        bar.set_style(style);
        bar.set_message(label.to_string());

        Self {
            bar,
            label: label.to_string(),
        }
    }

    pub fn hidden(label: &str) -> Self {
        Self {
            bar: IndicatifBar::hidden(),
            label: label.to_string(),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }

    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }

    pub fn inner(&self) -> &IndicatifBar {
        &self.bar
    }
}

impl ProgressObserver for TransferBar {
    fn on_progress(&mut self, report: &ProgressReport) {
        self.bar.set_length(report.length as u64);
        self.bar.set_position(report.transferred as u64);

        if report.is_final() {
            self.bar.finish_with_message(format!("{} done", self.label));
        } else if !report.okay {
            self.bar.set_message(format!(
                "{} (retrying chunk {}/{})",
                self.label,
                report.current_chunk + 1,
                report.total_chunks
            ));
        } else {
            self.bar.set_message(self.label.clone());
        }
    }
}

impl Drop for TransferBar {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.abandon_with_message(format!("{} interrupted", self.label));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gecko::TransferDirection;

    fn report(chunk: u32, total: u32, transferred: u32, okay: bool) -> ProgressReport {
        ProgressReport {
            current_chunk: chunk,
            total_chunks: total,
            transferred,
            length: 0x20000,
            okay,
            direction: TransferDirection::Dump,
        }
    }

    #[test]
    fn test_bar_follows_reports() {
        let mut bar = TransferBar::hidden("dump");
        bar.on_progress(&report(0, 3, 0, true));
        assert_eq!(bar.length(), Some(0x20000));
        assert_eq!(bar.position(), 0);

        bar.on_progress(&report(1, 3, 0xF800, false));
        assert_eq!(bar.position(), 0xF800);
        assert!(!bar.is_finished());

        bar.on_progress(&report(3, 3, 0x20000, true));
        assert!(bar.is_finished());
    }
}
