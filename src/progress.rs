//! Progress reporting.
//!
//! Copiers drive a [`ProgressReporter`] in one of two modes, announced by
//! [`ProgressReporter::start`]:
//!
//! - determinate, counting completed blocks ([`ProgressKind::Blocks`]) or
//!   bytes of a known total ([`ProgressKind::Bytes`])
//! - indeterminate, counting bytes with no known total
//!   ([`ProgressKind::UnknownBytes`]), used when decompressing
//!
//! With the `progress` feature, [`BarReporter`] renders either mode with
//! indicatif.

/// What the units passed to [`ProgressReporter::advance`] mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
    /// Completed blocks out of a known total
    Blocks {
        /// Number of blocks in the job
        total: u64,
    },
    /// Transferred bytes out of a known total
    Bytes {
        /// Size of the input
        total: u64,
    },
    /// Transferred bytes, total unknown
    UnknownBytes,
}

/// Receives progress from a running copy.
///
/// `advance` is called from worker threads, so implementations must be
/// `Send + Sync`.
pub trait ProgressReporter: Send + Sync {
    /// Called once before any work, with the unit and total.
    fn start(&self, kind: ProgressKind) {
        let _ = kind;
    }

    /// `delta` more units are done.
    fn advance(&self, delta: u64);

    /// Called once after the copier has returned, successfully or not.
    fn finish(&self) {}
}

/// A reporter that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn advance(&self, _delta: u64) {}
}

#[cfg(feature = "progress")]
pub use bar::BarReporter;

#[cfg(feature = "progress")]
mod bar {
    use super::{ProgressKind, ProgressReporter};
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Duration;

    /// indicatif-backed reporter (requires `progress` feature)
    ///
    /// The bar has no length until [`start`](ProgressReporter::start) restyles it.
    /// [`finish`](ProgressReporter::finish) clears it so the caller can print
    /// its own summary.
    #[derive(Clone)]
    pub struct BarReporter {
        bar: ProgressBar,
    }

    impl BarReporter {
        /// Create a reporter drawing to stderr.
        #[must_use]
        pub fn new() -> Self {
            Self {
                bar: ProgressBar::new(0),
            }
        }

        /// Create a reporter that never draws.
        #[must_use]
        pub fn hidden() -> Self {
            Self {
                bar: ProgressBar::hidden(),
            }
        }

        /// Units reported so far.
        pub fn position(&self) -> u64 {
            self.bar.position()
        }
    }

    impl Default for BarReporter {
        fn default() -> Self {
            Self::new()
        }
    }

    fn style(template: &str, fallback: ProgressStyle) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(template)
            .map(|s| s.progress_chars("=>-"))
            .unwrap_or(fallback)
    }

    impl ProgressReporter for BarReporter {
        fn start(&self, kind: ProgressKind) {
            match kind {
                ProgressKind::Blocks { total } => {
                    self.bar.set_length(total);
                    self.bar.set_style(style(
                        "{spinner:.green} Copying [{bar:40.cyan/blue}] {pos}/{len} blocks ({eta})",
                        ProgressStyle::default_bar(),
                    ));
                }
                ProgressKind::Bytes { total } => {
                    self.bar.set_length(total);
                    self.bar.set_style(style(
                        "{spinner:.green} Copying [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})",
                        ProgressStyle::default_bar(),
                    ));
                }
                ProgressKind::UnknownBytes => {
                    self.bar.unset_length();
                    self.bar.set_style(style(
                        "{spinner:.green} Decompressing {bytes} ({bytes_per_sec})",
                        ProgressStyle::default_spinner(),
                    ));
                    self.bar.enable_steady_tick(Duration::from_millis(100));
                }
            }
        }

        fn advance(&self, delta: u64) {
            self.bar.inc(delta);
        }

        fn finish(&self) {
            self.bar.finish_and_clear();
        }
    }
}
