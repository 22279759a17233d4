//! # Sampling Progress Display

use std::time::Instant;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Smoothed remaining-time estimator.
///
/// State is explicit: a step count, the timestamp of the last measurement
/// window, and an exponentially smoothed estimate. The estimate refreshes
/// every ten steps.
#[derive(Debug)]
pub struct EtaTracker {
    total: usize,
    step: usize,
    last: Instant,
    ema_secs: Option<f64>,
}

impl EtaTracker {
    /// Measurement window, in steps.
    const WINDOW: usize = 10;

    /// Smoothing factor applied to new estimates.
    const ALPHA: f64 = 0.1;

    /// Construct a tracker for `total` expected steps.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            step: 0,
            last: Instant::now(),
            ema_secs: None,
        }
    }

    /// Advance one step.
    ///
    /// ## Returns
    /// The current smoothed remaining-time estimate, in seconds, once a
    /// full measurement window has elapsed.
    pub fn tick(&mut self) -> Option<f64> {
        self.step += 1;

        if self.step % Self::WINDOW == 0 {
            let elapsed = self.last.elapsed().as_secs_f64();
            self.last = Instant::now();

            let per_step = elapsed / Self::WINDOW as f64;
            let remaining = self.total.saturating_sub(self.step) as f64;
            let estimate = per_step * remaining;

            self.ema_secs = Some(match self.ema_secs {
                None => estimate,
                Some(ema) => ema * (1.0 - Self::ALPHA) + estimate * Self::ALPHA,
            });
        }

        self.ema_secs
    }
}

/// Live progress for one sampling pass.
pub(crate) struct SampleProgress {
    bar: ProgressBar,
    eta: Option<EtaTracker>,
}

impl SampleProgress {
    /// Count-style progress (`path: pos/target`), for prefix sampling.
    pub(crate) fn counted(
        enabled: bool,
        path: &str,
        target: Option<usize>,
    ) -> Self {
        let bar = if !enabled {
            ProgressBar::hidden()
        } else if let Some(target) = target {
            let bar = ProgressBar::new(target as u64);
            bar.set_style(
                ProgressStyle::with_template("{prefix}:\t{pos}/{len}")
                    .expect("static template"),
            );
            bar
        } else {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{prefix}:\t{pos}/?").expect("static template"),
            );
            bar
        };
        bar.set_prefix(path.to_string());

        Self { bar, eta: None }
    }

    /// Spinner-style progress with a smoothed ETA, for reservoir sampling.
    pub(crate) fn spinner(
        enabled: bool,
        path: &str,
        total: usize,
    ) -> Self {
        let bar = if enabled {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{prefix}:\t{spinner}\t{msg}")
                    .expect("static template"),
            );
            bar
        } else {
            ProgressBar::hidden()
        };
        bar.set_prefix(path.to_string());

        Self {
            bar,
            eta: Some(EtaTracker::new(total)),
        }
    }

    /// Record one sampled item.
    pub(crate) fn inc(&mut self) {
        self.bar.inc(1);
        if let Some(eta) = &mut self.eta
            && let Some(secs) = eta.tick()
        {
            self.bar.set_message(format!("ETA:\t{} sec", secs as u64));
        }
    }

    /// Clear the live bar.
    pub(crate) fn clear(self) {
        self.bar.finish_and_clear();
    }
}

/// Emit the final count-vs-target summary line.
///
/// Green when the bound was reached exactly, red when missed; uncolored
/// when the bound is unbounded (`?` target).
pub(crate) fn report_final(
    path: &str,
    count: usize,
    target: Option<usize>,
) {
    let line = match target {
        Some(target) => {
            let line = format!("{path}:\t{count}/{target}");
            if count == target {
                style(line).green().to_string()
            } else {
                style(line).red().to_string()
            }
        }
        None => format!("{path}:\t{count}/?"),
    };
    log::info!("{line}");
}
