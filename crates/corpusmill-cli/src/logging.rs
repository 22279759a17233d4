use stderrlog::{LogLevelNum, Timestamp};

/// Logging arg group shared by every `cmill` subcommand.
///
/// The corpus engine emits sampling progress and the final
/// count-vs-target summary at info level, so `cmill` runs at info by
/// default; `-v` steps down into debug and trace detail.
#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Silence all log output, including the sampling summary.
    #[clap(short, long)]
    pub quiet: bool,

    /// Increase log detail (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Timestamp log lines.
    #[clap(long)]
    pub ts: bool,
}

impl LogArgs {
    /// The stderr log level implied by the verbosity flags.
    fn level(&self) -> LogLevelNum {
        match self.verbose {
            0 => LogLevelNum::Info,
            1 => LogLevelNum::Debug,
            _ => LogLevelNum::Trace,
        }
    }

    /// Install the stderr logger.
    pub fn setup_logging(&self) -> anyhow::Result<()> {
        stderrlog::new()
            .quiet(self.quiet)
            .verbosity(self.level())
            .timestamp(if self.ts {
                Timestamp::Second
            } else {
                Timestamp::Off
            })
            .init()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        let args = |verbose| LogArgs {
            quiet: false,
            verbose,
            ts: false,
        };

        assert!(matches!(args(0).level(), LogLevelNum::Info));
        assert!(matches!(args(1).level(), LogLevelNum::Debug));
        assert!(matches!(args(2).level(), LogLevelNum::Trace));
        assert!(matches!(args(9).level(), LogLevelNum::Trace));
    }
}
