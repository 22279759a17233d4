use std::io::Write;

use corpusmill::stat::stat_jsonl_file;

use crate::logging::LogArgs;

/// Args for the stat command.
#[derive(clap::Args, Debug)]
pub struct StatArgs {
    /// JSONL file to summarize.
    file: String,

    #[clap(flatten)]
    pub logging: LogArgs,
}

impl StatArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        self.logging.setup_logging()?;

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        stat_jsonl_file(&self.file, &mut out)?;
        out.flush()?;

        Ok(())
    }
}
