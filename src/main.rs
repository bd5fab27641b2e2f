// PromptCom - prompt-delimited command channel for embedded device consoles
use clap::Parser;

use promptcom::cli::args::Args;
use promptcom::cli::commands::execute_command;
use promptcom::infrastructure::logging::init_logging;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if !args.quiet {
        init_logging(args.verbose);
    }

    execute_command(args)
}
