use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Command line arguments for PromptCom
#[derive(Parser, Debug)]
#[command(
    name = "promptcom",
    version = env!("CARGO_PKG_VERSION"),
    about = "Prompt-delimited command channel for embedded device consoles",
    long_about = "Drive an embedded device console over serial or TCP: send a command, \
wait for the shell prompt to reappear, and print the command's own output."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a command on a configured device and print its output
    Exec(ExecArgs),
    /// List configured devices
    Devices,
    /// List serial ports available on this host
    Ports,
    /// Write an example project configuration to the current directory
    Init,
}

/// Arguments for the exec command
#[derive(ClapArgs, Debug)]
pub struct ExecArgs {
    /// Name of the configured device
    #[arg(short, long)]
    pub device: String,

    /// Command line to run on the device
    pub command: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_args_parse() {
        let args = Args::try_parse_from([
            "promptcom", "exec", "--device", "board", "echo hi",
        ])
        .unwrap();

        match args.command {
            Command::Exec(exec) => {
                assert_eq!(exec.device, "board");
                assert_eq!(exec.command, "echo hi");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let args =
            Args::try_parse_from(["promptcom", "--verbose", "devices"]).unwrap();
        assert!(args.verbose);
        assert!(matches!(args.command, Command::Devices));
    }

    #[test]
    fn test_missing_subcommand_fails() {
        assert!(Args::try_parse_from(["promptcom"]).is_err());
    }
}
