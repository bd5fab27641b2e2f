use anyhow::Context;

use crate::cli::args::{Args, Command, ExecArgs};
use crate::core::channel::CommandChannel;
use crate::domain::config::PromptComConfig;
use crate::domain::error::PromptComError;
use crate::infrastructure::config::ConfigManager;

/// Execute a CLI command.
pub fn execute_command(args: Args) -> anyhow::Result<()> {
    let config_manager = ConfigManager::new()?;
    let config = match &args.config {
        Some(path) => config_manager
            .load_config_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => config_manager.load_config()?,
    };

    match args.command {
        Command::Exec(exec_args) => execute_exec(exec_args, &config),
        Command::Devices => {
            for device in &config.devices {
                println!(
                    "{}\t{}\t{}",
                    device.name,
                    connection_label(device),
                    device.description
                );
            }
            Ok(())
        }
        Command::Ports => {
            for port in serialport::available_ports()? {
                println!("{}", port.port_name);
            }
            Ok(())
        }
        Command::Init => {
            let cwd = std::env::current_dir()?;
            config_manager.init_project_config(&cwd)?;
            println!("Wrote {}", cwd.join(".promptcom/config.toml").display());
            Ok(())
        }
    }
}

/// Open a channel to the device, run one command, print its stdout.
///
/// A timeout means the command's result is unknown; the session is
/// abandoned rather than reused on a possibly desynchronized stream.
fn execute_exec(exec_args: ExecArgs, config: &PromptComConfig) -> anyhow::Result<()> {
    let device = config
        .device(&exec_args.device)
        .ok_or_else(|| PromptComError::UnknownDevice(exec_args.device.clone()))?;

    let mut channel = CommandChannel::for_device(device, &config.global);
    channel.open()?;
    let output = channel.exec_command(exec_args.command.as_str());
    channel.close()?;

    let output =
        output.with_context(|| format!("running '{}' on {}", exec_args.command, device.name))?;
    println!("{}", output);
    Ok(())
}

fn connection_label(device: &crate::domain::config::DeviceConfig) -> String {
    use crate::domain::config::ConnectionConfig;

    match &device.connection {
        ConnectionConfig::Serial {
            port, baud_rate, ..
        } => format!("serial {} @{}", port, baud_rate),
        ConnectionConfig::Tcp { host, port, .. } => format!("tcp {}:{}", host, port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{ConnectionConfig, DeviceConfig, GlobalConfig};

    fn sample_config() -> PromptComConfig {
        PromptComConfig {
            global: GlobalConfig::default(),
            devices: vec![DeviceConfig {
                name: "board".to_string(),
                description: "Test board".to_string(),
                connection: ConnectionConfig::Tcp {
                    host: "127.0.0.1".to_string(),
                    port: 1,
                    timeout_ms: 50,
                },
                prompt: "> ".to_string(),
            }],
        }
    }

    #[test]
    fn exec_unknown_device_fails() {
        let config = sample_config();
        let result = execute_exec(
            ExecArgs {
                device: "missing".to_string(),
                command: "echo hi".to_string(),
            },
            &config,
        );
        assert!(result.is_err());
    }

    #[test]
    fn connection_labels() {
        let config = sample_config();
        assert_eq!(connection_label(&config.devices[0]), "tcp 127.0.0.1:1");
    }
}
