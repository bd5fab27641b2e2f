use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::config::{
    ConnectionConfig, DeviceConfig, FlowControlConfig, GlobalConfig, ParityConfig, PromptComConfig,
};
use crate::domain::error::{PromptComError, PromptComResult};

/// Configuration manager
///
/// Loads the global registry from `~/.config/promptcom/config.toml` and
/// merges device entries from a project-local `.promptcom/config.toml`
/// found by walking up from the current directory.
pub struct ConfigManager {
    global_config_path: PathBuf,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    pub fn new() -> PromptComResult<Self> {
        let global_config_path = Self::global_config_path()?;
        let project_config_path = Self::find_project_config_path();

        Ok(Self {
            global_config_path,
            project_config_path,
        })
    }

    /// Load configuration from files
    pub fn load_config(&self) -> PromptComResult<PromptComConfig> {
        let mut config = PromptComConfig::default();

        if self.global_config_path.exists() {
            let global_config = self.load_config_from_path(&self.global_config_path)?;
            config.global = global_config.global;
            config.devices = global_config.devices;
        }

        if let Some(project_path) = &self.project_config_path {
            if project_path.exists() {
                let project_config = self.load_config_from_path(project_path)?;
                config.devices.extend(project_config.devices);
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_config_from_path(&self, path: &Path) -> PromptComResult<PromptComConfig> {
        let content = fs::read_to_string(path).map_err(|e| PromptComError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| PromptComError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to a specific path
    pub fn save_config_to_path(
        &self,
        path: &Path,
        config: &PromptComConfig,
    ) -> PromptComResult<()> {
        let content = toml::to_string_pretty(config).map_err(|e| PromptComError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| PromptComError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Create an example project configuration under `path`.
    pub fn init_project_config(&self, path: &Path) -> PromptComResult<()> {
        let config_dir = path.join(".promptcom");
        let config_file = config_dir.join("config.toml");

        if config_file.exists() {
            return Err(PromptComError::Config {
                message: "Project configuration already exists".to_string(),
            });
        }

        fs::create_dir_all(&config_dir).map_err(|e| PromptComError::Config {
            message: format!("Failed to create .promptcom directory: {}", e),
        })?;

        let default_config = PromptComConfig {
            global: GlobalConfig::default(),
            devices: vec![
                DeviceConfig {
                    name: "board".to_string(),
                    description: "Serial test board".to_string(),
                    connection: ConnectionConfig::Serial {
                        port: "/dev/ttyUSB0".to_string(),
                        baud_rate: 115200,
                        data_bits: 8,
                        stop_bits: 1,
                        parity: ParityConfig::None,
                        flow_control: FlowControlConfig::None,
                        timeout_ms: 5000,
                    },
                    prompt: "nsh> ".to_string(),
                },
                DeviceConfig {
                    name: "netboard".to_string(),
                    description: "Board reachable over a telnet bridge".to_string(),
                    connection: ConnectionConfig::Tcp {
                        host: "192.168.1.100".to_string(),
                        port: 23,
                        timeout_ms: 5000,
                    },
                    prompt: "$ ".to_string(),
                },
            ],
        };

        self.save_config_to_path(&config_file, &default_config)
    }

    pub fn project_config_path(&self) -> Option<&PathBuf> {
        self.project_config_path.as_ref()
    }

    fn global_config_path() -> PromptComResult<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| PromptComError::Config {
            message: "Could not determine home directory".to_string(),
        })?;

        Ok(home.join(".config").join("promptcom").join("config.toml"))
    }

    /// Walk up from the current directory looking for a project config.
    fn find_project_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut path = current_dir.as_path();

        loop {
            let config_path = path.join(".promptcom").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }
}
