use serde::{Deserialize, Serialize};

/// PromptCom configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptComConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Device configurations
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Default read timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
    /// Settling delay before raw reads, in milliseconds
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
}

/// Device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device name
    pub name: String,
    /// Device description
    #[serde(default)]
    pub description: String,
    /// Shell prompt marking the end of a command's output
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Connection parameters
    pub connection: ConnectionConfig,
}

/// Connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConnectionConfig {
    #[serde(rename = "serial")]
    Serial {
        port: String,
        baud_rate: u32,
        #[serde(default = "default_data_bits")]
        data_bits: u8,
        #[serde(default = "default_stop_bits")]
        stop_bits: u8,
        #[serde(default = "default_parity")]
        parity: ParityConfig,
        #[serde(default = "default_flow_control")]
        flow_control: FlowControlConfig,
        #[serde(default = "default_timeout")]
        timeout_ms: u64,
    },
    #[serde(rename = "tcp")]
    Tcp {
        host: String,
        port: u16,
        #[serde(default = "default_timeout")]
        timeout_ms: u64,
    },
}

/// Parity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParityConfig {
    None,
    Odd,
    Even,
}

/// Flow control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControlConfig {
    None,
    Hardware,
    Software,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    5000
}

fn default_settle_delay() -> u64 {
    2000
}

fn default_prompt() -> String {
    "$ ".to_string()
}

fn default_data_bits() -> u8 {
    8
}

fn default_stop_bits() -> u8 {
    1
}

fn default_parity() -> ParityConfig {
    ParityConfig::None
}

fn default_flow_control() -> FlowControlConfig {
    FlowControlConfig::None
}

impl Default for PromptComConfig {
    fn default() -> Self {
        Self {
            global: GlobalConfig::default(),
            devices: Vec::new(),
        }
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            timeout_ms: default_timeout(),
            settle_delay_ms: default_settle_delay(),
        }
    }
}

impl Default for ParityConfig {
    fn default() -> Self {
        default_parity()
    }
}

impl Default for FlowControlConfig {
    fn default() -> Self {
        default_flow_control()
    }
}

impl PromptComConfig {
    /// Look up a configured device by name.
    pub fn device(&self, name: &str) -> Option<&DeviceConfig> {
        self.devices.iter().find(|d| d.name == name)
    }
}

impl ConnectionConfig {
    /// Read timeout configured for this connection.
    pub fn timeout_ms(&self) -> u64 {
        match self {
            ConnectionConfig::Serial { timeout_ms, .. } => *timeout_ms,
            ConnectionConfig::Tcp { timeout_ms, .. } => *timeout_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = PromptComConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let _deserialized: PromptComConfig = toml::from_str(&toml_str).unwrap();
    }

    #[test]
    fn test_serial_config() {
        let config = PromptComConfig {
            global: GlobalConfig::default(),
            devices: vec![DeviceConfig {
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
            }],
        };

        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: PromptComConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized.devices.len(), 1);
        assert_eq!(deserialized.devices[0].prompt, "nsh> ");
    }

    #[test]
    fn test_tcp_config_defaults() {
        let toml_str = r#"
            [[devices]]
            name = "netboard"
            [devices.connection]
            type = "tcp"
            host = "192.168.1.100"
            port = 23
        "#;

        let config: PromptComConfig = toml::from_str(toml_str).unwrap();
        let device = config.device("netboard").unwrap();
        assert_eq!(device.prompt, "$ ");
        assert_eq!(device.connection.timeout_ms(), 5000);
    }

    #[test]
    fn test_device_lookup() {
        let config = PromptComConfig::default();
        assert!(config.device("missing").is_none());
    }
}
