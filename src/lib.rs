//! PromptCom Library
//!
//! Prompt-delimited command channel for driving embedded device consoles
//! over serial and TCP transports: send a command, scan the byte stream
//! until the shell prompt reappears, and return the command's own output.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::core::channel::{ChannelOptions, CommandChannel};
pub use crate::core::scanner::read_until;
pub use crate::core::transport::Transport;
pub use crate::domain::config::{ConnectionConfig, DeviceConfig, GlobalConfig, PromptComConfig};
pub use crate::domain::error::{PromptComError, PromptComResult};
