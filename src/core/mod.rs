// Core module - prompt protocol engine
pub mod channel;
pub mod scanner;
pub mod transport;

pub use channel::{ChannelOptions, CommandChannel};
pub use scanner::read_until;
pub use transport::Transport;
