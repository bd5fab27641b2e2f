use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::SerialPort;
use tracing::info;

use crate::core::transport::Transport;
use crate::domain::config::{ConnectionConfig, FlowControlConfig, ParityConfig};
use crate::domain::error::{PromptComError, PromptComResult};

/// Serial-port transport backed by the `serialport` crate.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialTransport {
    /// Open the serial port described by a `ConnectionConfig::Serial`.
    ///
    /// Open failures from the serial layer propagate untranslated.
    pub fn open(config: &ConnectionConfig) -> PromptComResult<Self> {
        let ConnectionConfig::Serial {
            port,
            baud_rate,
            data_bits,
            stop_bits,
            parity,
            flow_control,
            timeout_ms,
        } = config
        else {
            return Err(PromptComError::Config {
                message: "Invalid connection type for serial transport".to_string(),
            });
        };

        let mut builder = serialport::new(port, *baud_rate);

        builder = builder.data_bits(match data_bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            8 => serialport::DataBits::Eight,
            _ => {
                return Err(PromptComError::Config {
                    message: format!("Invalid data bits: {}", data_bits),
                })
            }
        });

        builder = builder.stop_bits(match stop_bits {
            1 => serialport::StopBits::One,
            2 => serialport::StopBits::Two,
            _ => {
                return Err(PromptComError::Config {
                    message: format!("Invalid stop bits: {}", stop_bits),
                })
            }
        });

        builder = builder.parity(match parity {
            ParityConfig::None => serialport::Parity::None,
            ParityConfig::Even => serialport::Parity::Even,
            ParityConfig::Odd => serialport::Parity::Odd,
        });

        builder = builder.flow_control(match flow_control {
            FlowControlConfig::None => serialport::FlowControl::None,
            FlowControlConfig::Software => serialport::FlowControl::Software,
            FlowControlConfig::Hardware => serialport::FlowControl::Hardware,
        });

        builder = builder.timeout(Duration::from_millis(*timeout_ms));

        let handle = builder.open()?;
        info!(port = %port, baud = *baud_rate, "serial port opened");

        Ok(Self {
            port: handle,
            name: port.clone(),
        })
    }
}

impl Transport for SerialTransport {
    fn read_byte(&mut self) -> PromptComResult<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> PromptComResult<usize> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> PromptComResult<()> {
        self.port.write_all(data)?;
        self.port.flush()?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("serial:{}", self.name)
    }
}
