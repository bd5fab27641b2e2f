use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::core::scanner::read_until;
use crate::core::transport::Transport;
use crate::domain::config::{ConnectionConfig, DeviceConfig, GlobalConfig};
use crate::domain::error::{PromptComError, PromptComResult};
use crate::infrastructure::serial::SerialTransport;
use crate::infrastructure::tcp::TcpTransport;

/// Line terminator appended to every outgoing write.
const LINE_TERMINATOR: &[u8] = b"\n";

/// Line separator the target uses when echoing output back.
const LINE_SEPARATOR: &str = "\r\n";

/// Construction-time channel parameters.
#[derive(Debug, Clone)]
pub struct ChannelOptions {
    /// Byte sequence marking the end of a command's output.
    pub prompt: Vec<u8>,
    /// Delay before raw `getc` reads, for slow or buffered targets.
    pub settle_delay: Duration,
}

impl ChannelOptions {
    pub fn new(prompt: impl Into<Vec<u8>>) -> Self {
        Self {
            prompt: prompt.into(),
            settle_delay: Duration::from_secs(2),
        }
    }

    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

/// A prompt-delimited command channel to a remote execution target.
///
/// The channel owns its transport for the whole `Open` lifetime:
/// `open()` establishes it, `close()` releases it, and dropping the
/// channel releases it on any exit path. Operations are blocking and the
/// channel is not safe for concurrent use; one caller drives it at a
/// time.
///
/// `exec_command` is the only operation that knows when output is
/// complete. `putc`, `getc` and `readline` are escape hatches for
/// exchanges that do not fit the prompt model; callers using them must
/// do their own framing.
pub struct CommandChannel {
    connection: ConnectionConfig,
    options: ChannelOptions,
    transport: Option<Box<dyn Transport>>,
}

impl CommandChannel {
    /// Create a closed channel for the given connection.
    pub fn new(connection: ConnectionConfig, options: ChannelOptions) -> Self {
        Self {
            connection,
            options,
            transport: None,
        }
    }

    /// Create a closed channel for a configured device.
    pub fn for_device(device: &DeviceConfig, global: &GlobalConfig) -> Self {
        let options = ChannelOptions::new(device.prompt.as_bytes())
            .settle_delay(Duration::from_millis(global.settle_delay_ms));
        Self::new(device.connection.clone(), options)
    }

    /// Open the channel: establish the transport and prime the target.
    ///
    /// Transport-open failures propagate as-is. Opening an already-open
    /// channel fails fast.
    pub fn open(&mut self) -> PromptComResult<()> {
        if self.transport.is_some() {
            return Err(PromptComError::ChannelAlreadyOpen);
        }

        let transport: Box<dyn Transport> = match &self.connection {
            ConnectionConfig::Serial { .. } => Box::new(SerialTransport::open(&self.connection)?),
            ConnectionConfig::Tcp { .. } => Box::new(TcpTransport::connect(&self.connection)?),
        };

        self.attach(transport)
    }

    /// Adopt an already-established transport and prime the target.
    ///
    /// Used by `open()` and by callers supplying their own `Transport`
    /// implementation.
    pub fn attach(&mut self, mut transport: Box<dyn Transport>) -> PromptComResult<()> {
        if self.transport.is_some() {
            return Err(PromptComError::ChannelAlreadyOpen);
        }

        // Press enter twice so the target settles at a fresh prompt.
        // Whatever comes back is discarded; the target is assumed ready
        // even if the prompt never shows up.
        transport.write_all(b"\n\n")?;
        match read_until(&mut *transport, &[self.options.prompt.as_slice()]) {
            Ok((_, discarded)) => {
                debug!(bytes = discarded.len(), "priming response discarded");
            }
            Err(PromptComError::Timeout) => {
                warn!("no prompt during priming, assuming target is ready");
            }
            Err(e) => return Err(e),
        }

        info!(endpoint = %transport.describe(), "channel opened");
        self.transport = Some(transport);
        Ok(())
    }

    /// Close the channel and release the transport.
    pub fn close(&mut self) -> PromptComResult<()> {
        match self.transport.take() {
            Some(transport) => {
                info!(endpoint = %transport.describe(), "channel closed");
                Ok(())
            }
            None => Err(PromptComError::ChannelClosed),
        }
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Execute a command and return its stdout.
    ///
    /// Writes `cmd` plus one line terminator, then scans for the
    /// configured prompt. The received data is framed as
    /// `[echo][CRLF][stdout...][CRLF][prompt]`; the echo line and the
    /// prompt fragment are stripped and the remaining lines are joined
    /// with `\n`.
    ///
    /// If the prompt never appears within the transport timeout the call
    /// fails with `PromptComError::Timeout` and no partial output is
    /// returned; the stream may be desynchronized afterwards, so callers
    /// wanting a retry should reopen instead.
    pub fn exec_command(&mut self, cmd: impl AsRef<[u8]>) -> PromptComResult<String> {
        let prompt = self.options.prompt.clone();
        let transport = self.transport_mut()?;

        let mut frame = cmd.as_ref().to_vec();
        frame.extend_from_slice(LINE_TERMINATOR);
        transport.write_all(&frame)?;
        debug!(bytes = frame.len(), "command written");

        let (_, raw) = read_until(transport, &[prompt.as_slice()])?;
        Ok(strip_framing(&raw))
    }

    /// Raw write of `data` plus one line terminator. Returns the number
    /// of bytes written; does not wait for any response.
    pub fn putc(&mut self, data: impl AsRef<[u8]>) -> PromptComResult<usize> {
        let transport = self.transport_mut()?;

        let mut frame = data.as_ref().to_vec();
        frame.extend_from_slice(LINE_TERMINATOR);
        transport.write_all(&frame)?;
        debug!(bytes = frame.len(), "raw write");

        Ok(frame.len())
    }

    /// Raw read of up to `size` bytes after the settling delay. Returns
    /// `None` on an empty read rather than an error.
    pub fn getc(&mut self, size: usize) -> PromptComResult<Option<Vec<u8>>> {
        let settle = self.options.settle_delay;
        let transport = self.transport_mut()?;

        // Give slow targets a chance to flush buffered output.
        thread::sleep(settle);

        let mut buf = vec![0u8; size];
        let n = transport.read_chunk(&mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some(buf))
    }

    /// Read a single line, returning whatever bytes accumulate up to a
    /// newline or the transport timeout. No terminator logic applies.
    pub fn readline(&mut self) -> PromptComResult<Vec<u8>> {
        let transport = self.transport_mut()?;

        let mut line = Vec::new();
        loop {
            match transport.read_byte()? {
                Some(byte) => {
                    line.push(byte);
                    if byte == b'\n' {
                        break;
                    }
                }
                None => break,
            }
        }
        Ok(line)
    }

    /// Scan for any of `terminators`, for callers with their own
    /// framing. `exec_command` uses the configured prompt; this accepts
    /// N candidates.
    pub fn read_until<'t>(
        &mut self,
        terminators: &[&'t [u8]],
    ) -> PromptComResult<(&'t [u8], Vec<u8>)> {
        let transport = self.transport_mut()?;
        read_until(transport, terminators)
    }

    fn transport_mut(&mut self) -> PromptComResult<&mut (dyn Transport + 'static)> {
        self.transport
            .as_deref_mut()
            .ok_or(PromptComError::ChannelClosed)
    }
}

/// Strip the command echo and the trailing prompt from a raw response.
fn strip_framing(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let lines: Vec<&str> = text.split(LINE_SEPARATOR).collect();
    if lines.len() < 3 {
        return String::new();
    }
    lines[1..lines.len() - 1].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Transport that releases one scripted burst of bytes per write,
    /// mimicking a device that answers each line it receives.
    struct FakeDevice {
        bursts: VecDeque<Vec<u8>>,
        pending: VecDeque<u8>,
    }

    impl FakeDevice {
        fn new(bursts: Vec<Vec<u8>>) -> Self {
            Self {
                bursts: bursts.into(),
                pending: VecDeque::new(),
            }
        }
    }

    impl Transport for FakeDevice {
        fn read_byte(&mut self) -> PromptComResult<Option<u8>> {
            Ok(self.pending.pop_front())
        }

        fn read_chunk(&mut self, buf: &mut [u8]) -> PromptComResult<usize> {
            let mut n = 0;
            while n < buf.len() {
                match self.pending.pop_front() {
                    Some(byte) => {
                        buf[n] = byte;
                        n += 1;
                    }
                    None => break,
                }
            }
            Ok(n)
        }

        fn write_all(&mut self, _data: &[u8]) -> PromptComResult<()> {
            if let Some(burst) = self.bursts.pop_front() {
                self.pending.extend(burst);
            }
            Ok(())
        }

        fn describe(&self) -> String {
            "fake-device".to_string()
        }
    }

    fn test_connection() -> ConnectionConfig {
        ConnectionConfig::Serial {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115200,
            data_bits: 8,
            stop_bits: 1,
            parity: crate::domain::config::ParityConfig::None,
            flow_control: crate::domain::config::FlowControlConfig::None,
            timeout_ms: 100,
        }
    }

    fn open_channel(prompt: &[u8], bursts: Vec<Vec<u8>>) -> CommandChannel {
        let options = ChannelOptions::new(prompt).settle_delay(Duration::ZERO);
        let mut channel = CommandChannel::new(test_connection(), options);
        channel
            .attach(Box::new(FakeDevice::new(bursts)))
            .expect("attach failed");
        channel
    }

    #[test]
    fn exec_command_returns_stdout_only() {
        let mut channel = open_channel(
            b"> ",
            vec![
                Vec::new(), // priming: nothing comes back
                b"echo hi\r\nhi\r\n> ".to_vec(),
            ],
        );

        let output = channel.exec_command("echo hi").unwrap();
        assert_eq!(output, "hi");
    }

    #[test]
    fn exec_command_strips_echo_and_prompt() {
        let mut channel = open_channel(
            b"$ ",
            vec![Vec::new(), b"ls\r\nfile1\r\nfile2\r\n$ ".to_vec()],
        );

        let output = channel.exec_command("ls").unwrap();
        assert_eq!(output, "file1\nfile2");
    }

    #[test]
    fn exec_command_times_out_without_prompt() {
        let mut channel = open_channel(
            b"> ",
            vec![Vec::new(), b"echo hi\r\nhi\r\n".to_vec()],
        );

        let result = channel.exec_command("echo hi");
        assert!(matches!(result, Err(PromptComError::Timeout)));
    }

    #[test]
    fn text_and_byte_commands_are_equivalent() {
        let response = b"echo hi\r\nhi\r\n> ".to_vec();
        let mut text_channel = open_channel(b"> ", vec![Vec::new(), response.clone()]);
        let mut byte_channel = open_channel(b"> ", vec![Vec::new(), response]);

        let from_text = text_channel.exec_command("echo hi").unwrap();
        let from_bytes = byte_channel.exec_command(b"echo hi".as_slice()).unwrap();
        assert_eq!(from_text, from_bytes);
    }

    #[test]
    fn exec_before_open_fails_fast() {
        let options = ChannelOptions::new(b"> ".as_slice());
        let mut channel = CommandChannel::new(test_connection(), options);

        let result = channel.exec_command("echo hi");
        assert!(matches!(result, Err(PromptComError::ChannelClosed)));
    }

    #[test]
    fn exec_after_close_fails_fast() {
        let mut channel = open_channel(b"> ", vec![Vec::new()]);

        channel.close().unwrap();
        let result = channel.exec_command("echo hi");
        assert!(matches!(result, Err(PromptComError::ChannelClosed)));
    }

    #[test]
    fn double_close_fails_fast() {
        let mut channel = open_channel(b"> ", vec![Vec::new()]);

        channel.close().unwrap();
        assert!(matches!(
            channel.close(),
            Err(PromptComError::ChannelClosed)
        ));
    }

    #[test]
    fn double_open_fails_fast() {
        let mut channel = open_channel(b"> ", vec![Vec::new()]);

        let result = channel.attach(Box::new(FakeDevice::new(Vec::new())));
        assert!(matches!(result, Err(PromptComError::ChannelAlreadyOpen)));
        assert!(channel.is_open());
    }

    #[test]
    fn priming_sends_two_line_terminators() {
        let options = ChannelOptions::new(b"> ".as_slice()).settle_delay(Duration::ZERO);
        let mut channel = CommandChannel::new(test_connection(), options);
        let device = FakeDevice::new(vec![b"\r\n\r\n> ".to_vec()]);
        channel.attach(Box::new(device)).unwrap();

        assert!(channel.is_open());
    }

    #[test]
    fn putc_appends_line_terminator() {
        let mut channel = open_channel(b"> ", vec![Vec::new()]);

        let written = channel.putc("reboot").unwrap();
        assert_eq!(written, "reboot\n".len());
    }

    #[test]
    fn getc_returns_none_on_empty_read() {
        let mut channel = open_channel(b"> ", vec![Vec::new()]);

        assert!(channel.getc(16).unwrap().is_none());
    }

    #[test]
    fn getc_returns_available_bytes() {
        let mut channel = open_channel(b"> ", vec![Vec::new(), b"hello".to_vec()]);

        // Raw write releases the next scripted burst.
        channel.putc("boot").unwrap();
        let data = channel.getc(3).unwrap();
        assert_eq!(data, Some(b"hel".to_vec()));
    }

    #[test]
    fn readline_stops_at_newline() {
        let mut channel = open_channel(
            b"> ",
            vec![Vec::new(), b"first\r\nsecond\r\n".to_vec()],
        );

        channel.putc("cat file").unwrap();
        let line = channel.readline().unwrap();
        assert_eq!(line, b"first\r\n".to_vec());
    }

    #[test]
    fn readline_returns_partial_line_on_starvation() {
        let mut channel = open_channel(b"> ", vec![Vec::new(), b"partial".to_vec()]);

        channel.putc("cat file").unwrap();
        let line = channel.readline().unwrap();
        assert_eq!(line, b"partial".to_vec());
    }

    #[test]
    fn strip_framing_drops_echo_and_prompt() {
        assert_eq!(strip_framing(b"ls\r\nfile1\r\nfile2\r\n$ "), "file1\nfile2");
    }

    #[test]
    fn strip_framing_of_empty_output_is_empty() {
        assert_eq!(strip_framing(b"cd /test\r\n$ "), "");
        assert_eq!(strip_framing(b"$ "), "");
        assert_eq!(strip_framing(b""), "");
    }
}
