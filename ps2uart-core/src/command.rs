//! Host-to-bridge commands: vibration bytes and the AT line protocol.

use core::fmt;

use log::{debug, warn};
use ps2uart_proto::{
    parse_baud_reply, strip_line_ending, AtCommand, BaudRate, CommandTooLong, Vibrate,
    DISCONNECT_BYTE,
};

use crate::controller::Ps2Uart;
use crate::transport::{Clock, Transport, TransportError};

/// Scratch size for replies whose content is discarded.
const ACK_BUFFER_LEN: usize = 128;

/// Scratch size for the baud query reply.
const BAUD_REPLY_LEN: usize = 32;

/// Error type for commands sent to the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// The controller was built without a transport.
    NoTransport,
    /// Writing or flushing failed.
    Transport(TransportError),
    /// No complete reply line within the timeout.
    Timeout,
    /// The bridge does not implement this rate. Nothing was sent.
    UnsupportedBaud(u32),
    /// Reply buffers need room for at least one byte and the terminator.
    BufferTooSmall,
    /// Command text does not fit in one encoded line.
    CommandTooLong,
    /// A reply arrived but could not be interpreted.
    InvalidResponse,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTransport => write!(f, "no transport attached"),
            Self::Transport(e) => write!(f, "transport error: {}", e),
            Self::Timeout => write!(f, "timed out waiting for reply"),
            Self::UnsupportedBaud(baud) => write!(f, "unsupported baud rate {}", baud),
            Self::BufferTooSmall => write!(f, "reply buffer too small"),
            Self::CommandTooLong => write!(f, "command too long"),
            Self::InvalidResponse => write!(f, "invalid reply"),
        }
    }
}

impl From<TransportError> for CommandError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<CommandTooLong> for CommandError {
    fn from(_: CommandTooLong) -> Self {
        Self::CommandTooLong
    }
}

impl<T: Transport, C: Clock> Ps2Uart<T, C> {
    /// Ask the bridge to drive the pad's vibration motors.
    pub fn send_vibrate(&mut self, cmd: Vibrate) -> Result<(), CommandError> {
        let transport = self.prepare_link()?;
        transport.write(cmd.as_byte())?;
        transport.flush()?;
        Ok(())
    }

    /// Send one command line. CR LF is appended.
    pub fn send_command(&mut self, cmd: &str) -> Result<(), CommandError> {
        self.transmit(AtCommand::Raw(cmd))
    }

    /// `AT+RST`
    pub fn send_reset(&mut self) -> Result<(), CommandError> {
        self.transmit(AtCommand::Reset)
    }

    /// Switch the bridge's link rate.
    ///
    /// Only 9600 and 115200 are accepted; anything else fails before a byte
    /// is written. The local transport keeps its rate: call
    /// [`begin_with`](Self::begin_with) once the bridge has switched.
    pub fn set_baud(&mut self, baud: u32) -> Result<(), CommandError> {
        let Some(rate) = BaudRate::from_bps(baud) else {
            warn!("refusing unsupported baud rate {}", baud);
            return Err(CommandError::UnsupportedBaud(baud));
        };
        self.transmit(AtCommand::SetBaud(rate))
    }

    /// Send `cmd` and wait up to `timeout_ms` for one reply line.
    ///
    /// The reply is stored in `buf` with trailing CR/LF removed and a NUL
    /// written after it. Lines longer than the buffer are truncated but still
    /// read up to their `\n`. Disconnect sentinels mixed into the reply are
    /// skipped. Returns the stored length.
    pub fn command_with_response(
        &mut self,
        cmd: &str,
        buf: &mut [u8],
        timeout_ms: u32,
    ) -> Result<usize, CommandError> {
        self.exchange(AtCommand::Raw(cmd), buf, timeout_ms)
    }

    /// Send `cmd` and wait for any reply line, discarding its content.
    pub fn command_acknowledged(&mut self, cmd: &str, timeout_ms: u32) -> Result<(), CommandError> {
        let mut scratch = [0u8; ACK_BUFFER_LEN];
        self.exchange(AtCommand::Raw(cmd), &mut scratch, timeout_ms)?;
        Ok(())
    }

    /// `AT+BAUD?`: the bridge's current link rate.
    pub fn query_baud(&mut self, timeout_ms: u32) -> Result<u32, CommandError> {
        let mut reply = [0u8; BAUD_REPLY_LEN];
        let len = self.exchange(AtCommand::QueryBaud, &mut reply, timeout_ms)?;
        parse_baud_reply(&reply[..len]).ok_or(CommandError::InvalidResponse)
    }

    /// [`query_baud`](Self::query_baud) with the configured reply timeout.
    pub fn query_baud_default(&mut self) -> Result<u32, CommandError> {
        self.query_baud(self.config.response_timeout_ms)
    }

    fn exchange(
        &mut self,
        cmd: AtCommand<'_>,
        buf: &mut [u8],
        timeout_ms: u32,
    ) -> Result<usize, CommandError> {
        if buf.len() < 2 {
            return Err(CommandError::BufferTooSmall);
        }
        self.transmit(cmd)?;

        let transport = self.transport.as_mut().ok_or(CommandError::NoTransport)?;
        let capacity = buf.len() - 1;
        let mut len = 0;
        let start = self.clock.now_ms();

        while self.clock.now_ms().wrapping_sub(start) < timeout_ms {
            while let Some(byte) = transport.read() {
                if byte == DISCONNECT_BYTE {
                    continue;
                }
                if len < capacity {
                    buf[len] = byte;
                    len += 1;
                }
                if byte == b'\n' {
                    let line = strip_line_ending(&buf[..len]).len();
                    buf[line] = 0;
                    return Ok(line);
                }
            }
        }

        buf[len] = 0;
        warn!("no reply to {} within {} ms", cmd, timeout_ms);
        Err(CommandError::Timeout)
    }

    fn transmit(&mut self, cmd: AtCommand<'_>) -> Result<(), CommandError> {
        let line = cmd.encode()?;
        let transport = self.prepare_link()?;
        transport.write_all(line.as_bytes())?;
        transport.flush()?;
        debug!("sent {}", cmd);
        Ok(())
    }

    /// Discard pending input so a reply is not confused with pad frames.
    fn prepare_link(&mut self) -> Result<&mut T, CommandError> {
        let transport = self.transport.as_mut().ok_or(CommandError::NoTransport)?;
        let dropped = transport.drain();
        if dropped > 0 {
            debug!("drained {} bytes before command", dropped);
        }
        self.framer.abort_partial();
        Ok(transport)
    }
}
