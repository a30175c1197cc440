use std::io::{ErrorKind, Read, Write};

use serelay_transport::StopSignal;
use tracing::debug;

use crate::error::{RelayError, Result};

/// Bytes moved per read in the forwarding variant.
pub const FORWARD_CHUNK_SIZE: usize = 1;

/// Which direction a forwarder pumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// Device to standard output.
    Client,
    /// Standard input to device.
    #[default]
    Server,
}

/// Raw byte pump between the serial device and stdin/stdout.
///
/// No framing and no lifecycle coordination: it copies until its input ends.
#[derive(Debug, Clone)]
pub struct Forwarder {
    chunk_size: usize,
    follow: Option<StopSignal>,
}

impl Default for Forwarder {
    fn default() -> Self {
        Self::new()
    }
}

impl Forwarder {
    pub fn new() -> Self {
        Self {
            chunk_size: FORWARD_CHUNK_SIZE,
            follow: None,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Keep reading through idle device timeouts until `stop` is raised.
    ///
    /// Without this a client ends at the first zero-byte read.
    pub fn follow(mut self, stop: StopSignal) -> Self {
        self.follow = Some(stop);
        self
    }

    /// Copy bytes arriving on `device` to `output`. Returns bytes copied.
    pub fn client<R: Read, W: Write>(
        &self,
        mut device: R,
        device_name: &str,
        mut output: W,
        output_name: &str,
    ) -> Result<u64> {
        let mut buf = vec![0u8; self.chunk_size];
        let mut total = 0u64;
        loop {
            let read = match device.read(&mut buf) {
                Ok(0) if self.keep_following() => continue,
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
                        && self.keep_following() =>
                {
                    continue
                }
                Err(source) => {
                    return Err(RelayError::ChannelRead {
                        name: device_name.to_string(),
                        source,
                    })
                }
            };

            output
                .write_all(&buf[..read])
                .and_then(|()| output.flush())
                .map_err(|source| RelayError::SinkWrite {
                    name: output_name.to_string(),
                    source,
                })?;
            total += read as u64;
        }
        debug!(bytes = total, "client forwarding finished");
        Ok(total)
    }

    /// Copy bytes from `input` to `device` until `input` ends.
    pub fn server<R: Read, W: Write>(
        &self,
        mut input: R,
        input_name: &str,
        mut device: W,
        device_name: &str,
    ) -> Result<u64> {
        let mut buf = vec![0u8; self.chunk_size];
        let mut total = 0u64;
        loop {
            let read = match input.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(RelayError::SourceRead {
                        name: input_name.to_string(),
                        source,
                    })
                }
            };

            let written = device
                .write(&buf[..read])
                .map_err(|source| RelayError::ChannelWrite {
                    name: device_name.to_string(),
                    source,
                })?;
            if written < read {
                return Err(RelayError::ShortWrite {
                    name: device_name.to_string(),
                    written,
                    requested: read,
                });
            }
            total += read as u64;
        }
        debug!(bytes = total, "server forwarding finished");
        Ok(total)
    }

    fn keep_following(&self) -> bool {
        self.follow.as_ref().is_some_and(|stop| !stop.is_raised())
    }
}
