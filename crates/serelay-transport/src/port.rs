use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::fd::{AsRawFd, IntoRawFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{DataBits, Parity, SerialConfig, StopBits};
use crate::error::{Result, SerialError};
use crate::traits::ByteChannel;

/// An open, configured serial device.
///
/// Reads follow the committed `VMIN`/`VTIME` settings: with the defaults a
/// read returns as soon as any byte arrives, or with zero bytes after one
/// second of silence.
pub struct SerialPort {
    file: File,
    path: PathBuf,
}

impl SerialPort {
    /// Open `config.path` and commit the line discipline described by `config`.
    ///
    /// The device is opened read/write without becoming the controlling
    /// terminal and with synchronous writes. Pending bytes in both directions
    /// are discarded before the port is returned.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let path = config.path.clone();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_SYNC)
            .open(&path)
            .map_err(|source| SerialError::Open {
                path: path.clone(),
                source,
            })?;
        let fd = file.as_raw_fd();

        let mut tty = get_attributes(fd).map_err(|source| SerialError::GetAttributes {
            path: path.clone(),
            source,
        })?;

        apply_line_discipline(&mut tty, config)?;

        // SAFETY: `fd` is an open descriptor owned by `file` and `tty` is a
        // fully initialised termios obtained from tcgetattr.
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &tty) } != 0 {
            return Err(SerialError::SetAttributes {
                path,
                source: std::io::Error::last_os_error(),
            });
        }

        // SAFETY: TIOCEXCL takes no argument and `fd` refers to an open tty.
        if unsafe { libc::ioctl(fd, libc::TIOCEXCL) } != 0 {
            return Err(SerialError::SetAttributes {
                path,
                source: std::io::Error::last_os_error(),
            });
        }

        // SAFETY: `fd` is an open tty descriptor.
        if unsafe { libc::tcflush(fd, libc::TCIOFLUSH) } != 0 {
            return Err(SerialError::Flush {
                path,
                source: std::io::Error::last_os_error(),
            });
        }

        info!(
            ?path,
            baud = config.baud_rate,
            vtime = config.read_timeout_ds,
            vmin = config.min_read_bytes,
            "serial port configured"
        );

        Ok(Self { file, path })
    }

    /// The device node this port was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Query the attributes currently committed on the device.
    pub fn attributes(&self) -> Result<libc::termios> {
        get_attributes(self.file.as_raw_fd()).map_err(|source| SerialError::GetAttributes {
            path: self.path.clone(),
            source,
        })
    }

    /// Duplicate the descriptor. Both handles share the same line discipline.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            file: self.file.try_clone()?,
            path: self.path.clone(),
        })
    }

    /// Close this handle, surfacing any error reported by `close(2)`.
    pub fn close(self) -> std::io::Result<()> {
        let fd = self.file.into_raw_fd();
        // SAFETY: ownership of `fd` was just released by `into_raw_fd`, so it
        // is closed exactly once here.
        if unsafe { libc::close(fd) } != 0 {
            return Err(std::io::Error::last_os_error());
        }
        debug!(path = ?self.path, "serial handle closed");
        Ok(())
    }
}

impl AsRawFd for SerialPort {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl Read for SerialPort {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for SerialPort {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

impl ByteChannel for SerialPort {
    fn try_clone_channel(&self) -> std::io::Result<Self> {
        self.try_clone().map_err(|err| match err {
            SerialError::Io(source) => source,
            other => std::io::Error::other(other.to_string()),
        })
    }

    fn close_write(self) -> std::io::Result<()> {
        self.close()
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

impl std::fmt::Debug for SerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPort")
            .field("path", &self.path)
            .field("fd", &self.file.as_raw_fd())
            .finish()
    }
}

fn get_attributes(fd: RawFd) -> std::io::Result<libc::termios> {
    // SAFETY: termios is plain old data; an all-zero value is a valid
    // placeholder that tcgetattr overwrites.
    let mut tty: libc::termios = unsafe { std::mem::zeroed() };
    // SAFETY: `tty` is a valid writable termios and `fd` is caller-owned.
    if unsafe { libc::tcgetattr(fd, &mut tty) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(tty)
}

fn speed_for(baud_rate: u32) -> Result<libc::speed_t> {
    let speed = match baud_rate {
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19_200 => libc::B19200,
        38_400 => libc::B38400,
        57_600 => libc::B57600,
        115_200 => libc::B115200,
        230_400 => libc::B230400,
        other => return Err(SerialError::UnsupportedBaudRate(other)),
    };
    Ok(speed)
}

/// Rewrite `tty` in place to the raw line discipline described by `config`.
///
/// Output post-processing and all local modes (echo, canonical input,
/// signals) are switched off, break processing is enabled, and the receiver
/// is enabled with modem control lines ignored.
pub fn apply_line_discipline(tty: &mut libc::termios, config: &SerialConfig) -> Result<()> {
    let speed = speed_for(config.baud_rate)?;
    // SAFETY: `tty` is a valid termios and `speed` is a termios speed constant.
    let out_rc = unsafe { libc::cfsetospeed(tty, speed) };
    // SAFETY: as above.
    let in_rc = unsafe { libc::cfsetispeed(tty, speed) };
    if out_rc != 0 || in_rc != 0 {
        return Err(SerialError::UnsupportedBaudRate(config.baud_rate));
    }

    let size = match config.data_bits {
        DataBits::Five => libc::CS5,
        DataBits::Six => libc::CS6,
        DataBits::Seven => libc::CS7,
        DataBits::Eight => libc::CS8,
    };
    tty.c_cflag = (tty.c_cflag & !libc::CSIZE) | size;

    tty.c_iflag &= !libc::IGNBRK;
    tty.c_lflag = 0;
    tty.c_oflag = 0;
    tty.c_cc[libc::VMIN] = config.min_read_bytes;
    tty.c_cc[libc::VTIME] = config.read_timeout_ds;

    tty.c_iflag &= !(libc::IXON | libc::IXOFF | libc::IXANY);
    if config.software_flow_control {
        tty.c_iflag |= libc::IXON | libc::IXOFF;
    }

    tty.c_cflag |= libc::CLOCAL | libc::CREAD;

    tty.c_cflag &= !(libc::PARENB | libc::PARODD);
    match config.parity {
        Parity::None => {}
        Parity::Even => tty.c_cflag |= libc::PARENB,
        Parity::Odd => tty.c_cflag |= libc::PARENB | libc::PARODD,
    }

    match config.stop_bits {
        StopBits::One => tty.c_cflag &= !libc::CSTOPB,
        StopBits::Two => tty.c_cflag |= libc::CSTOPB,
    }

    if config.hardware_flow_control {
        tty.c_cflag |= libc::CRTSCTS;
    } else {
        tty.c_cflag &= !libc::CRTSCTS;
    }

    Ok(())
}
