use std::io::{Read, Write};

/// A full-duplex byte channel that can be split between a reading and a
/// writing unit of execution.
///
/// The writer keeps the original handle and the reader works on a clone.
/// Each side only ever touches its own direction, so no further
/// synchronization is needed between them.
pub trait ByteChannel: Read + Write + Send + Sized + 'static {
    /// Duplicate the handle (a new file descriptor on Unix).
    fn try_clone_channel(&self) -> std::io::Result<Self>;

    /// Release this handle's write side and report any error from doing so.
    fn close_write(self) -> std::io::Result<()>;

    /// Short description for diagnostics.
    fn describe(&self) -> String;
}

#[cfg(unix)]
impl ByteChannel for std::os::unix::net::UnixStream {
    fn try_clone_channel(&self) -> std::io::Result<Self> {
        self.try_clone()
    }

    fn close_write(self) -> std::io::Result<()> {
        self.shutdown(std::net::Shutdown::Write)
    }

    fn describe(&self) -> String {
        "unix-stream".to_string()
    }
}
