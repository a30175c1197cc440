use std::path::PathBuf;

/// Device used when none is given.
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// Line speed used when none is given.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Read timeout in deciseconds (`VTIME`).
pub const DEFAULT_READ_TIMEOUT_DS: u8 = 10;

/// Character size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    #[default]
    Eight,
}

/// Number of stop bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopBits {
    One,
    #[default]
    Two,
}

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

/// Line discipline for a serial device.
///
/// Applied as a whole before any read or write; a failure to commit any part
/// of it aborts the open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device node, e.g. `/dev/ttyUSB0`.
    pub path: PathBuf,
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    /// XON/XOFF flow control.
    pub software_flow_control: bool,
    /// RTS/CTS flow control.
    pub hardware_flow_control: bool,
    /// `VTIME`: a read returns after this many tenths of a second without data.
    pub read_timeout_ds: u8,
    /// `VMIN`: minimum bytes a read waits for.
    pub min_read_bytes: u8,
}

impl SerialConfig {
    /// Default line discipline for the given device.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Override the line speed.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Worst-case time a single read may block.
    pub fn read_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(u64::from(self.read_timeout_ds) * 100)
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DEVICE),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::default(),
            stop_bits: StopBits::default(),
            parity: Parity::default(),
            software_flow_control: false,
            hardware_flow_control: false,
            read_timeout_ds: DEFAULT_READ_TIMEOUT_DS,
            min_read_bytes: 0,
        }
    }
}
