// Serial port abstraction with async support
// Wraps the serialport crate with tokio async functionality

use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

#[derive(Error, Debug)]
pub enum SerialError {
    #[error("Serial port error: {0}")]
    Port(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Port not open")]
    NotOpen,
}

pub type Result<T> = std::result::Result<T, SerialError>;

/// Serial port configuration. The radio talks 115200 8N1 with no flow
/// control; block reads can stall while the firmware fetches from SPI
/// flash, so the read timeout is much longer than the write timeout.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: serialport::DataBits,
    pub stop_bits: serialport::StopBits,
    pub parity: serialport::Parity,
    pub flow_control: serialport::FlowControl,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            data_bits: serialport::DataBits::Eight,
            stop_bits: serialport::StopBits::One,
            parity: serialport::Parity::None,
            flow_control: serialport::FlowControl::None,
            read_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(2),
        }
    }
}

impl SerialConfig {
    pub fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Default::default()
        }
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

/// The byte-stream operations the protocol engine needs from a transport.
///
/// `SerialPort` implements this over real hardware; `MockSerialPort` over
/// in-memory queues for tests.
pub trait SerialLink {
    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;
    async fn write_all(&mut self, buf: &[u8]) -> Result<()>;
    async fn flush(&mut self) -> Result<()>;
}

/// Async serial port wrapper
pub struct SerialPort {
    port: Option<Box<dyn serialport::SerialPort>>,
    config: SerialConfig,
    port_name: String,
}

impl SerialPort {
    /// Open a serial port with the given configuration
    pub fn open(port_name: &str, config: SerialConfig) -> Result<Self> {
        let mut port = serialport::new(port_name, config.baud_rate)
            .data_bits(config.data_bits)
            .stop_bits(config.stop_bits)
            .parity(config.parity)
            .flow_control(config.flow_control)
            .timeout(Duration::from_millis(100))
            .open()
            .map_err(|e| SerialError::Port(e.to_string()))?;

        // Some USB cables gate power on these lines
        let _ = port.write_data_terminal_ready(true);
        let _ = port.write_request_to_send(true);

        Ok(Self {
            port: Some(port),
            config,
            port_name: port_name.to_string(),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// Clear any stale bytes from the input buffer
    pub fn clear_input(&mut self) -> Result<()> {
        let port = self.port.as_mut().ok_or(SerialError::NotOpen)?;
        port.clear(serialport::ClearBuffer::Input)
            .map_err(|e| SerialError::Port(e.to_string()))
    }

    /// Close the port
    pub fn close(mut self) -> Result<()> {
        self.port.take();
        Ok(())
    }
}

impl SerialLink for SerialPort {
    /// Read exactly `buf.len()` bytes within the read timeout
    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let read_timeout = self.config.read_timeout;
        let port = self.port.as_mut().ok_or(SerialError::NotOpen)?;

        timeout(read_timeout, async {
            let mut total_read = 0;
            while total_read < buf.len() {
                match port.read(&mut buf[total_read..]) {
                    Ok(0) => {
                        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "Port closed"))
                    }
                    Ok(n) => total_read += n,
                    Err(ref e) if e.kind() == io::ErrorKind::TimedOut => {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(())
        })
        .await
        .map_err(|_| SerialError::Timeout(read_timeout))?
        .map_err(SerialError::Io)
    }

    /// Write all bytes within the write timeout
    async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let write_timeout = self.config.write_timeout;
        let port = self.port.as_mut().ok_or(SerialError::NotOpen)?;

        timeout(write_timeout, async {
            port.write_all(buf).map_err(SerialError::Io)
        })
        .await
        .map_err(|_| SerialError::Timeout(write_timeout))?
    }

    async fn flush(&mut self) -> Result<()> {
        let port = self.port.as_mut().ok_or(SerialError::NotOpen)?;
        port.flush().map_err(SerialError::Io)
    }
}

/// List available serial ports
pub fn list_ports() -> Result<Vec<String>> {
    serialport::available_ports()
        .map_err(|e| SerialError::Port(e.to_string()))?
        .into_iter()
        .map(|p| Ok(p.port_name))
        .collect()
}
