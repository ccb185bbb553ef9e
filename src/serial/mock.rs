// Mock serial port for testing without hardware

use super::comm::{Result, SerialConfig, SerialError, SerialLink};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Mock serial port for testing
#[derive(Clone)]
pub struct MockSerialPort {
    /// Data to be read (simulates radio responses)
    read_buffer: Arc<Mutex<VecDeque<u8>>>,

    /// Data that was written (simulates commands sent to radio)
    write_buffer: Arc<Mutex<Vec<u8>>>,

    config: SerialConfig,
}

impl MockSerialPort {
    pub fn new() -> Self {
        Self {
            read_buffer: Arc::new(Mutex::new(VecDeque::new())),
            write_buffer: Arc::new(Mutex::new(Vec::new())),
            config: SerialConfig::default(),
        }
    }

    /// Push data to be read (simulates radio sending data)
    pub fn push_read_data(&mut self, data: &[u8]) {
        let mut buffer = self.read_buffer.lock().unwrap();
        for &byte in data {
            buffer.push_back(byte);
        }
    }

    /// Get data that was written (simulates reading commands sent to radio)
    pub fn get_written_data(&self) -> Vec<u8> {
        self.write_buffer.lock().unwrap().clone()
    }

    /// Clear written data
    pub fn clear_written_data(&mut self) {
        self.write_buffer.lock().unwrap().clear();
    }

    /// Check if a specific byte sequence was written
    pub fn was_written(&self, expected: &[u8]) -> bool {
        let buffer = self.write_buffer.lock().unwrap();
        buffer
            .windows(expected.len())
            .any(|window| window == expected)
    }

    /// Get number of bytes available to read
    pub fn bytes_available(&self) -> usize {
        self.read_buffer.lock().unwrap().len()
    }
}

impl SerialLink for MockSerialPort {
    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut buffer = self.read_buffer.lock().unwrap();

        if buffer.len() < buf.len() {
            return Err(SerialError::Timeout(self.config.read_timeout));
        }

        for item in buf.iter_mut() {
            *item = buffer.pop_front().unwrap();
        }

        Ok(())
    }

    async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let mut buffer = self.write_buffer.lock().unwrap();
        buffer.extend_from_slice(buf);
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Default for MockSerialPort {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_serial_basic() {
        let mut port = MockSerialPort::new();

        port.push_read_data(b"Hello");

        let mut buf = [0u8; 5];
        port.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"Hello");

        port.write_all(b"World").await.unwrap();
        assert_eq!(port.get_written_data(), b"World");
    }

    #[tokio::test]
    async fn test_mock_serial_timeout() {
        let mut port = MockSerialPort::new();

        // Try to read when no data available
        let mut buf = [0u8; 5];
        let result = port.read_exact(&mut buf).await;
        assert!(matches!(result, Err(SerialError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_mock_was_written() {
        let mut port = MockSerialPort::new();

        port.write_all(b"COMMAND123").await.unwrap();

        assert!(port.was_written(b"COMMAND"));
        assert!(port.was_written(b"123"));
        assert!(!port.was_written(b"NOTFOUND"));
    }
}
