// Serial transport for the radio's UART protocol

pub mod comm;
pub mod mock;

pub use comm::{list_ports, SerialConfig, SerialError, SerialLink, SerialPort};
pub use mock::MockSerialPort;
