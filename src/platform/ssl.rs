//! TLS client shim.

use std::net::IpAddr;

use crate::core::errors::Result;
use crate::engine::emulator::Emulator;
use crate::platform::fs::fill_from;

/// Stream client over TLS. Connection results are the device's raw status
/// codes: `1` success, `0` or negative failure.
#[derive(Debug, Default)]
pub struct MockSslClient {
    emulator: Emulator,
}

super::impl_emulated!(MockSslClient, emulator);

impl MockSslClient {
    #[must_use]
    pub fn new(emulator: Emulator) -> Self {
        Self { emulator }
    }

    #[track_caller]
    pub fn connect(&mut self, _host: &str, _port: u16) -> Result<i32> {
        self.emulator.invoke("connect")
    }

    #[track_caller]
    pub fn connect_ip(&mut self, _ip: IpAddr, _port: u16) -> Result<i32> {
        self.emulator.invoke("connect")
    }

    #[track_caller]
    pub fn write_byte(&mut self, _byte: u8) -> Result<usize> {
        self.emulator.invoke("write")
    }

    #[track_caller]
    pub fn write(&mut self, _buf: &[u8]) -> Result<usize> {
        self.emulator.invoke("write")
    }

    #[track_caller]
    pub fn available(&mut self) -> Result<i32> {
        self.emulator.invoke("available")
    }

    #[track_caller]
    pub fn read_byte(&mut self) -> Result<i32> {
        self.emulator.invoke("read")
    }

    /// Bulk read; a `bytes` value fills `buf`, an integer is the count.
    #[track_caller]
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let value = self.emulator.invoke_value("read")?;
        fill_from(&value, buf, "read")
    }

    #[track_caller]
    pub fn peek(&mut self) -> Result<i32> {
        self.emulator.invoke("peek")
    }

    pub fn flush(&mut self) {}

    pub fn stop(&mut self) {}

    /// Non-zero while the session is up.
    #[track_caller]
    pub fn connected(&mut self) -> Result<u8> {
        self.emulator.invoke("connected")
    }
}
