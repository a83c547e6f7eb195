//! Cellular modem shim.

use std::fmt;
use std::net::IpAddr;

use crate::core::errors::Result;
use crate::engine::emulator::Emulator;
use crate::engine::value::{FromValue, Value};

/// Network registration state reported by the modem.
///
/// Stored in the engine as its numeric code so scenario files can use
/// `{ int = 1 }` for a home registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegStatus {
    #[default]
    NoResult,
    Unregistered,
    Home,
    Searching,
    Denied,
    Unknown,
    Roaming,
}

impl RegStatus {
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::NoResult => -1,
            Self::Unregistered => 0,
            Self::Home => 1,
            Self::Searching => 2,
            Self::Denied => 3,
            Self::Unknown => 4,
            Self::Roaming => 5,
        }
    }

    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            -1 => Some(Self::NoResult),
            0 => Some(Self::Unregistered),
            1 => Some(Self::Home),
            2 => Some(Self::Searching),
            3 => Some(Self::Denied),
            4 => Some(Self::Unknown),
            5 => Some(Self::Roaming),
            _ => None,
        }
    }

    /// Registered on a network, home or roaming.
    #[must_use]
    pub const fn is_registered(self) -> bool {
        matches!(self, Self::Home | Self::Roaming)
    }
}

impl fmt::Display for RegStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NoResult => "no result",
            Self::Unregistered => "unregistered",
            Self::Home => "home",
            Self::Searching => "searching",
            Self::Denied => "denied",
            Self::Unknown => "unknown",
            Self::Roaming => "roaming",
        };
        f.write_str(label)
    }
}

impl FromValue for RegStatus {
    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(Self::from_code)
    }
}

impl From<RegStatus> for Value {
    fn from(status: RegStatus) -> Self {
        Self::Int(status.code())
    }
}

/// GSM/LTE modem driver.
#[derive(Debug, Default)]
pub struct MockModem {
    emulator: Emulator,
}

super::impl_emulated!(MockModem, emulator);

impl MockModem {
    #[must_use]
    pub fn new(emulator: Emulator) -> Self {
        Self { emulator }
    }

    #[track_caller]
    pub fn init(&mut self) -> Result<bool> {
        self.emulator.invoke("init")
    }

    #[track_caller]
    pub fn registration_status(&mut self) -> Result<RegStatus> {
        self.emulator.invoke("getRegistrationStatus")
    }

    #[track_caller]
    pub fn wait_for_network(&mut self, _timeout_ms: u32, _check_signal: bool) -> Result<bool> {
        self.emulator.invoke("waitForNetwork")
    }

    #[track_caller]
    pub fn gprs_connect(&mut self, _apn: &str, _user: &str, _password: &str) -> Result<bool> {
        self.emulator.invoke("gprsConnect")
    }

    #[track_caller]
    pub fn is_gprs_connected(&mut self) -> Result<bool> {
        self.emulator.invoke("isGprsConnected")
    }

    #[track_caller]
    pub fn sim_ccid(&mut self) -> Result<String> {
        self.emulator.invoke("getSimCCID")
    }

    #[track_caller]
    pub fn imei(&mut self) -> Result<String> {
        self.emulator.invoke("getIMEI")
    }

    #[track_caller]
    pub fn operator(&mut self) -> Result<String> {
        self.emulator.invoke("getOperator")
    }

    #[track_caller]
    pub fn local_ip(&mut self) -> Result<IpAddr> {
        self.emulator.invoke("localIP")
    }

    /// Signal quality in the modem's CSQ scale (`99` means unknown).
    #[track_caller]
    pub fn signal_quality(&mut self) -> Result<i16> {
        self.emulator.invoke("getSignalQuality")
    }

    #[track_caller]
    pub fn modem_name(&mut self) -> Result<String> {
        self.emulator.invoke("getModemName")
    }

    #[track_caller]
    pub fn modem_info(&mut self) -> Result<String> {
        self.emulator.invoke("getModemInfo")
    }

    #[track_caller]
    pub fn is_network_connected(&mut self) -> Result<bool> {
        self.emulator.invoke("isNetworkConnected")
    }
}
