//! Configuration requests accepted by the VPC service
use vpc_services::vpc::Command;

use crate::Error;

/// Request key as named by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    /// Battery conservation mode
    Conservation,
    /// Fn-lock
    Fnlock,
    /// Clamshell mode
    Clamshell,
    /// Raw EC read
    ReadEc,
    /// Raw EC write
    WriteEc,
    /// Refresh all published state
    Update,
}

impl Key {
    /// Name used by the host
    pub const fn name(&self) -> &'static str {
        match self {
            Key::Conservation => "ConservationMode",
            Key::Fnlock => "FnlockMode",
            Key::Clamshell => "ClamshellMode",
            Key::ReadEc => "ReadEC",
            Key::WriteEc => "WriteEC",
            Key::Update => "Update",
        }
    }

    /// Look up a key by its host name
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Key::Conservation,
            Key::Fnlock,
            Key::Clamshell,
            Key::ReadEc,
            Key::WriteEc,
            Key::Update,
        ]
        .into_iter()
        .find(|key| key.name() == name)
    }
}

/// Typed value attached to a request key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Value {
    /// No value
    None,
    /// Boolean
    Bool(bool),
    /// Integer
    U32(u32),
    /// Pair of integers
    Pair(u32, u32),
}

/// Validated request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request {
    /// Enable or disable battery conservation mode
    Conservation(bool),
    /// Enable or disable fn-lock
    Fnlock(bool),
    /// Enable or disable clamshell mode
    Clamshell(bool),
    /// Read an EC register
    ReadEc(Command),
    /// Write an EC register
    WriteEc {
        /// Command code
        command: Command,
        /// Value written with the command
        value: u32,
    },
    /// Refresh all published state
    RefreshAll,
}

impl Request {
    /// Key this request was made under
    pub fn key(&self) -> Key {
        match self {
            Request::Conservation(_) => Key::Conservation,
            Request::Fnlock(_) => Key::Fnlock,
            Request::Clamshell(_) => Key::Clamshell,
            Request::ReadEc(_) => Key::ReadEc,
            Request::WriteEc { .. } => Key::WriteEc,
            Request::RefreshAll => Key::Update,
        }
    }

    /// Build a request from a key and the value supplied with it
    pub fn new(key: Key, value: Value) -> Result<Self, Error> {
        match (key, value) {
            (Key::Conservation, Value::Bool(enabled)) => Ok(Request::Conservation(enabled)),
            (Key::Fnlock, Value::Bool(enabled)) => Ok(Request::Fnlock(enabled)),
            (Key::Clamshell, Value::Bool(enabled)) => Ok(Request::Clamshell(enabled)),
            (Key::ReadEc, Value::U32(command)) => Ok(Request::ReadEc(command.into())),
            (Key::WriteEc, Value::Pair(command, value)) => Ok(Request::WriteEc {
                command: command.into(),
                value,
            }),
            // The value of an update request is ignored
            (Key::Update, _) => Ok(Request::RefreshAll),
            (key, _) => Err(Error::InvalidRequestValue(key)),
        }
    }

    /// Parse a request from the host's key name
    pub fn parse(name: &str, value: Value) -> Result<Self, Error> {
        let key = Key::from_name(name).ok_or(Error::UnknownRequestKey)?;
        Self::new(key, value)
    }
}
