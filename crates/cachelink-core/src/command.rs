//! Byte-level command and reply model handed to a connector.
//!
//! Keys and values are already serialized when they reach this layer; the
//! connector never sees application types.

use crate::BackendError;

/// A single store command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `GET key`
    Get(Vec<u8>),
    /// `SET key value`
    Set(Vec<u8>, Vec<u8>),
    /// `DEL key`
    Del(Vec<u8>),
}

impl Command {
    /// Returns the command name as sent on the wire.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Get(_) => "GET",
            Self::Set(..) => "SET",
            Self::Del(_) => "DEL",
        }
    }

    /// Returns the serialized key the command targets.
    #[must_use]
    pub fn key(&self) -> &[u8] {
        match self {
            Self::Get(key) | Self::Set(key, _) | Self::Del(key) => key,
        }
    }
}

/// A reply from the store, reduced to the shapes the commands above produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Nil,
    Data(Vec<u8>),
    Integer(i64),
    Status(String),
}

impl Reply {
    /// Interprets a `GET` reply: bytes for a hit, `None` for a miss.
    pub fn into_data(self) -> Result<Option<Vec<u8>>, BackendError> {
        match self {
            Self::Data(bytes) => Ok(Some(bytes)),
            Self::Nil => Ok(None),
            other => Err(BackendError::UnexpectedReply(format!(
                "expected bulk data or nil, got {:?}",
                other
            ))),
        }
    }

    /// Interprets an integer reply such as the count returned by `DEL`.
    pub fn into_integer(self) -> Result<i64, BackendError> {
        match self {
            Self::Integer(n) => Ok(n),
            other => Err(BackendError::UnexpectedReply(format!(
                "expected integer, got {:?}",
                other
            ))),
        }
    }

    /// Interprets a status reply such as the `OK` returned by `SET`.
    pub fn into_ok(self) -> Result<(), BackendError> {
        match self {
            Self::Status(ref status) if status.eq_ignore_ascii_case("OK") => Ok(()),
            other => Err(BackendError::UnexpectedReply(format!(
                "expected OK, got {:?}",
                other
            ))),
        }
    }
}

/// One page of a cursor-based key scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next call; `0` means the iteration is complete.
    pub cursor: u64,
    /// Raw keys returned in this page.
    pub keys: Vec<Vec<u8>>,
}

impl ScanPage {
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.cursor == 0
    }
}
