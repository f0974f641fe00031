use std::fmt;

/// Error that may occur while delivering a fix to the collector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UplinkError {
    InvalidEndpoint(String),
    Request(String),
    Timeout,
    RejectedStatus { status: u16 },
}

impl fmt::Display for UplinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UplinkError::InvalidEndpoint(url) => write!(f, "Invalid collector endpoint {}", url),
            UplinkError::Request(reason) => write!(f, "Upload request failed: {}", reason),
            UplinkError::Timeout => f.write_str("Upload request timed out"),
            UplinkError::RejectedStatus { status } => {
                write!(f, "Collector rejected upload with status {}", status)
            },
        }
    }
}

impl std::error::Error for UplinkError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeError {
    InvalidDate,
    InvalidTime,
}

impl fmt::Display for DateTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTimeError::InvalidDate => f.write_str("invalid date"),
            DateTimeError::InvalidTime => f.write_str("invalid time"),
        }
    }
}

impl std::error::Error for DateTimeError {}
