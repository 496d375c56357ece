//! Error types for the HID class driver.
//!
//! Pending work is never an error: it is reported as
//! [`crate::Progress::Pending`]. Everything in [`HidClassError`] is final for
//! the step that returned it.

use std::fmt;

use usbh_hid_descriptor::DescriptorError;
use usbh_hid_fifo::FifoError;

use crate::config::DeviceMode;
use crate::role::HidRole;

/// Failure kinds surfaced by the host transport for pipe and transfer calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum TransportError {
    /// No free host channel for a new pipe
    #[error("no free pipe available")]
    NoFreePipe,
    /// The channel or request queue is busy
    #[error("transport busy")]
    Busy,
    /// The device is no longer attached
    #[error("device not connected")]
    NotConnected,
    /// Any other low-level failure
    #[error("transport failure")]
    Failed,
}

/// Errors returned by the HID class driver.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HidClassError {
    /// Interface search found nothing suitable.
    #[error("no HID interface found for {mode} mode")]
    InterfaceNotFound {
        /// Device mode the search was run for
        mode: DeviceMode,
    },

    /// Selected interface index is beyond the platform limit.
    #[error("interface index {index} out of range (max {max})")]
    InterfaceOutOfRange {
        /// Requested interface index
        index: u8,
        /// Platform interface limit
        max: u8,
    },

    /// The configuration has no interface at the requested index.
    #[error("configuration has no interface at index {index}")]
    InterfaceMissing {
        /// Requested interface index
        index: u8,
    },

    /// The host refused to activate the interface.
    #[error("failed to select interface {index}: {source}")]
    SelectInterface {
        /// Interface index
        index: u8,
        /// Transport failure
        source: TransportError,
    },

    /// The interface has no interrupt IN endpoint.
    #[error("interface {interface} has no IN endpoint")]
    MissingInEndpoint {
        /// Interface index
        interface: u8,
    },

    /// Pipe allocation failed.
    #[error("failed to allocate pipe for endpoint {endpoint:#04x}: {source}")]
    PipeAlloc {
        /// Endpoint address
        endpoint: u8,
        /// Transport failure
        source: TransportError,
    },

    /// Pipe open failed.
    #[error("failed to open pipe for endpoint {endpoint:#04x}: {source}")]
    PipeOpen {
        /// Endpoint address
        endpoint: u8,
        /// Transport failure
        source: TransportError,
    },

    /// The device rejected GET_DESCRIPTOR(report).
    #[error("device does not support the report descriptor request")]
    ReportDescriptorNotSupported,

    /// The device rejected SET_PROTOCOL.
    #[error("device does not support SET_PROTOCOL")]
    SetProtocolNotSupported,

    /// The legacy GET_REPORT fetch failed at the transport level.
    #[error("initial GET_REPORT failed")]
    GetReportFailed,

    /// The role-specific initializer failed.
    #[error("{role} initialization failed: {reason}")]
    RoleInitFailed {
        /// Role being initialized
        role: HidRole,
        /// Failure reason
        reason: &'static str,
    },

    /// A configuration value is unusable.
    #[error("invalid configuration: {field}: {reason}")]
    InvalidConfig {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Strict descriptor parsing failed.
    #[error("descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    /// Report buffer construction failed.
    #[error("report buffer error: {0}")]
    Fifo(#[from] FifoError),
}

impl HidClassError {
    /// Create an invalid-configuration error.
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InterfaceNotFound { .. } => ErrorSeverity::Error,
            Self::InterfaceOutOfRange { .. } => ErrorSeverity::Error,
            Self::InterfaceMissing { .. } => ErrorSeverity::Error,
            Self::SelectInterface { .. } => ErrorSeverity::Error,
            Self::MissingInEndpoint { .. } => ErrorSeverity::Error,
            Self::PipeAlloc { .. } => ErrorSeverity::Critical,
            Self::PipeOpen { .. } => ErrorSeverity::Critical,
            Self::ReportDescriptorNotSupported => ErrorSeverity::Error,
            Self::SetProtocolNotSupported => ErrorSeverity::Error,
            Self::GetReportFailed => ErrorSeverity::Error,
            Self::RoleInitFailed { .. } => ErrorSeverity::Error,
            Self::InvalidConfig { .. } => ErrorSeverity::Error,
            Self::Descriptor(_) => ErrorSeverity::Error,
            Self::Fifo(_) => ErrorSeverity::Error,
        }
    }

    /// `true` when the bound class instance cannot continue and must be torn
    /// down by the host core.
    pub fn is_fatal(&self) -> bool {
        self.severity() >= ErrorSeverity::Error
    }

    /// `true` for errors raised while binding, before a handle exists.
    pub fn is_bind_error(&self) -> bool {
        matches!(
            self,
            Self::InterfaceNotFound { .. }
                | Self::InterfaceOutOfRange { .. }
                | Self::InterfaceMissing { .. }
                | Self::SelectInterface { .. }
                | Self::MissingInEndpoint { .. }
                | Self::PipeAlloc { .. }
                | Self::PipeOpen { .. }
        )
    }
}

/// Result alias for the HID class driver.
pub type HidClassResult<T> = Result<T, HidClassError>;

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Operation failed, the class instance must be torn down
    Error = 0,
    /// Host resources may be in an inconsistent state
    Critical = 1,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
