//! Unified error type for btnhid.
//!
//! Only startup can fail: the input pipeline and report encoders are
//! total, and runtime drops are absorbed where they happen.
//! We avoid `alloc` - all error variants carry only fixed-size data.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Transport
    /// The radio stack could not be brought up.
    Transport(TransportError),

    // HID
    /// The report map does not describe the report schema.
    ReportMap(ReportMapError),
}

/// Failures while bringing up the BLE transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// GATT server registration failed.
    GattRegister,
}

/// Mismatch between `REPORT_MAP` and `REPORT_SCHEMA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportMapError {
    /// The descriptor has no input report with this id.
    MissingReport(u8),
    /// The descriptor declares a different usage for this id.
    WrongKind(u8),
    /// The descriptor declares a different length (bytes) for this id.
    WrongLength { report_id: u8, declared: u16 },
    /// The descriptor declares a report id the schema does not know.
    UnexpectedReport(u8),
}

// Convenience conversions

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}

impl From<ReportMapError> for Error {
    fn from(e: ReportMapError) -> Self {
        Error::ReportMap(e)
    }
}
