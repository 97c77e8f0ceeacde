//! Constants for Bluetooth Class-of-Device values and connection defaults.
//!
//! The Class-of-Device codes correspond to the Bluetooth baseband assigned
//! numbers as reported by BlueZ for each remote device.

/// Major device class codes (bits 8-12 of the Class-of-Device field).
pub mod major_class {
    pub const IMAGING: u32 = 0x06;

    pub const SHIFT: u32 = 8;
    pub const MASK: u32 = 0x1f;
}

/// Imaging minor-class function bits.
///
/// An imaging device advertises one or more of these in its minor class.
pub mod imaging_function {
    pub const DISPLAY: u32 = 0x10;
    pub const CAMERA: u32 = 0x20;
    pub const SCANNER: u32 = 0x40;
    pub const PRINTER: u32 = 0x80;
}

/// Name heuristics for printer classification.
pub mod printer_names {
    /// Name fragments that mark a device as a printer candidate,
    /// matched case-insensitively.
    pub const KEYWORDS: &[&str] = &[
        "printer",
        "print",
        "bixolon",
        "label",
        "thermal",
        "receipt",
        "impresora",
        "etiqueta",
        "termica",
        "ticket",
        "pos",
        "terminal",
    ];

    /// Model-number prefixes of common portable receipt/label printers.
    pub const MODEL_PREFIXES: &[&str] = &["SPP-R", "BXL", "SRP-", "TSP", "ZQ", "RPP", "MTP-"];
}

/// Connection defaults.
pub mod defaults {
    use std::time::Duration;

    /// Default connect budget (10 seconds).
    pub const CONNECT_TIMEOUT_MS: u64 = 10_000;

    /// Conventional raw-stream printing port.
    pub const NETWORK_PORT: u16 = 9100;

    /// Budget for closing the adapter during disconnect.
    pub const DISCONNECT_TIMEOUT_MS: u64 = 5_000;

    pub fn connect_timeout() -> Duration {
        Duration::from_millis(CONNECT_TIMEOUT_MS)
    }

    pub fn disconnect_timeout() -> Duration {
        Duration::from_millis(DISCONNECT_TIMEOUT_MS)
    }
}
