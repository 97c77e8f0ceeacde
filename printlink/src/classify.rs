//! Printer classification heuristics.
//!
//! Turns transport-level device records into [`DeviceRecord`]s, inferring
//! whether a peripheral is likely a printer. Classification is a pure
//! function of the input record: no I/O, and deterministic for identical
//! input, so the same snapshot always classifies the same way.

use crate::constants::{imaging_function, printer_names};
use crate::models::{DeviceClass, DeviceRecord, RawDeviceInfo, ServiceClasses};

/// Placeholder for devices that report neither a name nor an alias.
pub const UNKNOWN_DEVICE_NAME: &str = "Unknown Device";

/// Classifies a raw device record.
///
/// The device class comes from the Class-of-Device major class when the
/// device reports one. A device is a printer candidate when either:
///
/// 1. its Class-of-Device declares the Imaging major class with the printer
///    function bit or the RENDERING service bit, or
/// 2. its name or alias matches a known printer keyword or vendor model
///    prefix.
pub fn classify(raw: &RawDeviceInfo) -> DeviceRecord {
    let name = raw
        .name
        .clone()
        .or_else(|| raw.alias.clone())
        .unwrap_or_else(|| UNKNOWN_DEVICE_NAME.to_string());

    let device_class = raw
        .class_of_device
        .map(DeviceClass::from_cod)
        .unwrap_or(DeviceClass::Uncategorized);

    let printer_candidate = is_printer_cod(raw.class_of_device)
        || raw
            .name
            .iter()
            .chain(raw.alias.iter())
            .any(|n| is_printer_name(n));

    DeviceRecord {
        name,
        address: raw.address.clone(),
        device_class,
        printer_candidate,
    }
}

/// Caller-side selection policy for a discovery snapshot: the first printer
/// candidate, falling back to the first record. `None` means there is
/// nothing to connect to.
pub fn preferred_target(devices: &[DeviceRecord]) -> Option<&DeviceRecord> {
    devices
        .iter()
        .find(|d| d.printer_candidate)
        .or_else(|| devices.first())
}

fn is_printer_cod(cod: Option<u32>) -> bool {
    let Some(cod) = cod else {
        return false;
    };
    if DeviceClass::from_cod(cod) != DeviceClass::Imaging {
        return false;
    }
    cod & imaging_function::PRINTER != 0
        || ServiceClasses::from_cod(cod).contains(ServiceClasses::RENDERING)
}

fn is_printer_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    if printer_names::KEYWORDS.iter().any(|k| lower.contains(k)) {
        return true;
    }
    let upper = name.to_uppercase();
    printer_names::MODEL_PREFIXES
        .iter()
        .any(|p| upper.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: Option<&str>, cod: Option<u32>) -> RawDeviceInfo {
        RawDeviceInfo {
            address: "00:11:22:33:44:55".into(),
            name: name.map(str::to_string),
            alias: None,
            class_of_device: cod,
            paired: true,
        }
    }

    #[test]
    fn classify_is_deterministic() {
        let input = raw(Some("SPP-R200III"), Some(0x040680));
        assert_eq!(classify(&input), classify(&input));
    }

    #[test]
    fn printer_cod_is_candidate() {
        // Imaging major class, printer function bit, RENDERING service bit.
        let record = classify(&raw(Some("NoHintInName"), Some(0x040680)));
        assert_eq!(record.device_class, DeviceClass::Imaging);
        assert!(record.printer_candidate);
    }

    #[test]
    fn imaging_without_printer_function_is_not_candidate() {
        // Imaging major class, camera function, no RENDERING bit.
        let record = classify(&raw(Some("Webcam"), Some(0x080620)));
        assert_eq!(record.device_class, DeviceClass::Imaging);
        assert!(!record.printer_candidate);
    }

    #[test]
    fn headset_is_not_candidate() {
        let record = classify(&raw(Some("Headset"), Some(0x240404)));
        assert_eq!(record.device_class, DeviceClass::AudioVideo);
        assert!(!record.printer_candidate);
    }

    #[test]
    fn keyword_in_name_is_candidate() {
        for name in [
            "My Thermal Printer",
            "receipt-58mm",
            "Impresora Movil",
            "POS Station",
            "BIXOLON SPP-R310",
        ] {
            let record = classify(&raw(Some(name), None));
            assert!(record.printer_candidate, "'{name}' should be a candidate");
        }
    }

    #[test]
    fn model_prefix_is_candidate() {
        for name in ["BXL-P", "SPP-R200III", "ZQ520", "TSP143III", "SRP-350plus"] {
            let record = classify(&raw(Some(name), None));
            assert!(record.printer_candidate, "'{name}' should be a candidate");
        }
    }

    #[test]
    fn unknown_device_is_not_candidate() {
        let record = classify(&raw(Some("Galaxy S21"), Some(0x5a020c)));
        assert_eq!(record.device_class, DeviceClass::Phone);
        assert!(!record.printer_candidate);
    }

    #[test]
    fn alias_is_checked_when_name_missing() {
        let mut input = raw(None, None);
        input.alias = Some("Kitchen Printer".into());
        let record = classify(&input);
        assert_eq!(record.name, "Kitchen Printer");
        assert!(record.printer_candidate);
    }

    #[test]
    fn nameless_device_gets_placeholder() {
        let record = classify(&raw(None, None));
        assert_eq!(record.name, UNKNOWN_DEVICE_NAME);
        assert_eq!(record.device_class, DeviceClass::Uncategorized);
        assert!(!record.printer_candidate);
    }

    #[test]
    fn preferred_target_picks_first_candidate() {
        let records = vec![
            classify(&raw(Some("Headset"), Some(0x240404))),
            classify(&raw(Some("BXL-P"), None)),
            classify(&raw(Some("SPP-R200III"), None)),
        ];
        let target = preferred_target(&records).expect("non-empty list");
        assert_eq!(target.name, "BXL-P");
    }

    #[test]
    fn preferred_target_falls_back_to_first_record() {
        let records = vec![
            classify(&raw(Some("Headset"), Some(0x240404))),
            classify(&raw(Some("Galaxy S21"), Some(0x5a020c))),
        ];
        let target = preferred_target(&records).expect("non-empty list");
        assert_eq!(target.name, "Headset");
    }

    #[test]
    fn preferred_target_empty_list() {
        assert!(preferred_target(&[]).is_none());
    }
}
