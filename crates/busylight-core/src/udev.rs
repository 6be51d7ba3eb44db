//! Linux udev permission rules for supported devices.

use crate::driver::Driver;

/// Default permission mode, world read/write.
pub const DEFAULT_MODE: u32 = 0o666;

/// Rule blocks keyed by `(vendor_id, product_id)`, in first-seen order.
pub type Rules = Vec<((u16, u16), Vec<String>)>;

/// Three rule lines for every id declared by `drivers`.
///
/// When two drivers declare the same id the first one wins.
pub fn udev_rules(drivers: &[&Driver], mode: u32) -> Rules {
    let mut rules: Rules = Vec::new();
    for driver in drivers {
        for (vendor_id, product_id, _) in driver.supported_device_ids {
            let key = (*vendor_id, *product_id);
            if rules.iter().any(|(seen, _)| *seen == key) {
                continue;
            }
            rules.push((key, rule_block(driver, *vendor_id, *product_id, mode)));
        }
    }
    rules
}

fn rule_block(driver: &Driver, vendor_id: u16, product_id: u16, mode: u32) -> Vec<String> {
    let attrs = format!("ATTRS{{idVendor}}==\"{vendor_id:04x}\", ATTRS{{idProduct}}==\"{product_id:04x}\"");
    vec![
        format!("# {} {} udev rules", driver.vendor, driver.model),
        format!("SUBSYSTEMS==\"usb\", {attrs}, MODE=\"{mode:04o}\""),
        format!("KERNEL==\"hidraw*\", {attrs}, MODE=\"{mode:04o}\""),
    ]
}

/// Render rule blocks as the text of a rules file.
pub fn render(rules: &Rules) -> String {
    let mut text = String::new();
    for (_, lines) in rules {
        for line in lines {
            text.push_str(line);
            text.push('\n');
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendors::{self, agile_innovative, compulab};

    #[test]
    fn test_rule_text() {
        let rules = udev_rules(&[&compulab::FIT_STATUSB], DEFAULT_MODE);
        assert_eq!(
            rules,
            vec![(
                (0x2047, 0x03DF),
                vec![
                    "# CompuLab fit-statUSB udev rules".to_string(),
                    r#"SUBSYSTEMS=="usb", ATTRS{idVendor}=="2047", ATTRS{idProduct}=="03df", MODE="0666""#
                        .to_string(),
                    r#"KERNEL=="hidraw*", ATTRS{idVendor}=="2047", ATTRS{idProduct}=="03df", MODE="0666""#
                        .to_string(),
                ]
            )]
        );
    }

    #[test]
    fn test_custom_mode() {
        let text = render(&udev_rules(&[&compulab::FIT_STATUSB], 0o660));
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("MODE=\"0660\""));
    }

    #[test]
    fn test_first_declared_id_wins() {
        let rules = udev_rules(
            &[&agile_innovative::BLINKSTICK_PRO, &agile_innovative::BLINKSTICK],
            DEFAULT_MODE,
        );
        assert_eq!(rules.len(), 1);
        let comment = rules.first().and_then(|(_, lines)| lines.first().cloned());
        assert_eq!(
            comment.as_deref(),
            Some("# Agile Innovative BlinkStick Pro udev rules")
        );
    }

    #[test]
    fn test_catalog_rules_follow_driver_order() {
        let rules = udev_rules(vendors::DRIVERS, DEFAULT_MODE);
        // Six BlinkSticks and four Luxafor HID models share one id each.
        assert_eq!(rules.len(), 23);
        assert!(rules.iter().all(|(_, lines)| lines.len() == 3));

        let comment = |key: (u16, u16)| {
            rules
                .iter()
                .find(|(seen, _)| *seen == key)
                .and_then(|(_, lines)| lines.first().cloned())
        };
        assert_eq!(
            comment((0x20A0, 0x41E5)).as_deref(),
            Some("# Agile Innovative BlinkStick udev rules")
        );
        assert_eq!(
            comment((0x04D8, 0xF372)).as_deref(),
            Some("# Luxafor Flag udev rules")
        );
        assert_eq!(
            rules.first().map(|(key, _)| *key),
            Some((0x20A0, 0x41E5))
        );
        assert_eq!(rules.last().map(|(key, _)| *key), Some((0x27B8, 0x01ED)));
    }
}
