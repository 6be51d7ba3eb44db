//! Vendor drivers and their device-state encodings.
//!
//! Each vendor module declares `static` [`Driver`]s for its models. The
//! registry consults [`DRIVERS`] in the order listed here, so when two
//! drivers could claim the same hardware the earlier entry wins.

pub mod agile_innovative;
pub mod compulab;
pub mod embrava;
pub mod epos;
pub mod kuando;
pub mod luxafor;
pub mod muteme;
pub mod plantronics;
pub mod thingm;

#[cfg(test)]
mod embrava_tests;
#[cfg(test)]
mod epos_tests;
#[cfg(test)]
mod luxafor_tests;
#[cfg(test)]
mod muteme_tests;
#[cfg(test)]
mod testing;

use crate::driver::Driver;

/// Every supported model, in claim order.
pub static DRIVERS: &[&Driver] = &[
    &agile_innovative::BLINKSTICK,
    &agile_innovative::BLINKSTICK_PRO,
    &agile_innovative::BLINKSTICK_SQUARE,
    &agile_innovative::BLINKSTICK_STRIP,
    &agile_innovative::BLINKSTICK_NANO,
    &agile_innovative::BLINKSTICK_FLEX,
    &compulab::FIT_STATUSB,
    &embrava::BLYNCLIGHT,
    &embrava::BLYNCLIGHT_MINI,
    &embrava::BLYNCLIGHT_PLUS,
    &epos::BUSYLIGHT,
    &kuando::BUSYLIGHT_ALPHA,
    &kuando::BUSYLIGHT_OMEGA,
    &luxafor::FLAG,
    &luxafor::ORB,
    &luxafor::MUTE,
    &luxafor::BLUETOOTH,
    &luxafor::BUSY_TAG,
    &muteme::MUTEME,
    &muteme::MUTEME_MINI,
    &plantronics::STATUS_INDICATOR,
    &thingm::BLINK1,
];

#[cfg(test)]
mod tests {
    use busylight_hid::Hardware;

    use super::DRIVERS;

    /// Plausible descriptors for one declared id: bare, with a product
    /// string naming the device, and with each BlinkStick serial/release.
    fn candidates(vendor_id: u16, product_id: u16, vendor: &str, name: &str) -> Vec<Hardware> {
        let bare = Hardware::hid(vendor_id, product_id, "/dev/hidraw0");
        let mut all = vec![
            bare.clone(),
            bare.clone().with_product(format!("{vendor} {name}")),
        ];
        for major in 1..=3 {
            for release in 0x0200..=0x0203 {
                all.push(
                    bare.clone()
                        .with_serial(format!("BS000001-{major}.0"))
                        .with_release(release),
                );
            }
        }
        all
    }

    #[test]
    fn test_every_declared_id_has_exactly_one_claimant() {
        for driver in DRIVERS {
            for (vendor_id, product_id, name) in driver.supported_device_ids {
                let hardware = candidates(*vendor_id, *product_id, driver.vendor, name);
                let mine: Vec<_> = hardware.iter().filter(|h| driver.claims(h)).collect();
                assert!(!mine.is_empty(), "{} never claims {name}", driver.model);
                for claimed in mine {
                    let claimants: Vec<_> = DRIVERS
                        .iter()
                        .filter(|other| other.claims(claimed))
                        .map(|other| other.model)
                        .collect();
                    assert_eq!(claimants, vec![driver.model], "{claimed}");
                }
            }
        }
    }
}
