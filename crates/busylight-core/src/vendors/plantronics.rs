//! Plantronics Status Indicator, an OEM Blynclight.

use super::embrava::build_blynclight;
use crate::driver::Driver;

pub static STATUS_INDICATOR: Driver = Driver::new(
    "Plantronics",
    "Status Indicator",
    &[(0x047F, 0xD005, "Status Indicator")],
    build_blynclight,
);
