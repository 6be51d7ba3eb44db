//! CompuLab fit-statUSB, driven with a short text command over serial.

use crate::color::Rgb;
use crate::driver::Driver;
use crate::error::LightResult;
use crate::light::{Light, LightCore};

pub static FIT_STATUSB: Driver = Driver::new(
    "CompuLab",
    "fit-statUSB",
    &[(0x2047, 0x03DF, "fit-statUSB")],
    build,
);

#[derive(Debug)]
pub struct FitStatUsb {
    core: LightCore,
}

impl FitStatUsb {
    pub fn new(core: LightCore) -> Self {
        Self { core }
    }
}

impl Light for FitStatUsb {
    fn core(&self) -> &LightCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LightCore {
        &mut self.core
    }

    /// `B#rrggbb\n`, lowercase hex.
    fn to_bytes(&self) -> LightResult<Vec<u8>> {
        let Rgb { red, green, blue } = self.color();
        Ok(format!("B#{red:02x}{green:02x}{blue:02x}\n").into_bytes())
    }

    fn on(&mut self, color: Rgb, _led: u8) -> LightResult<()> {
        self.batch_update(|light| {
            light.set_color(color);
            Ok(())
        })
    }
}

fn build(core: LightCore) -> LightResult<Box<dyn Light>> {
    Ok(Box::new(FitStatUsb::new(core)))
}
