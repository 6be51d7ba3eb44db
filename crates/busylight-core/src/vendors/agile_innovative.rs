//! Agile Innovative BlinkStick family.
//!
//! Every BlinkStick shares one USB id; models are told apart by the major
//! version in the serial number (`BSnnnnnn-M.m`) and, for version 3
//! boards, by the USB release number.

use busylight_hid::Hardware;

use crate::color::Rgb;
use crate::driver::Driver;
use crate::error::LightResult;
use crate::light::{Light, LightCore};

pub const VENDOR: &str = "Agile Innovative";

const VENDOR_ID: u16 = 0x20A0;
const PRODUCT_ID: u16 = 0x41E5;

pub static BLINKSTICK: Driver = Driver::new(
    VENDOR,
    "BlinkStick",
    &[(VENDOR_ID, PRODUCT_ID, "BlinkStick")],
    build_blinkstick,
)
.with_claim_check(claims_blinkstick);

pub static BLINKSTICK_PRO: Driver = Driver::new(
    VENDOR,
    "BlinkStick Pro",
    &[(VENDOR_ID, PRODUCT_ID, "BlinkStick Pro")],
    build_pro,
)
.with_claim_check(claims_pro);

pub static BLINKSTICK_SQUARE: Driver = Driver::new(
    VENDOR,
    "BlinkStick Square",
    &[(VENDOR_ID, PRODUCT_ID, "BlinkStick Square")],
    build_square,
)
.with_claim_check(claims_square);

pub static BLINKSTICK_STRIP: Driver = Driver::new(
    VENDOR,
    "BlinkStick Strip",
    &[(VENDOR_ID, PRODUCT_ID, "BlinkStick Strip")],
    build_strip,
)
.with_claim_check(claims_strip);

pub static BLINKSTICK_NANO: Driver = Driver::new(
    VENDOR,
    "BlinkStick Nano",
    &[(VENDOR_ID, PRODUCT_ID, "BlinkStick Nano")],
    build_nano,
)
.with_claim_check(claims_nano);

pub static BLINKSTICK_FLEX: Driver = Driver::new(
    VENDOR,
    "BlinkStick Flex",
    &[(VENDOR_ID, PRODUCT_ID, "BlinkStick Flex")],
    build_flex,
)
.with_claim_check(claims_flex);

/// Reorder a red, green, blue triple into the device's green, red, blue.
pub fn rgb_to_grb((red, green, blue): (u8, u8, u8)) -> (u8, u8, u8) {
    (green, red, blue)
}

/// Inverse of [`rgb_to_grb`].
pub fn grb_to_rgb((green, red, blue): (u8, u8, u8)) -> (u8, u8, u8) {
    (red, green, blue)
}

/// `(major, minor)` from a `BSnnnnnn-M.m` serial number.
pub fn version(serial: &str) -> Option<(u8, u8)> {
    let (_, version) = serial.rsplit_once('-')?;
    let (major, minor) = version.split_once('.')?;
    Some((major.parse().ok()?, minor.parse().ok()?))
}

fn major(hardware: &Hardware) -> Option<u8> {
    hardware
        .serial_number
        .as_deref()
        .and_then(version)
        .map(|(major, _)| major)
}

fn claims_blinkstick(_: &Driver, hardware: &Hardware) -> bool {
    major(hardware) == Some(1)
}

fn claims_pro(_: &Driver, hardware: &Hardware) -> bool {
    major(hardware) == Some(2)
}

fn claims_v3(hardware: &Hardware, release_number: u16) -> bool {
    major(hardware) == Some(3) && hardware.release_number == release_number
}

fn claims_square(_: &Driver, hardware: &Hardware) -> bool {
    claims_v3(hardware, 0x0200)
}

fn claims_strip(_: &Driver, hardware: &Hardware) -> bool {
    claims_v3(hardware, 0x0201)
}

fn claims_nano(_: &Driver, hardware: &Hardware) -> bool {
    claims_v3(hardware, 0x0202)
}

fn claims_flex(_: &Driver, hardware: &Hardware) -> bool {
    claims_v3(hardware, 0x0203)
}

/// BlinkStick report: report id, channel, then one GRB triple per LED.
///
/// Colors are stored green, red, blue; every public accessor takes and
/// returns red, green, blue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub report: u8,
    pub channel: u8,
    colors: Vec<(u8, u8, u8)>,
}

impl State {
    pub fn new(report: u8, nleds: usize) -> Self {
        Self {
            report,
            channel: 0,
            colors: vec![(0, 0, 0); nleds],
        }
    }

    pub fn blinkstick() -> Self {
        Self::new(1, 1)
    }

    pub fn pro() -> Self {
        Self::new(2, 192)
    }

    pub fn square() -> Self {
        Self::new(6, 8)
    }

    pub fn strip() -> Self {
        Self::new(6, 8)
    }

    pub fn nano() -> Self {
        Self::new(6, 2)
    }

    pub fn flex() -> Self {
        Self::new(6, 32)
    }

    pub fn nleds(&self) -> usize {
        self.colors.len()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(2 + self.colors.len() * 3);
        buf.push(self.report);
        buf.push(self.channel);
        for (g, r, b) in &self.colors {
            buf.extend([*g, *r, *b]);
        }
        buf
    }

    /// Color of the first lit LED, or off.
    pub fn color(&self) -> Rgb {
        self.colors
            .iter()
            .find(|(g, r, b)| *g != 0 || *r != 0 || *b != 0)
            .map_or(Rgb::OFF, |grb| Rgb::from(grb_to_rgb(*grb)))
    }

    /// Set every LED to `color`.
    pub fn set_color(&mut self, color: Rgb) {
        let grb = rgb_to_grb(color.into());
        self.colors.fill(grb);
    }

    /// Color of LED `index`; out of range LEDs read as off.
    pub fn get_led(&self, index: usize) -> Rgb {
        self.colors
            .get(index)
            .map_or(Rgb::OFF, |grb| Rgb::from(grb_to_rgb(*grb)))
    }

    /// Set LED `index`; out of range indices are ignored.
    pub fn set_led(&mut self, index: usize, color: Rgb) {
        if let Some(slot) = self.colors.get_mut(index) {
            *slot = rgb_to_grb(color.into());
        }
    }
}

/// Any BlinkStick model; the driver decides the state layout.
#[derive(Debug)]
pub struct BlinkStick {
    core: LightCore,
    state: State,
}

impl BlinkStick {
    pub fn new(core: LightCore, state: State) -> Self {
        Self { core, state }
    }

    pub fn state(&self) -> &State {
        &self.state
    }
}

impl Light for BlinkStick {
    fn core(&self) -> &LightCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LightCore {
        &mut self.core
    }

    fn to_bytes(&self) -> LightResult<Vec<u8>> {
        Ok(self.state.to_bytes())
    }

    /// `led` 0 lights every LED, otherwise LED `led - 1`.
    fn on(&mut self, color: Rgb, led: u8) -> LightResult<()> {
        self.batch_update(|light| {
            light.set_color(color);
            match led {
                0 => light.state.set_color(color),
                n => light.state.set_led(usize::from(n.saturating_sub(1)), color),
            }
            Ok(())
        })
    }
}

fn build(core: LightCore, state: State) -> LightResult<Box<dyn Light>> {
    Ok(Box::new(BlinkStick::new(core, state)))
}

fn build_blinkstick(core: LightCore) -> LightResult<Box<dyn Light>> {
    build(core, State::blinkstick())
}

fn build_pro(core: LightCore) -> LightResult<Box<dyn Light>> {
    build(core, State::pro())
}

fn build_square(core: LightCore) -> LightResult<Box<dyn Light>> {
    build(core, State::square())
}

fn build_strip(core: LightCore) -> LightResult<Box<dyn Light>> {
    build(core, State::strip())
}

fn build_nano(core: LightCore) -> LightResult<Box<dyn Light>> {
    build(core, State::nano())
}

fn build_flex(core: LightCore) -> LightResult<Box<dyn Light>> {
    build(core, State::flex())
}
