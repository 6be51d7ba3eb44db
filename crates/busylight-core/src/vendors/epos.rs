//! EPOS Busylight, a two LED light with an 80 bit report.

use std::fmt;

use busylight_word::{BitField, Field, Word};

use crate::color::Rgb;
use crate::driver::Driver;
use crate::error::LightResult;
use crate::light::{Light, LightCore};

pub static BUSYLIGHT: Driver = Driver::new(
    "EPOS",
    "Busylight",
    &[(0x1395, 0x0074, "Busylight")],
    build,
);

/// Report ids.
pub mod report {
    pub const ONE: u64 = 1;
}

/// Action codes.
pub mod action {
    pub const SET_COLOR: u64 = 0x1202;
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct State {
    word: Word,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    pub const REPORT: BitField = BitField::new(72, 80);
    pub const ACTION: BitField = BitField::new(56, 72);
    pub const RED0: BitField = BitField::new(48, 56);
    pub const GREEN0: BitField = BitField::new(40, 48);
    pub const BLUE0: BitField = BitField::new(32, 40);
    pub const RED1: BitField = BitField::new(24, 32);
    pub const GREEN1: BitField = BitField::new(16, 24);
    pub const BLUE1: BitField = BitField::new(8, 16);
    pub const ON: BitField = BitField::new(0, 8);

    pub fn new() -> Self {
        Self {
            word: Word::from_array([0; 10]),
        }
    }

    pub fn get(&self, field: BitField) -> u64 {
        field.get(&self.word)
    }

    pub fn put(&mut self, field: BitField, value: u64) {
        field.put(&mut self.word, value);
    }

    fn rgb(&self, red: BitField, green: BitField, blue: BitField) -> Rgb {
        let channel = |field: BitField| u8::try_from(self.get(field)).unwrap_or(u8::MAX);
        Rgb::new(channel(red), channel(green), channel(blue))
    }

    pub fn color0(&self) -> Rgb {
        self.rgb(Self::RED0, Self::GREEN0, Self::BLUE0)
    }

    pub fn set_color0(&mut self, color: Rgb) {
        self.put(Self::RED0, color.red.into());
        self.put(Self::GREEN0, color.green.into());
        self.put(Self::BLUE0, color.blue.into());
    }

    pub fn color1(&self) -> Rgb {
        self.rgb(Self::RED1, Self::GREEN1, Self::BLUE1)
    }

    pub fn set_color1(&mut self, color: Rgb) {
        self.put(Self::RED1, color.red.into());
        self.put(Self::GREEN1, color.green.into());
        self.put(Self::BLUE1, color.blue.into());
    }

    /// The first LED's color.
    pub fn color(&self) -> Rgb {
        self.color0()
    }

    /// Prepare a set-color report for `led`: 1 and 2 address one LED,
    /// anything else both.
    pub fn set_color(&mut self, color: Rgb, led: u8) {
        self.put(Self::REPORT, report::ONE);
        self.put(Self::ACTION, action::SET_COLOR);
        match led {
            1 => self.set_color0(color),
            2 => self.set_color1(color),
            _ => {
                self.set_color0(color);
                self.set_color1(color);
            }
        }
        self.put(Self::ON, u64::from(color.is_lit()));
    }

    pub fn clear(&mut self) {
        self.word.clear();
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.word.to_bytes()
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State({})", self.word.hex())
    }
}

#[derive(Debug)]
pub struct Busylight {
    core: LightCore,
    state: State,
}

impl Busylight {
    pub fn new(core: LightCore) -> Self {
        Self {
            core,
            state: State::new(),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }
}

impl Light for Busylight {
    fn core(&self) -> &LightCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LightCore {
        &mut self.core
    }

    fn to_bytes(&self) -> LightResult<Vec<u8>> {
        Ok(self.state.to_bytes())
    }

    fn on(&mut self, color: Rgb, led: u8) -> LightResult<()> {
        self.set_color(color);
        self.batch_update(|light| {
            light.state.set_color(color, led);
            Ok(())
        })
    }

    fn reset(&mut self) -> LightResult<()> {
        self.state.clear();
        self.off(0)
    }
}

fn build(core: LightCore) -> LightResult<Box<dyn Light>> {
    Ok(Box::new(Busylight::new(core)))
}
