//! MuteMe Original and Mini.

use busylight_word::{BoolField, Field, Word};
use tracing::debug;

use crate::color::Rgb;
use crate::driver::Driver;
use crate::error::LightResult;
use crate::light::{Light, LightCore};

pub const VENDOR: &str = "MuteMe";

pub static MUTEME: Driver = Driver::new(
    VENDOR,
    "MuteMe Original",
    &[
        (0x16C0, 0x27DB, "MuteMe Original"),
        (0x20A0, 0x42DA, "MuteMe Original"),
    ],
    build,
);

pub static MUTEME_MINI: Driver = Driver::new(
    VENDOR,
    "MuteMe Mini",
    &[(0x20A0, 0x42DB, "MuteMe Mini")],
    build,
);

/// One byte of on/off flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    word: Word,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    pub const RED: BoolField = BoolField::new(0);
    pub const GREEN: BoolField = BoolField::new(1);
    pub const BLUE: BoolField = BoolField::new(2);
    pub const DIM: BoolField = BoolField::new(4);
    pub const BLINK: BoolField = BoolField::new(5);
    pub const SLEEP: BoolField = BoolField::new(6);

    pub fn new() -> Self {
        Self {
            word: Word::from_array([0]),
        }
    }

    /// `0xFF` when the flag is set, else `0`.
    pub fn get(&self, field: BoolField) -> u8 {
        u8::try_from(field.get(&self.word)).unwrap_or(u8::MAX)
    }

    /// Store `value` in `field`; odd values set the flag, even values clear it.
    pub fn set(&mut self, field: BoolField, value: u8) {
        field.put(&mut self.word, u64::from(value));
    }

    pub fn put(&mut self, field: BoolField, on: bool) {
        self.set(field, u8::from(on));
    }

    pub fn color(&self) -> Rgb {
        Rgb::new(
            self.get(Self::RED),
            self.get(Self::GREEN),
            self.get(Self::BLUE),
        )
    }

    /// Odd channel values turn their LED fully on, even values turn it off.
    pub fn set_color(&mut self, color: Rgb) {
        self.set(Self::RED, color.red);
        self.set(Self::GREEN, color.green);
        self.set(Self::BLUE, color.blue);
    }

    pub fn value(&self) -> u8 {
        self.word.as_bytes().first().copied().unwrap_or_default()
    }

    /// A pad byte followed by the flags.
    pub fn to_bytes(&self) -> Vec<u8> {
        vec![0x00, self.value()]
    }
}

#[derive(Debug)]
pub struct MuteMe {
    core: LightCore,
    state: State,
}

impl MuteMe {
    pub fn new(core: LightCore) -> Self {
        Self {
            core,
            state: State::new(),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Probe the device with an empty feature report.
    pub fn is_pluggedin(&self) -> bool {
        match self.core.link().send_feature_report(&[0; 8]) {
            Ok(nbytes) => nbytes == 8,
            Err(e) => {
                debug!("MuteMe probe failed: {e}");
                false
            }
        }
    }

    /// # Errors
    ///
    /// Transport failures from the write.
    pub fn set_dim(&mut self, dim: bool) -> LightResult<()> {
        self.batch_update(|light| {
            light.state.put(State::DIM, dim);
            Ok(())
        })
    }

    /// # Errors
    ///
    /// Transport failures from the write.
    pub fn set_blink(&mut self, blink: bool) -> LightResult<()> {
        self.batch_update(|light| {
            light.state.put(State::BLINK, blink);
            Ok(())
        })
    }
}

impl Light for MuteMe {
    fn core(&self) -> &LightCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LightCore {
        &mut self.core
    }

    fn to_bytes(&self) -> LightResult<Vec<u8>> {
        Ok(self.state.to_bytes())
    }

    fn on(&mut self, color: Rgb, _led: u8) -> LightResult<()> {
        self.batch_update(|light| {
            light.set_color(color);
            light.state.set_color(color);
            Ok(())
        })
    }

    fn is_button(&self) -> bool {
        true
    }
}

fn build(core: LightCore) -> LightResult<Box<dyn Light>> {
    Ok(Box::new(MuteMe::new(core)))
}
