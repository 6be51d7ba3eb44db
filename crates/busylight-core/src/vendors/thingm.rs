//! ThingM blink(1).
//!
//! Commands are eight byte feature reports: report id, an ASCII action and
//! six parameter bytes whose meaning depends on the action.

use std::fmt;

use busylight_word::{BitField, Field, Word};

use crate::color::Rgb;
use crate::driver::Driver;
use crate::error::{LightError, LightResult};
use crate::light::{Light, LightCore};
use crate::link::WriteStrategy;

pub static BLINK1: Driver = Driver::new(
    "ThingM",
    "Blink(1)",
    &[(0x27B8, 0x01ED, "Blink(1)")],
    build,
)
.with_write_strategy(WriteStrategy::FeatureReport);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Report {
    One = 1,
    Two = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Action {
    FadeColor = b'c',
    SetColor = b'n',
    ReadColor = b'r',
    ServerTickle = b'D',
    PlayLoop = b'p',
    PlayStateRead = b'S',
    SetColorPattern = b'P',
    SaveColorPatterns = b'W',
    ReadColorPattern = b'R',
    SetLedN = b'l',
    ReadEeprom = b'e',
    WriteEeprom = b'E',
    GetVersion = b'v',
    TestCommand = b'!',
    WriteNote = b'F',
    ReadNote = b'f',
    Bootloader = b'G',
    LockBootLoader = b'L',
    SetStartupParams = b'B',
    GetStartupParams = b'b',
    GetChipId = b'U',
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Leds {
    #[default]
    All = 0,
    Top = 1,
    Bottom = 2,
}

impl TryFrom<u8> for Leds {
    type Error = LightError;

    fn try_from(led: u8) -> Result<Self, Self::Error> {
        match led {
            0 => Ok(Self::All),
            1 => Ok(Self::Top),
            2 => Ok(Self::Bottom),
            other => Err(LightError::InvalidArgument(format!(
                "blink(1) has no LED {other}"
            ))),
        }
    }
}

/// Default fade for [`State::fade_to_color`], in milliseconds.
pub const DEFAULT_FADE_MS: u16 = 10;

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
    pub const REPORT: BitField = BitField::new(56, 64);
    pub const ACTION: BitField = BitField::new(48, 56);
    pub const RED: BitField = BitField::new(40, 48);
    pub const GREEN: BitField = BitField::new(32, 40);
    pub const BLUE: BitField = BitField::new(24, 32);
    pub const PLAY: BitField = Self::RED;
    pub const START: BitField = Self::GREEN;
    pub const STOP: BitField = Self::BLUE;
    pub const COUNT: BitField = BitField::new(16, 24);
    pub const FADE: BitField = BitField::new(8, 24);
    pub const LEDS: BitField = BitField::new(0, 8);
    pub const LINE: BitField = Self::LEDS;

    pub fn new() -> Self {
        Self {
            word: Word::from_array([0; 8]),
        }
    }

    pub fn get(&self, field: BitField) -> u64 {
        field.get(&self.word)
    }

    pub fn put(&mut self, field: BitField, value: u64) {
        field.put(&mut self.word, value);
    }

    pub fn color(&self) -> Rgb {
        let channel = |field: BitField| u8::try_from(self.get(field)).unwrap_or(u8::MAX);
        Rgb::new(channel(Self::RED), channel(Self::GREEN), channel(Self::BLUE))
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.put(Self::RED, color.red.into());
        self.put(Self::GREEN, color.green.into());
        self.put(Self::BLUE, color.blue.into());
    }

    pub fn clear(&mut self) {
        self.word.clear();
    }

    fn command(&mut self, action: Action) {
        self.clear();
        self.put(Self::REPORT, Report::One as u64);
        self.put(Self::ACTION, action as u64);
    }

    pub fn fade_to_color(&mut self, color: Rgb, fade_ms: u16, leds: Leds) {
        self.command(Action::FadeColor);
        self.set_color(color);
        self.put(Self::FADE, fade_ms.into());
        self.put(Self::LEDS, leds as u64);
    }

    pub fn write_pattern_line(&mut self, color: Rgb, fade_ms: u16, index: u8) {
        self.command(Action::SetColorPattern);
        self.set_color(color);
        self.put(Self::FADE, fade_ms.into());
        self.put(Self::LINE, index.into());
    }

    /// Persist the pattern to flash; the magic bytes are required.
    pub fn save_patterns(&mut self) {
        self.command(Action::SaveColorPatterns);
        self.set_color(Rgb::new(0xBE, 0xEF, 0xCA));
        self.put(Self::COUNT, 0xFE);
    }

    pub fn play_loop(&mut self, play: u8, start: u8, stop: u8, count: u8) {
        self.command(Action::PlayLoop);
        self.put(Self::PLAY, play.into());
        self.put(Self::START, start.into());
        self.put(Self::STOP, stop.into());
        self.put(Self::COUNT, count.into());
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
pub struct Blink1 {
    core: LightCore,
    state: State,
}

impl Blink1 {
    pub fn new(core: LightCore) -> Self {
        Self {
            core,
            state: State::new(),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// # Errors
    ///
    /// [`LightError::InvalidArgument`] for an unknown LED, or transport
    /// failures from the write.
    pub fn fade_to_color(&mut self, color: Rgb, fade_ms: u16, led: u8) -> LightResult<()> {
        let leds = Leds::try_from(led)?;
        self.set_color(color);
        self.batch_update(|light| {
            light.state.fade_to_color(color, fade_ms, leds);
            Ok(())
        })
    }

    /// # Errors
    ///
    /// Transport failures from the write.
    pub fn write_pattern_line(&mut self, color: Rgb, fade_ms: u16, index: u8) -> LightResult<()> {
        self.batch_update(|light| {
            light.state.write_pattern_line(color, fade_ms, index);
            Ok(())
        })
    }

    /// # Errors
    ///
    /// Transport failures from the write.
    pub fn save_patterns(&mut self) -> LightResult<()> {
        self.batch_update(|light| {
            light.state.save_patterns();
            Ok(())
        })
    }

    /// # Errors
    ///
    /// Transport failures from the write.
    pub fn play_loop(&mut self, play: u8, start: u8, stop: u8, count: u8) -> LightResult<()> {
        self.batch_update(|light| {
            light.state.play_loop(play, start, stop, count);
            Ok(())
        })
    }

    /// Blank `count` pattern lines from `start`, one report per line.
    ///
    /// # Errors
    ///
    /// The first failing write; later lines are not sent.
    pub fn clear_patterns(&mut self, start: u8, count: u8) -> LightResult<()> {
        for index in (u16::from(start)..u16::from(start) + u16::from(count))
            .filter_map(|index| u8::try_from(index).ok())
        {
            self.write_pattern_line(Rgb::OFF, 0, index)?;
        }
        Ok(())
    }
}

impl Light for Blink1 {
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
        self.fade_to_color(color, DEFAULT_FADE_MS, led)
    }
}

fn build(core: LightCore) -> LightResult<Box<dyn Light>> {
    Ok(Box::new(Blink1::new(core)))
}
