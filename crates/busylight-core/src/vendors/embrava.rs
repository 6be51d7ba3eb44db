//! Embrava Blynclight family.
//!
//! The Blynclight report is six state bytes framed by a leading zero and a
//! trailing `0xFF 0x22`. Besides color the state carries dim, flash and a
//! small sound player.

use std::fmt;

use busylight_word::{BitField, Field, Word};

use crate::color::Rgb;
use crate::driver::Driver;
use crate::error::LightResult;
use crate::light::{Light, LightCore};

pub const VENDOR: &str = "Embrava";

pub static BLYNCLIGHT: Driver = Driver::new(
    VENDOR,
    "Blynclight",
    &[
        (0x2C0D, 0x0001, "Blynclight"),
        (0x2C0D, 0x000C, "Blynclight"),
        (0x0E53, 0x2516, "Blynclight"),
    ],
    build_blynclight,
);

pub static BLYNCLIGHT_MINI: Driver = Driver::new(
    VENDOR,
    "Blynclight Mini",
    &[
        (0x2C0D, 0x000A, "Blynclight Mini"),
        (0x0E53, 0x2517, "Blynclight Mini"),
    ],
    build_blynclight,
);

pub static BLYNCLIGHT_PLUS: Driver = Driver::new(
    VENDOR,
    "Blynclight Plus",
    &[
        (0x2C0D, 0x0002, "Blynclight Plus"),
        (0x2C0D, 0x0010, "Blynclight Plus"),
    ],
    build_blynclight,
);

/// Flash cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FlashSpeed {
    #[default]
    Slow = 1,
    Medium = 2,
    Fast = 4,
}

/// Blynclight state word, 48 bits.
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
    pub const RED: BitField = BitField::new(40, 48);
    pub const BLUE: BitField = BitField::new(32, 40);
    pub const GREEN: BitField = BitField::new(24, 32);
    pub const OFF: BitField = BitField::new(16, 17);
    pub const DIM: BitField = BitField::new(17, 18);
    pub const FLASH: BitField = BitField::new(18, 19);
    pub const SPEED: BitField = BitField::new(19, 22);
    pub const MUSIC: BitField = BitField::new(8, 12);
    pub const REPEAT: BitField = BitField::new(12, 13);
    pub const PLAY: BitField = BitField::new(13, 14);
    pub const VOLUME: BitField = BitField::new(0, 4);
    pub const MUTE: BitField = BitField::new(7, 8);

    pub fn new() -> Self {
        Self {
            word: Word::from_array([0; 6]),
        }
    }

    pub fn get(&self, field: BitField) -> u64 {
        field.get(&self.word)
    }

    pub fn put(&mut self, field: BitField, value: u64) {
        field.put(&mut self.word, value);
    }

    fn flag(&self, field: BitField) -> bool {
        self.get(field) != 0
    }

    fn channel(&self, field: BitField) -> u8 {
        u8::try_from(self.get(field)).unwrap_or(u8::MAX)
    }

    pub fn color(&self) -> Rgb {
        Rgb::new(
            self.channel(Self::RED),
            self.channel(Self::GREEN),
            self.channel(Self::BLUE),
        )
    }

    /// Set the color channels; a dark color also raises `off` and clears
    /// flash and dim.
    pub fn set_color(&mut self, color: Rgb) {
        self.put(Self::RED, color.red.into());
        self.put(Self::GREEN, color.green.into());
        self.put(Self::BLUE, color.blue.into());
        let lit = color.is_lit();
        self.put(Self::OFF, u64::from(!lit));
        if !lit {
            self.put(Self::FLASH, 0);
            self.put(Self::DIM, 0);
        }
    }

    /// Dark, silent, slow flash cadence.
    pub fn reset(&mut self) {
        self.word.clear();
        self.put(Self::OFF, 1);
        self.put(Self::SPEED, FlashSpeed::Slow as u64);
    }

    pub fn word(&self) -> &Word {
        &self.word
    }

    /// The full report, framing included.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(9);
        buf.push(0);
        buf.extend_from_slice(self.word.as_bytes());
        buf.extend([0xFF, 0x22]);
        buf
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State({})", self.word.hex())
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "red:    {:#04x}", self.get(Self::RED))?;
        writeln!(f, "blue:   {:#04x}", self.get(Self::BLUE))?;
        writeln!(f, "green:  {:#04x}", self.get(Self::GREEN))?;
        writeln!(f, "off:    {}", self.get(Self::OFF))?;
        writeln!(f, "dim:    {}", self.get(Self::DIM))?;
        writeln!(f, "flash:  {}", self.get(Self::FLASH))?;
        writeln!(f, "speed:  {}", self.get(Self::SPEED))?;
        writeln!(f, "repeat: {}", self.get(Self::REPEAT))?;
        writeln!(f, "play:   {}", self.get(Self::PLAY))?;
        writeln!(f, "music:  {}", self.get(Self::MUSIC))?;
        writeln!(f, "volume: {}", self.get(Self::VOLUME))?;
        write!(f, "mute:   {}", self.get(Self::MUTE))
    }
}

/// Blynclight, Blynclight Mini, Blynclight Plus and protocol compatible
/// lights from other vendors.
#[derive(Debug)]
pub struct Blynclight {
    core: LightCore,
    state: State,
}

impl Blynclight {
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
    /// Transport failures from the write.
    pub fn dim(&mut self) -> LightResult<()> {
        self.batch_update(|light| {
            light.state.put(State::DIM, 1);
            Ok(())
        })
    }

    /// # Errors
    ///
    /// Transport failures from the write.
    pub fn bright(&mut self) -> LightResult<()> {
        self.batch_update(|light| {
            light.state.put(State::DIM, 0);
            Ok(())
        })
    }

    pub fn is_dim(&self) -> bool {
        self.state.flag(State::DIM)
    }

    /// Play `music` (0-15) at `volume` (0-15), unmuting the device.
    ///
    /// # Errors
    ///
    /// Transport failures from the write.
    pub fn play_sound(&mut self, music: u8, volume: u8, repeat: bool) -> LightResult<()> {
        self.batch_update(|light| {
            light.state.put(State::REPEAT, u64::from(repeat));
            light.state.put(State::PLAY, 1);
            light.state.put(State::MUSIC, music.into());
            light.state.put(State::MUTE, 0);
            light.state.put(State::VOLUME, volume.into());
            Ok(())
        })
    }

    /// # Errors
    ///
    /// Transport failures from the write.
    pub fn stop_sound(&mut self) -> LightResult<()> {
        self.batch_update(|light| {
            light.state.put(State::PLAY, 0);
            Ok(())
        })
    }

    /// # Errors
    ///
    /// Transport failures from the write.
    pub fn mute(&mut self) -> LightResult<()> {
        self.batch_update(|light| {
            light.state.put(State::MUTE, 1);
            Ok(())
        })
    }

    /// # Errors
    ///
    /// Transport failures from the write.
    pub fn unmute(&mut self) -> LightResult<()> {
        self.batch_update(|light| {
            light.state.put(State::MUTE, 0);
            Ok(())
        })
    }

    /// Flash `color`, slowly unless a speed is given.
    ///
    /// # Errors
    ///
    /// Transport failures from the write.
    pub fn flash(&mut self, color: Rgb, speed: Option<FlashSpeed>) -> LightResult<()> {
        let speed = speed.unwrap_or_default();
        self.batch_update(|light| {
            light.set_color(color);
            light.state.put(State::FLASH, 1);
            light.state.put(State::SPEED, speed as u64);
            Ok(())
        })
    }

    /// # Errors
    ///
    /// Transport failures from the write.
    pub fn stop_flashing(&mut self) -> LightResult<()> {
        self.batch_update(|light| {
            light.state.put(State::FLASH, 0);
            Ok(())
        })
    }
}

impl Light for Blynclight {
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
            Ok(())
        })
    }

    fn color(&self) -> Rgb {
        self.state.color()
    }

    fn set_color(&mut self, color: Rgb) {
        self.core.set_color(color);
        self.state.set_color(color);
    }

    /// Dark and silent.
    fn reset(&mut self) -> LightResult<()> {
        self.state.reset();
        self.core.set_color(Rgb::OFF);
        self.update()
    }
}

pub(crate) fn build_blynclight(core: LightCore) -> LightResult<Box<dyn Light>> {
    Ok(Box::new(Blynclight::new(core)))
}
