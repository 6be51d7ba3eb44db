//! Luxafor Flag, Orb, Mute and BT, plus the Busy Tag.
//!
//! Every Luxafor HID model shares one vendor/product id, so the model is
//! picked from the last word of the product string.

use busylight_hid::Hardware;
use tracing::debug;

use crate::color::Rgb;
use crate::driver::Driver;
use crate::error::{LightError, LightResult};
use crate::light::{Light, LightCore};

pub const VENDOR: &str = "Luxafor";

pub static FLAG: Driver = Driver::new(VENDOR, "Flag", &[(0x04D8, 0xF372, "Flag")], build_flag)
    .with_claim_check(claims_product);

pub static ORB: Driver = Driver::new(VENDOR, "Orb", &[(0x04D8, 0xF372, "Orb")], build_flag)
    .with_claim_check(claims_product);

pub static MUTE: Driver = Driver::new(VENDOR, "Mute", &[(0x04D8, 0xF372, "Mute")], build_mute)
    .with_claim_check(claims_product);

pub static BLUETOOTH: Driver = Driver::new(VENDOR, "BT", &[(0x04D8, 0xF372, "BT")], build_flag)
    .with_claim_check(claims_product);

pub static BUSY_TAG: Driver = Driver::new(
    "Busy Tag",
    "Busy Tag",
    &[(0x303A, 0x81DF, "Busy Tag")],
    build_busy_tag,
);

/// Claim when the product string's last word names one of the driver's
/// devices, ignoring case.
fn claims_product(driver: &Driver, hardware: &Hardware) -> bool {
    let Some(product) = hardware
        .product_string
        .as_deref()
        .and_then(|s| s.split_whitespace().last())
    else {
        debug!("problem missing product string processing {hardware}");
        return false;
    };
    driver
        .supported_device_ids
        .iter()
        .any(|(_, _, name)| name.eq_ignore_ascii_case(product))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Command {
    #[default]
    Color = 1,
    Fade = 2,
    Strobe = 3,
    Wave = 4,
    Pattern = 6,
}

/// LED selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Leds {
    #[default]
    All = 0xFF,
    Back = 0x41,
    Front = 0x42,
    Led1 = 1,
    Led2 = 2,
    Led3 = 3,
    Led4 = 4,
    Led5 = 5,
    Led6 = 6,
}

impl Leds {
    /// Selector for a raw LED number; unknown numbers address every LED.
    pub fn from_led(led: u8) -> Self {
        match led {
            0x41 => Self::Back,
            0x42 => Self::Front,
            1 => Self::Led1,
            2 => Self::Led2,
            3 => Self::Led3,
            4 => Self::Led4,
            5 => Self::Led5,
            6 => Self::Led6,
            _ => Self::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct State {
    pub command: Command,
    pub leds: Leds,
    pub color: Rgb,
    pub fade: u8,
    pub repeat: u8,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// [`LightError::Unsupported`] for commands other than color and fade.
    pub fn to_bytes(&self) -> LightResult<Vec<u8>> {
        let Rgb { red, green, blue } = self.color;
        let leds = self.leds as u8;
        match self.command {
            Command::Color => Ok(vec![Command::Color as u8, leds, red, green, blue]),
            Command::Fade => Ok(vec![
                Command::Fade as u8,
                leds,
                red,
                green,
                blue,
                self.fade,
                self.repeat,
            ]),
            other => {
                let message = format!("Unsupported command: {}", other as u8);
                debug!("{message}");
                Err(LightError::Unsupported(message))
            }
        }
    }
}

/// Flag, Orb and BT.
#[derive(Debug)]
pub struct Flag {
    core: LightCore,
    state: State,
}

impl Flag {
    pub fn new(core: LightCore) -> Self {
        Self {
            core,
            state: State::new(),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Fade `led` to `color` over `fade` device ticks.
    ///
    /// # Errors
    ///
    /// Transport failures from the write.
    pub fn fade(&mut self, color: Rgb, led: u8, fade: u8, repeat: u8) -> LightResult<()> {
        self.set_color(color);
        self.batch_update(|light| {
            light.state = State {
                command: Command::Fade,
                leds: Leds::from_led(led),
                color,
                fade,
                repeat,
            };
            Ok(())
        })
    }
}

impl Light for Flag {
    fn core(&self) -> &LightCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LightCore {
        &mut self.core
    }

    fn to_bytes(&self) -> LightResult<Vec<u8>> {
        self.state.to_bytes()
    }

    fn on(&mut self, color: Rgb, led: u8) -> LightResult<()> {
        self.set_color(color);
        self.batch_update(|light| {
            light.state.command = Command::Color;
            light.state.leds = Leds::from_led(led);
            light.state.color = color;
            Ok(())
        })
    }
}

/// Luxafor Mute: a Flag with a button.
#[derive(Debug)]
pub struct Mute {
    flag: Flag,
    button: bool,
}

impl Mute {
    /// Report code for a plain status frame.
    pub const STATUS: u8 = 66;
    /// Report code carrying the button state.
    pub const BUTTON: u8 = 131;

    pub fn new(core: LightCore) -> Self {
        Self {
            flag: Flag::new(core),
            button: false,
        }
    }
}

impl Light for Mute {
    fn core(&self) -> &LightCore {
        &self.flag.core
    }

    fn core_mut(&mut self) -> &mut LightCore {
        &mut self.flag.core
    }

    fn to_bytes(&self) -> LightResult<Vec<u8>> {
        self.flag.to_bytes()
    }

    fn on(&mut self, color: Rgb, led: u8) -> LightResult<()> {
        self.flag.on(color, led)
    }

    fn is_button(&self) -> bool {
        true
    }

    /// Poll the device. Frames other than status and button reports leave
    /// the last known state in place.
    fn button_on(&mut self) -> LightResult<bool> {
        let response = self.core().link().read(8, 200)?;
        match response.first() {
            Some(&Self::STATUS) => self.button = false,
            Some(&Self::BUTTON) => {
                self.button = response.get(1).is_some_and(|pressed| *pressed != 0);
            }
            _ => {}
        }
        Ok(self.button)
    }
}

/// Busy Tag AT commands.
pub mod command {
    use crate::color::Rgb;

    pub const GET_DEVICE_NAME: &str = "AT+GDN";
    pub const GET_MANUFACTURER_NAME: &str = "AT+GMN";
    pub const GET_DEVICE_ID: &str = "AT+GID";
    pub const GET_PICTURE_LIST: &str = "AT+GPL";
    pub const GET_FILE_LIST: &str = "AT+GFL";
    pub const GET_LOCAL_HOST_ADDRESS: &str = "AT+GLHA";
    pub const GET_FREE_STORAGE_SIZE: &str = "AT+GFSS";
    pub const GET_TOTAL_STORAGE_SIZE: &str = "AT+GTSS";
    pub const GET_LAST_ERROR_CODE: &str = "AT+GLEC";
    pub const GET_LAST_RESET_REASON_CORE0: &str = "AT+GLRR0";
    pub const GET_LAST_RESET_REASON_CORE1: &str = "AT+GLRR1";

    /// `AT+SC` for `led`; 0 addresses every LED.
    pub fn solid_color(color: Rgb, led: u8) -> String {
        let leds = if led == 0 {
            127
        } else {
            1u32.checked_shl(led.into()).unwrap_or(0)
        };
        format!(
            "AT+SC={leds},{:02x}{:02x}{:02x}",
            color.red, color.green, color.blue
        )
    }
}

/// Busy Tag, driven with AT text commands over its serial port.
#[derive(Debug)]
pub struct BusyTag {
    core: LightCore,
    command: String,
}

impl BusyTag {
    pub fn new(core: LightCore) -> Self {
        Self {
            core,
            command: String::new(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn set_command(&mut self, command: impl Into<String>) {
        self.command = command.into();
    }

    /// Send an arbitrary AT command.
    ///
    /// # Errors
    ///
    /// Transport failures from the write.
    pub fn send(&mut self, command: impl Into<String>) -> LightResult<()> {
        self.set_command(command);
        self.update()
    }
}

impl Light for BusyTag {
    fn core(&self) -> &LightCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LightCore {
        &mut self.core
    }

    fn to_bytes(&self) -> LightResult<Vec<u8>> {
        Ok(self.command.as_bytes().to_vec())
    }

    fn on(&mut self, color: Rgb, led: u8) -> LightResult<()> {
        self.batch_update(|light| {
            light.set_color(color);
            light.command = command::solid_color(color, led);
            Ok(())
        })
    }
}

fn build_flag(core: LightCore) -> LightResult<Box<dyn Light>> {
    Ok(Box::new(Flag::new(core)))
}

fn build_mute(core: LightCore) -> LightResult<Box<dyn Light>> {
    Ok(Box::new(Mute::new(core)))
}

fn build_busy_tag(core: LightCore) -> LightResult<Box<dyn Light>> {
    Ok(Box::new(BusyTag::new(core)))
}
