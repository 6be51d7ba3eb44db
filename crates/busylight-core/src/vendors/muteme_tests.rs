//! Tests for the MuteMe flag byte and plug probe.

use busylight_hid::Hardware;
use busylight_hid::mock::MockTransport;

use super::muteme::{MUTEME, MUTEME_MINI, MuteMe, State};
use super::testing::{last_write, mock_core};
use crate::color::Rgb;
use crate::error::{LightError, LightResult};
use crate::light::Light;

fn muteme() -> LightResult<(MuteMe, MockTransport)> {
    let (core, device) = mock_core(&MUTEME, Hardware::hid(0x16C0, 0x27DB, "/dev/hidraw5"))?;
    Ok((MuteMe::new(core), device))
}

#[test]
fn test_state_flag_positions() {
    let mut state = State::new();
    assert_eq!(state.color(), Rgb::OFF);
    state.put(State::DIM, true);
    assert_eq!(state.value(), 0b1_0000);
    state.put(State::BLINK, true);
    state.put(State::SLEEP, true);
    assert_eq!(state.value(), 0b111_0000);
    assert_eq!(state.get(State::SLEEP), 0xFF);
}

#[test]
fn test_color_to_flags() {
    let cases = [
        (Rgb::new(0, 0, 0), 0b000),
        (Rgb::new(255, 0, 0), 0b001),
        (Rgb::new(0, 255, 0), 0b010),
        (Rgb::new(0, 0, 255), 0b100),
        (Rgb::new(255, 255, 0), 0b011),
        (Rgb::new(255, 0, 255), 0b101),
        (Rgb::new(0, 255, 255), 0b110),
        (Rgb::new(255, 255, 255), 0b111),
    ];
    let mut state = State::new();
    for (color, value) in cases {
        state.set_color(color);
        assert_eq!(state.to_bytes(), vec![0x00, value], "{color:?}");
        assert_eq!(state.color(), color);
    }
    state.set_color(Rgb::new(1, 0, 3));
    assert_eq!(state.color(), Rgb::new(0xFF, 0, 0xFF));
}

#[test]
fn test_even_channels_are_off() {
    let mut state = State::new();
    state.set_color(Rgb::new(2, 0, 0));
    assert_eq!(state.to_bytes(), vec![0x00, 0x00]);
    state.set_color(Rgb::new(128, 254, 64));
    assert_eq!(state.to_bytes(), vec![0x00, 0x00]);
    state.set_color(Rgb::new(129, 0, 0));
    assert_eq!(state.to_bytes(), vec![0x00, 0x01]);
    state.set(State::DIM, 6);
    assert_eq!(state.get(State::DIM), 0);
    state.set(State::DIM, 7);
    assert_eq!(state.get(State::DIM), 0xFF);
}

#[test]
fn test_on_writes_flag_byte() -> LightResult<()> {
    let (mut light, device) = muteme()?;
    assert!(light.is_button());
    light.on(Rgb::new(255, 0, 255), 0)?;
    assert_eq!(last_write(&device), vec![0x00, 0x05]);
    assert_eq!(light.color(), Rgb::new(255, 0, 255));
    light.set_dim(true)?;
    assert_eq!(last_write(&device), vec![0x00, 0x15]);
    light.off(0)?;
    assert_eq!(last_write(&device), vec![0x00, 0x10]);
    light.on(Rgb::new(128, 0, 0), 0)?;
    assert_eq!(last_write(&device), vec![0x00, 0x10]);
    light.on(Rgb::new(2, 0, 0), 0)?;
    assert_eq!(last_write(&device), vec![0x00, 0x10]);
    Ok(())
}

#[test]
fn test_button_read_is_unsupported() -> LightResult<()> {
    let (mut light, _device) = muteme()?;
    assert!(matches!(light.button_on(), Err(LightError::Unsupported(_))));
    Ok(())
}

#[test]
fn test_plug_probe() -> LightResult<()> {
    let (light, device) = muteme()?;
    assert!(light.is_pluggedin());
    assert_eq!(device.feature_history(), vec![vec![0; 8]]);
    device.fail_writes(true);
    assert!(!light.is_pluggedin());
    Ok(())
}

#[test]
fn test_mini_ids() {
    assert!(MUTEME_MINI.claims(&Hardware::hid(0x20A0, 0x42DB, "x")));
    assert!(!MUTEME_MINI.claims(&Hardware::hid(0x20A0, 0x42DA, "x")));
    assert!(MUTEME.claims(&Hardware::hid(0x20A0, 0x42DA, "x")));
}
