//! Tests for the EPOS Busylight.

use busylight_hid::Hardware;

use super::epos::{BUSYLIGHT, Busylight, State, action, report};
use super::testing::{last_write, mock_core};
use crate::color::Rgb;
use crate::error::LightResult;
use crate::light::Light;

#[test]
fn test_state_starts_clear() {
    let state = State::new();
    assert_eq!(state.to_bytes(), vec![0; 10]);
    assert_eq!(state.color(), Rgb::OFF);
    assert_eq!(state.color1(), Rgb::OFF);
}

#[test]
fn test_led_addressing() {
    let mut state = State::new();
    state.set_color(Rgb::RED, 0);
    assert_eq!((state.color0(), state.color1()), (Rgb::RED, Rgb::RED));

    state.clear();
    state.set_color(Rgb::GREEN, 1);
    assert_eq!((state.color0(), state.color1()), (Rgb::GREEN, Rgb::OFF));

    state.clear();
    state.set_color(Rgb::BLUE, 2);
    assert_eq!((state.color0(), state.color1()), (Rgb::OFF, Rgb::BLUE));
}

#[test]
fn test_set_color_report() {
    let mut state = State::new();
    state.set_color(Rgb::new(200, 100, 50), 0);
    assert_eq!(state.get(State::REPORT), report::ONE);
    assert_eq!(state.get(State::ACTION), action::SET_COLOR);
    assert_eq!(
        state.to_bytes(),
        vec![0x01, 0x12, 0x02, 200, 100, 50, 200, 100, 50, 0x01]
    );
    state.set_color(Rgb::OFF, 0);
    assert_eq!(state.get(State::ON), 0);
}

#[test]
fn test_on_and_reset() -> LightResult<()> {
    let (core, device) = mock_core(&BUSYLIGHT, Hardware::hid(0x1395, 0x0074, "/dev/hidraw7"))?;
    let mut light = Busylight::new(core);
    light.on(Rgb::new(1, 2, 3), 2)?;
    assert_eq!(
        last_write(&device),
        vec![0x01, 0x12, 0x02, 0, 0, 0, 1, 2, 3, 0x01]
    );
    assert_eq!(light.color(), Rgb::new(1, 2, 3));

    light.reset()?;
    assert_eq!(
        last_write(&device),
        vec![0x01, 0x12, 0x02, 0, 0, 0, 0, 0, 0, 0x00]
    );
    assert_eq!(light.state().color1(), Rgb::OFF);
    Ok(())
}
