//! Tests for the Blynclight protocol.

use busylight_hid::Hardware;
use busylight_hid::mock::MockTransport;

use super::embrava::{BLYNCLIGHT, BLYNCLIGHT_MINI, BLYNCLIGHT_PLUS, Blynclight, FlashSpeed, State};
use super::testing::{last_write, mock_core};
use crate::color::Rgb;
use crate::error::LightResult;
use crate::light::Light;

fn blynclight() -> LightResult<(Blynclight, MockTransport)> {
    let (core, device) = mock_core(&BLYNCLIGHT, Hardware::hid(0x2C0D, 0x0001, "/dev/hidraw5"))?;
    Ok((Blynclight::new(core), device))
}

#[test]
fn test_state_layout() {
    let mut state = State::new();
    state.set_color(Rgb::new(0x01, 0x03, 0x02));
    assert_eq!(state.to_bytes(), vec![0, 0x01, 0x02, 0x03, 0, 0, 0, 0xFF, 0x22]);

    state.put(State::MUTE, 1);
    state.put(State::VOLUME, 10);
    state.put(State::MUSIC, 5);
    state.put(State::REPEAT, 1);
    assert_eq!(state.word().as_bytes(), &[0x01, 0x02, 0x03, 0x00, 0x15, 0x8A]);
}

#[test]
fn test_dark_color_sets_off_and_clears_effects() {
    let mut state = State::new();
    state.put(State::FLASH, 1);
    state.put(State::DIM, 1);
    state.set_color(Rgb::OFF);
    assert_eq!(state.get(State::OFF), 1);
    assert_eq!(state.get(State::FLASH), 0);
    assert_eq!(state.get(State::DIM), 0);

    state.set_color(Rgb::RED);
    assert_eq!(state.get(State::OFF), 0);
}

#[test]
fn test_reset_state() {
    let mut state = State::new();
    state.set_color(Rgb::WHITE);
    state.put(State::PLAY, 1);
    state.reset();
    assert_eq!(state.color(), Rgb::OFF);
    assert_eq!(state.get(State::OFF), 1);
    assert_eq!(state.get(State::SPEED), 1);
    assert_eq!(state.get(State::PLAY), 0);
}

#[test]
fn test_display_and_debug() {
    let mut state = State::new();
    state.set_color(Rgb::new(1, 3, 2));
    state.put(State::OFF, 1);
    state.put(State::DIM, 1);
    state.put(State::SPEED, 2);
    state.put(State::REPEAT, 1);
    state.put(State::MUSIC, 5);
    state.put(State::VOLUME, 10);
    state.put(State::MUTE, 1);
    let expected = [
        "red:    0x01",
        "blue:   0x02",
        "green:  0x03",
        "off:    1",
        "dim:    1",
        "flash:  0",
        "speed:  2",
        "repeat: 1",
        "play:   0",
        "music:  5",
        "volume: 10",
        "mute:   1",
    ]
    .join("\n");
    assert_eq!(state.to_string(), expected);
    assert_eq!(format!("{state:?}"), "State(0x01020313158a)");
}

#[test]
fn test_flash_defaults_to_slow() -> LightResult<()> {
    let (mut light, device) = blynclight()?;
    light.flash(Rgb::GREEN, None)?;
    assert_eq!(light.state().get(State::FLASH), 1);
    assert_eq!(light.state().get(State::SPEED), FlashSpeed::Slow as u64);
    assert_eq!(light.color(), Rgb::GREEN);

    light.flash(Rgb::GREEN, Some(FlashSpeed::Fast))?;
    assert_eq!(light.state().get(State::SPEED), 4);
    light.stop_flashing()?;
    assert_eq!(light.state().get(State::FLASH), 0);
    assert_eq!(device.write_history().len(), 3);
    Ok(())
}

#[test]
fn test_sound_controls() -> LightResult<()> {
    let (mut light, device) = blynclight()?;
    light.mute()?;
    light.play_sound(3, 2, true)?;
    let state = light.state();
    assert_eq!(state.get(State::PLAY), 1);
    assert_eq!(state.get(State::MUSIC), 3);
    assert_eq!(state.get(State::VOLUME), 2);
    assert_eq!(state.get(State::REPEAT), 1);
    assert_eq!(state.get(State::MUTE), 0);

    light.stop_sound()?;
    assert_eq!(light.state().get(State::PLAY), 0);
    light.mute()?;
    assert_eq!(light.state().get(State::MUTE), 1);
    light.unmute()?;
    assert_eq!(light.state().get(State::MUTE), 0);
    assert_eq!(device.write_history().len(), 5);
    Ok(())
}

#[test]
fn test_dim_and_off() -> LightResult<()> {
    let (mut light, device) = blynclight()?;
    light.on(Rgb::BLUE, 0)?;
    light.dim()?;
    assert!(light.is_dim());
    assert_eq!(last_write(&device), vec![0, 0, 0xFF, 0, 0x02, 0, 0, 0xFF, 0x22]);
    light.bright()?;
    assert!(!light.is_dim());

    light.dim()?;
    light.off(0)?;
    assert!(!light.is_dim());
    assert_eq!(last_write(&device), vec![0, 0, 0, 0, 0x01, 0, 0, 0xFF, 0x22]);
    Ok(())
}

#[test]
fn test_reset_writes_dark_state() -> LightResult<()> {
    let (mut light, device) = blynclight()?;
    light.play_sound(1, 1, false)?;
    light.reset()?;
    assert_eq!(last_write(&device), vec![0, 0, 0, 0, 0x09, 0, 0, 0xFF, 0x22]);
    assert!(!light.is_lit());
    Ok(())
}

#[test]
fn test_family_ids() {
    for (driver, ids) in [
        (&BLYNCLIGHT, vec![(0x2C0D, 0x0001), (0x2C0D, 0x000C), (0x0E53, 0x2516)]),
        (&BLYNCLIGHT_MINI, vec![(0x2C0D, 0x000A), (0x0E53, 0x2517)]),
        (&BLYNCLIGHT_PLUS, vec![(0x2C0D, 0x0002), (0x2C0D, 0x0010)]),
    ] {
        for (vid, pid) in ids {
            assert!(driver.claims(&Hardware::hid(vid, pid, "/dev/hidraw0")));
        }
        assert_eq!(driver.vendor, "Embrava");
    }
}
