//! Tests for the Luxafor family and the Busy Tag.

use busylight_hid::Hardware;
use busylight_hid::mock::MockTransport;
use tracing_test::traced_test;

use super::DRIVERS;
use super::luxafor::{
    BLUETOOTH, BUSY_TAG, BusyTag, Command, FLAG, Flag, Leds, MUTE, Mute, ORB, State, command,
};
use super::testing::{last_write, mock_core};
use crate::color::Rgb;
use crate::error::{LightError, LightResult};
use crate::light::Light;

fn luxafor(product: &str) -> Hardware {
    Hardware::hid(0x04D8, 0xF372, "/dev/hidraw2").with_product(product)
}

fn mute() -> LightResult<(Mute, MockTransport)> {
    let (core, device) = mock_core(&MUTE, luxafor("LUXAFOR MUTE"))?;
    Ok((Mute::new(core), device))
}

#[test]
fn test_product_string_picks_model() {
    let cases = [
        ("LUXAFOR FLAG", &FLAG),
        ("Luxafor Orb", &ORB),
        ("Luxafor Mute", &MUTE),
        ("LUXAFOR BT", &BLUETOOTH),
    ];
    for (product, expected) in cases {
        let hardware = luxafor(product);
        let claimants: Vec<_> = DRIVERS.iter().filter(|d| d.claims(&hardware)).collect();
        assert_eq!(claimants, vec![&expected], "{product}");
    }
}

#[test]
#[traced_test]
fn test_missing_product_string_is_not_claimed() {
    let hardware = Hardware::hid(0x04D8, 0xF372, "/dev/hidraw2");
    assert!(!FLAG.claims(&hardware));
    assert!(!FLAG.claims(&luxafor("Something Else")));
    assert!(logs_contain("problem"));
}

#[test]
fn test_color_and_fade_bytes() -> LightResult<()> {
    let mut state = State::new();
    state.color = Rgb::new(255, 128, 64);
    assert_eq!(state.to_bytes()?, vec![1, 0xFF, 255, 128, 64]);

    state.command = Command::Fade;
    state.leds = Leds::Led1;
    state.fade = 10;
    state.repeat = 5;
    assert_eq!(state.to_bytes()?, vec![2, 1, 255, 128, 64, 10, 5]);
    Ok(())
}

#[test]
#[traced_test]
fn test_unsupported_command() {
    let state = State {
        command: Command::Strobe,
        ..State::new()
    };
    let error = state.to_bytes().err();
    assert!(
        matches!(&error, Some(LightError::Unsupported(message)) if message == "Unsupported command: 3"),
        "{error:?}"
    );
    assert!(logs_contain("Unsupported command: 3"));
}

#[test]
fn test_led_selector_fallback() {
    assert_eq!(Leds::from_led(0), Leds::All);
    assert_eq!(Leds::from_led(3), Leds::Led3);
    assert_eq!(Leds::from_led(0x42), Leds::Front);
    assert_eq!(Leds::from_led(7), Leds::All);
}

#[test]
fn test_flag_on_and_fade() -> LightResult<()> {
    let (core, device) = mock_core(&FLAG, luxafor("LUXAFOR FLAG"))?;
    let mut light = Flag::new(core);
    light.on(Rgb::RED, 0)?;
    assert_eq!(last_write(&device), vec![1, 0xFF, 255, 0, 0]);
    light.on(Rgb::BLUE, 0x41)?;
    assert_eq!(last_write(&device), vec![1, 0x41, 0, 0, 255]);
    light.fade(Rgb::GREEN, 2, 20, 3)?;
    assert_eq!(last_write(&device), vec![2, 2, 0, 255, 0, 20, 3]);
    assert_eq!(light.color(), Rgb::GREEN);
    light.off(0)?;
    assert_eq!(last_write(&device), vec![1, 0xFF, 0, 0, 0]);
    Ok(())
}

#[test]
fn test_mute_button_reports() -> LightResult<()> {
    let (mut light, device) = mute()?;
    assert!(light.is_button());

    device.queue_read(vec![131, 1, 0, 0, 0, 0, 0, 0]);
    assert!(light.button_on()?);
    // Unknown frames keep the last state.
    device.queue_read(vec![99, 0, 0, 0, 0, 0, 0, 0]);
    assert!(light.button_on()?);
    device.queue_read(vec![66, 0, 0, 0, 0, 0, 0, 0]);
    assert!(!light.button_on()?);
    device.queue_read(vec![131, 255]);
    assert!(light.button_on()?);
    device.queue_read(vec![131]);
    assert!(!light.button_on()?);

    assert!(device.read_requests().iter().all(|r| *r == (8, 200)));
    Ok(())
}

#[test]
fn test_mute_empty_read_is_not_pressed() -> LightResult<()> {
    let (mut light, _device) = mute()?;
    assert!(!light.button_on()?);
    Ok(())
}

#[test]
fn test_busy_tag_solid_color() {
    assert_eq!(command::solid_color(Rgb::new(255, 128, 64), 0), "AT+SC=127,ff8040");
    assert_eq!(command::solid_color(Rgb::new(200, 100, 50), 3), "AT+SC=8,c86432");
    assert_eq!(command::solid_color(Rgb::new(50, 50, 50), 7), "AT+SC=128,323232");
    assert_eq!(command::GET_LAST_RESET_REASON_CORE1, "AT+GLRR1");
}

#[test]
fn test_busy_tag_writes_command_text() -> LightResult<()> {
    let hardware = Hardware::serial(0x303A, 0x81DF, "/dev/ttyACM1");
    let (core, device) = mock_core(&BUSY_TAG, hardware)?;
    let mut light = BusyTag::new(core);
    assert_eq!(light.vendor(), "Busy Tag");
    assert_eq!(light.command(), "");
    assert_eq!(light.to_bytes()?, Vec::<u8>::new());

    light.on(Rgb::RED, 0)?;
    assert_eq!(last_write(&device), b"AT+SC=127,ff0000".to_vec());
    light.send(command::GET_DEVICE_NAME)?;
    assert_eq!(last_write(&device), b"AT+GDN".to_vec());
    Ok(())
}
