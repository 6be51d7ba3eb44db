//! Kuando Busylight Alpha and Omega.
//!
//! The device runs a seven step program followed by a footer carrying a
//! checksum. A lit Busylight falls back to its idle pattern unless the
//! host re-arms its watchdog, so [`Busylight::on`] starts a named
//! `keepalive` task that rewrites the first step with a keep-alive opcode
//! every `round(interval / 2)` seconds until the light is turned off.

use std::cmp::Ordering;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use busylight_word::{BitField, Field, Word};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::color::Rgb;
use crate::config::MAX_KEEPALIVE_INTERVAL;
use crate::driver::Driver;
use crate::error::{LightError, LightResult, TaskError};
use crate::light::{Light, LightCore};
use crate::link::DeviceLink;
use crate::tasks::TaskPriority;

pub const VENDOR: &str = "Kuando";

/// Name of the heartbeat task attached to a lit Busylight.
pub const KEEPALIVE_TASK: &str = "keepalive";

pub static BUSYLIGHT_ALPHA: Driver = Driver::new(
    VENDOR,
    "Busylight Alpha",
    &[
        (0x04D8, 0xF848, "Busylight Alpha"),
        (0x27BB, 0x3BCA, "Busylight Alpha"),
        (0x27BB, 0x3BCB, "Busylight Alpha"),
        (0x27BB, 0x3BCE, "Busylight Alpha"),
    ],
    build,
);

pub static BUSYLIGHT_OMEGA: Driver = Driver::new(
    VENDOR,
    "Busylight Omega",
    &[
        (0x27BB, 0x3BCD, "Busylight Omega"),
        (0x27BB, 0x3BCF, "Busylight Omega"),
    ],
    build,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    Jump = 0x1,
    Reset = 0x2,
    Boot = 0x4,
    KeepAlive = 0x8,
}

/// Built-in ring tones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Ring {
    #[default]
    Off = 0,
    OpenOffice = 136,
    Quiet = 144,
    Funky = 152,
    FairyTale = 160,
    KuandoTrain = 168,
    TelephoneNordic = 176,
    TelephoneOriginal = 184,
    TelephonePickMeUp = 192,
    Buzz = 216,
}

impl From<Ring> for u8 {
    fn from(ring: Ring) -> Self {
        ring as u8
    }
}

/// `numerator / denominator` rounded half to even.
fn div_round_half_even(numerator: u32, denominator: u32) -> u32 {
    let quotient = numerator / denominator;
    let twice_remainder = (numerator % denominator) * 2;
    match twice_remainder.cmp(&denominator) {
        Ordering::Greater => quotient + 1,
        Ordering::Equal => quotient + (quotient & 1),
        Ordering::Less => quotient,
    }
}

/// Device channels run 0-100.
fn to_device_channel(value: u8) -> u64 {
    u64::from(div_round_half_even(u32::from(value) * 100, 255))
}

fn from_device_channel(value: u64) -> u8 {
    let value = u32::try_from(value.min(100)).unwrap_or(100);
    u8::try_from(div_round_half_even(value * 255, 100)).unwrap_or(u8::MAX)
}

/// Parameters of a jump step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Jump {
    pub color: Rgb,
    pub target: u8,
    pub repeat: u8,
    pub on_time: u8,
    pub off_time: u8,
    pub update: u8,
    pub ring: u8,
    pub volume: u8,
}

impl Jump {
    pub fn new(color: Rgb) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    pub fn with_ring(mut self, ring: Ring, volume: u8) -> Self {
        self.ring = ring.into();
        self.volume = volume;
        self
    }
}

/// One 64 bit program step.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Step {
    word: Word,
}

impl Default for Step {
    fn default() -> Self {
        Self::new()
    }
}

impl Step {
    pub const OPCODE: BitField = BitField::new(60, 64);
    pub const OPERAND: BitField = BitField::new(56, 60);
    pub const BODY: BitField = BitField::new(0, 56);
    pub const REPEAT: BitField = BitField::new(48, 56);
    pub const RED: BitField = BitField::new(40, 48);
    pub const GREEN: BitField = BitField::new(32, 40);
    pub const BLUE: BitField = BitField::new(24, 32);
    pub const DUTY_CYCLE_ON: BitField = BitField::new(16, 24);
    pub const DUTY_CYCLE_OFF: BitField = BitField::new(8, 16);
    pub const UPDATE: BitField = BitField::new(7, 8);
    pub const RINGTONE: BitField = BitField::new(3, 7);
    pub const VOLUME: BitField = BitField::new(0, 3);

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

    /// Color scaled back up to 0-255.
    pub fn color(&self) -> Rgb {
        Rgb::new(
            from_device_channel(self.get(Self::RED)),
            from_device_channel(self.get(Self::GREEN)),
            from_device_channel(self.get(Self::BLUE)),
        )
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.put(Self::RED, to_device_channel(color.red));
        self.put(Self::GREEN, to_device_channel(color.green));
        self.put(Self::BLUE, to_device_channel(color.blue));
    }

    fn command(&mut self, opcode: OpCode, operand: u64) {
        self.put(Self::OPCODE, opcode as u64);
        self.put(Self::OPERAND, operand & 0xF);
        self.put(Self::BODY, 0);
    }

    /// Re-arm the watchdog for `timeout` seconds (low four bits).
    pub fn keep_alive(&mut self, timeout: u8) {
        self.command(OpCode::KeepAlive, timeout.into());
    }

    pub fn boot(&mut self) {
        self.command(OpCode::Boot, 0);
    }

    pub fn reset(&mut self) {
        self.command(OpCode::Reset, 0);
    }

    pub fn jump(&mut self, jump: &Jump) {
        self.put(Self::OPCODE, OpCode::Jump as u64);
        self.put(Self::OPERAND, u64::from(jump.target & 0xF));
        self.set_color(jump.color);
        self.put(Self::REPEAT, jump.repeat.into());
        self.put(Self::DUTY_CYCLE_ON, jump.on_time.into());
        self.put(Self::DUTY_CYCLE_OFF, jump.off_time.into());
        self.put(Self::UPDATE, u64::from(jump.update & 0x1));
        self.put(Self::RINGTONE, u64::from(jump.ring & 0xF));
        self.put(Self::VOLUME, u64::from(jump.volume & 0x3));
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.word.to_bytes()
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step({})", self.word.hex())
    }
}

/// Trailing 64 bit block: sensor settings, padding and checksum.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Footer {
    word: Word,
}

impl Default for Footer {
    fn default() -> Self {
        Self::new()
    }
}

impl Footer {
    pub const SENSITIVITY: BitField = BitField::new(56, 64);
    pub const TIMEOUT: BitField = BitField::new(48, 56);
    pub const TRIGGER: BitField = BitField::new(40, 48);
    pub const PADDING: BitField = BitField::new(16, 40);
    pub const CHECKSUM: BitField = BitField::new(0, 16);

    pub fn new() -> Self {
        let mut footer = Self {
            word: Word::from_array([0; 8]),
        };
        footer.put(Self::PADDING, 0xFF_FFFF);
        footer
    }

    pub fn get(&self, field: BitField) -> u64 {
        field.get(&self.word)
    }

    pub fn put(&mut self, field: BitField, value: u64) {
        field.put(&mut self.word, value);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.word.to_bytes()
    }
}

impl fmt::Debug for Footer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Footer({})", self.word.hex())
    }
}

/// Number of program steps in a report.
pub const STEP_COUNT: usize = 7;

/// The full 64 byte report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    steps: [Step; STEP_COUNT],
    footer: Footer,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    pub fn new() -> Self {
        Self {
            steps: std::array::from_fn(|_| Step::new()),
            footer: Footer::new(),
        }
    }

    pub fn steps(&self) -> &[Step; STEP_COUNT] {
        &self.steps
    }

    pub fn steps_mut(&mut self) -> &mut [Step; STEP_COUNT] {
        &mut self.steps
    }

    /// The step the device runs first.
    pub fn first_step(&self) -> &Step {
        let [first, ..] = &self.steps;
        first
    }

    pub fn first_step_mut(&mut self) -> &mut Step {
        let [first, ..] = &mut self.steps;
        first
    }

    pub fn footer(&self) -> &Footer {
        &self.footer
    }

    pub fn footer_mut(&mut self) -> &mut Footer {
        &mut self.footer
    }

    /// Serialize every step and the footer, with the checksum covering the
    /// 62 bytes that precede it.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf: Vec<u8> = self.steps.iter().flat_map(Step::to_bytes).collect();
        let mut footer = self.footer.clone();
        footer.put(Footer::CHECKSUM, 0);
        let footer_bytes = footer.to_bytes();
        let body_len = footer_bytes.len().saturating_sub(2);
        buf.extend(footer_bytes.iter().take(body_len));
        let checksum = buf.iter().map(|byte| u64::from(*byte)).sum::<u64>() & 0xFFFF;
        footer.put(Footer::CHECKSUM, checksum);
        buf.extend(footer.to_bytes().into_iter().skip(body_len));
        buf
    }
}

/// Seconds slept between heartbeats for a device `interval`.
pub fn keepalive_sleep(interval: u8) -> Duration {
    Duration::from_secs(div_round_half_even(interval.into(), 2).into())
}

/// Build the heartbeat loop for a light sharing `link` and `state`.
///
/// Each iteration rewrites the first step with a keep-alive carrying
/// `interval`, writes the report and sleeps [`keepalive_sleep`]. The loop
/// only ends when a write fails or the task is aborted.
///
/// # Errors
///
/// [`LightError::InvalidArgument`] when `interval` exceeds 15 seconds.
/// Nothing is scheduled in that case.
pub fn keepalive(
    link: DeviceLink,
    state: Arc<Mutex<State>>,
    interval: u8,
) -> LightResult<impl Future<Output = LightResult<()>> + Send + 'static> {
    if interval > MAX_KEEPALIVE_INTERVAL {
        return Err(LightError::InvalidArgument(
            "Keepalive interval must be between 0 and 15 seconds.".to_string(),
        ));
    }
    Ok(run_keepalive(link, state, interval))
}

async fn run_keepalive(link: DeviceLink, state: Arc<Mutex<State>>, interval: u8) -> LightResult<()> {
    let pause = keepalive_sleep(interval);
    loop {
        {
            let mut state = state.lock();
            state.first_step_mut().keep_alive(interval);
            link.write(&state.to_bytes())?;
        }
        tokio::time::sleep(pause).await;
    }
}

/// Busylight Alpha and Omega.
///
/// The state is shared with the keep-alive task, and every write happens
/// while holding its lock.
#[derive(Debug)]
pub struct Busylight {
    core: LightCore,
    state: Arc<Mutex<State>>,
}

impl Busylight {
    pub fn new(core: LightCore) -> Self {
        Self {
            core,
            state: Arc::new(Mutex::new(State::new())),
        }
    }

    pub fn state(&self) -> Arc<Mutex<State>> {
        Arc::clone(&self.state)
    }

    /// Run `jump` as the first step.
    ///
    /// # Errors
    ///
    /// Transport failures from the write.
    pub fn jump(&mut self, jump: &Jump) -> LightResult<()> {
        self.batch_update(|light| {
            light.state.lock().first_step_mut().jump(jump);
            Ok(())
        })
    }

    fn start_keepalive(&self) -> LightResult<()> {
        let link = self.core.link().clone();
        let state = Arc::clone(&self.state);
        let interval = self.core.options().keepalive_interval;
        let started = self
            .core
            .tasks()
            .add_task(KEEPALIVE_TASK, TaskPriority::Normal, false, || {
                keepalive(link, state, interval)
            });
        match started {
            Ok(_) => Ok(()),
            Err(LightError::Task(TaskError::NoRuntime(name))) => {
                warn!(
                    "No async runtime for '{name}' on {}, the light will revert to idle",
                    self.core.hardware().path
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
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
        Ok(self.state.lock().to_bytes())
    }

    fn update(&self) -> LightResult<()> {
        let state = self.state.lock();
        self.core.write(&state.to_bytes())
    }

    fn on(&mut self, color: Rgb, _led: u8) -> LightResult<()> {
        self.set_color(color);
        self.jump(&Jump::new(color))?;
        self.start_keepalive()
    }

    fn off(&mut self, _led: u8) -> LightResult<()> {
        self.set_color(Rgb::OFF);
        self.jump(&Jump::new(Rgb::OFF))?;
        if self.cancel_task(KEEPALIVE_TASK).is_some() {
            debug!("Stopped keepalive for {}", self.core.hardware().path);
        }
        Ok(())
    }
}

fn build(core: LightCore) -> LightResult<Box<dyn Light>> {
    Ok(Box::new(Busylight::new(core)))
}
