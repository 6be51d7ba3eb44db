//! RGB colors and the per-light color state.

use serde::{Deserialize, Serialize};

/// An 8-bit per channel color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Any channel non-zero.
    pub const fn is_lit(&self) -> bool {
        self.red != 0 || self.green != 0 || self.blue != 0
    }

    /// Reorder to the green, red, blue layout some firmware stores.
    pub const fn to_grb(self) -> [u8; 3] {
        [self.green, self.red, self.blue]
    }

    /// Inverse of [`Rgb::to_grb`].
    pub const fn from_grb([green, red, blue]: [u8; 3]) -> Self {
        Self { red, green, blue }
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self { red, green, blue }
    }
}

impl From<Rgb> for (u8, u8, u8) {
    fn from(color: Rgb) -> Self {
        (color.red, color.green, color.blue)
    }
}

/// Color most recently requested of a light.
///
/// Drivers whose wire state carries its own color channels keep this in
/// step with that state; the rest serialize directly from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorState {
    color: Rgb,
}

impl ColorState {
    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    pub fn red(&self) -> u8 {
        self.color.red
    }

    pub fn green(&self) -> u8 {
        self.color.green
    }

    pub fn blue(&self) -> u8 {
        self.color.blue
    }

    pub fn is_lit(&self) -> bool {
        self.color.is_lit()
    }
}
