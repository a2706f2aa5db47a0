//! VPC embedded controller types shared between the platform and the VPC service
pub mod config;
pub mod event;

pub use config::{Capabilities, ConfigWord, Graphics};
pub use event::{EventBit, EventWord};

/// EC command code handed to the VPC command slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command(pub u32);

impl Command {
    /// Low byte of the pending event word
    pub const VPC1: Command = Command(0x10);
    /// Backlight power, follows the lid
    pub const BL_POWER: Command = Command(0x18);
    /// High byte of the pending event word
    pub const VPC2: Command = Command(0x1A);
    /// Touchpad enable state
    pub const TOUCHPAD: Command = Command(0x1B);
    /// Last special button pressed
    pub const SPECIAL_BUTTONS: Command = Command(0x31);
}

impl From<u32> for Command {
    fn from(code: u32) -> Self {
        Command(code)
    }
}

/// Status register slot addressed by `VPCR`/`VPCW`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum Slot {
    /// Data slot, carries the write payload or the read result
    Data = 0,
    /// Command slot, reads back zero once the EC has consumed the command
    Command = 1,
}

impl From<Slot> for u32 {
    fn from(slot: Slot) -> Self {
        slot as u32
    }
}

/// Special button code reported for Fn+Q
pub const SPECIAL_BUTTON_COOLING: u32 = 0x40;
