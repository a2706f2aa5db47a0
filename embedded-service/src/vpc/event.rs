//! VPC pending event word
use bitflags::bitflags;

/// Pending VPC events, assembled from the VPC1 and VPC2 registers
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventWord(pub u16);

bitflags! {
    impl EventWord: u16 {
        /// Special button pressed, see `SPECIAL_BUTTONS`
        const SPECIAL_BUTTONS = 1 << 0;
        /// Fn+Space keyboard backlight
        const KEYBOARD_BACKLIGHT = 1 << 1;
        /// Backlight power changed, follows the lid
        const DISPLAY = 1 << 2;
        /// Fn+F6 touchpad toggle
        const TOUCHPAD = 1 << 5;
        /// Fn+F8 camera
        const CAMERA = 1 << 7;
        /// Fn+F4 microphone
        const MICROPHONE = 1 << 8;
        /// Touchpad switched on
        const TOUCHPAD_ON = 1 << 10;
        /// Fn+F7 airplane mode
        const AIRPLANE_MODE = 1 << 13;
    }
}

impl EventWord {
    /// Combine the low (VPC1) and high (VPC2) register values
    pub fn from_registers(low: u32, high: u32) -> Self {
        Self(((high << 8) | low) as u16)
    }

    /// Iterate over pending bit positions in ascending order
    pub fn pending(self) -> impl Iterator<Item = u8> {
        (0..u16::BITS as u8).filter(move |bit| self.0 & (1 << bit) != 0)
    }
}

/// Meaning of a single event bit
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventBit {
    /// Special button, details in the special buttons register
    SpecialButtons,
    /// Keyboard backlight key
    KeyboardBacklight,
    /// Backlight power, details in the backlight power register
    Display,
    /// Touchpad toggle, details in the touchpad register
    Touchpad,
    /// Camera key
    Camera,
    /// Microphone key
    Microphone,
    /// Touchpad switched on
    TouchpadOn,
    /// Airplane mode key
    AirplaneMode,
    /// Bit without a known meaning
    Unknown(u8),
}

impl EventBit {
    /// Look up the meaning of bit position `bit`
    pub const fn from_bit(bit: u8) -> Self {
        if bit >= u16::BITS as u8 {
            return EventBit::Unknown(bit);
        }

        match EventWord(1 << bit) {
            EventWord::SPECIAL_BUTTONS => EventBit::SpecialButtons,
            EventWord::KEYBOARD_BACKLIGHT => EventBit::KeyboardBacklight,
            EventWord::DISPLAY => EventBit::Display,
            EventWord::TOUCHPAD => EventBit::Touchpad,
            EventWord::CAMERA => EventBit::Camera,
            EventWord::MICROPHONE => EventBit::Microphone,
            EventWord::TOUCHPAD_ON => EventBit::TouchpadOn,
            EventWord::AIRPLANE_MODE => EventBit::AirplaneMode,
            _ => EventBit::Unknown(bit),
        }
    }
}
