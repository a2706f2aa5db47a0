//! VPC configuration word and the capabilities it describes
use bitfield::bitfield;

bitfield! {
    /// Configuration word returned by `_CFG`
    #[derive(Copy, Clone, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct ConfigWord(u32);
    impl Debug;
    /// Installed graphics adapter class
    pub u8, graphics_raw, _: 10, 8;
    /// Bluetooth module present
    pub bluetooth, _: 16;
    /// 3G/WWAN module present
    pub wwan, _: 17;
    /// Wi-Fi module present
    pub wifi, _: 18;
    /// Camera present
    pub camera, _: 19;
}

/// Graphics adapter class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Graphics {
    /// Intel integrated graphics only
    Integrated,
    /// ATI discrete graphics
    DiscreteAti,
    /// Nvidia discrete graphics
    DiscreteNvidia,
    /// Intel with switchable ATI
    HybridAti,
    /// Intel with switchable Nvidia
    HybridNvidia,
    /// Unrecognized class, carries the raw field
    Unknown(u8),
}

impl Graphics {
    /// Decode the 3-bit graphics field, never fails
    pub const fn from_raw(raw: u8) -> Self {
        match raw & 0x7 {
            1 => Graphics::Integrated,
            2 => Graphics::DiscreteAti,
            3 => Graphics::DiscreteNvidia,
            4 => Graphics::HybridAti,
            5 => Graphics::HybridNvidia,
            other => Graphics::Unknown(other),
        }
    }

    /// Human readable label
    pub const fn label(&self) -> &'static str {
        match self {
            Graphics::Integrated => "Intel",
            Graphics::DiscreteAti => "ATI",
            Graphics::DiscreteNvidia => "Nvidia",
            Graphics::HybridAti => "Intel and ATI",
            Graphics::HybridNvidia => "Intel and Nvidia",
            Graphics::Unknown(_) => "Unknown",
        }
    }
}

/// Hardware options decoded from the configuration word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities {
    /// Graphics adapter class
    pub graphics: Graphics,
    /// Bluetooth present
    pub bluetooth: bool,
    /// WWAN present
    pub wwan: bool,
    /// Wi-Fi present
    pub wifi: bool,
    /// Camera present
    pub camera: bool,
}

impl Capabilities {
    /// Decode a raw configuration word
    pub fn decode(config: u32) -> Self {
        ConfigWord(config).into()
    }
}

impl From<ConfigWord> for Capabilities {
    fn from(config: ConfigWord) -> Self {
        Self {
            graphics: Graphics::from_raw(config.graphics_raw()),
            bluetooth: config.bluetooth(),
            wwan: config.wwan(),
            wifi: config.wifi(),
            camera: config.camera(),
        }
    }
}
