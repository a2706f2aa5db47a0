//! VPC event dispatch
use embedded_hal_async::delay::DelayNs;
use heapless::Vec;
use vpc_services::acpi::Gateway;
use vpc_services::property::{PropertyKey, PropertySink, PropertyValue};
use vpc_services::vpc::{Command, EventBit, EventWord, SPECIAL_BUTTON_COOLING};
use vpc_services::{debug, info, warn};

use crate::ec::{Clock, Ec};
use crate::Error;

/// Decoded VPC event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Fn+Q cooling mode key
    Cooling,
    /// Special button without a known meaning
    SpecialButton(u32),
    /// Fn+Space, keyboard backlight level is not handled
    KeyboardBacklight,
    /// Backlight power, on while the lid is open
    Display(bool),
    /// Fn+F6 touchpad state
    Touchpad(bool),
    /// Fn+F8, camera switching is not handled
    Camera,
    /// Fn+F4, microphone switching is not handled
    Microphone,
    /// Touchpad switched on
    TouchpadOn,
    /// Fn+F7, airplane mode switching is not handled
    AirplaneMode,
}

/// Outcome of a single pending bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dispatched {
    /// Bit position in the event word
    pub bit: u8,
    /// Event, or why the bit could not be handled
    pub result: Result<Event, Error>,
}

/// All bits handled in one pass, ascending
pub type Dispatch = Vec<Dispatched, 16>;

/// Read an EC register backing an event
async fn read_detail<G: Gateway, C: Clock, D: DelayNs>(ec: &mut Ec<G, C, D>, command: Command) -> Result<u32, Error> {
    ec.read(command).await.map(|response| response.data)
}

async fn handle_bit<G: Gateway, C: Clock, D: DelayNs>(ec: &mut Ec<G, C, D>, bit: u8) -> Result<Event, Error> {
    match EventBit::from_bit(bit) {
        EventBit::SpecialButtons => match read_detail(ec, Command::SPECIAL_BUTTONS).await? {
            SPECIAL_BUTTON_COOLING => {
                info!("Fn+Q cooling");
                Ok(Event::Cooling)
            }
            button => {
                info!("Special button {:#x}", button);
                Ok(Event::SpecialButton(button))
            }
        },
        EventBit::KeyboardBacklight => {
            info!("Fn+Space keyboard backlight, not handled");
            Ok(Event::KeyboardBacklight)
        }
        EventBit::Display => {
            let state = read_detail(ec, Command::BL_POWER).await?;
            info!("Backlight power {:#x}: {}", state, if state != 0 { "on" } else { "off" });
            Ok(Event::Display(state != 0))
        }
        EventBit::Touchpad => {
            let state = read_detail(ec, Command::TOUCHPAD).await?;
            info!("Fn+F6 touchpad {:#x}: {}", state, if state != 0 { "on" } else { "off" });
            Ok(Event::Touchpad(state != 0))
        }
        EventBit::Camera => {
            info!("Fn+F8 camera, not handled");
            Ok(Event::Camera)
        }
        EventBit::Microphone => {
            info!("Fn+F4 microphone, not handled");
            Ok(Event::Microphone)
        }
        EventBit::TouchpadOn => {
            info!("Touchpad on");
            Ok(Event::TouchpadOn)
        }
        EventBit::AirplaneMode => {
            info!("Fn+F7 airplane mode, not handled");
            Ok(Event::AirplaneMode)
        }
        EventBit::Unknown(bit) => {
            warn!("Unknown VPC event {}", bit);
            Err(Error::UnhandledEvent(bit))
        }
    }
}

/// Read the pending event word and handle every set bit in ascending order
///
/// Nothing is dispatched unless both halves of the event word were read. A failure while handling one bit is
/// recorded for that bit and does not stop the pass.
pub async fn dispatch<G: Gateway, C: Clock, D: DelayNs>(
    ec: &mut Ec<G, C, D>,
    sink: &impl PropertySink,
) -> Result<Dispatch, Error> {
    let low = ec.read(Command::VPC1).await;
    let high = match low {
        Ok(_) => ec.read(Command::VPC2).await,
        Err(e) => Err(e),
    };

    let (low, high) = match (low, high) {
        (Ok(low), Ok(high)) => (low, high),
        // Failure already logged
        (Err(e), _) | (_, Err(e)) => return Err(e),
    };

    let events = EventWord::from_registers(low.data, high.data);
    debug!("VPC event word {:#x}, {} retries", events.0, low.retries.saturating_add(high.retries));
    sink.publish(PropertyKey::VpcStatus, PropertyValue::U32(events.0 as u32));

    let mut dispatched = Dispatch::new();
    for bit in events.pending() {
        let result = handle_bit(ec, bit).await;
        // At most 16 bits
        let _ = dispatched.push(Dispatched { bit, result });
    }

    Ok(dispatched)
}
