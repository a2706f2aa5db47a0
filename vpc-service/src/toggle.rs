//! Boolean VPC features backed by a get/set ACPI method pair
use embedded_hal_async::delay::DelayNs;
use vpc_services::acpi::{self, Args, Gateway, Method};
use vpc_services::property::{PropertyKey, PropertySink, PropertyValue};
use vpc_services::{error, info};

use crate::ec::{Clock, Ec};
use crate::Error;

/// How the feature state is extracted from the state word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decode {
    /// A single bit of the word
    Bit(u8),
    /// Any non-zero word
    NonZero,
}

/// Firmware contract of a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Descriptor {
    /// Property the state is published under
    pub property: PropertyKey,
    /// Method returning the state word
    pub get: Method,
    /// Method accepting the on/off argument
    pub set: Method,
    /// Location of the feature state in the state word
    pub extract: Decode,
    /// Argument that enables the feature
    pub on: u32,
    /// Argument that disables the feature
    pub off: u32,
}

impl Descriptor {
    /// Log name of the feature
    pub const fn name(&self) -> &'static str {
        self.property.name()
    }

    /// Extract the feature state from a state word
    pub const fn decode(&self, state: u32) -> bool {
        match self.extract {
            Decode::Bit(bit) => (state >> bit) & 1 != 0,
            Decode::NonZero => state != 0,
        }
    }

    /// Set argument selecting `enabled`
    pub const fn argument(&self, enabled: bool) -> u32 {
        if enabled {
            self.on
        } else {
            self.off
        }
    }
}

/// Clamshell mode, any non-zero `GCSM` result is enabled
pub const CLAMSHELL: Descriptor = Descriptor {
    property: PropertyKey::ClamshellMode,
    get: acpi::GET_CLAMSHELL,
    set: acpi::SET_CLAMSHELL,
    extract: Decode::NonZero,
    on: 1,
    off: 0,
};

/// Battery conservation mode, bit 5 of the battery management state
pub const CONSERVATION: Descriptor = Descriptor {
    property: PropertyKey::ConservationMode,
    get: acpi::GET_CONSERVATION,
    set: acpi::SET_CONSERVATION,
    extract: Decode::Bit(5),
    on: 0x3,
    off: 0x5,
};

/// Fn-lock, bit 10 of the hotkey state
pub const FNLOCK: Descriptor = Descriptor {
    property: PropertyKey::FnlockMode,
    get: acpi::GET_FNLOCK,
    set: acpi::SET_FNLOCK,
    extract: Decode::Bit(10),
    on: 0xE,
    off: 0xF,
};

/// Whether a query publishes its result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Report {
    /// Log and publish the new state
    Publish,
    /// Only refresh the cache
    Silent,
}

/// Result of a state request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Hardware already in the requested state, nothing was written
    Unchanged(bool),
    /// Hardware toggled to the contained state
    Toggled(bool),
}

/// Cached mirror of a boolean feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Toggle {
    descriptor: Descriptor,
    cached: bool,
}

impl Toggle {
    /// Create a toggle, the cached state starts disabled
    pub const fn new(descriptor: Descriptor) -> Self {
        Self {
            descriptor,
            cached: false,
        }
    }

    /// Last known hardware state
    pub fn cached(&self) -> bool {
        self.cached
    }

    /// Read the hardware state into the cache
    pub async fn query<G: Gateway, C: Clock, D: DelayNs>(
        &mut self,
        ec: &mut Ec<G, C, D>,
        sink: &impl PropertySink,
        report: Report,
    ) -> Result<bool, Error> {
        let state = ec.evaluate(self.descriptor.get, Args::None).await?;

        self.cached = self.descriptor.decode(state);

        if report == Report::Publish {
            info!("{} {:#x}", self.descriptor.name(), state);
            sink.publish(self.descriptor.property, PropertyValue::Bool(self.cached));
        }

        Ok(self.cached)
    }

    /// Flip the hardware state, the cache follows only if the firmware accepts
    pub async fn toggle<G: Gateway, C: Clock, D: DelayNs>(
        &mut self,
        ec: &mut Ec<G, C, D>,
        sink: &impl PropertySink,
    ) -> Result<bool, Error> {
        let target = !self.cached;
        let argument = self.descriptor.argument(target);

        let result = ec.evaluate(self.descriptor.set, Args::One(argument)).await?;

        if result != 0 {
            error!("{} toggle failed, result {:#x}", self.descriptor.name(), result);
            return Err(Error::Rejected {
                method: self.descriptor.set,
                result,
            });
        }

        self.cached = target;
        info!(
            "{} set to {:#x}: {}",
            self.descriptor.name(),
            argument,
            if target { "on" } else { "off" }
        );
        sink.publish(self.descriptor.property, PropertyValue::Bool(self.cached));

        Ok(self.cached)
    }

    /// Drive the hardware to `desired`, toggling only when it differs
    pub async fn request_state<G: Gateway, C: Clock, D: DelayNs>(
        &mut self,
        ec: &mut Ec<G, C, D>,
        sink: &impl PropertySink,
        desired: bool,
    ) -> Result<Outcome, Error> {
        self.query(ec, sink, Report::Silent).await?;

        if self.cached == desired {
            info!(
                "{} already {}",
                self.descriptor.name(),
                if desired { "enabled" } else { "disabled" }
            );
            return Ok(Outcome::Unchanged(desired));
        }

        self.toggle(ec, sink).await.map(Outcome::Toggled)
    }
}
