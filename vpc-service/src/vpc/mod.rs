//! Hardware families
//!
//! Every family implements [`Vpc`], the capability set the service drives. The family is chosen once, when the
//! device is constructed, either directly or from the PnP id through [`Device`].
use core::future::Future;

use embedded_hal_async::delay::DelayNs;
use vpc_services::acpi::Gateway;
use vpc_services::property::PropertySink;
use vpc_services::vpc::Capabilities;

use crate::ec::{Clock, Ec, Response};
use crate::event::Dispatch;
use crate::request::Request;
use crate::toggle::Outcome;
use crate::Error;

pub mod idea;
pub mod yoga;

pub use idea::Idea;
pub use yoga::Yoga;

/// Result of a handled request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    /// Toggle request completed
    State(Outcome),
    /// Raw EC read completed
    Read(Response),
    /// Raw EC write completed after the contained number of busy reads
    Written(u8),
    /// All published state refreshed
    Refreshed,
}

/// Snapshot of the cached device state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    /// Clamshell mode
    pub clamshell: bool,
    /// Battery conservation mode, `None` if the family lacks it
    pub conservation: Option<bool>,
    /// Fn-lock, `None` if the family lacks it
    pub fnlock: Option<bool>,
    /// Decoded configuration word, `None` until read
    pub capabilities: Option<Capabilities>,
}

/// Capability set of a VPC hardware family
pub trait Vpc {
    /// Read the one-shot configuration and publish the initial state
    fn initialize(&mut self) -> impl Future<Output = Result<(), Error>>;
    /// Query and publish every feature, failures are logged
    fn refresh_all(&mut self) -> impl Future<Output = ()>;
    /// Handle a validated request
    fn handle_request(&mut self, request: Request) -> impl Future<Output = Result<Reply, Error>>;
    /// Run one event dispatch pass
    fn dispatch_events(&mut self) -> impl Future<Output = Result<Dispatch, Error>>;
    /// Re-read fn-lock and flip it, returns the new state
    fn toggle_fnlock(&mut self) -> impl Future<Output = Result<bool, Error>>;
    /// Restore the hardware before the device goes away
    fn shutdown(&mut self) -> impl Future<Output = ()>;
    /// Cached state
    fn status(&self) -> Status;
}

/// Hardware family, identified by PnP id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Family {
    /// Base VPC, clamshell only
    Yoga,
    /// IdeaPad VPC with EC events and battery features
    Idea,
}

impl Family {
    /// PnP id of the ACPI device
    pub const fn pnp_id(&self) -> &'static str {
        match self {
            Family::Yoga => "LEN0268",
            Family::Idea => "VPC2004",
        }
    }

    /// Family matching a PnP id
    pub fn from_pnp_id(id: &str) -> Option<Self> {
        [Family::Idea, Family::Yoga]
            .into_iter()
            .find(|family| family.pnp_id() == id)
    }
}

/// Device of a family picked at runtime
pub enum Device<'a, G: Gateway, C: Clock, D: DelayNs, S: PropertySink> {
    /// Base VPC
    Yoga(Yoga<'a, G, C, D, S>),
    /// IdeaPad VPC
    Idea(Idea<'a, G, C, D, S>),
}

impl<'a, G: Gateway, C: Clock, D: DelayNs, S: PropertySink> Device<'a, G, C, D, S> {
    /// Create the device for `family`
    pub fn new(family: Family, ec: Ec<G, C, D>, sink: &'a S) -> Self {
        match family {
            Family::Yoga => Device::Yoga(Yoga::new(ec, sink)),
            Family::Idea => Device::Idea(Idea::new(ec, sink)),
        }
    }

    /// Family of this device
    pub fn family(&self) -> Family {
        match self {
            Device::Yoga(_) => Family::Yoga,
            Device::Idea(_) => Family::Idea,
        }
    }
}

impl<G: Gateway, C: Clock, D: DelayNs, S: PropertySink> Vpc for Device<'_, G, C, D, S> {
    async fn initialize(&mut self) -> Result<(), Error> {
        match self {
            Device::Yoga(vpc) => vpc.initialize().await,
            Device::Idea(vpc) => vpc.initialize().await,
        }
    }

    async fn refresh_all(&mut self) {
        match self {
            Device::Yoga(vpc) => vpc.refresh_all().await,
            Device::Idea(vpc) => vpc.refresh_all().await,
        }
    }

    async fn handle_request(&mut self, request: Request) -> Result<Reply, Error> {
        match self {
            Device::Yoga(vpc) => vpc.handle_request(request).await,
            Device::Idea(vpc) => vpc.handle_request(request).await,
        }
    }

    async fn dispatch_events(&mut self) -> Result<Dispatch, Error> {
        match self {
            Device::Yoga(vpc) => vpc.dispatch_events().await,
            Device::Idea(vpc) => vpc.dispatch_events().await,
        }
    }

    async fn toggle_fnlock(&mut self) -> Result<bool, Error> {
        match self {
            Device::Yoga(vpc) => vpc.toggle_fnlock().await,
            Device::Idea(vpc) => vpc.toggle_fnlock().await,
        }
    }

    async fn shutdown(&mut self) {
        match self {
            Device::Yoga(vpc) => vpc.shutdown().await,
            Device::Idea(vpc) => vpc.shutdown().await,
        }
    }

    fn status(&self) -> Status {
        match self {
            Device::Yoga(vpc) => vpc.status(),
            Device::Idea(vpc) => vpc.status(),
        }
    }
}
