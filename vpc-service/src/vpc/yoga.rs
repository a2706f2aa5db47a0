//! Base VPC family, clamshell mode only
use embedded_hal_async::delay::DelayNs;
use vpc_services::acpi::Gateway;
use vpc_services::property::PropertySink;
use vpc_services::{error, info, warn};

use super::{Reply, Status, Vpc};
use crate::ec::{Clock, Ec};
use crate::event::Dispatch;
use crate::request::{Key, Request};
use crate::toggle::{self, Report, Toggle};
use crate::Error;

/// Base VPC device
pub struct Yoga<'a, G: Gateway, C: Clock, D: DelayNs, S: PropertySink> {
    pub(super) ec: Ec<G, C, D>,
    pub(super) sink: &'a S,
    clamshell: Toggle,
}

impl<'a, G: Gateway, C: Clock, D: DelayNs, S: PropertySink> Yoga<'a, G, C, D, S> {
    /// Create a device publishing into `sink`
    pub fn new(ec: Ec<G, C, D>, sink: &'a S) -> Self {
        Self {
            ec,
            sink,
            clamshell: Toggle::new(toggle::CLAMSHELL),
        }
    }

    /// Fail fast if the device has no gateway
    pub(super) fn ensure_available(&self) -> Result<(), Error> {
        if self.ec.is_available() {
            Ok(())
        } else {
            error!("VPC unavailable");
            Err(Error::GatewayUnavailable)
        }
    }

    pub(super) async fn refresh_clamshell(&mut self) {
        // Failure already logged
        let _ = self.clamshell.query(&mut self.ec, self.sink, Report::Publish).await;
    }

    pub(super) async fn request_clamshell(&mut self, enabled: bool) -> Result<Reply, Error> {
        self.clamshell
            .request_state(&mut self.ec, self.sink, enabled)
            .await
            .map(Reply::State)
    }
}

impl<G: Gateway, C: Clock, D: DelayNs, S: PropertySink> Vpc for Yoga<'_, G, C, D, S> {
    async fn initialize(&mut self) -> Result<(), Error> {
        self.ensure_available()?;
        info!("Initializing VPC");
        self.refresh_all().await;
        Ok(())
    }

    async fn refresh_all(&mut self) {
        self.refresh_clamshell().await;
    }

    async fn handle_request(&mut self, request: Request) -> Result<Reply, Error> {
        self.ensure_available()?;

        match request {
            Request::Clamshell(enabled) => self.request_clamshell(enabled).await,
            Request::RefreshAll => {
                self.refresh_all().await;
                Ok(Reply::Refreshed)
            }
            request => {
                warn!("{} not supported", request.key().name());
                Err(Error::Unsupported(request.key()))
            }
        }
    }

    async fn dispatch_events(&mut self) -> Result<Dispatch, Error> {
        self.ensure_available()?;
        Ok(Dispatch::new())
    }

    async fn toggle_fnlock(&mut self) -> Result<bool, Error> {
        warn!("{} not supported", Key::Fnlock.name());
        Err(Error::Unsupported(Key::Fnlock))
    }

    async fn shutdown(&mut self) {
        if !self.clamshell.cached() {
            return;
        }

        info!("Disabling clamshell mode");
        // Failure already logged
        let _ = self.clamshell.toggle(&mut self.ec, self.sink).await;
    }

    fn status(&self) -> Status {
        Status {
            clamshell: self.clamshell.cached(),
            ..Status::default()
        }
    }
}
