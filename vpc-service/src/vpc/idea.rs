//! IdeaPad VPC family
//!
//! Extends the base device with the configuration word, battery conservation, fn-lock, raw EC access and EC event
//! dispatch.
use embedded_hal_async::delay::DelayNs;
use vpc_services::acpi::{self, Args, Gateway};
use vpc_services::property::{PropertyKey, PropertySink, PropertyValue};
use vpc_services::vpc::Capabilities;
use vpc_services::info;

use super::{Reply, Status, Vpc, Yoga};
use crate::ec::{Clock, Ec};
use crate::event::{self, Dispatch};
use crate::request::Request;
use crate::toggle::{self, Report, Toggle};
use crate::Error;

/// IdeaPad VPC device
pub struct Idea<'a, G: Gateway, C: Clock, D: DelayNs, S: PropertySink> {
    base: Yoga<'a, G, C, D, S>,
    conservation: Toggle,
    fnlock: Toggle,
    capabilities: Option<Capabilities>,
}

impl<'a, G: Gateway, C: Clock, D: DelayNs, S: PropertySink> Idea<'a, G, C, D, S> {
    /// Create a device publishing into `sink`
    pub fn new(ec: Ec<G, C, D>, sink: &'a S) -> Self {
        Self {
            base: Yoga::new(ec, sink),
            conservation: Toggle::new(toggle::CONSERVATION),
            fnlock: Toggle::new(toggle::FNLOCK),
            capabilities: None,
        }
    }

    /// Decoded configuration word, `None` before initialization
    pub fn capabilities(&self) -> Option<Capabilities> {
        self.capabilities
    }

    async fn read_config(&mut self) -> Result<Capabilities, Error> {
        let config = self.base.ec.evaluate(acpi::GET_CONFIG, Args::None).await?;

        info!("VPCconfig {:#x}", config);
        let capabilities = Capabilities::decode(config);
        info!(
            "Graphics {}, bluetooth {}, 3G {}, wireless {}, camera {}",
            capabilities.graphics.label(),
            capabilities.bluetooth,
            capabilities.wwan,
            capabilities.wifi,
            capabilities.camera
        );

        let sink = self.base.sink;
        sink.publish(PropertyKey::VpcConfig, PropertyValue::U32(config));
        sink.publish(PropertyKey::Graphics, PropertyValue::Graphics(capabilities.graphics));
        sink.publish(PropertyKey::Bluetooth, PropertyValue::Bool(capabilities.bluetooth));
        sink.publish(PropertyKey::Wwan, PropertyValue::Bool(capabilities.wwan));
        sink.publish(PropertyKey::Wireless, PropertyValue::Bool(capabilities.wifi));
        sink.publish(PropertyKey::Camera, PropertyValue::Bool(capabilities.camera));

        Ok(capabilities)
    }

    async fn request_toggle(
        toggle: &mut Toggle,
        base: &mut Yoga<'a, G, C, D, S>,
        enabled: bool,
    ) -> Result<Reply, Error> {
        toggle
            .request_state(&mut base.ec, base.sink, enabled)
            .await
            .map(Reply::State)
    }
}

impl<G: Gateway, C: Clock, D: DelayNs, S: PropertySink> Vpc for Idea<'_, G, C, D, S> {
    async fn initialize(&mut self) -> Result<(), Error> {
        self.base.ensure_available()?;
        info!("Initializing IdeaPad VPC");

        self.capabilities = Some(self.read_config().await?);
        self.refresh_all().await;
        Ok(())
    }

    async fn refresh_all(&mut self) {
        self.base.refresh_clamshell().await;

        // Failures already logged
        let _ = self
            .conservation
            .query(&mut self.base.ec, self.base.sink, Report::Publish)
            .await;
        let _ = self
            .fnlock
            .query(&mut self.base.ec, self.base.sink, Report::Publish)
            .await;
        let _ = self.dispatch_events().await;
    }

    async fn handle_request(&mut self, request: Request) -> Result<Reply, Error> {
        self.base.ensure_available()?;

        match request {
            Request::Conservation(enabled) => {
                Self::request_toggle(&mut self.conservation, &mut self.base, enabled).await
            }
            Request::Fnlock(enabled) => Self::request_toggle(&mut self.fnlock, &mut self.base, enabled).await,
            Request::Clamshell(enabled) => self.base.request_clamshell(enabled).await,
            Request::ReadEc(command) => {
                let response = self.base.ec.read(command).await?;
                info!(
                    "ReadEC {:#x} result: {:#x}, {} retries",
                    command.0, response.data, response.retries
                );
                Ok(Reply::Read(response))
            }
            Request::WriteEc { command, value } => {
                let retries = self.base.ec.write(command, value).await?;
                info!("WriteEC {:#x} {:#x}, {} retries", command.0, value, retries);
                Ok(Reply::Written(retries))
            }
            Request::RefreshAll => {
                self.refresh_all().await;
                Ok(Reply::Refreshed)
            }
        }
    }

    async fn dispatch_events(&mut self) -> Result<Dispatch, Error> {
        self.base.ensure_available()?;
        event::dispatch(&mut self.base.ec, self.base.sink).await
    }

    async fn toggle_fnlock(&mut self) -> Result<bool, Error> {
        self.base.ensure_available()?;
        self.fnlock
            .query(&mut self.base.ec, self.base.sink, Report::Publish)
            .await?;
        self.fnlock.toggle(&mut self.base.ec, self.base.sink).await
    }

    async fn shutdown(&mut self) {
        self.base.shutdown().await;
    }

    fn status(&self) -> Status {
        Status {
            conservation: Some(self.conservation.cached()),
            fnlock: Some(self.fnlock.cached()),
            capabilities: self.capabilities,
            ..self.base.status()
        }
    }
}

#[cfg(test)]
mod test {
    extern crate std;
    use std::vec;

    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use vpc_services::property::PropertyStore;
    use vpc_services::vpc::{Command, Graphics, SPECIAL_BUTTON_COOLING};

    use super::*;
    use crate::config::Config;
    use crate::ec::Response;
    use crate::event::{Dispatched, Event};
    use crate::mock::{Firmware, MockClock, MockDelay};
    use crate::toggle::Outcome;

    type TestIdea<'a> = Idea<'a, &'a Firmware, MockClock, MockDelay, PropertyStore<NoopRawMutex>>;

    fn idea<'a>(firmware: &'a Firmware, store: &'a PropertyStore<NoopRawMutex>) -> TestIdea<'a> {
        let clock = MockClock::new();
        let delay = MockDelay::new(&clock);
        Idea::new(Ec::new(firmware, clock, delay, Config::default()), store)
    }

    #[test]
    fn test_initialize() {
        let firmware = Firmware::new();
        // Camera and bluetooth
        firmware.set_config((1 << 19) | (1 << 16));
        firmware.set_state(acpi::GET_CONSERVATION, 1 << 5);
        firmware.set_state(acpi::GET_FNLOCK, 0);
        let store = PropertyStore::new();
        let mut vpc = idea(&firmware, &store);

        block_on(vpc.initialize()).unwrap();

        let capabilities = vpc.capabilities().unwrap();
        assert!(capabilities.camera);
        assert!(capabilities.bluetooth);
        assert!(!capabilities.wifi);
        assert!(!capabilities.wwan);
        assert_eq!(capabilities.graphics, Graphics::Unknown(0));

        assert_eq!(store.get(PropertyKey::VpcConfig), Some(PropertyValue::U32(0x0009_0000)));
        assert_eq!(store.get(PropertyKey::Graphics), Some(PropertyValue::Graphics(Graphics::Unknown(0))));
        assert_eq!(store.get_bool(PropertyKey::Camera), Some(true));
        assert_eq!(store.get_bool(PropertyKey::Wireless), Some(false));
        assert_eq!(store.get_bool(PropertyKey::ConservationMode), Some(true));
        assert_eq!(store.get_bool(PropertyKey::FnlockMode), Some(false));
        assert_eq!(store.get_bool(PropertyKey::ClamshellMode), Some(false));
        // Initial refresh runs one dispatch pass
        assert_eq!(store.get(PropertyKey::VpcStatus), Some(PropertyValue::U32(0)));

        assert_eq!(
            vpc.status(),
            Status {
                clamshell: false,
                conservation: Some(true),
                fnlock: Some(false),
                capabilities: Some(capabilities),
            }
        );
    }

    #[test]
    fn test_initialize_config_failure() {
        let firmware = Firmware::new();
        firmware.fail_method(acpi::GET_CONFIG);
        let store = PropertyStore::new();
        let mut vpc = idea(&firmware, &store);

        assert_eq!(block_on(vpc.initialize()), Err(Error::GatewayUnavailable));
        assert_eq!(vpc.capabilities(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_toggle_requests() {
        let firmware = Firmware::new();
        let store = PropertyStore::new();
        let mut vpc = idea(&firmware, &store);

        assert_eq!(
            block_on(vpc.handle_request(Request::Conservation(true))),
            Ok(Reply::State(Outcome::Toggled(true)))
        );
        assert_eq!(firmware.last_argument(acpi::SET_CONSERVATION), Some(0x3));

        assert_eq!(
            block_on(vpc.handle_request(Request::Fnlock(true))),
            Ok(Reply::State(Outcome::Toggled(true)))
        );
        assert_eq!(firmware.last_argument(acpi::SET_FNLOCK), Some(0xE));

        assert_eq!(
            block_on(vpc.handle_request(Request::Clamshell(false))),
            Ok(Reply::State(Outcome::Unchanged(false)))
        );
        assert_eq!(firmware.count(acpi::SET_CLAMSHELL), 0);

        let status = vpc.status();
        assert_eq!(status.conservation, Some(true));
        assert_eq!(status.fnlock, Some(true));
    }

    #[test]
    fn test_rejected_toggle_keeps_state() {
        let firmware = Firmware::new();
        firmware.set_result(acpi::SET_CONSERVATION, 2);
        let store = PropertyStore::new();
        let mut vpc = idea(&firmware, &store);

        assert_eq!(
            block_on(vpc.handle_request(Request::Conservation(true))),
            Err(Error::Rejected {
                method: acpi::SET_CONSERVATION,
                result: 2
            })
        );
        assert_eq!(vpc.status().conservation, Some(false));
        assert_eq!(store.get_bool(PropertyKey::ConservationMode), None);
    }

    #[test]
    fn test_raw_ec_requests() {
        let firmware = Firmware::new();
        firmware.set_register(Command::TOUCHPAD, 1);
        let store = PropertyStore::new();
        let mut vpc = idea(&firmware, &store);

        assert_eq!(
            block_on(vpc.handle_request(Request::ReadEc(Command::TOUCHPAD))),
            Ok(Reply::Read(Response { data: 1, retries: 0 }))
        );
        assert_eq!(
            block_on(vpc.handle_request(Request::WriteEc {
                command: Command::TOUCHPAD,
                value: 0
            })),
            Ok(Reply::Written(0))
        );
        assert_eq!(firmware.register(Command::TOUCHPAD), Some(0));
    }

    #[test]
    fn test_raw_ec_timeout() {
        let firmware = Firmware::new();
        firmware.set_busy(u32::MAX);
        let store = PropertyStore::new();
        let mut vpc = idea(&firmware, &store);

        assert_eq!(
            block_on(vpc.handle_request(Request::ReadEc(Command::VPC1))),
            Err(Error::Timeout {
                command: Command::VPC1,
                retries: u8::MAX
            })
        );

        // Device stays usable
        firmware.set_busy(0);
        assert_eq!(
            block_on(vpc.handle_request(Request::Fnlock(false))),
            Ok(Reply::State(Outcome::Unchanged(false)))
        );
    }

    #[test]
    fn test_dispatch_events() {
        let firmware = Firmware::new();
        firmware.set_register(Command::VPC1, 0x01);
        firmware.set_register(Command::VPC2, 0x00);
        firmware.set_register(Command::SPECIAL_BUTTONS, SPECIAL_BUTTON_COOLING);
        let store = PropertyStore::new();
        let mut vpc = idea(&firmware, &store);

        let dispatched = block_on(vpc.dispatch_events()).unwrap();
        assert_eq!(
            dispatched.as_slice(),
            [Dispatched {
                bit: 0,
                result: Ok(Event::Cooling)
            }]
        );
        assert_eq!(
            firmware.commands(),
            vec![Command::VPC1.0, Command::VPC2.0, Command::SPECIAL_BUTTONS.0]
        );
    }

    #[test]
    fn test_refresh_all() {
        let firmware = Firmware::new();
        let store = PropertyStore::new();
        let mut vpc = idea(&firmware, &store);

        firmware.set_state(acpi::GET_FNLOCK, 1 << 10);
        assert_eq!(block_on(vpc.handle_request(Request::RefreshAll)), Ok(Reply::Refreshed));
        assert_eq!(store.get_bool(PropertyKey::FnlockMode), Some(true));
        assert_eq!(firmware.count(acpi::GET_CLAMSHELL), 1);
        assert_eq!(firmware.count(acpi::GET_CONSERVATION), 1);
        assert_eq!(firmware.count(acpi::GET_FNLOCK), 1);
        assert_eq!(firmware.commands(), vec![Command::VPC1.0, Command::VPC2.0]);
    }

    #[test]
    fn test_toggle_fnlock_reads_before_flipping() {
        let firmware = Firmware::new();
        let store = PropertyStore::new();
        let mut vpc = idea(&firmware, &store);

        // Enabled by the keyboard behind our back, cache still disabled
        firmware.set_state(acpi::GET_FNLOCK, 1 << 10);
        assert_eq!(block_on(vpc.toggle_fnlock()), Ok(false));
        assert_eq!(firmware.last_argument(acpi::SET_FNLOCK), Some(0xF));
        assert_eq!(store.get_bool(PropertyKey::FnlockMode), Some(false));

        assert_eq!(block_on(vpc.toggle_fnlock()), Ok(true));
        assert_eq!(firmware.last_argument(acpi::SET_FNLOCK), Some(0xE));
        assert_eq!(firmware.count(acpi::GET_FNLOCK), 2);
    }

    #[test]
    fn test_toggle_fnlock_query_failure() {
        let firmware = Firmware::new();
        firmware.fail_method(acpi::GET_FNLOCK);
        let store = PropertyStore::new();
        let mut vpc = idea(&firmware, &store);

        assert_eq!(block_on(vpc.toggle_fnlock()), Err(Error::GatewayUnavailable));
        assert_eq!(firmware.count(acpi::SET_FNLOCK), 0);
    }

    #[test]
    fn test_shutdown_disables_clamshell() {
        let firmware = Firmware::new();
        firmware.set_state(acpi::GET_CLAMSHELL, 1);
        let store = PropertyStore::new();
        let mut vpc = idea(&firmware, &store);
        block_on(vpc.initialize()).unwrap();

        block_on(vpc.shutdown());
        assert_eq!(firmware.last_argument(acpi::SET_CLAMSHELL), Some(0));
        assert_eq!(store.get_bool(PropertyKey::ClamshellMode), Some(false));
    }
}
