//! VPC embedded controller protocol
//!
//! The EC exposes a single request slot through the `VPCW`/`VPCR` methods. A command is written to the command slot,
//! which reads back non-zero until the EC has consumed it. Only one exchange can be outstanding at a time, so every
//! exchange runs to completion before the next one starts.
use embassy_time::Instant;
use embedded_hal_async::delay::DelayNs;
use vpc_services::acpi::{self, Args, Gateway, Method};
use vpc_services::vpc::{Command, Slot};
use vpc_services::{error, trace};

use crate::config::Config;
use crate::Error;

/// Monotonic time source used to bound EC exchanges
pub trait Clock {
    /// Current time
    fn now(&self) -> Instant;
}

/// Clock backed by the embassy time driver
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Direction and payload of a single exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transfer {
    /// Read the result of a command
    Read(Command),
    /// Write a value with a command
    Write(Command, u32),
}

impl Transfer {
    /// Command code of this transfer
    pub fn command(&self) -> Command {
        match self {
            Transfer::Read(command) | Transfer::Write(command, _) => *command,
        }
    }
}

/// Completed read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Response {
    /// Value read from the data slot
    pub data: u32,
    /// Command slot reads that came back busy
    pub retries: u8,
}

/// Method gateway and EC protocol engine for a single VPC device
pub struct Ec<G: Gateway, C: Clock, D: DelayNs> {
    /// `None` if the platform never provided a gateway
    gateway: Option<G>,
    clock: C,
    delay: D,
    config: Config,
}

impl<G: Gateway, C: Clock, D: DelayNs> Ec<G, C, D> {
    /// Create an EC interface on top of `gateway`
    pub fn new(gateway: G, clock: C, delay: D, config: Config) -> Self {
        Self {
            gateway: Some(gateway),
            clock,
            delay,
            config,
        }
    }

    /// Create an EC interface for a device whose gateway is not available, every operation fails
    pub fn unavailable(clock: C, delay: D, config: Config) -> Self {
        Self {
            gateway: None,
            clock,
            delay,
            config,
        }
    }

    /// Returns true if a gateway is present
    pub fn is_available(&self) -> bool {
        self.gateway.is_some()
    }

    /// Evaluate an ACPI method on the device
    pub async fn evaluate(&mut self, method: Method, args: Args) -> Result<u32, Error> {
        let Some(gateway) = self.gateway.as_mut() else {
            error!("VPC unavailable, cannot evaluate {}", method.name());
            return Err(Error::GatewayUnavailable);
        };

        gateway.evaluate(method, args).await.map_err(|_| {
            error!("{} evaluation failed", method.name());
            Error::GatewayUnavailable
        })
    }

    async fn read_slot(&mut self, slot: Slot) -> Result<u32, Error> {
        self.evaluate(acpi::READ_STATUS, Args::One(slot.into())).await
    }

    async fn write_slot(&mut self, slot: Slot, data: u32) -> Result<(), Error> {
        // VPCW always returns zero
        self.evaluate(acpi::WRITE_STATUS, Args::Two(slot.into(), data))
            .await
            .map(|_| ())
    }

    /// Poll the command slot until the EC has consumed `command`, returns the number of busy reads
    ///
    /// Polling continues while the deadline has not passed or fewer than `min_retries` reads came back busy, it gives
    /// up only once both budgets are spent.
    async fn wait_ready(&mut self, command: Command) -> Result<u8, Error> {
        let deadline = self.clock.now() + self.config.ec_timeout;
        let interval_us = self.config.poll_interval.as_micros() as u32;
        let mut retries: u8 = 0;

        loop {
            if self.read_slot(Slot::Command).await? == 0 {
                return Ok(retries);
            }

            retries = retries.saturating_add(1);
            self.delay.delay_us(interval_us).await;

            let now = self.clock.now();
            if !(now < deadline || retries < self.config.min_retries) {
                break;
            }
        }

        error!("EC command {:#x} timeout after {} retries", command.0, retries);
        Err(Error::Timeout { command, retries })
    }

    /// Run a single exchange, returns the data slot for reads
    async fn exchange(&mut self, transfer: Transfer) -> Result<(Option<u32>, u8), Error> {
        let command = transfer.command();

        if let Transfer::Write(_, value) = transfer {
            self.write_slot(Slot::Data, value).await?;
        }
        self.write_slot(Slot::Command, command.0).await?;

        let retries = self.wait_ready(command).await?;
        let data = match transfer {
            Transfer::Read(_) => Some(self.read_slot(Slot::Data).await?),
            Transfer::Write(_, _) => None,
        };

        trace!("EC {:?} complete, {} retries", transfer, retries);
        Ok((data, retries))
    }

    /// Read the result of `command`
    pub async fn read(&mut self, command: Command) -> Result<Response, Error> {
        let (data, retries) = self.exchange(Transfer::Read(command)).await?;
        Ok(Response {
            data: data.unwrap_or_default(),
            retries,
        })
    }

    /// Write `value` with `command`, returns the number of busy reads
    pub async fn write(&mut self, command: Command, value: u32) -> Result<u8, Error> {
        let (_, retries) = self.exchange(Transfer::Write(command, value)).await?;
        Ok(retries)
    }
}
