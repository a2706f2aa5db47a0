//! VPC embedded controller service
//!
//! Serializes every access to a single VPC device: host requests are queued and executed one at a time, and
//! notifications, status snapshots and teardown take the same lock.
#![no_std]
#![warn(missing_docs)]

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use vpc_services::acpi::Method;
use vpc_services::vpc::Command;
use vpc_services::{debug, error, info, warn};

pub mod config;
pub mod ec;
pub mod event;
pub mod request;
pub mod toggle;
pub mod vpc;

#[cfg(test)]
mod mock;

use event::Dispatch;
use request::{Key, Request, Value};
use vpc::{Reply, Status, Vpc};

/// VPC service errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Gateway call failed or no gateway present
    GatewayUnavailable,
    /// EC did not consume a command in time
    Timeout {
        /// Command that was pending
        command: Command,
        /// Busy reads before giving up
        retries: u8,
    },
    /// Set method returned a non-zero result
    Rejected {
        /// Method that was evaluated
        method: Method,
        /// Result it returned
        result: u32,
    },
    /// Request value has the wrong type for its key
    InvalidRequestValue(Key),
    /// Request key is not recognized
    UnknownRequestKey,
    /// Event bit without a handler
    UnhandledEvent(u8),
    /// Request not supported by this hardware family
    Unsupported(Key),
}

/// Depth of the request queue
pub const REQUEST_CHANNEL_SIZE: usize = 4;

/// WMI hotkey event that flips fn-lock
pub const WMI_EVENT_FNLOCK: u32 = 0x80;

/// Serialized VPC service
pub struct Service<M: RawMutex, V: Vpc> {
    vpc: Mutex<M, V>,
    requests: Channel<M, Request, REQUEST_CHANNEL_SIZE>,
}

impl<M: RawMutex, V: Vpc> Service<M, V> {
    /// Create a service around `vpc`
    pub fn new(vpc: V) -> Self {
        Self {
            vpc: Mutex::new(vpc),
            requests: Channel::new(),
        }
    }

    /// Initialize the device
    pub async fn init(&self) -> Result<(), Error> {
        info!("Starting VPC service");
        self.vpc.lock().await.initialize().await
    }

    /// Queue a request, waits while the queue is full
    pub async fn send_request(&self, request: Request) {
        self.requests.send(request).await
    }

    /// Parse and queue a host request
    ///
    /// Unknown keys are logged and ignored.
    pub async fn set_property(&self, name: &str, value: Value) -> Result<(), Error> {
        match Request::parse(name, value) {
            Ok(request) => {
                debug!("Queueing {}", name);
                self.send_request(request).await;
                Ok(())
            }
            Err(Error::UnknownRequestKey) => {
                warn!("Unknown property {}", name);
                Ok(())
            }
            Err(e) => {
                error!("Invalid value for {}", name);
                Err(e)
            }
        }
    }

    /// Execute a request immediately, bypassing the queue
    pub async fn execute(&self, request: Request) -> Result<Reply, Error> {
        self.vpc.lock().await.handle_request(request).await
    }

    /// Wait for the next queued request and execute it
    pub async fn process_request(&self) -> Result<Reply, Error> {
        let request = self.requests.receive().await;
        self.execute(request)
            .await
            .inspect_err(|e| error!("{} request failed: {:?}", request.key().name(), e))
    }

    /// Handle a device notification, only notifications carrying an argument trigger a dispatch pass
    pub async fn notify(&self, argument: Option<u32>) -> Result<Option<Dispatch>, Error> {
        let Some(argument) = argument else {
            debug!("VPC notification without argument");
            return Ok(None);
        };

        debug!("VPC notification {:#x}", argument);
        self.vpc.lock().await.dispatch_events().await.map(Some)
    }

    /// Handle a WMI hotkey event, returns the new fn-lock state if the event toggled it
    pub async fn wmi_event(&self, argument: u32) -> Result<Option<bool>, Error> {
        match argument {
            WMI_EVENT_FNLOCK => self.vpc.lock().await.toggle_fnlock().await.map(Some),
            argument => {
                warn!("Unknown WMI event {:#x}", argument);
                Ok(None)
            }
        }
    }

    /// Consistent snapshot of the cached state
    pub async fn status(&self) -> Status {
        self.vpc.lock().await.status()
    }

    /// Restore the hardware before the device goes away
    pub async fn shutdown(&self) {
        info!("Stopping VPC service");
        self.vpc.lock().await.shutdown().await
    }

    /// Process requests forever, failures are logged and the loop continues
    pub async fn run(&self) -> ! {
        loop {
            // Failure already logged
            let _ = self.process_request().await;
        }
    }
}

/// Generates the service instance and
///
/// - vpc_service_init()
/// - vpc_service_task()
#[macro_export]
macro_rules! create_vpc_service {
    ($vpc:ty) => {
        use ::embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
        use ::embassy_sync::once_lock::OnceLock;
        use ::vpc_service::Service;
        use ::vpc_services::error;
        static SERVICE: OnceLock<Service<CriticalSectionRawMutex, $vpc>> = OnceLock::new();

        pub async fn vpc_service_init(vpc: $vpc) -> &'static Service<CriticalSectionRawMutex, $vpc> {
            let vpc_service = SERVICE.get_or_init(|| Service::new(vpc));

            if let Err(e) = vpc_service.init().await {
                error!("VPC init failed: {:?}", e);
            }
            vpc_service
        }

        // Tasks
        #[embassy_executor::task]
        async fn vpc_service_task() {
            // Block until service is initialized
            let s = SERVICE.get().await;
            s.run().await
        }
    };
}
