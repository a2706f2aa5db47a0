//! ACPI method gateway contract
//!
//! The platform owns the ACPI namespace; services only see a gateway that evaluates a named method with up to two
//! integer arguments and hands back a single integer.
use core::future::Future;

/// Name of an ACPI method exposed by the VPC device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Method(pub &'static str);

impl Method {
    /// Returns the ACPI path segment of this method
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

/// Get clamshell mode
pub const GET_CLAMSHELL: Method = Method("GCSM");
/// Set clamshell mode
pub const SET_CLAMSHELL: Method = Method("SCSM");
/// Get battery management state, conservation mode lives here
pub const GET_CONSERVATION: Method = Method("GBMD");
/// Set battery management command
pub const SET_CONSERVATION: Method = Method("SBMC");
/// Get hotkey state, fn-lock lives here
pub const GET_FNLOCK: Method = Method("HALS");
/// Set hotkey command
pub const SET_FNLOCK: Method = Method("SALS");
/// Get the VPC configuration word
pub const GET_CONFIG: Method = Method("_CFG");
/// Read a VPC status slot
pub const READ_STATUS: Method = Method("VPCR");
/// Write a VPC status slot
pub const WRITE_STATUS: Method = Method("VPCW");

/// Integer arguments passed to a method evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Args {
    /// No arguments
    None,
    /// Single argument
    One(u32),
    /// Two arguments
    Two(u32, u32),
}

/// Evaluates ACPI methods on the VPC device
pub trait Gateway {
    /// Platform error returned when an evaluation fails
    type Error;

    /// Evaluate `method` with `args` and return its integer result
    fn evaluate(&mut self, method: Method, args: Args) -> impl Future<Output = Result<u32, Self::Error>>;
}

impl<T: Gateway + ?Sized> Gateway for &mut T {
    type Error = T::Error;

    fn evaluate(&mut self, method: Method, args: Args) -> impl Future<Output = Result<u32, Self::Error>> {
        T::evaluate(&mut **self, method, args)
    }
}
