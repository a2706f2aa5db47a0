//! VPC Services Interface Exports

#![no_std]
#![warn(missing_docs)]

pub mod acpi;
pub mod fmt;
pub mod property;
pub mod vpc;
