#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;

mod error;

pub mod config;
pub mod device;
pub mod interface;
pub mod operation;
pub mod params;
pub mod registers;

pub use crate::config::{BusConfig, ConfigError};
pub use crate::device::Ina229;
pub use crate::error::{Error, Result};
pub use crate::interface::{Frame, Responses};
pub use crate::operation::Operation;
pub use crate::registers::Register;
