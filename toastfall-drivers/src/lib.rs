//! Hardware driver implementations
//!
//! Concrete implementations of the traits defined in toastfall-core:
//!
//! - Display sinks (ST7789 over SPI)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod display;
