#![cfg_attr(not(feature = "std"), no_std)]

pub mod clock;

pub use clock::{DateTime, Mode, Settings};
