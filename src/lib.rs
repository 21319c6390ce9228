#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod constraint;
mod error;
mod list;
mod set;
mod version;

pub use error::*;
pub use list::*;
pub use set::*;
pub use version::*;
