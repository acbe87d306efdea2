#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod calibration;
pub mod error;
pub mod linear;
pub mod math;
pub mod selection;
pub mod transform;

pub use error::{Error, Variable};

pub type Result<T> = ::std::result::Result<T, Error>;
