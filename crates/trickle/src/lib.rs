#![doc = include_str!("../README.md")]

mod buffer;
#[cfg(feature = "serde")]
mod config;
mod distributed;
mod error;
mod generator;
mod source;
mod time;

pub use crate::buffer::*;
#[cfg(feature = "serde")]
pub use crate::config::*;
pub use crate::distributed::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::source::*;
pub use crate::time::*;
