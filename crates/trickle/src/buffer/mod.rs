mod interface;
mod vec;

pub use interface::*;
pub use vec::*;
