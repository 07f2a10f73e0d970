mod event;
mod interface;
#[cfg(feature = "serde")]
mod transport;

pub use event::*;
pub use interface::*;
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[cfg(feature = "serde")]
pub use transport::*;
