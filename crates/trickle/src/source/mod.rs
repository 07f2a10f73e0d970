mod items;
mod poll;
mod stream;
mod supplier;

pub use items::*;
pub use poll::*;
pub use stream::*;
pub use supplier::*;
