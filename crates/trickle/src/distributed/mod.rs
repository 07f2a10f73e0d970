//! Construction contract for sources replicated across cluster members.
//!
//! A [`LongStreamSource`] is validated configuration. For every member the
//! engine asks it for a [`MemberSupplier`], which fixes the start time and then
//! builds one independent source per local processor through a
//! [`StreamSourceFactory`]. Instances share configuration, never state.

mod factory;
mod long_stream;
mod member;

pub use factory::*;
pub use long_stream::*;
pub use member::*;
