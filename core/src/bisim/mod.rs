//! Change-tracking bisimulation (`spec.md` §4.2–§4.5).

mod delayed_weak;
mod encode;
mod saturate;
mod strong;

pub use delayed_weak::{bisimulation as delayed_weak_bisimulation, Variant};
pub use encode::Encoded;
pub use saturate::{saturate, saturated_bisimulation};
pub use strong::strong_bisimulation;
