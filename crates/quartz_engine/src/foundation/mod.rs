//! Foundation utilities: math, time, logging, and collections

pub mod collections;
pub mod logging;
pub mod math;
pub mod time;
