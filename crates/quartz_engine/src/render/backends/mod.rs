//! Device implementations
//!
//! The headless backend runs the full frame sequence without a window or
//! GPU. It validates handles and records operations, which is what the
//! pipeline and game tests assert against.

pub mod headless;

pub use headless::{DeviceOp, HeadlessDevice};
