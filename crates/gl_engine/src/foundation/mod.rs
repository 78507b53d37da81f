//! Foundation module
//!
//! Math types, the frame clock and logger setup shared by the rest of the
//! engine and the viewer.

pub mod logging;
pub mod math;
pub mod time;
