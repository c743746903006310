pub mod calibrate;
pub mod rep;

pub use calibrate::{Calibrator, JointBand};
pub use rep::{Direction, RepCounter, Transition};
