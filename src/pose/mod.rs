pub mod angle;
pub mod frame;
pub mod landmark;
pub mod smooth;

pub use angle::AngleJoint;
pub use frame::{FrameSize, PoseFrame};
pub use landmark::{visibility_scale, Landmark, LandmarkIndex};
pub use smooth::LandmarkSmoother;
