pub mod device;
pub mod session;

pub use device::{AudioOutput, CpalOutput, DeviceError, OutputDevice};
pub use session::{DeviceStatus, LiveSession};
