pub mod cadence;
pub mod clock;

pub use cadence::{CadenceMonitor, CadenceStats};
pub use clock::{Clock, HighPrecisionClock, ManualClock};
