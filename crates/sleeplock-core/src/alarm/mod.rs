mod clock;
mod registry;

pub use clock::{format_clock, format_countdown, minute_stamp, AlarmTime};
pub use registry::{Alarm, AlarmId, AlarmRegistry};
