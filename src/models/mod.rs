pub mod daily_log;
pub mod rpe_target;

pub use daily_log::{DailyLog, LogPatch, PostSessionInput, PreSessionInput, RatioUpdate};
pub use rpe_target::TeamRpeTarget;
