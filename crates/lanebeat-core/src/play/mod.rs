//! Run-time types: everything that changes while a chart is being played.
//!
//! - `SchedulingWindow` - active note set, spawning and auto-miss sweep
//! - `resolve` - tap to note matching
//! - `RunTracker` - score, combo and tier counts; produces `RunSummary`
//! - `PhaseTracker` - Ready / Playing / Finished lifecycle
//! - `Engine` - tick and tap entry points over one chart
//! - `Driver` - fixed-step clock replaying a tap log

mod clock;
mod engine;
mod resolver;
mod state;
mod tracker;
mod window;

pub use clock::*;
pub use engine::*;
pub use resolver::*;
pub use state::*;
pub use tracker::*;
pub use window::*;
