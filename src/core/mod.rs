pub mod driver;
pub mod event;
pub mod observer;
pub mod state;

pub use driver::SchedCore;
pub use event::{SimEvent, TimedEvent};
pub use observer::{Location, Observer};
pub use state::{
    IoRequest, Pid, Priority, ProcessRecord, ProcessSpec, ProcessState, SimCtx, Ticks,
    WorkloadError,
};
