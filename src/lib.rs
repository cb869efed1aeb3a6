pub mod core;
pub mod device;
pub mod scheduler;
pub mod sim;

pub use crate::core::{Pid, Priority, ProcessSpec, ProcessState, SimEvent, Ticks, TimedEvent};
pub use device::DeviceKind;
pub use scheduler::{MlfqScheduler, Scheduler};
pub use sim::{Sim, SimConfig, SimStatus, Summary};
