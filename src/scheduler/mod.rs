pub mod mlfq;

use crate::core::{
    Ticks,
    state::{Pid, Priority, SimCtx},
};
use crate::device::DeviceKind;
pub use mlfq::MlfqScheduler;

/// Why a process is being put back on a ready queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueReason {
    Admitted,
    Preempted,
    IoCompleted(DeviceKind),
}

#[derive(Debug)]
pub enum DispatchError {
    NoRunnableProcess,
}

/// Time slice handed out per ready level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quanta {
    pub high: Ticks,
    pub low: Ticks,
}

impl Quanta {
    pub fn for_level(&self, level: Priority) -> Ticks {
        match level {
            Priority::High => self.high,
            Priority::Low => self.low,
        }
    }
}

pub trait Scheduler {
    fn init(quanta: Quanta) -> Self;

    /// Append `pid` to a ready queue chosen from `reason`, stamping `at` as
    /// the tick its ready-wait starts.
    fn enqueue(&mut self, ctx: &mut SimCtx, pid: Pid, reason: EnqueueReason, at: Ticks);

    /// Pick the next process and put it on the CPU.
    fn dispatch(&mut self, ctx: &mut SimCtx) -> Result<Pid, DispatchError>;

    fn is_queued(&self, pid: Pid) -> bool;

    /// Every queued process with its level, head first within a level.
    fn queued(&self) -> Vec<(Pid, Priority)>;
}
