use std::fmt;

use crate::core::{Pid, Priority, Ticks};
use crate::device::DeviceKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    Dispatch {
        pid: Pid,
        priority: Priority,
        quantum: Ticks,
        remaining_in_burst: Ticks,
    },
    // `burst` is 1-based
    BurstCompleted {
        pid: Pid,
        burst: usize,
    },
    IoStarted {
        pid: Pid,
        device: DeviceKind,
        duration: Ticks,
    },
    IoQueued {
        pid: Pid,
        device: DeviceKind,
    },
    IoCompleted {
        pid: Pid,
        device: DeviceKind,
        priority: Priority,
    },
    Preempted {
        pid: Pid,
        remaining_in_burst: Ticks,
    },
    Terminated {
        pid: Pid,
        turnaround: Ticks,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedEvent {
    pub at: Ticks,
    pub event: SimEvent,
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SimEvent::Dispatch {
                pid,
                priority,
                quantum,
                remaining_in_burst,
            } => write!(
                f,
                "DISPATCH P{pid} (prio={priority}, q={quantum}, burst_rem={remaining_in_burst})"
            ),
            SimEvent::BurstCompleted { pid, burst } => write!(f, "P{pid} finished burst {burst}"),
            SimEvent::IoStarted {
                pid,
                device,
                duration,
            } => write!(f, "P{pid} starts I/O ({device}) dur={duration}"),
            SimEvent::IoQueued { pid, device } => write!(f, "P{pid} waits for I/O ({device})"),
            SimEvent::IoCompleted {
                pid,
                device,
                priority,
            } => write!(f, "P{pid} finished I/O ({device}) -> {priority} queue"),
            SimEvent::Preempted {
                pid,
                remaining_in_burst,
            } => write!(
                f,
                "PREEMPT P{pid} -> low queue (burst_rem={remaining_in_burst})"
            ),
            SimEvent::Terminated { pid, turnaround } => {
                write!(f, "P{pid} terminated (turnaround={turnaround})")
            }
        }
    }
}

impl fmt::Display for TimedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[t={:04}] {}", self.at, self.event)
    }
}
