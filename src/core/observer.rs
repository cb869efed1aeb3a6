use rustc_hash::FxHashMap;

use super::state::{Pid, Priority, ProcessState, SimCtx};
use crate::device::{DeviceKind, DeviceTable};
use crate::scheduler::Scheduler;

/// Where a live process currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Ready(Priority),
    Cpu,
    Device(DeviceKind),
}

/// Build the location of every live process from the ready queues, the CPU
/// slot and the devices. Panics in debug builds if a process sits in two
/// places at once.
pub fn locate<S: Scheduler>(
    ctx: &SimCtx,
    scheduler: &S,
    devices: &DeviceTable,
) -> FxHashMap<Pid, Location> {
    let mut locations = FxHashMap::default();
    let mut place = |pid: Pid, location: Location| {
        let previous = locations.insert(pid, location);
        debug_assert!(
            previous.is_none(),
            "Process {pid} at {location:?} and {previous:?}"
        );
    };

    for (pid, level) in scheduler.queued() {
        place(pid, Location::Ready(level));
    }
    if let Some(pid) = ctx.running {
        place(pid, Location::Cpu);
    }
    for device in devices.iter() {
        for pid in device.current().into_iter().chain(device.waiting()) {
            place(pid, Location::Device(device.kind));
        }
    }

    locations
}

/// Cross-checks engine state after every tick.
#[derive(Debug)]
pub struct Observer {
    step: u64,
    max_running: usize,
}

impl Observer {
    pub fn new() -> Self {
        Self {
            step: 0,
            max_running: 0,
        }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    /// Largest number of processes seen in the `Running` state at once.
    pub fn max_running(&self) -> usize {
        self.max_running
    }

    pub fn observe<S: Scheduler>(&mut self, ctx: &SimCtx, scheduler: &S, devices: &DeviceTable) {
        self.step += 1;

        let running = ctx
            .procs
            .iter()
            .filter(|proc| proc.state == ProcessState::Running)
            .count();
        self.max_running = self.max_running.max(running);
        debug_assert!(running <= 1, "{running} processes running at once");

        if cfg!(debug_assertions) {
            check_locations(ctx, scheduler, devices);
        }
    }
}

impl Default for Observer {
    fn default() -> Self {
        Self::new()
    }
}

fn check_locations<S: Scheduler>(ctx: &SimCtx, scheduler: &S, devices: &DeviceTable) {
    let locations = locate(ctx, scheduler, devices);

    for proc in &ctx.procs {
        let pid = proc.id;
        match locations.get(&pid) {
            Some(Location::Ready(level)) => {
                debug_assert_eq!(proc.state, ProcessState::Ready, "Queued process {pid}");
                debug_assert_eq!(proc.priority, *level, "Process {pid} on wrong level");
            }
            Some(Location::Cpu) => {
                debug_assert_eq!(proc.state, ProcessState::Running, "CPU holds process {pid}");
            }
            Some(Location::Device(kind)) => {
                debug_assert_eq!(proc.state, ProcessState::Blocked, "Process {pid} on {kind}");
            }
            None => debug_assert!(
                matches!(proc.state, ProcessState::New | ProcessState::Terminated),
                "Live process {pid} has no location"
            ),
        }
    }

    for device in devices.iter() {
        debug_assert!(
            device.current().is_some() || device.waiting().next().is_none(),
            "{} idle with waiters",
            device.kind
        );
    }
}
