use std::{collections::VecDeque, fmt};

use crate::core::{Pid, Priority, Ticks};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Disk,
    Tape,
    Printer,
}

impl DeviceKind {
    /// Service order within the device phase of a tick.
    pub const ALL: [DeviceKind; 3] = [DeviceKind::Disk, DeviceKind::Tape, DeviceKind::Printer];

    fn index(self) -> usize {
        match self {
            DeviceKind::Disk => 0,
            DeviceKind::Tape => 1,
            DeviceKind::Printer => 2,
        }
    }

    /// Ready level a process is routed to when its I/O on this device ends.
    ///
    /// Disk completions feed back into the low queue; tape and printer
    /// completions return to the high queue regardless of the level the
    /// process held before blocking.
    pub fn return_priority(self) -> Priority {
        match self {
            DeviceKind::Disk => Priority::Low,
            DeviceKind::Tape | DeviceKind::Printer => Priority::High,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DeviceKind::Disk => "disk",
            DeviceKind::Tape => "tape",
            DeviceKind::Printer => "printer",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a submitted request went straight into service or had to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Started,
    Queued,
}

/// What happened on one device during one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStep {
    pub completed: Option<Pid>,
    pub started: Option<(Pid, Ticks)>,
}

#[derive(Debug)]
pub struct Device {
    pub kind: DeviceKind,
    current: Option<Pid>,
    remaining: Ticks,
    // Waiters keep the service time of the request they are blocked on
    waiting: VecDeque<(Pid, Ticks)>,
}

impl Device {
    pub fn new(kind: DeviceKind) -> Self {
        Self {
            kind,
            current: None,
            remaining: 0,
            waiting: VecDeque::new(),
        }
    }

    pub fn current(&self) -> Option<Pid> {
        self.current
    }

    pub fn remaining(&self) -> Ticks {
        self.remaining
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    pub fn waiting(&self) -> impl Iterator<Item = Pid> + '_ {
        self.waiting.iter().map(|&(pid, _)| pid)
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.current == Some(pid) || self.waiting().any(|waiter| waiter == pid)
    }

    /// Hand a request to the device. An idle device starts serving it at
    /// once; a busy one appends it to the tail of the wait queue.
    pub fn submit(&mut self, pid: Pid, duration: Ticks) -> Admission {
        debug_assert!(duration > 0, "I/O for process {pid} has zero duration");
        debug_assert!(!self.contains(pid), "Process {pid} already on {}", self.kind);

        if self.current.is_none() {
            self.current = Some(pid);
            self.remaining = duration;
            Admission::Started
        } else {
            self.waiting.push_back((pid, duration));
            Admission::Queued
        }
    }

    /// Advance the device by one tick.
    ///
    /// A request admitted from the wait queue during this call is not
    /// charged for the current tick; its full duration starts counting on
    /// the next one.
    pub fn tick(&mut self) -> DeviceStep {
        let mut step = DeviceStep::default();

        if let Some(pid) = self.current {
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining > 0 {
                return step;
            }
            self.current = None;
            step.completed = Some(pid);
        }

        if let Some((pid, duration)) = self.waiting.pop_front() {
            self.current = Some(pid);
            self.remaining = duration;
            step.started = Some((pid, duration));
        }

        step
    }
}

/// The fixed set of three devices, indexed by [`DeviceKind`].
#[derive(Debug)]
pub struct DeviceTable {
    devices: [Device; 3],
}

impl DeviceTable {
    pub fn new() -> Self {
        Self {
            devices: DeviceKind::ALL.map(Device::new),
        }
    }

    pub fn get(&self, kind: DeviceKind) -> &Device {
        &self.devices[kind.index()]
    }

    pub fn get_mut(&mut self, kind: DeviceKind) -> &mut Device {
        &mut self.devices[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    pub fn holding(&self, pid: Pid) -> Option<DeviceKind> {
        self.devices
            .iter()
            .find(|device| device.contains(pid))
            .map(|device| device.kind)
    }
}

impl Default for DeviceTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_device_starts_immediately() {
        let mut disk = Device::new(DeviceKind::Disk);
        assert_eq!(disk.submit(1, 3), Admission::Started);
        assert_eq!(disk.current(), Some(1));
        assert_eq!(disk.remaining(), 3);
    }

    #[test]
    fn busy_device_queues_in_arrival_order() {
        let mut tape = Device::new(DeviceKind::Tape);
        tape.submit(1, 1);
        assert_eq!(tape.submit(2, 4), Admission::Queued);
        assert_eq!(tape.submit(3, 2), Admission::Queued);
        assert_eq!(tape.waiting().collect::<Vec<_>>(), vec![2, 3]);

        let step = tape.tick();
        assert_eq!(step.completed, Some(1));
        assert_eq!(step.started, Some((2, 4)));
        assert_eq!(tape.waiting().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn admitted_waiter_is_not_charged_in_the_same_tick() {
        let mut printer = Device::new(DeviceKind::Printer);
        printer.submit(1, 1);
        printer.submit(2, 2);

        printer.tick();
        assert_eq!(printer.current(), Some(2));
        assert_eq!(printer.remaining(), 2);

        assert_eq!(printer.tick(), DeviceStep::default());
        let step = printer.tick();
        assert_eq!(step.completed, Some(2));
        assert!(printer.is_idle());
    }

    #[test]
    fn idle_tick_is_a_no_op() {
        let mut disk = Device::new(DeviceKind::Disk);
        assert_eq!(disk.tick(), DeviceStep::default());
        assert!(disk.is_idle());
    }

    #[test]
    fn return_routing_is_asymmetric() {
        assert_eq!(DeviceKind::Disk.return_priority(), Priority::Low);
        assert_eq!(DeviceKind::Tape.return_priority(), Priority::High);
        assert_eq!(DeviceKind::Printer.return_priority(), Priority::High);
    }

    #[test]
    fn table_finds_holder() {
        let mut table = DeviceTable::new();
        table.get_mut(DeviceKind::Tape).submit(4, 2);
        table.get_mut(DeviceKind::Tape).submit(5, 2);
        assert_eq!(table.holding(5), Some(DeviceKind::Tape));
        assert_eq!(table.holding(6), None);
    }
}
