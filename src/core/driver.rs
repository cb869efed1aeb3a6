use log::{debug, trace};

use super::{
    event::{SimEvent, TimedEvent},
    observer::Observer,
    state::{Pid, ProcessSpec, SimCtx, Ticks},
};
use crate::device::{Admission, DeviceKind, DeviceTable};
use crate::scheduler::{DispatchError, EnqueueReason, Quanta, Scheduler};

pub struct SchedCore<S: Scheduler> {
    pub ctx: SimCtx,
    pub scheduler: S,
    pub devices: DeviceTable,
    observer: Observer,
    events: Vec<TimedEvent>,
}

impl<S: Scheduler> SchedCore<S> {
    pub fn new(quanta: Quanta) -> Self {
        Self {
            ctx: SimCtx::new(),
            scheduler: S::init(quanta),
            devices: DeviceTable::new(),
            observer: Observer::new(),
            events: Vec::new(),
        }
    }

    /// Create a process at the current tick and queue it on the high level.
    pub fn admit(&mut self, spec: ProcessSpec) -> Pid {
        let pid = self.ctx.create_process(spec);
        let now = self.ctx.now;
        self.scheduler
            .enqueue(&mut self.ctx, pid, EnqueueReason::Admitted, now);
        pid
    }

    /// Run one tick: dispatch, one tick of CPU, one tick of every device,
    /// then advance the clock. Returns the events of this tick in order.
    pub fn tick(&mut self) -> Vec<TimedEvent> {
        trace!("tick {}", self.ctx.now);

        if self.ctx.running.is_none() {
            self.try_dispatch();
        }
        self.tick_cpu();
        self.tick_devices();

        self.ctx.advance_time(1);
        self.observer
            .observe(&self.ctx, &self.scheduler, &self.devices);

        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, at: Ticks, event: SimEvent) {
        debug!("t={at} {event}");
        self.events.push(TimedEvent { at, event });
    }

    fn try_dispatch(&mut self) {
        let pid = match self.scheduler.dispatch(&mut self.ctx) {
            Ok(pid) => pid,
            // CPU stays idle this tick
            Err(DispatchError::NoRunnableProcess) => return,
        };

        let proc = self.ctx.process(pid);
        let event = SimEvent::Dispatch {
            pid,
            priority: proc.priority,
            quantum: proc.quantum_remaining,
            remaining_in_burst: proc.remaining_in_burst,
        };
        self.emit(self.ctx.now, event);
    }

    fn tick_cpu(&mut self) {
        let pid = match self.ctx.running {
            Some(pid) => pid,
            None => return,
        };
        let end = self.ctx.now + 1;

        // In its own block to avoid double-mutable-borrow
        {
            let proc = self.ctx.process_mut(pid);
            proc.remaining_in_burst = proc.remaining_in_burst.saturating_sub(1);
            proc.quantum_remaining = proc.quantum_remaining.saturating_sub(1);
        }
        self.ctx.busy_ticks += 1;

        let proc = self.ctx.process(pid);
        let burst_done = proc.remaining_in_burst == 0;
        let slice_expired = proc.quantum_remaining == 0;
        let has_next_burst = proc.has_next_burst();
        let burst = proc.current_burst + 1;

        // Burst completion wins over quantum expiry in the same tick
        if burst_done {
            self.emit(end, SimEvent::BurstCompleted { pid, burst });

            if has_next_burst {
                let request = self.ctx.block_on_io(pid);
                let device = request.device;
                let event = match self.devices.get_mut(device).submit(pid, request.duration) {
                    Admission::Started => SimEvent::IoStarted {
                        pid,
                        device,
                        duration: request.duration,
                    },
                    Admission::Queued => SimEvent::IoQueued { pid, device },
                };
                self.emit(end, event);
            } else {
                self.ctx.mark_terminated(pid, end);
                let turnaround = self.ctx.process(pid).turnaround().unwrap_or_default();
                self.emit(end, SimEvent::Terminated { pid, turnaround });
            }
            return;
        }

        if slice_expired {
            self.ctx.preempt(pid);
            self.scheduler
                .enqueue(&mut self.ctx, pid, EnqueueReason::Preempted, end);
            let remaining_in_burst = self.ctx.process(pid).remaining_in_burst;
            self.emit(
                end,
                SimEvent::Preempted {
                    pid,
                    remaining_in_burst,
                },
            );
        }
    }

    // A device that accepted a request during the CPU phase of this tick is
    // charged for this tick as well.
    fn tick_devices(&mut self) {
        let end = self.ctx.now + 1;

        for device in DeviceKind::ALL {
            let step = self.devices.get_mut(device).tick();

            if let Some(pid) = step.completed {
                self.scheduler
                    .enqueue(&mut self.ctx, pid, EnqueueReason::IoCompleted(device), end);
                let priority = self.ctx.process(pid).priority;
                self.emit(
                    end,
                    SimEvent::IoCompleted {
                        pid,
                        device,
                        priority,
                    },
                );
            }

            if let Some((pid, duration)) = step.started {
                self.emit(
                    end,
                    SimEvent::IoStarted {
                        pid,
                        device,
                        duration,
                    },
                );
            }
        }
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}
