use std::collections::VecDeque;

use super::{DispatchError, EnqueueReason, Pid, Quanta, Scheduler, SimCtx, Ticks};
use crate::core::Priority;

/// Two-level feedback queue: round robin within a level, high before low.
///
/// New processes start high, quantum expiry demotes to low, and I/O
/// completion routes by device (see [`crate::device::DeviceKind::return_priority`]).
#[derive(Debug)]
pub struct MlfqScheduler {
    high: VecDeque<Pid>,
    low: VecDeque<Pid>,
    quanta: Quanta,
}

impl MlfqScheduler {
    pub fn queue(&self, level: Priority) -> impl Iterator<Item = Pid> + '_ {
        match level {
            Priority::High => self.high.iter(),
            Priority::Low => self.low.iter(),
        }
        .copied()
    }

    fn queue_mut(&mut self, level: Priority) -> &mut VecDeque<Pid> {
        match level {
            Priority::High => &mut self.high,
            Priority::Low => &mut self.low,
        }
    }
}

impl Scheduler for MlfqScheduler {
    fn init(quanta: Quanta) -> Self {
        // A zero slice cannot count down; treat it as one tick
        let quanta = Quanta {
            high: quanta.high.max(1),
            low: quanta.low.max(1),
        };
        Self {
            high: VecDeque::new(),
            low: VecDeque::new(),
            quanta,
        }
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, pid: Pid, reason: EnqueueReason, at: Ticks) {
        debug_assert!(!self.is_queued(pid), "Process {pid} already in a ready queue");

        let level = match reason {
            EnqueueReason::Admitted => Priority::High,
            EnqueueReason::Preempted => Priority::Low,
            EnqueueReason::IoCompleted(device) => device.return_priority(),
        };
        ctx.mark_ready(pid, level, at);
        self.queue_mut(level).push_back(pid);
    }

    fn dispatch(&mut self, ctx: &mut SimCtx) -> Result<Pid, DispatchError> {
        let pid = self
            .high
            .pop_front()
            .or_else(|| self.low.pop_front())
            .ok_or(DispatchError::NoRunnableProcess)?;

        let quantum = self.quanta.for_level(ctx.process(pid).priority);
        ctx.set_running(pid, quantum);
        Ok(pid)
    }

    fn is_queued(&self, pid: Pid) -> bool {
        self.high.contains(&pid) || self.low.contains(&pid)
    }

    fn queued(&self) -> Vec<(Pid, Priority)> {
        let high = self.high.iter().map(|&pid| (pid, Priority::High));
        let low = self.low.iter().map(|&pid| (pid, Priority::Low));
        high.chain(low).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ProcessSpec, ProcessState};
    use crate::device::DeviceKind;

    fn setup(count: usize) -> (SimCtx, MlfqScheduler) {
        let mut ctx = SimCtx::new();
        for _ in 0..count {
            ctx.create_process(ProcessSpec::new(vec![5], vec![]).unwrap());
        }
        let sched = MlfqScheduler::init(Quanta { high: 3, low: 6 });
        (ctx, sched)
    }

    #[test]
    fn high_queue_drains_before_low() {
        let (mut ctx, mut sched) = setup(3);
        sched.enqueue(&mut ctx, 1, EnqueueReason::Preempted, 0);
        sched.enqueue(&mut ctx, 2, EnqueueReason::Admitted, 0);
        sched.enqueue(&mut ctx, 3, EnqueueReason::Admitted, 0);

        assert_eq!(sched.dispatch(&mut ctx).unwrap(), 2);
        assert_eq!(ctx.process(2).quantum_remaining, 3);
        ctx.mark_terminated(2, 0);

        assert_eq!(sched.dispatch(&mut ctx).unwrap(), 3);
        ctx.mark_terminated(3, 0);

        assert_eq!(sched.dispatch(&mut ctx).unwrap(), 1);
        assert_eq!(ctx.process(1).quantum_remaining, 6);
        assert_eq!(ctx.process(1).state, ProcessState::Running);
    }

    #[test]
    fn empty_queues_leave_cpu_idle() {
        let (mut ctx, mut sched) = setup(0);
        assert!(matches!(
            sched.dispatch(&mut ctx),
            Err(DispatchError::NoRunnableProcess)
        ));
        assert_eq!(ctx.running, None);
    }

    #[test]
    fn zero_quantum_is_raised_to_one_tick() {
        let mut ctx = SimCtx::new();
        ctx.create_process(ProcessSpec::new(vec![5], vec![]).unwrap());
        let mut sched = MlfqScheduler::init(Quanta { high: 0, low: 0 });

        sched.enqueue(&mut ctx, 1, EnqueueReason::Admitted, 0);
        sched.dispatch(&mut ctx).unwrap();
        assert_eq!(ctx.process(1).quantum_remaining, 1);
    }

    #[test]
    fn queued_lists_high_then_low() {
        let (mut ctx, mut sched) = setup(3);
        sched.enqueue(&mut ctx, 1, EnqueueReason::Preempted, 0);
        sched.enqueue(&mut ctx, 2, EnqueueReason::Admitted, 0);
        sched.enqueue(&mut ctx, 3, EnqueueReason::Admitted, 0);
        assert_eq!(
            sched.queued(),
            vec![(2, Priority::High), (3, Priority::High), (1, Priority::Low)]
        );
    }

    #[test]
    fn io_completion_routes_by_device() {
        let (mut ctx, mut sched) = setup(2);
        sched.enqueue(&mut ctx, 1, EnqueueReason::IoCompleted(DeviceKind::Disk), 0);
        sched.enqueue(&mut ctx, 2, EnqueueReason::IoCompleted(DeviceKind::Printer), 0);

        assert_eq!(sched.queue(Priority::Low).collect::<Vec<_>>(), vec![1]);
        assert_eq!(sched.queue(Priority::High).collect::<Vec<_>>(), vec![2]);
        assert_eq!(ctx.process(1).priority, Priority::Low);
    }
}
