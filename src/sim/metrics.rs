use average::{Estimate, Mean};

use super::driver::SimStatus;
use crate::core::{Pid, SimCtx, Ticks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSummary {
    pub pid: Pid,
    pub bursts: usize,
    pub io_count: u32,
    pub preemptions: u32,
    pub response: Option<Ticks>,
    pub ready_wait: Ticks,
    pub turnaround: Option<Ticks>,
}

#[derive(Debug, Clone)]
pub struct Summary {
    pub status: SimStatus,
    pub total_ticks: Ticks,
    pub busy_ticks: Ticks,
    pub processes: Vec<ProcessSummary>,
}

impl Summary {
    pub fn collect(ctx: &SimCtx, status: SimStatus) -> Self {
        debug_assert!(ctx.busy_ticks <= ctx.now, "CPU busier than the clock");
        let processes = ctx
            .procs
            .iter()
            .map(|proc| ProcessSummary {
                pid: proc.id,
                bursts: proc.burst_count(),
                io_count: proc.io_count,
                preemptions: proc.preemptions,
                response: proc.response_time,
                ready_wait: proc.ready_wait,
                turnaround: proc.turnaround(),
            })
            .collect();

        Self {
            status,
            total_ticks: ctx.now,
            busy_ticks: ctx.busy_ticks,
            processes,
        }
    }

    /// Percentage of ticks the CPU ran a process; 0 for an empty run.
    pub fn cpu_utilization(&self) -> f64 {
        if self.total_ticks == 0 {
            return 0.0;
        }
        100.0 * self.busy_ticks as f64 / self.total_ticks as f64
    }

    // Averages skip processes for which the value is not (yet) known
    pub fn avg_turnaround(&self) -> Option<f64> {
        avg(self.processes.iter().filter_map(|p| p.turnaround))
    }

    pub fn avg_ready_wait(&self) -> Option<f64> {
        avg(self.processes.iter().map(|p| p.ready_wait))
    }

    pub fn avg_response(&self) -> Option<f64> {
        avg(self.processes.iter().filter_map(|p| p.response))
    }
}

fn avg(iter: impl Iterator<Item = Ticks>) -> Option<f64> {
    let mean: Mean = iter.map(|ticks| ticks as f64).collect();
    if mean.is_empty() {
        None
    } else {
        Some(mean.estimate())
    }
}
