use log::{info, warn};

use super::{
    config::SimConfig,
    metrics::Summary,
    workload::workload,
};
use crate::{
    core::{ProcessSpec, SchedCore, Ticks, TimedEvent, WorkloadError},
    scheduler::{Quanta, Scheduler},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimStatus {
    Running,
    /// Every process terminated.
    Completed,
    /// The safety tick bound was exceeded first.
    Aborted,
}

pub struct Sim<S: Scheduler> {
    pub core: SchedCore<S>,
    safety_ticks: Ticks,
    status: SimStatus,
}

impl<S: Scheduler> Sim<S> {
    /// Admit every process on the high queue at tick 0, in order.
    pub fn new(specs: Vec<ProcessSpec>, quanta: Quanta, safety_ticks: Ticks) -> Self {
        let mut core = SchedCore::<S>::new(quanta);
        for spec in specs {
            core.admit(spec);
        }

        let status = if core.ctx.all_terminated() {
            SimStatus::Completed
        } else {
            SimStatus::Running
        };

        Self {
            core,
            safety_ticks,
            status,
        }
    }

    /// Normalize `config`, generate its workload and build the simulation.
    pub fn from_config(config: &SimConfig) -> Result<Self, WorkloadError> {
        let config = config.clone().normalized();
        let specs = workload(&config)?;
        info!(
            "generated {} processes (seed {}, {:?} rng)",
            specs.len(),
            config.seed,
            config.rng
        );
        Ok(Self::new(specs, config.quanta, config.safety_ticks))
    }

    /// Advance one tick. Does nothing once the run has ended.
    pub fn step(&mut self) -> Vec<TimedEvent> {
        if self.status != SimStatus::Running {
            return Vec::new();
        }

        let events = self.core.tick();

        if self.core.ctx.all_terminated() {
            self.status = SimStatus::Completed;
            info!("all processes terminated at t={}", self.core.now());
        } else if self.core.now() > self.safety_ticks {
            self.status = SimStatus::Aborted;
            warn!(
                "safety bound of {} ticks exceeded, {} of {} processes unfinished",
                self.safety_ticks,
                self.core.ctx.procs.len() - self.core.ctx.finished,
                self.core.ctx.procs.len()
            );
        }

        events
    }

    pub fn run(&mut self) -> SimStatus {
        self.run_with(|_| {})
    }

    /// Run to completion or abort, handing each event to `on_event` in order.
    pub fn run_with(&mut self, mut on_event: impl FnMut(&TimedEvent)) -> SimStatus {
        while self.status == SimStatus::Running {
            for event in self.step() {
                on_event(&event);
            }
        }
        self.status
    }

    pub fn status(&self) -> SimStatus {
        self.status
    }

    pub fn all_completed(&self) -> bool {
        self.status == SimStatus::Completed
    }

    pub fn summary(&self) -> Summary {
        Summary::collect(&self.core.ctx, self.status)
    }
}
