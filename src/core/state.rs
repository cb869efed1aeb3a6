use std::{error::Error, fmt};

use crate::device::DeviceKind;

// 1-based; process `n` lives at `procs[n - 1]`
pub type Pid = usize;
pub type Ticks = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => f.write_str("high"),
            Priority::Low => f.write_str("low"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    New,
    Ready,
    Running,
    Blocked,
    Terminated,
}

/// I/O a process performs after finishing a CPU burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoRequest {
    pub device: DeviceKind,
    pub duration: Ticks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkloadError {
    NoBursts,
    EmptyBurst { index: usize },
    IoCountMismatch { bursts: usize, io: usize },
    EmptyIo { index: usize },
}

impl fmt::Display for WorkloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadError::NoBursts => write!(f, "process has no CPU bursts"),
            WorkloadError::EmptyBurst { index } => write!(f, "CPU burst {index} has zero length"),
            WorkloadError::IoCountMismatch { bursts, io } => write!(
                f,
                "{bursts} CPU bursts need {} I/O requests, got {io}",
                bursts - 1
            ),
            WorkloadError::EmptyIo { index } => write!(f, "I/O request {index} has zero length"),
        }
    }
}

impl Error for WorkloadError {}

/// Static description of a process: its CPU bursts and the I/O between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    bursts: Vec<Ticks>,
    io: Vec<IoRequest>,
}

impl ProcessSpec {
    pub fn new(bursts: Vec<Ticks>, io: Vec<IoRequest>) -> Result<Self, WorkloadError> {
        if bursts.is_empty() {
            return Err(WorkloadError::NoBursts);
        }
        if let Some(index) = bursts.iter().position(|&b| b == 0) {
            return Err(WorkloadError::EmptyBurst { index });
        }
        if io.len() != bursts.len() - 1 {
            return Err(WorkloadError::IoCountMismatch {
                bursts: bursts.len(),
                io: io.len(),
            });
        }
        if let Some(index) = io.iter().position(|req| req.duration == 0) {
            return Err(WorkloadError::EmptyIo { index });
        }
        Ok(Self { bursts, io })
    }

    pub fn bursts(&self) -> &[Ticks] {
        &self.bursts
    }

    pub fn io(&self) -> &[IoRequest] {
        &self.io
    }
}

/// Per-process control block.
#[derive(Debug, Clone)]
pub struct ProcessRecord {
    pub id: Pid,
    pub priority: Priority,
    pub state: ProcessState,
    pub bursts: Vec<Ticks>,
    pub io: Vec<IoRequest>,
    pub current_burst: usize,
    pub remaining_in_burst: Ticks,
    pub quantum_remaining: Ticks,

    pub arrival_time: Ticks,
    pub response_time: Option<Ticks>,
    pub ready_wait: Ticks,
    pub last_enqueue: Ticks,
    pub io_count: u32,
    pub preemptions: u32,
    pub completion_time: Option<Ticks>,
}

impl ProcessRecord {
    fn new(id: Pid, spec: ProcessSpec, arrival_time: Ticks) -> Self {
        let first = spec.bursts[0];
        Self {
            id,
            priority: Priority::High,
            state: ProcessState::New,
            bursts: spec.bursts,
            io: spec.io,
            current_burst: 0,
            remaining_in_burst: first,
            quantum_remaining: 0,
            arrival_time,
            response_time: None,
            ready_wait: 0,
            last_enqueue: arrival_time,
            io_count: 0,
            preemptions: 0,
            completion_time: None,
        }
    }

    pub fn burst_count(&self) -> usize {
        self.bursts.len()
    }

    pub fn has_next_burst(&self) -> bool {
        self.current_burst + 1 < self.bursts.len()
    }

    pub fn turnaround(&self) -> Option<Ticks> {
        self.completion_time.map(|end| end - self.arrival_time)
    }
}

/// Mutable engine state shared by the scheduling phases of a tick.
#[derive(Debug)]
pub struct SimCtx {
    pub now: Ticks,
    pub procs: Vec<ProcessRecord>,
    pub running: Option<Pid>,
    pub busy_ticks: Ticks,
    pub finished: usize,
}

impl SimCtx {
    pub fn new() -> Self {
        Self {
            now: 0,
            procs: Vec::new(),
            running: None,
            busy_ticks: 0,
            finished: 0,
        }
    }

    pub fn create_process(&mut self, spec: ProcessSpec) -> Pid {
        let id = self.procs.len() + 1;
        self.procs.push(ProcessRecord::new(id, spec, self.now));
        id
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    pub fn process(&self, pid: Pid) -> &ProcessRecord {
        &self.procs[pid - 1]
    }

    pub fn process_mut(&mut self, pid: Pid) -> &mut ProcessRecord {
        &mut self.procs[pid - 1]
    }

    pub fn all_terminated(&self) -> bool {
        self.finished == self.procs.len()
    }

    /// Put a process on a ready level, stamping the tick it started waiting.
    pub fn mark_ready(&mut self, pid: Pid, level: Priority, at: Ticks) {
        debug_assert_ne!(
            self.running,
            Some(pid),
            "Process {pid} must leave the CPU before it is made ready"
        );
        let proc = self.process_mut(pid);
        debug_assert_ne!(
            proc.state,
            ProcessState::Terminated,
            "Terminated process {pid} cannot be made ready"
        );
        proc.priority = level;
        proc.state = ProcessState::Ready;
        proc.last_enqueue = at;
    }

    /// Give the CPU to `pid` with a fresh quantum and settle its wait metrics.
    pub fn set_running(&mut self, pid: Pid, quantum: Ticks) {
        debug_assert!(self.running.is_none(), "CPU already running a process");
        let now = self.now;
        let proc = self.process_mut(pid);
        debug_assert_eq!(
            proc.state,
            ProcessState::Ready,
            "Process {pid} must be ready when dispatched"
        );
        proc.state = ProcessState::Running;
        proc.quantum_remaining = quantum;
        if proc.response_time.is_none() {
            proc.response_time = Some(now - proc.arrival_time);
        }
        proc.ready_wait += now - proc.last_enqueue;
        self.running = Some(pid);
    }

    pub fn clear_cpu(&mut self) {
        self.running = None;
    }

    /// Move the running process past its finished burst and block it on the
    /// I/O attached to that burst.
    pub fn block_on_io(&mut self, pid: Pid) -> IoRequest {
        debug_assert_eq!(self.running, Some(pid));
        self.clear_cpu();

        let proc = self.process_mut(pid);
        let request = proc.io[proc.current_burst];
        proc.state = ProcessState::Blocked;
        proc.io_count += 1;
        proc.current_burst += 1;
        proc.remaining_in_burst = proc.bursts[proc.current_burst];
        request
    }

    pub fn preempt(&mut self, pid: Pid) {
        debug_assert_eq!(self.running, Some(pid));
        self.clear_cpu();
        let proc = self.process_mut(pid);
        proc.preemptions += 1;
        proc.state = ProcessState::Ready;
    }

    pub fn mark_terminated(&mut self, pid: Pid, completion_time: Ticks) {
        debug_assert_eq!(self.running, Some(pid));
        self.clear_cpu();
        let proc = self.process_mut(pid);
        proc.state = ProcessState::Terminated;
        proc.completion_time = Some(completion_time);
        self.finished += 1;
    }
}

impl Default for SimCtx {
    fn default() -> Self {
        Self::new()
    }
}
