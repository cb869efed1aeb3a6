use mlfq_sim::{
    DeviceKind, MlfqScheduler, Priority, ProcessSpec, ProcessState, Sim, SimEvent, SimStatus,
    Ticks, TimedEvent,
    core::IoRequest,
    scheduler::Quanta,
    sim::config::SAFETY_TICKS,
};

use SimEvent::*;

fn cpu_only(burst: Ticks) -> ProcessSpec {
    ProcessSpec::new(vec![burst], vec![]).unwrap()
}

fn with_io(first: Ticks, device: DeviceKind, duration: Ticks, second: Ticks) -> ProcessSpec {
    ProcessSpec::new(vec![first, second], vec![IoRequest { device, duration }]).unwrap()
}

fn run(specs: Vec<ProcessSpec>, high: Ticks, low: Ticks) -> (Sim<MlfqScheduler>, Vec<TimedEvent>) {
    let mut sim = Sim::<MlfqScheduler>::new(specs, Quanta { high, low }, SAFETY_TICKS);
    let mut events = Vec::new();
    let status = sim.run_with(|event| events.push(event.clone()));
    assert_eq!(status, SimStatus::Completed);
    (sim, events)
}

fn at(at: Ticks, event: SimEvent) -> TimedEvent {
    TimedEvent { at, event }
}

#[test]
fn quantum_expiry_demotes_and_round_robins_low_queue() {
    let (sim, events) = run(vec![cpu_only(4), cpu_only(4)], 2, 2);

    let dispatch = |pid, priority, remaining_in_burst| Dispatch {
        pid,
        priority,
        quantum: 2,
        remaining_in_burst,
    };
    assert_eq!(
        events,
        vec![
            at(0, dispatch(1, Priority::High, 4)),
            at(2, Preempted { pid: 1, remaining_in_burst: 2 }),
            at(2, dispatch(2, Priority::High, 4)),
            at(4, Preempted { pid: 2, remaining_in_burst: 2 }),
            at(4, dispatch(1, Priority::Low, 2)),
            at(6, BurstCompleted { pid: 1, burst: 1 }),
            at(6, Terminated { pid: 1, turnaround: 6 }),
            at(6, dispatch(2, Priority::Low, 2)),
            at(8, BurstCompleted { pid: 2, burst: 1 }),
            at(8, Terminated { pid: 2, turnaround: 8 }),
        ]
    );

    let summary = sim.summary();
    assert_eq!(summary.total_ticks, 8);
    assert_eq!(summary.cpu_utilization(), 100.0);
    assert_eq!(summary.processes[0].turnaround, Some(6));
    assert_eq!(summary.processes[1].turnaround, Some(8));
    assert_eq!(summary.processes[0].ready_wait, 2);
    assert_eq!(summary.processes[1].ready_wait, 4);
    assert_eq!(summary.processes[1].response, Some(2));
    assert_eq!(summary.processes[0].preemptions, 1);
}

#[test]
fn disk_completion_returns_to_low_queue() {
    let (sim, events) = run(vec![with_io(3, DeviceKind::Disk, 5, 3)], 3, 6);

    // Burst end and quantum expiry coincide at t=3; the burst end wins.
    // The device is charged for the tick it was started in, so five ticks of
    // disk end at t=7 rather than t=8.
    assert_eq!(
        events,
        vec![
            at(0, Dispatch { pid: 1, priority: Priority::High, quantum: 3, remaining_in_burst: 3 }),
            at(3, BurstCompleted { pid: 1, burst: 1 }),
            at(3, IoStarted { pid: 1, device: DeviceKind::Disk, duration: 5 }),
            at(7, IoCompleted { pid: 1, device: DeviceKind::Disk, priority: Priority::Low }),
            at(7, Dispatch { pid: 1, priority: Priority::Low, quantum: 6, remaining_in_burst: 3 }),
            at(10, BurstCompleted { pid: 1, burst: 2 }),
            at(10, Terminated { pid: 1, turnaround: 10 }),
        ]
    );

    let summary = sim.summary();
    assert_eq!(summary.total_ticks, 10);
    assert_eq!(summary.busy_ticks, 6);
    assert_eq!(summary.processes[0].io_count, 1);
    assert_eq!(summary.processes[0].preemptions, 0);
    assert_eq!(summary.processes[0].ready_wait, 0);
}

#[test]
fn waiter_admitted_from_device_queue_gets_full_service() {
    let (sim, events) = run(
        vec![
            with_io(3, DeviceKind::Disk, 5, 3),
            with_io(3, DeviceKind::Disk, 5, 3),
        ],
        3,
        6,
    );

    let disk = DeviceKind::Disk;
    assert_eq!(
        events,
        vec![
            at(0, Dispatch { pid: 1, priority: Priority::High, quantum: 3, remaining_in_burst: 3 }),
            at(3, BurstCompleted { pid: 1, burst: 1 }),
            at(3, IoStarted { pid: 1, device: disk, duration: 5 }),
            at(3, Dispatch { pid: 2, priority: Priority::High, quantum: 3, remaining_in_burst: 3 }),
            at(6, BurstCompleted { pid: 2, burst: 1 }),
            at(6, IoQueued { pid: 2, device: disk }),
            at(7, IoCompleted { pid: 1, device: disk, priority: Priority::Low }),
            at(7, IoStarted { pid: 2, device: disk, duration: 5 }),
            at(7, Dispatch { pid: 1, priority: Priority::Low, quantum: 6, remaining_in_burst: 3 }),
            at(10, BurstCompleted { pid: 1, burst: 2 }),
            at(10, Terminated { pid: 1, turnaround: 10 }),
            at(12, IoCompleted { pid: 2, device: disk, priority: Priority::Low }),
            at(12, Dispatch { pid: 2, priority: Priority::Low, quantum: 6, remaining_in_burst: 3 }),
            at(15, BurstCompleted { pid: 2, burst: 2 }),
            at(15, Terminated { pid: 2, turnaround: 15 }),
        ]
    );

    let summary = sim.summary();
    assert_eq!(summary.total_ticks, 15);
    assert_eq!(summary.busy_ticks, 12);
    assert_eq!(summary.cpu_utilization(), 80.0);
    assert_eq!(summary.processes[1].ready_wait, 3);
}

#[test]
fn tape_completion_promotes_demoted_process() {
    let (sim, events) = run(vec![with_io(3, DeviceKind::Tape, 2, 3)], 2, 6);

    let tape = DeviceKind::Tape;
    assert_eq!(
        events,
        vec![
            at(0, Dispatch { pid: 1, priority: Priority::High, quantum: 2, remaining_in_burst: 3 }),
            at(2, Preempted { pid: 1, remaining_in_burst: 1 }),
            at(2, Dispatch { pid: 1, priority: Priority::Low, quantum: 6, remaining_in_burst: 1 }),
            at(3, BurstCompleted { pid: 1, burst: 1 }),
            at(3, IoStarted { pid: 1, device: tape, duration: 2 }),
            at(4, IoCompleted { pid: 1, device: tape, priority: Priority::High }),
            at(4, Dispatch { pid: 1, priority: Priority::High, quantum: 2, remaining_in_burst: 3 }),
            at(6, Preempted { pid: 1, remaining_in_burst: 1 }),
            at(6, Dispatch { pid: 1, priority: Priority::Low, quantum: 6, remaining_in_burst: 1 }),
            at(7, BurstCompleted { pid: 1, burst: 2 }),
            at(7, Terminated { pid: 1, turnaround: 7 }),
        ]
    );

    let summary = sim.summary();
    assert_eq!(summary.processes[0].preemptions, 2);
    assert_eq!(summary.busy_ticks, 6);
}

#[test]
fn one_tick_io_started_from_cpu_ends_in_the_same_tick() {
    let (_, events) = run(vec![with_io(2, DeviceKind::Printer, 1, 2)], 3, 6);

    assert_eq!(events[1], at(2, BurstCompleted { pid: 1, burst: 1 }));
    assert_eq!(events[2], at(2, IoStarted { pid: 1, device: DeviceKind::Printer, duration: 1 }));
    assert_eq!(
        events[3],
        at(2, IoCompleted { pid: 1, device: DeviceKind::Printer, priority: Priority::High })
    );
    assert_eq!(
        events[4],
        at(2, Dispatch { pid: 1, priority: Priority::High, quantum: 3, remaining_in_burst: 2 })
    );
    assert_eq!(events.last(), Some(&at(4, Terminated { pid: 1, turnaround: 4 })));
}

#[test]
fn zero_quanta_run_as_one_tick_slices() {
    let (_, events) = run(vec![cpu_only(2)], 0, 0);

    assert_eq!(
        events,
        vec![
            at(0, Dispatch { pid: 1, priority: Priority::High, quantum: 1, remaining_in_burst: 2 }),
            at(1, Preempted { pid: 1, remaining_in_burst: 1 }),
            at(1, Dispatch { pid: 1, priority: Priority::Low, quantum: 1, remaining_in_burst: 1 }),
            at(2, BurstCompleted { pid: 1, burst: 1 }),
            at(2, Terminated { pid: 1, turnaround: 2 }),
        ]
    );
}

#[test]
fn safety_bound_aborts_run() {
    let mut sim = Sim::<MlfqScheduler>::new(
        vec![cpu_only(10), cpu_only(3)],
        Quanta { high: 10, low: 10 },
        3,
    );

    assert_eq!(sim.run(), SimStatus::Aborted);
    assert!(!sim.all_completed());
    assert!(sim.step().is_empty());

    let summary = sim.summary();
    assert_eq!(summary.status, SimStatus::Aborted);
    assert_eq!(summary.total_ticks, 4);
    assert_eq!(summary.busy_ticks, 4);
    assert_eq!(summary.processes[0].turnaround, None);
    assert_eq!(summary.processes[1].response, None);
    assert_eq!(summary.avg_turnaround(), None);
    assert_eq!(sim.core.ctx.process(1).state, ProcessState::Running);
}

#[test]
fn empty_workload_is_complete_immediately() {
    let mut sim = Sim::<MlfqScheduler>::new(vec![], Quanta { high: 3, low: 6 }, SAFETY_TICKS);
    assert_eq!(sim.status(), SimStatus::Completed);
    assert_eq!(sim.run(), SimStatus::Completed);
    assert_eq!(sim.summary().total_ticks, 0);
    assert_eq!(sim.summary().cpu_utilization(), 0.0);
}
