use clap::{Parser, ValueEnum};
use mlfq_sim::{
    MlfqScheduler, Sim, SimStatus, Ticks,
    scheduler::Quanta,
    sim::{DeviceBases, RngKind, SimConfig, config::SAFETY_TICKS},
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RngArg {
    /// java.util.Random-compatible stream
    Java,
    /// rand's StdRng
    Std,
}

impl From<RngArg> for RngKind {
    fn from(arg: RngArg) -> Self {
        match arg {
            RngArg::Java => RngKind::Java,
            RngArg::Std => RngKind::Std,
        }
    }
}

/// Round robin with feedback: a two-level MLFQ simulation with I/O devices
#[derive(Parser, Debug)]
#[command(name = "mlfq_sim", long_about = None)]
struct Args {
    /// Number of processes (clamped to 1..=20)
    #[arg(default_value_t = 5, allow_negative_numbers = true)]
    n: i64,

    /// Workload seed
    #[arg(default_value_t = 42, allow_negative_numbers = true)]
    seed: i64,

    /// Quantum of the high queue
    #[arg(default_value_t = 3)]
    qh: Ticks,

    /// Quantum of the low queue
    #[arg(default_value_t = 6)]
    ql: Ticks,

    /// Maximum CPU bursts per process (capped at 10)
    #[arg(default_value_t = 4)]
    max_bursts: usize,

    /// Base I/O duration of the disk
    #[arg(default_value_t = 8)]
    base_disk: Ticks,

    /// Base I/O duration of the tape
    #[arg(default_value_t = 12)]
    base_tape: Ticks,

    /// Base I/O duration of the printer
    #[arg(default_value_t = 15)]
    base_print: Ticks,

    /// Random source used to generate the workload
    #[arg(long, value_enum, default_value_t = RngArg::Java)]
    rng: RngArg,

    /// Abort once the clock passes this many ticks
    #[arg(long, default_value_t = SAFETY_TICKS)]
    safety_ticks: Ticks,

    /// Only print the summary
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

impl Args {
    fn config(&self) -> SimConfig {
        SimConfig {
            processes: self.n.max(0) as usize,
            seed: self.seed,
            quanta: Quanta {
                high: self.qh,
                low: self.ql,
            },
            max_bursts: self.max_bursts,
            bases: DeviceBases {
                disk: self.base_disk,
                tape: self.base_tape,
                printer: self.base_print,
            },
            safety_ticks: self.safety_ticks,
            rng: self.rng.into(),
        }
        .normalized()
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = args.config();

    let mut sim = match Sim::<MlfqScheduler>::from_config(&config) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("invalid workload: {err}");
            std::process::exit(1);
        }
    };

    println!("=== RR with feedback (2-level MLFQ) ===");
    println!(
        "N={} SEED={} QH={} QL={} MAX_B={} BASES: DISK={}, TAPE={}, PRINT={}\n",
        config.processes,
        config.seed,
        config.quanta.high,
        config.quanta.low,
        config.max_bursts,
        config.bases.disk,
        config.bases.tape,
        config.bases.printer
    );

    let status = sim.run_with(|event| {
        if !args.quiet {
            println!("{event}");
        }
    });

    if status == SimStatus::Aborted {
        eprintln!(
            "run exceeded {} ticks (safety bound); results are incomplete",
            config.safety_ticks
        );
    }

    print_summary(&sim);
}

fn print_summary(sim: &Sim<MlfqScheduler>) {
    let summary = sim.summary();

    println!("\n=== SUMMARY ===");
    for p in &summary.processes {
        println!(
            "P{:<2}: bursts={}, io={}, preemp={}, resp={}, wait={}, turn={}",
            p.pid,
            p.bursts,
            p.io_count,
            p.preemptions,
            or_dash(p.response),
            p.ready_wait,
            or_dash(p.turnaround)
        );
    }

    println!(
        "\nTotal time: {} ticks | CPU busy: {} ({:.2}%)",
        summary.total_ticks,
        summary.busy_ticks,
        summary.cpu_utilization()
    );
    println!(
        "Averages -> Turnaround: {} | Wait(READY): {} | Response: {}",
        avg_or_dash(summary.avg_turnaround()),
        avg_or_dash(summary.avg_ready_wait()),
        avg_or_dash(summary.avg_response())
    );
}

fn or_dash(value: Option<Ticks>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn avg_or_dash(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}
