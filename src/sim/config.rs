use log::warn;

use crate::core::Ticks;
use crate::device::DeviceKind;
use crate::scheduler::Quanta;

pub const MAX_PROCESSES: usize = 20;
pub const MAX_BURSTS_LIMIT: usize = 10;
/// Largest burst-count maximum a 31-bit bounded draw can take.
pub const MAX_BURSTS_DRAW: usize = i32::MAX as usize;
pub const SAFETY_TICKS: Ticks = 200_000;

/// Which uniform-integer stream drives workload generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RngKind {
    /// 48-bit LCG compatible with `java.util.Random`.
    #[default]
    Java,
    /// `rand`'s `StdRng`. Stable only for a fixed `rand` release.
    Std,
}

/// Base I/O service time per device kind, before the ±20% variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceBases {
    pub disk: Ticks,
    pub tape: Ticks,
    pub printer: Ticks,
}

impl DeviceBases {
    pub fn base(&self, kind: DeviceKind) -> Ticks {
        match kind {
            DeviceKind::Disk => self.disk,
            DeviceKind::Tape => self.tape,
            DeviceKind::Printer => self.printer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    pub processes: usize,
    pub seed: i64,
    pub quanta: Quanta,
    pub max_bursts: usize,
    pub bases: DeviceBases,
    pub safety_ticks: Ticks,
    pub rng: RngKind,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            processes: 5,
            seed: 42,
            quanta: Quanta { high: 3, low: 6 },
            max_bursts: 4,
            bases: DeviceBases {
                disk: 8,
                tape: 12,
                printer: 15,
            },
            safety_ticks: SAFETY_TICKS,
            rng: RngKind::default(),
        }
    }
}

impl SimConfig {
    /// Clamp out-of-range values instead of rejecting them.
    pub fn normalized(mut self) -> Self {
        let processes = self.processes.clamp(1, MAX_PROCESSES);
        if processes != self.processes {
            warn!("process count {} clamped to {processes}", self.processes);
            self.processes = processes;
        }

        let max_bursts = self.max_bursts.clamp(1, MAX_BURSTS_DRAW);
        if max_bursts != self.max_bursts {
            warn!("max bursts {} clamped to {max_bursts}", self.max_bursts);
            self.max_bursts = max_bursts;
        }

        for (name, quantum) in [
            ("high", &mut self.quanta.high),
            ("low", &mut self.quanta.low),
        ] {
            if *quantum == 0 {
                warn!("{name} quantum 0 raised to 1");
                *quantum = 1;
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_already_normal() {
        assert_eq!(SimConfig::default().normalized(), SimConfig::default());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = SimConfig {
            processes: 0,
            max_bursts: 0,
            quanta: Quanta { high: 0, low: 4 },
            ..SimConfig::default()
        }
        .normalized();
        assert_eq!(config.processes, 1);
        assert_eq!(config.max_bursts, 1);
        assert_eq!(config.quanta, Quanta { high: 1, low: 4 });

        let config = SimConfig {
            processes: 500,
            ..SimConfig::default()
        }
        .normalized();
        assert_eq!(config.processes, MAX_PROCESSES);
    }

    #[test]
    fn max_bursts_beyond_draw_range_is_capped() {
        for max_bursts in [3_000_000_000, 1usize << 32, usize::MAX] {
            let config = SimConfig {
                max_bursts,
                ..SimConfig::default()
            }
            .normalized();
            assert_eq!(config.max_bursts, MAX_BURSTS_DRAW);
        }
    }
}
