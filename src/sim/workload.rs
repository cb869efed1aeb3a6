use rand::{Rng, SeedableRng, rngs::StdRng};

use super::config::{MAX_BURSTS_DRAW, MAX_BURSTS_LIMIT, RngKind, SimConfig};
use crate::core::{IoRequest, ProcessSpec, Ticks, WorkloadError};
use crate::device::DeviceKind;

pub const BURST_MIN: Ticks = 3;
pub const BURST_MAX: Ticks = 10;

/// Stream of uniformly distributed integers.
pub trait UniformSource {
    /// Uniform draw from `lo..=hi`.
    fn next_in(&mut self, lo: u32, hi: u32) -> u32;
}

const MULTIPLIER: u64 = 0x5_DEEC_E66D;
const ADDEND: u64 = 0xB;
const MASK: u64 = (1 << 48) - 1;

/// 48-bit LCG with the same stream as `java.util.Random`.
#[derive(Debug, Clone)]
pub struct JavaRandom {
    state: u64,
}

impl JavaRandom {
    pub fn new(seed: i64) -> Self {
        Self {
            state: (seed as u64 ^ MULTIPLIER) & MASK,
        }
    }

    fn next(&mut self, bits: u32) -> i32 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(ADDEND) & MASK;
        (self.state >> (48 - bits)) as i32
    }

    pub fn next_i32(&mut self) -> i32 {
        self.next(32)
    }

    /// Uniform draw from `0..bound`, rejecting the biased tail.
    pub fn next_bounded(&mut self, bound: i32) -> i32 {
        debug_assert!(bound > 0, "bound must be positive");
        let mut r = self.next(31);
        let m = bound - 1;
        if bound & m == 0 {
            return ((bound as i64 * r as i64) >> 31) as i32;
        }
        let mut u = r;
        loop {
            r = u % bound;
            if u.wrapping_sub(r).wrapping_add(m) >= 0 {
                return r;
            }
            u = self.next(31);
        }
    }
}

impl UniformSource for JavaRandom {
    fn next_in(&mut self, lo: u32, hi: u32) -> u32 {
        let span = i32::try_from(hi.saturating_sub(lo).saturating_add(1)).unwrap_or(i32::MAX);
        lo + self.next_bounded(span) as u32
    }
}

#[derive(Debug, Clone)]
pub struct SeededRng(StdRng);

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl UniformSource for SeededRng {
    fn next_in(&mut self, lo: u32, hi: u32) -> u32 {
        self.0.random_range(lo..=hi)
    }
}

/// Generate the configured workload with the configured random source.
pub fn workload(config: &SimConfig) -> Result<Vec<ProcessSpec>, WorkloadError> {
    match config.rng {
        RngKind::Java => generate(config, &mut JavaRandom::new(config.seed)),
        RngKind::Std => generate(config, &mut SeededRng::new(config.seed as u64)),
    }
}

pub fn generate(
    config: &SimConfig,
    source: &mut impl UniformSource,
) -> Result<Vec<ProcessSpec>, WorkloadError> {
    (0..config.processes)
        .map(|_| generate_process(config, &mut *source))
        .collect()
}

fn generate_process(
    config: &SimConfig,
    source: &mut impl UniformSource,
) -> Result<ProcessSpec, WorkloadError> {
    // Drawn over the configured maximum, then capped
    let max_bursts = u32::try_from(config.max_bursts.clamp(1, MAX_BURSTS_DRAW)).unwrap_or(1);
    let count = (source.next_in(1, max_bursts) as usize).min(MAX_BURSTS_LIMIT);

    let mut bursts = Vec::with_capacity(count);
    let mut io = Vec::with_capacity(count - 1);
    for index in 0..count {
        bursts.push(source.next_in(BURST_MIN as u32, BURST_MAX as u32) as Ticks);
        if index + 1 == count {
            break;
        }

        let device = match source.next_in(1, 3) {
            1 => DeviceKind::Disk,
            2 => DeviceKind::Tape,
            _ => DeviceKind::Printer,
        };
        let factor = 0.8 + (source.next_in(0, 40) as f64 / 100.0);
        let duration = (config.bases.base(device) as f64 * factor).round() as Ticks;
        io.push(IoRequest {
            device,
            duration: duration.max(1),
        });
    }

    ProcessSpec::new(bursts, io)
}
