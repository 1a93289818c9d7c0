//! Helpers shared by the benchmark bodies

use cbench_backend::{Backend, BackendError, CommandQueue, Event, QueueProperties};
use cbench_shared::{Engine, ParseError, MAX_BLITTERS};
use std::str::FromStr;
use std::thread::ScopedJoinHandle;
use std::time::Duration;

/// Blitter selection written as binary digits, least significant bit first
/// from the right: `000000101` selects BCS and BCS2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitterMask(u16);

impl BlitterMask {
    pub fn bits(&self) -> u16 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Selected engines, main blitter first
    pub fn engines(&self) -> Vec<Engine> {
        (0..MAX_BLITTERS)
            .filter(|index| self.0 & (1 << index) != 0)
            .filter_map(|index| Engine::blitter_from_index(index).ok())
            .collect()
    }
}

impl FromStr for BlitterMask {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidBitmask(s.to_string(), MAX_BLITTERS);
        if s.is_empty() || s.len() > MAX_BLITTERS {
            return Err(invalid());
        }
        s.chars().try_fold(0u16, |mask, digit| match digit {
            '0' => Ok(mask << 1),
            '1' => Ok((mask << 1) | 1),
            _ => Err(invalid()),
        })
        .map(BlitterMask)
    }
}

/// Durations below the device timer resolution cannot be told apart from
/// zero; report them as one tick.
pub fn at_least_one_tick(duration: Duration, resolution: Duration) -> Duration {
    duration.max(resolution).max(Duration::from_nanos(1))
}

/// Create one profiling queue per engine. `None` when the device lacks one
/// of them.
pub fn create_engine_queues(
    backend: &dyn Backend,
    engines: &[Engine],
    profiling: bool,
) -> cbench_backend::Result<Option<Vec<Box<dyn CommandQueue>>>> {
    let mut queues = Vec::with_capacity(engines.len());
    for engine in engines {
        let properties = QueueProperties::create()
            .set_force_engine(*engine)
            .set_profiling(profiling)
            .allow_creation_fail();
        match backend.create_queue(&properties)? {
            Some(queue) => queues.push(queue),
            None => return Ok(None),
        }
    }
    Ok(Some(queues))
}

/// Split `buffer` into consecutive regions of the given sizes. Bytes past the
/// last region are left out.
pub fn split_regions<'a>(buffer: &'a mut [u8], sizes: &[usize]) -> Vec<&'a mut [u8]> {
    let mut regions = Vec::with_capacity(sizes.len());
    let mut rest = buffer;
    for size in sizes {
        let (region, tail) = std::mem::take(&mut rest).split_at_mut(*size);
        regions.push(region);
        rest = tail;
    }
    regions
}

/// Join scoped workers in spawn order, re-raising the first panic.
pub fn join_all<T>(handles: Vec<ScopedJoinHandle<'_, T>>) -> Vec<T> {
    handles
        .into_iter()
        .map(|handle| {
            handle
                .join()
                .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
        })
        .collect()
}

/// Device time from the earliest start to the latest end of `events`
pub fn gpu_span(events: &[Event]) -> cbench_backend::Result<Duration> {
    let mut span: Option<(Duration, Duration)> = None;
    for event in events {
        let (start, end) = event.profiling.ok_or(BackendError::ProfilingNotEnabled)?;
        span = Some(match span {
            Some((first, last)) => (first.min(start), last.max(end)),
            None => (start, end),
        });
    }
    Ok(span.map_or(Duration::ZERO, |(first, last)| last.saturating_sub(first)))
}

/// Deterministic non-trivial buffer contents
pub fn pattern_bytes(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8 + 1).collect()
}
