use crate::{BackendError, CommandQueue, Event, Result};
use cbench_shared::Engine;
use std::time::{Duration, Instant};

/// In-order queue executing commands on the submitting thread
#[derive(Debug)]
pub struct HostQueue {
    engine: Engine,
    profiling: bool,
    device_clock: Instant,
}

impl HostQueue {
    pub(crate) fn new(engine: Engine, profiling: bool, device_clock: Instant) -> Self {
        Self {
            engine,
            profiling,
            device_clock,
        }
    }

    fn timestamp(&self) -> Duration {
        self.device_clock.elapsed()
    }

    fn execute(&self, command: impl FnOnce()) -> Event {
        let enqueued = self.timestamp();
        let start = self.timestamp();
        command();
        let end = self.timestamp();
        Event {
            enqueued,
            profiling: self.profiling.then_some((start, end)),
        }
    }
}

impl CommandQueue for HostQueue {
    fn engine(&self) -> Engine {
        self.engine
    }

    fn copy(&self, src: &[u8], dst: &mut [u8]) -> Result<Event> {
        if src.len() != dst.len() {
            return Err(BackendError::RegionMismatch {
                src: src.len(),
                dst: dst.len(),
            });
        }
        Ok(self.execute(|| dst.copy_from_slice(src)))
    }

    fn fill(&self, dst: &mut [u8], pattern: &[u8]) -> Result<Event> {
        if pattern.is_empty() || dst.len() % pattern.len() != 0 {
            return Err(BackendError::InvalidPattern {
                pattern: pattern.len(),
                size: dst.len(),
            });
        }
        Ok(self.execute(|| {
            for chunk in dst.chunks_exact_mut(pattern.len()) {
                chunk.copy_from_slice(pattern);
            }
        }))
    }

    fn finish(&self) -> Result<()> {
        // Commands complete before copy/fill return
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_moves_bytes() {
        let queue = HostQueue::new(Engine::Bcs, true, Instant::now());
        let src = vec![7u8; 4096];
        let mut dst = vec![0u8; 4096];

        let event = queue.copy(&src, &mut dst).unwrap();
        assert_eq!(dst, src);
        assert!(event.profiling.is_some());
        queue.finish().unwrap();
    }

    #[test]
    fn test_copy_size_mismatch() {
        let queue = HostQueue::new(Engine::Bcs, false, Instant::now());
        let mut dst = vec![0u8; 8];
        assert_eq!(
            queue.copy(&[1, 2, 3], &mut dst).err(),
            Some(BackendError::RegionMismatch { src: 3, dst: 8 })
        );
    }

    #[test]
    fn test_fill_repeats_pattern() {
        let queue = HostQueue::new(Engine::Bcs1, false, Instant::now());
        let mut dst = vec![0u8; 8];
        let event = queue.fill(&mut dst, &[1, 2]).unwrap();
        assert_eq!(dst, vec![1, 2, 1, 2, 1, 2, 1, 2]);
        assert!(event.profiling.is_none());

        assert!(queue.fill(&mut dst, &[1, 2, 3]).is_err());
        assert!(queue.fill(&mut dst, &[]).is_err());
    }
}
