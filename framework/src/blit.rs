//! Buffer partitioning across copy engines
//!
//! The main blitter is assumed to be as fast as every link blitter combined, so
//! with `L` link engines the buffer is cut into `2L` chunks: `L` for the main
//! engine and one for each link engine. Without link engines the whole buffer
//! is a single chunk.

use cbench_shared::Engine;
use tracing::warn;

/// How well the claimed regions cover the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    Exact,
    /// Trailing bytes that no engine touches
    Under(usize),
    /// Bytes claimed past the end of the buffer
    Over(usize),
}

#[derive(Debug, Clone)]
pub struct BlitSizeAssigner {
    buffer_size: usize,
    main_copy_engine_present: bool,
    link_copy_engines_count: usize,
    offset: usize,
}

impl BlitSizeAssigner {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            main_copy_engine_present: false,
            link_copy_engines_count: 0,
            offset: 0,
        }
    }

    pub fn add_main_copy_engine(&mut self) {
        if self.main_copy_engine_present {
            panic!("Multiple main copy engines detected");
        }
        self.main_copy_engine_present = true;
    }

    pub fn add_link_copy_engine(&mut self) {
        self.link_copy_engines_count += 1;
    }

    /// Register a blitter by its hardware name.
    pub fn add_copy_engine(&mut self, engine: Engine) {
        if engine.is_main_copy_engine() {
            self.add_main_copy_engine();
        } else if engine.is_copy_engine() {
            self.add_link_copy_engine();
        } else {
            panic!("Unexpected copy engine {}", engine);
        }
    }

    pub fn chunks_count(&self) -> usize {
        if self.link_copy_engines_count == 0 {
            return 1;
        }
        let main_share = if self.main_copy_engine_present {
            self.link_copy_engines_count
        } else {
            0
        };
        self.link_copy_engines_count + main_share
    }

    pub fn chunk_size(&self) -> usize {
        self.buffer_size / self.chunks_count()
    }

    pub fn copy_size_for_engine(&self, is_main_copy_engine: bool) -> usize {
        if is_main_copy_engine {
            if !self.main_copy_engine_present {
                panic!("Unexpected main copy engine");
            }
            if self.link_copy_engines_count == 0 {
                return self.chunk_size();
            }
            self.chunk_size() * self.link_copy_engines_count
        } else {
            if self.link_copy_engines_count == 0 {
                panic!("Unexpected link copy engine");
            }
            self.chunk_size()
        }
    }

    /// Claim the next region for an engine, returning `(offset, size)`.
    pub fn space_for_blit(&mut self, is_main_copy_engine: bool) -> (usize, usize) {
        let size = self.copy_size_for_engine(is_main_copy_engine);
        let offset = self.offset;
        self.offset += size;
        (offset, size)
    }

    /// Current cursor, the number of bytes claimed so far
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Check the claimed regions against the buffer. Mismatches only warn.
    pub fn validate(&self) -> Coverage {
        if self.offset < self.buffer_size {
            let chunks = self.chunks_count();
            warn!(
                "Buffer is divided to {} chunks, but bufferSize is not divisible by {}. Only {} out of specified {} bytes will be copied.",
                chunks, chunks, self.offset, self.buffer_size
            );
            return Coverage::Under(self.buffer_size - self.offset);
        }
        if self.offset > self.buffer_size {
            warn!(
                "Access out of buffer bounds will happen ({} bytes claimed for a {} byte buffer)",
                self.offset, self.buffer_size
            );
            return Coverage::Over(self.offset - self.buffer_size);
        }
        Coverage::Exact
    }
}
