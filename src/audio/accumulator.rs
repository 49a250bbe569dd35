//! Re-chunking of captured audio into fixed-size blocks

/// A fixed-length run of mono samples processed as one unit
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlock {
    samples: Vec<f32>,
}

impl AudioBlock {
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Collects variable-sized chunks and slices them into blocks.
///
/// Leftover samples (fewer than a block) stay buffered until later chunks
/// complete them; nothing is padded or discarded.
pub struct SampleAccumulator {
    buffer: Vec<f32>,
    block_size: usize,
}

impl SampleAccumulator {
    pub fn new(block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            buffer: Vec::with_capacity(block_size * 4),
            block_size,
        }
    }

    /// Append drained chunks, in order, after any carried-over samples.
    pub fn feed<I>(&mut self, chunks: I)
    where
        I: IntoIterator,
        I::Item: AsRef<[f32]>,
    {
        for chunk in chunks {
            self.buffer.extend_from_slice(chunk.as_ref());
        }
    }

    /// Take the oldest full block, or `None` without consuming anything.
    pub fn next_block(&mut self) -> Option<AudioBlock> {
        if self.buffer.len() < self.block_size {
            return None;
        }
        let samples: Vec<f32> = self.buffer.drain(..self.block_size).collect();
        Some(AudioBlock::new(samples))
    }

    /// Samples waiting for a block to fill
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_block_is_none_until_a_block_is_buffered() {
        let mut acc = SampleAccumulator::new(4);
        acc.feed([vec![1.0f32, 2.0, 3.0]]);

        assert!(acc.next_block().is_none());
        assert_eq!(acc.buffered(), 3);
    }

    #[test]
    fn remainder_is_prepended_to_later_input() {
        let mut acc = SampleAccumulator::new(4);
        acc.feed([vec![1.0f32, 2.0, 3.0]]);
        assert!(acc.next_block().is_none());

        acc.feed([vec![4.0f32, 5.0]]);
        let block = acc.next_block().unwrap();

        assert_eq!(block.samples(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(acc.buffered(), 1);
    }

    #[test]
    fn drains_several_blocks_in_a_tight_loop() {
        let mut acc = SampleAccumulator::new(3);
        let chunk: Vec<f32> = (0..10).map(|i| i as f32).collect();
        acc.feed([chunk]);

        let mut blocks = Vec::new();
        while let Some(block) = acc.next_block() {
            blocks.push(block);
        }

        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].samples(), &[0.0, 1.0, 2.0]);
        assert_eq!(blocks[2].samples(), &[6.0, 7.0, 8.0]);
        assert_eq!(acc.buffered(), 1);
    }

    #[test]
    fn arbitrary_chunk_sizes_yield_floor_of_total_over_block_size() {
        let block_size = 7;
        let sizes = [1usize, 13, 2, 0, 6, 29, 3, 11, 5, 17];
        let total: usize = sizes.iter().sum();

        let mut acc = SampleAccumulator::new(block_size);
        let mut next = 0.0f32;
        let mut blocks = Vec::new();
        for &size in &sizes {
            let chunk: Vec<f32> = (0..size)
                .map(|_| {
                    next += 1.0;
                    next
                })
                .collect();
            acc.feed([chunk]);
            while let Some(block) = acc.next_block() {
                blocks.push(block);
            }
        }

        assert_eq!(blocks.len(), total / block_size);
        assert_eq!(acc.buffered(), total % block_size);

        // Sample order survives re-chunking
        let flat: Vec<f32> = blocks.iter().flat_map(|b| b.samples().to_vec()).collect();
        let expected: Vec<f32> = (1..=flat.len()).map(|i| i as f32).collect();
        assert_eq!(flat, expected);
    }

    #[test]
    fn feed_accepts_borrowed_slices() {
        let mut acc = SampleAccumulator::new(2);
        let a = [0.5f32];
        let b = [0.25f32];
        acc.feed([&a[..], &b[..]]);

        assert_eq!(acc.next_block().unwrap().samples(), &[0.5, 0.25]);
    }
}
