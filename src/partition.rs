//! Splitting a dataset into contiguous chunks, one per worker.

use std::ops::Range;
use std::sync::Arc;

/// Splits `0..len` into exactly `chunks` contiguous, non-overlapping ranges.
///
/// Every chunk gets `len / chunks` elements except the last one, which also
/// takes the remainder. When `len < chunks` the leading chunks are empty.
/// `chunks` is treated as at least 1.
pub fn partition(len: usize, chunks: usize) -> Vec<Range<usize>> {
    let chunks = chunks.max(1);
    let chunk_size = len / chunks;

    (0..chunks)
        .map(|i| {
            let start = i * chunk_size;
            let end = if i + 1 == chunks { len } else { start + chunk_size };
            start..end
        })
        .collect()
}

/// A read-only view of one contiguous piece of a shared dataset.
#[derive(Debug)]
pub struct Chunk<T> {
    data: Arc<[T]>,
    range: Range<usize>,
}

impl<T> Chunk<T> {
    /// Cuts `data` into `count` chunks following `partition`.
    pub fn split(data: &Arc<[T]>, count: usize) -> Vec<Chunk<T>> {
        partition(data.len(), count)
            .into_iter()
            .map(|range| Chunk { data: Arc::clone(data), range })
            .collect()
    }

    /// The indices of the original dataset covered by this chunk.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// The elements of this chunk.
    pub fn as_slice(&self) -> &[T] {
        &self.data[self.range.clone()]
    }

    /// Number of elements in this chunk.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Whether this chunk holds no elements, which happens when the dataset
    /// is shorter than the number of chunks.
    pub fn is_empty(&self) -> bool {
        self.range.start == self.range.end
    }
}
