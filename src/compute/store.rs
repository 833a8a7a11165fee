//! Ping-pong cell storage.
//!
//! Two equally sized buffers live in a `[Vec<Cell>; 2]`; a single flag says
//! which one is current. A step reads the current buffer and writes the
//! other, then [`GridStateStore::commit`] flips the flag. Contents are never
//! copied and buffers are never reallocated after construction.

use log::debug;

use super::{Cell, GridError, IndexMapper};

/// Borrowed views for one step: the readable generation and the writable
/// next one. Holding this borrows the store mutably, so nothing else can
/// observe the half-written `next` buffer.
pub struct StepBuffers<'a> {
    pub current: &'a [Cell],
    pub next: &'a mut [Cell],
}

/// Owns both generation buffers and the role assignment between them.
#[derive(Debug, Clone)]
pub struct GridStateStore {
    mapper: IndexMapper,
    buffers: [Vec<Cell>; 2],
    /// Index into `buffers` of the current generation.
    current: usize,
    generation: u64,
}

impl GridStateStore {
    /// Create a store whose current generation is `initial` and whose next
    /// buffer is all dead.
    pub fn new(width: usize, height: usize, initial: Vec<Cell>) -> Result<Self, GridError> {
        let len = IndexMapper::try_new(width, height)?.len();
        Self::from_buffers(width, height, initial, vec![Cell::Dead; len])
    }

    /// Create a store from two explicit buffers. `a` becomes current.
    pub fn from_buffers(
        width: usize,
        height: usize,
        a: Vec<Cell>,
        b: Vec<Cell>,
    ) -> Result<Self, GridError> {
        let mapper = IndexMapper::try_new(width, height)?;
        let expected = mapper.len();
        for buffer in [&a, &b] {
            if buffer.len() != expected {
                return Err(GridError::BufferLength {
                    expected,
                    actual: buffer.len(),
                });
            }
        }

        debug!("Allocated {width}x{height} double buffer ({expected} cells each)");

        Ok(Self {
            mapper,
            buffers: [a, b],
            current: 0,
            generation: 0,
        })
    }

    /// Create a store from a row-major byte image (`0` dead, `1` alive).
    pub fn from_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self, GridError> {
        let expected = IndexMapper::try_new(width, height)?.len();
        if bytes.len() != expected {
            return Err(GridError::BufferLength {
                expected,
                actual: bytes.len(),
            });
        }
        let cells: &[Cell] = bytemuck::checked::try_cast_slice(bytes).map_err(|_| {
            // Report the first offending byte rather than the bytemuck error.
            let (offset, &value) = bytes
                .iter()
                .enumerate()
                .find(|&(_, &b)| Cell::try_from(b).is_err())
                .unwrap_or((0, &0));
            GridError::InvalidCellByte { offset, value }
        })?;
        Self::new(width, height, cells.to_vec())
    }

    #[inline]
    pub fn mapper(&self) -> &IndexMapper {
        &self.mapper
    }

    /// Number of committed steps since construction.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The current generation.
    #[inline]
    pub fn current(&self) -> &[Cell] {
        &self.buffers[self.current]
    }

    /// Mutable access to the current generation for edits between steps.
    #[inline]
    pub(crate) fn current_mut(&mut self) -> &mut [Cell] {
        &mut self.buffers[self.current]
    }

    /// Split into the read-only current buffer and the write-only next
    /// buffer for one step.
    pub fn buffers_mut(&mut self) -> StepBuffers<'_> {
        let (first, second) = self.buffers.split_at_mut(1);
        let (current, next) = if self.current == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        };
        debug_assert_eq!(current.len(), next.len());
        StepBuffers {
            current: current.as_slice(),
            next: next.as_mut_slice(),
        }
    }

    /// Publish the next buffer as current. Call only after every cell of
    /// `next` has been written for this step.
    #[inline]
    pub fn commit(&mut self) {
        self.current ^= 1;
        self.generation += 1;
    }
}
