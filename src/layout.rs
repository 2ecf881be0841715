//! Dataset layout - how a 2-D dataset is split into tiled chunks

use crate::error::{GeoError, Result};
use serde::{Deserialize, Serialize};

/// Rectangular block of a 2-D dataset addressed by offset and count per axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub row: usize,
    pub col: usize,
    pub n_rows: usize,
    pub n_cols: usize,
}

impl Rect {
    pub fn new(row: usize, col: usize, n_rows: usize, n_cols: usize) -> Self {
        Self {
            row,
            col,
            n_rows,
            n_cols,
        }
    }

    /// Whole extent of a dataset
    pub fn full(shape: [usize; 2]) -> Self {
        Self::new(0, 0, shape[0], shape[1])
    }

    pub fn len(&self) -> usize {
        self.n_rows * self.n_cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fails with `GeoError::Range` if any part of the block falls outside `shape`
    pub fn check_within(&self, shape: [usize; 2]) -> Result<()> {
        let row_end = self.row.checked_add(self.n_rows);
        let col_end = self.col.checked_add(self.n_cols);
        match (row_end, col_end) {
            (Some(r), Some(c)) if r <= shape[0] && c <= shape[1] => Ok(()),
            _ => Err(GeoError::Range(format!(
                "block rows {}+{} cols {}+{} outside extent {}x{}",
                self.row, self.n_rows, self.col, self.n_cols, shape[0], shape[1]
            ))),
        }
    }
}

/// Chunking of a 2-D dataset into tiles of `chunk[0]` rows by `chunk[1]`
/// columns. Tiles are numbered row-major; edge tiles are clipped to the extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkLayout {
    pub shape: [usize; 2],
    pub chunk: [usize; 2],
}

impl ChunkLayout {
    /// A zero chunk width spans every column
    pub fn new(shape: [usize; 2], chunk: [usize; 2]) -> Self {
        let cols = if chunk[1] == 0 { shape[1] } else { chunk[1] };
        Self {
            shape,
            chunk: [chunk[0].max(1), cols.max(1)],
        }
    }

    fn tiles_across(&self) -> usize {
        self.shape[1].div_ceil(self.chunk[1])
    }

    pub fn chunk_count(&self) -> usize {
        self.shape[0].div_ceil(self.chunk[0]) * self.tiles_across()
    }

    /// Row range and column range `[start, end)` covered by chunk `index`
    pub fn chunk_bounds(&self, index: usize) -> ((usize, usize), (usize, usize)) {
        let across = self.tiles_across().max(1);
        let (tr, tc) = (index / across, index % across);
        let r0 = tr * self.chunk[0];
        let c0 = tc * self.chunk[1];
        (
            (r0, (r0 + self.chunk[0]).min(self.shape[0])),
            (c0, (c0 + self.chunk[1]).min(self.shape[1])),
        )
    }

    /// Number of elements stored in chunk `index`
    pub fn chunk_len(&self, index: usize) -> usize {
        let ((r0, r1), (c0, c1)) = self.chunk_bounds(index);
        (r1 - r0) * (c1 - c0)
    }

    /// Chunk indices that intersect a block
    pub fn overlapping_chunks(&self, rect: &Rect) -> Vec<usize> {
        if rect.is_empty() {
            return Vec::new();
        }
        let across = self.tiles_across();
        let rows = rect.row / self.chunk[0]..=(rect.row + rect.n_rows - 1) / self.chunk[0];
        let cols = rect.col / self.chunk[1]..=(rect.col + rect.n_cols - 1) / self.chunk[1];
        rows.flat_map(|tr| cols.clone().map(move |tc| tr * across + tc))
            .collect()
    }

    /// Triples of (offset in chunk, offset in block, run length) copying one
    /// chunk's intersection with `rect`, row by row
    pub fn copy_runs(&self, index: usize, rect: &Rect) -> Vec<(usize, usize, usize)> {
        let ((r0, r1), (c0, c1)) = self.chunk_bounds(index);
        let width = c1 - c0;
        let (r_start, r_end) = (rect.row.max(r0), (rect.row + rect.n_rows).min(r1));
        let (c_start, c_end) = (rect.col.max(c0), (rect.col + rect.n_cols).min(c1));
        if c_start >= c_end {
            return Vec::new();
        }
        (r_start..r_end)
            .map(|r| {
                let in_chunk = (r - r0) * width + (c_start - c0);
                let in_block = (r - rect.row) * rect.n_cols + (c_start - rect.col);
                (in_chunk, in_block, c_end - c_start)
            })
            .collect()
    }
}
