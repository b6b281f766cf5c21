//! Tiling of the completed-column range
//!
//! Column `j` is reduced against every completed column `p ∈ [0, j)`. That
//! range is cut into tiles of `width` columns; the last tile may be shorter.
//! A short tile behaves exactly like a full tile padded with zero columns,
//! since a zero column contributes a zero product.
//!
//! ```text
//! j = 14, width = 6:   [0..6) [6..12) [12..14)
//! ```

use std::ops::Range;

/// Iterator over the tiles of `[0, end)`.
#[derive(Clone, Debug)]
pub(crate) struct TileIterator {
    next: usize,
    end: usize,
    width: usize,
}

impl TileIterator {
    /// Tiles of width `width` covering `[0, end)`
    ///
    /// # Panics
    /// Panics if `width` is zero.
    pub fn new(end: usize, width: usize) -> Self {
        assert!(width > 0, "tile width must be positive");
        Self {
            next: 0,
            end,
            width,
        }
    }
}

impl Iterator for TileIterator {
    type Item = Range<usize>;

    #[inline]
    fn next(&mut self) -> Option<Range<usize>> {
        if self.next >= self.end {
            return None;
        }
        let start = self.next;
        self.next = (start + self.width).min(self.end);
        Some(start..self.next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = tile_count(self.end - self.next.min(self.end), self.width);
        (n, Some(n))
    }
}

impl ExactSizeIterator for TileIterator {}

/// Number of tiles needed to cover `columns` columns
#[inline]
pub(crate) fn tile_count(columns: usize, width: usize) -> usize {
    columns.div_ceil(width)
}
