#![forbid(unsafe_code)]

//! Balanced-grid partition math.
//!
//! For `n` panes with no prior structure the grid uses
//! `cols = ceil(sqrt(n))` and `rows = ceil(n / cols)`, filled row-major with
//! a possibly short last row.

/// Total percentage a split distributes across its children.
pub const FULL_SHARE: f64 = 100.0;

/// Column/row counts of a balanced grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub cols: usize,
    pub rows: usize,
}

impl GridShape {
    /// Number of cells the shape can hold.
    #[must_use]
    pub const fn capacity(self) -> usize {
        self.cols * self.rows
    }
}

/// Smallest `c` with `c * c >= n`: a float estimate corrected in integer math.
#[must_use]
pub fn ceil_sqrt(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    // Float estimate, then correct for rounding in either direction.
    let mut c = (n as f64).sqrt() as usize;
    while c.saturating_mul(c) < n {
        c += 1;
    }
    while c > 1 && (c - 1).saturating_mul(c - 1) >= n {
        c -= 1;
    }
    c
}

/// Shape of the balanced grid for `n` cells. `n == 0` yields a 0x0 shape.
#[must_use]
pub fn grid_shape(n: usize) -> GridShape {
    if n == 0 {
        return GridShape { cols: 0, rows: 0 };
    }
    let cols = ceil_sqrt(n);
    let rows = n.div_ceil(cols);
    GridShape { cols, rows }
}

/// Row lengths of the balanced grid for `n` cells, in row-major order.
///
/// ```
/// use paneweave_core::grid::grid_rows;
///
/// assert_eq!(grid_rows(5), vec![3, 2]);
/// assert_eq!(grid_rows(4), vec![2, 2]);
/// assert!(grid_rows(0).is_empty());
/// ```
#[must_use]
pub fn grid_rows(n: usize) -> Vec<usize> {
    let shape = grid_shape(n);
    let mut remaining = n;
    let mut rows = Vec::with_capacity(shape.rows);
    while remaining > 0 {
        let take = remaining.min(shape.cols);
        rows.push(take);
        remaining -= take;
    }
    rows
}

/// `n` equal shares summing to [`FULL_SHARE`].
#[must_use]
pub fn uniform_sizes(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![FULL_SHARE / n as f64; n]
}

/// True if `sizes` sums to [`FULL_SHARE`] within `epsilon` and every entry is
/// finite and positive.
#[must_use]
pub fn sizes_are_normalized(sizes: &[f64], epsilon: f64) -> bool {
    if sizes.is_empty() {
        return false;
    }
    let mut sum = 0.0;
    for size in sizes {
        if !size.is_finite() || *size <= 0.0 {
            return false;
        }
        sum += size;
    }
    (sum - FULL_SHARE).abs() <= epsilon
}
