//! Score storage for banded DP.
//!
//! A column holds `2 * band + 1` cells; row `b` of column `c` is the cell on
//! query offset `c + b - band`. With this layout the diagonal predecessor of
//! a cell sits at the same row of the previous column.
//!
//! Query offset -1 and target offset -1 form the boundary of the matrix:
//! they hold the cost of a gap running from the origin, so an alignment may
//! start with a gap.

use crate::common::{Score, NEG_INF};

/// Column store used by the banded scan.
pub trait DpBackend {
    /// Prepare for a scan over columns of `rows` cells and set up the column
    /// before the first one: 0 at the origin, leading insertion costs below
    /// it, -inf above.
    fn reset(&mut self, rows: usize, gap_open: Score, gap_extend: Score);

    /// Previous column (read) and column `col` (write).
    fn column_pair(&mut self, col: usize) -> (&[Score], &mut [Score]);
}

fn origin_column(column: &mut Vec<Score>, rows: usize, gap_open: Score, gap_extend: Score) {
    let band = rows / 2;
    column.clear();
    column.resize(rows, NEG_INF);
    column[band] = 0;
    for (k, cell) in column[band + 1..].iter_mut().enumerate() {
        *cell = -(gap_open + (k as Score + 1) * gap_extend);
    }
}

/// Two alternating columns; scores only.
#[derive(Debug, Default, Clone)]
pub struct ScoreOnlyBuffer {
    columns: [Vec<Score>; 2],
}

impl DpBackend for ScoreOnlyBuffer {
    fn reset(&mut self, rows: usize, gap_open: Score, gap_extend: Score) {
        origin_column(&mut self.columns[1], rows, gap_open, gap_extend);
        self.columns[0].clear();
        self.columns[0].resize(rows, NEG_INF);
    }

    fn column_pair(&mut self, col: usize) -> (&[Score], &mut [Score]) {
        let [even, odd] = &mut self.columns;
        if col % 2 == 0 {
            (&odd[..], &mut even[..])
        } else {
            (&even[..], &mut odd[..])
        }
    }
}

/// Every column of the scan, kept for traceback.
#[derive(Debug, Default, Clone)]
pub struct TracebackBuffer {
    origin: Vec<Score>,
    data: Vec<Score>,
    rows: usize,
    cols: usize,
}

impl TracebackBuffer {
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns written so far.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Score at row `b` of column `col`; -inf outside the stored area.
    #[inline]
    pub fn get(&self, b: isize, col: isize) -> Score {
        if b < 0 || b as usize >= self.rows || col >= self.cols as isize {
            return NEG_INF;
        }
        if col < 0 {
            return if col == -1 { self.origin[b as usize] } else { NEG_INF };
        }
        self.data[col as usize * self.rows + b as usize]
    }
}

impl DpBackend for TracebackBuffer {
    fn reset(&mut self, rows: usize, gap_open: Score, gap_extend: Score) {
        origin_column(&mut self.origin, rows, gap_open, gap_extend);
        self.data.clear();
        self.rows = rows;
        self.cols = 0;
    }

    fn column_pair(&mut self, col: usize) -> (&[Score], &mut [Score]) {
        let rows = self.rows;
        let end = (col + 1) * rows;
        if self.data.len() < end {
            self.data.resize(end, NEG_INF);
        }
        self.cols = self.cols.max(col + 1);
        let (head, tail) = self.data.split_at_mut(col * rows);
        let prev: &[Score] = if col == 0 {
            &self.origin
        } else {
            &head[(col - 1) * rows..]
        };
        (prev, &mut tail[..rows])
    }
}
