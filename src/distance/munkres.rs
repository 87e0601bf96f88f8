//! Minimum-cost assignment via the Hungarian (Munkres) method.
//!
//! Pairs the rows of a cost matrix with its columns so that the total
//! assigned cost is minimal. Rectangular matrices are padded to square with
//! zero-cost dummies, so when rows outnumber columns exactly
//! `rows - columns` rows end up unassigned (and symmetrically for extra
//! columns). Used to pair local files with canonical tracks, where the
//! matrix is pairwise track distances.
//!
//! The implementation is the classic starred/primed-zero step machine,
//! O(n³) in the padded dimension. It is fully deterministic: zeros are
//! scanned row-major, so ties resolve to the lowest row then lowest column.
//!
//! Input entries must be finite and non-negative; that is a caller
//! contract, not a checked error.

/// Result of solving one assignment problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Matched (row, column) pairs over the original matrix dimensions,
    /// ordered by row. Rows or columns beyond the smaller dimension are
    /// absent.
    pub pairs: Vec<(usize, usize)>,
    /// Total cost of the matched pairs.
    pub cost: f64,
}

/// Hungarian method state over a padded square matrix.
pub struct Munkres {
    /// Working matrix, mutated by row/column reductions.
    c: Vec<Vec<f64>>,
    /// Original (padded) costs, kept for the final cost sum.
    c_orig: Vec<Vec<f64>>,
    /// 0 = unmarked, 1 = starred zero, 2 = primed zero.
    marks: Vec<Vec<u8>>,
    row_cover: Vec<bool>,
    col_cover: Vec<bool>,
    n: usize,
    rows: usize,
    cols: usize,
}

impl Munkres {
    /// Build the solver from a rectangular cost matrix. Every row must have
    /// the same length.
    pub fn new(matrix: &[Vec<f64>]) -> Self {
        let rows = matrix.len();
        let cols = matrix.first().map(|r| r.len()).unwrap_or(0);
        let n = rows.max(cols);

        let mut c = vec![vec![0.0; n]; n];
        for (r, row) in matrix.iter().enumerate() {
            debug_assert_eq!(row.len(), cols, "cost matrix must be rectangular");
            c[r][..cols].copy_from_slice(row);
        }

        Self {
            c_orig: c.clone(),
            c,
            marks: vec![vec![0; n]; n],
            row_cover: vec![false; n],
            col_cover: vec![false; n],
            n,
            rows,
            cols,
        }
    }

    /// Run the algorithm to completion and return the optimal assignment.
    pub fn solve(mut self) -> Assignment {
        if self.rows == 0 || self.cols == 0 {
            return Assignment { pairs: Vec::new(), cost: 0.0 };
        }

        self.reduce_rows();
        self.star_initial_zeros();

        while !self.cover_starred_columns() {
            loop {
                match self.prime_uncovered_zero() {
                    Some((row, col)) => {
                        // an uncovered primed zero with no star in its row
                        // starts an augmenting path
                        self.augment_from(row, col);
                        break;
                    }
                    None => self.adjust_by_min_uncovered(),
                }
            }
        }

        self.into_assignment()
    }

    /// Subtract each row's minimum from the row.
    fn reduce_rows(&mut self) {
        for row in &mut self.c {
            let min = row.iter().cloned().fold(f64::INFINITY, f64::min);
            for cell in row.iter_mut() {
                *cell -= min;
            }
        }
    }

    /// Star every zero with no starred zero in its row or column yet.
    fn star_initial_zeros(&mut self) {
        for r in 0..self.n {
            for col in 0..self.n {
                if self.c[r][col] == 0.0 && !self.row_cover[r] && !self.col_cover[col] {
                    self.marks[r][col] = 1;
                    self.row_cover[r] = true;
                    self.col_cover[col] = true;
                }
            }
        }
        self.clear_covers();
    }

    /// Cover every column containing a starred zero. Returns true when the
    /// stars form a complete assignment.
    fn cover_starred_columns(&mut self) -> bool {
        for r in 0..self.n {
            for col in 0..self.n {
                if self.marks[r][col] == 1 {
                    self.col_cover[col] = true;
                }
            }
        }
        self.col_cover.iter().filter(|&&covered| covered).count() >= self.n
    }

    /// Prime uncovered zeros until either one has no star in its row
    /// (returned, seeding the augmenting path) or no uncovered zeros
    /// remain (None, so the matrix needs adjusting).
    fn prime_uncovered_zero(&mut self) -> Option<(usize, usize)> {
        while let Some((row, col)) = self.find_uncovered_zero() {
            self.marks[row][col] = 2;
            match self.star_in_row(row) {
                Some(star_col) => {
                    self.row_cover[row] = true;
                    self.col_cover[star_col] = false;
                }
                None => return Some((row, col)),
            }
        }
        None
    }

    fn find_uncovered_zero(&self) -> Option<(usize, usize)> {
        for r in 0..self.n {
            if self.row_cover[r] {
                continue;
            }
            for col in 0..self.n {
                if self.c[r][col] == 0.0 && !self.col_cover[col] {
                    return Some((r, col));
                }
            }
        }
        None
    }

    fn star_in_row(&self, row: usize) -> Option<usize> {
        (0..self.n).find(|&col| self.marks[row][col] == 1)
    }

    fn star_in_col(&self, col: usize) -> Option<usize> {
        (0..self.n).find(|&row| self.marks[row][col] == 1)
    }

    fn prime_in_row(&self, row: usize) -> Option<usize> {
        (0..self.n).find(|&col| self.marks[row][col] == 2)
    }

    /// Build the alternating star/prime path from the seed zero, flip it,
    /// then reset covers and primes.
    fn augment_from(&mut self, row: usize, col: usize) {
        let mut path = vec![(row, col)];
        while let Some(star_row) = self.star_in_col(path[path.len() - 1].1) {
            path.push((star_row, path[path.len() - 1].1));
            let prime_col = self
                .prime_in_row(star_row)
                .expect("a primed zero always exists in an augmenting path row");
            path.push((star_row, prime_col));
        }

        for &(r, c) in &path {
            self.marks[r][c] = if self.marks[r][c] == 1 { 0 } else { 1 };
        }

        self.clear_covers();
        for row in &mut self.marks {
            for mark in row.iter_mut() {
                if *mark == 2 {
                    *mark = 0;
                }
            }
        }
    }

    /// Add the smallest uncovered value to covered rows and subtract it
    /// from uncovered columns, creating at least one new uncovered zero.
    fn adjust_by_min_uncovered(&mut self) {
        let mut min = f64::INFINITY;
        for r in 0..self.n {
            for col in 0..self.n {
                if !self.row_cover[r] && !self.col_cover[col] && self.c[r][col] < min {
                    min = self.c[r][col];
                }
            }
        }

        for r in 0..self.n {
            for col in 0..self.n {
                if self.row_cover[r] {
                    self.c[r][col] += min;
                }
                if !self.col_cover[col] {
                    self.c[r][col] -= min;
                }
            }
        }
    }

    fn clear_covers(&mut self) {
        self.row_cover.fill(false);
        self.col_cover.fill(false);
    }

    fn into_assignment(self) -> Assignment {
        let mut pairs = Vec::new();
        let mut cost = 0.0;
        for r in 0..self.rows {
            for col in 0..self.cols {
                if self.marks[r][col] == 1 {
                    pairs.push((r, col));
                    cost += self.c_orig[r][col];
                }
            }
        }
        Assignment { pairs, cost }
    }
}
