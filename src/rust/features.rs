use ndarray::ArrayView1;

/// A sparse feature row produced by a vectorizer.
///
/// Entries are `(column, value)` pairs sorted by column with no duplicates
/// and no explicit zeros. `dim` is the width of the dense equivalent.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// An all-zero vector of width `dim`
    pub fn zeros(dim: usize) -> Self {
        Self { dim, entries: Vec::new() }
    }

    /// Builds a vector from unsorted `(column, value)` pairs.
    ///
    /// Pairs with the same column are summed; zeros are dropped. Columns
    /// outside `0..dim` are a caller bug and are ignored.
    pub fn from_pairs(dim: usize, pairs: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut entries: Vec<(usize, f64)> = pairs.into_iter().filter(|&(i, _)| i < dim).collect();
        entries.sort_unstable_by_key(|&(i, _)| i);

        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (i, v) in entries {
            match merged.last_mut() {
                Some(last) if last.0 == i => last.1 += v,
                _ => merged.push((i, v)),
            }
        }
        merged.retain(|&(_, v)| v != 0.0);

        Self { dim, entries: merged }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Value at `column`, zero when absent
    pub fn get(&self, column: usize) -> f64 {
        self.entries
            .binary_search_by_key(&column, |&(i, _)| i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    /// Applies `f` to every stored value
    pub(crate) fn map_values(&mut self, f: impl Fn(f64) -> f64) {
        for entry in &mut self.entries {
            entry.1 = f(entry.1);
        }
        self.entries.retain(|&(_, v)| v != 0.0);
    }

    /// Dot product with a dense weight row of the same width
    pub fn dot(&self, row: ArrayView1<'_, f64>) -> f64 {
        self.entries.iter().map(|&(i, v)| v * row[i]).sum()
    }

    pub fn l1_norm(&self) -> f64 {
        self.entries.iter().map(|&(_, v)| v.abs()).sum()
    }

    pub fn l2_norm(&self) -> f64 {
        self.entries.iter().map(|&(_, v)| v * v).sum::<f64>().sqrt()
    }

    /// Scales the vector to unit norm; a zero vector stays zero
    pub(crate) fn scale_to_unit(&mut self, norm: f64) {
        if norm > 1e-10 {
            self.map_values(|v| v / norm);
        }
    }
}
