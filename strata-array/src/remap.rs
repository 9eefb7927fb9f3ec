use crate::Batch;

/// The rows selected by a filter, as ascending logical row numbers of the batch it evaluated.
///
/// A remapper is cleared and refilled for every batch, and projected onto each column of that
/// batch exactly once with [`RowRemapper::remap_into`]. Its storage is reused between batches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowRemapper {
    indices: Vec<usize>,
}

impl RowRemapper {
    /// Create an empty remapper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every selected row, keeping capacity.
    pub fn clear(&mut self) {
        self.indices.clear();
    }

    /// Select logical row `row`. Rows must be added in ascending order.
    #[inline]
    pub fn add(&mut self, row: usize) {
        debug_assert!(
            self.indices.last().is_none_or(|&last| last < row),
            "rows must be selected in ascending order"
        );
        self.indices.push(row);
    }

    /// The selected logical rows.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// The number of selected rows.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether no rows are selected.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Resolve the selected rows to storage slots of `batch`, composing with its own selection.
    ///
    /// The result is written into `out`, which is cleared first, and can be used as the
    /// [`Selection::Indices`](crate::Selection::Indices) of a projected batch over the same
    /// storage.
    pub fn remap_into(&self, batch: &Batch<'_>, out: &mut Vec<usize>) {
        out.clear();
        out.extend(self.indices.iter().map(|&row| batch.index(row)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArrayView, Selection};

    #[test]
    fn remap_composes_with_existing_selection() {
        let values = [10i32, 20, 30, 40, 50];
        let selection = [4usize, 3, 1, 0];
        let batch =
            Batch::try_new(ArrayView::I32(&values), Selection::Indices(&selection), 4).unwrap();

        let mut remapper = RowRemapper::new();
        remapper.add(1);
        remapper.add(3);

        let mut out = vec![99];
        remapper.remap_into(&batch, &mut out);
        assert_eq!(out, vec![3, 0]);

        let projected = Batch::try_new(batch.array(), Selection::Indices(&out), out.len()).unwrap();
        assert_eq!(projected.as_primitive::<i32>().unwrap()[projected.index(0)], 40);
    }

    #[test]
    fn clear_forgets_rows() {
        let mut remapper = RowRemapper::new();
        remapper.add(0);
        remapper.clear();
        assert!(remapper.is_empty());
        remapper.add(0);
        assert_eq!(remapper.indices(), &[0]);
    }
}
