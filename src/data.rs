//! Row-collection change notifications.

/// A change to the data rows behind a scroll coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowChange {
    /// A row was inserted at this index; later rows shift down by one.
    Inserted(usize),
    /// The row at this index was removed; later rows shift up by one.
    Removed(usize),
    /// Every row changed; the collection now has this many rows.
    Reset(usize),
}

impl RowChange {
    /// Row count after applying the change to `count` rows.
    pub fn apply_to(self, count: usize) -> usize {
        match self {
            RowChange::Inserted(_) => count + 1,
            RowChange::Removed(_) => count.saturating_sub(1),
            RowChange::Reset(rows) => rows,
        }
    }

    /// Where `row` ends up after the change, or `None` if it no longer exists.
    pub fn shift(self, row: usize) -> Option<usize> {
        match self {
            RowChange::Inserted(at) if row >= at => Some(row + 1),
            RowChange::Removed(at) if row == at => None,
            RowChange::Removed(at) if row > at => Some(row - 1),
            RowChange::Reset(rows) if row >= rows => None,
            RowChange::Reset(_) | RowChange::Inserted(_) | RowChange::Removed(_) => Some(row),
        }
    }

    /// First row whose content or position changed.
    pub fn first_affected(self) -> usize {
        match self {
            RowChange::Inserted(at) | RowChange::Removed(at) => at,
            RowChange::Reset(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts() {
        assert_eq!(RowChange::Inserted(3).apply_to(10), 11);
        assert_eq!(RowChange::Removed(3).apply_to(10), 9);
        assert_eq!(RowChange::Reset(4).apply_to(10), 4);
    }

    #[test]
    fn shifting_rows() {
        assert_eq!(RowChange::Inserted(3).shift(2), Some(2));
        assert_eq!(RowChange::Inserted(3).shift(3), Some(4));
        assert_eq!(RowChange::Removed(3).shift(3), None);
        assert_eq!(RowChange::Removed(3).shift(7), Some(6));
        assert_eq!(RowChange::Reset(5).shift(4), Some(4));
        assert_eq!(RowChange::Reset(5).shift(5), None);
    }
}
