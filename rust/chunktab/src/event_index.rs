//! Event identifier to row range lookup.

use std::{collections::BTreeSet, ops::RangeInclusive};

use ahash::AHashMap;
use chunktab_common::{
    Result,
    error::{Error, ErrorKind},
};

/// The event identifier of every row of a table, in row order.
///
/// # Contiguity precondition
///
/// All rows sharing an event identifier are expected to form one contiguous run.
/// The table writer must uphold this; the lookup in [`row_range`](Self::row_range)
/// relies on it and does not scan the whole map in release builds. Debug builds
/// cross-check every result against a full scan, and
/// [`check_contiguity`](Self::check_contiguity) verifies the whole map at once.
#[derive(Debug, Clone, Default)]
pub struct EventRowIndex {
    row_events: Vec<u64>,
}

/// Where the bidirectional scan first met the target event.
enum Anchor {
    /// Found scanning forward: the first row of the run.
    Front(usize),
    /// Found scanning backward: the last row of the run.
    Back(usize),
}

impl EventRowIndex {
    pub fn from_ids(row_events: Vec<u64>) -> EventRowIndex {
        EventRowIndex { row_events }
    }

    /// Builds the index from the raw values of the event identifier column.
    ///
    /// Every value must be a finite, non-negative integer.
    pub fn from_column_values(values: &[f32]) -> Result<EventRowIndex> {
        let row_events = values
            .iter()
            .enumerate()
            .map(|(row, &value)| {
                if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
                    Ok(value as u64)
                } else {
                    Err(Error::invalid_format(
                        "event column",
                        format!("row {row} holds {value}, which is not an event identifier"),
                    ))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(EventRowIndex { row_events })
    }

    pub fn len(&self) -> usize {
        self.row_events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_events.is_empty()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.row_events
    }

    /// The distinct event identifiers present in the table.
    pub fn events(&self) -> BTreeSet<u64> {
        self.row_events
            .chunk_by(|a, b| a == b)
            .map(|run| run[0])
            .collect()
    }

    /// Returns the inclusive row range of `event`, or `None` if no row carries it.
    ///
    /// The map is scanned from both ends toward the middle, one position at a time,
    /// until a row matching `event` is found. From there the scan walks away from the
    /// end it came from until the event changes. Events stored near either end of the
    /// table are therefore found quickly.
    pub fn row_range(&self, event: u64) -> Result<Option<RangeInclusive<u64>>> {
        let rows = &self.row_events;
        let Some(anchor) = self.find_anchor(event) else {
            return Ok(None);
        };
        let (first, last) = match anchor {
            Anchor::Front(first) => {
                let mut last = first;
                while last + 1 < rows.len() && rows[last + 1] == event {
                    last += 1;
                }
                (first, last)
            }
            Anchor::Back(last) => {
                let mut first = last;
                while first > 0 && rows[first - 1] == event {
                    first -= 1;
                }
                (first, last)
            }
        };
        self.verify_edges(event, first as i64, last as i64)?;
        if cfg!(debug_assertions) {
            self.cross_check(event, first, last)?;
        }
        Ok(Some(first as u64..=last as u64))
    }

    /// Like [`row_range`](Self::row_range), but returns `(first_row, last_row)` with
    /// `(-1, -1)` standing for an absent event.
    pub fn row_edges(&self, event: u64) -> Result<(i64, i64)> {
        Ok(self
            .row_range(event)?
            .map_or((-1, -1), |range| (*range.start() as i64, *range.end() as i64)))
    }

    /// Verifies the contiguity precondition for every event in one pass.
    pub fn check_contiguity(&self) -> Result<()> {
        let mut runs: AHashMap<u64, usize> = AHashMap::new();
        let mut start = 0;
        for run in self.row_events.chunk_by(|a, b| a == b) {
            let event = run[0];
            let end = start + run.len() - 1;
            if let Some(previous_start) = runs.insert(event, start) {
                return Err(not_contiguous(event, previous_start as i64, end as i64));
            }
            start = end + 1;
        }
        Ok(())
    }

    fn find_anchor(&self, event: u64) -> Option<Anchor> {
        let rows = &self.row_events;
        let n = rows.len();
        for counter in 0..n.div_ceil(2) {
            if rows[counter] == event {
                return Some(Anchor::Front(counter));
            }
            let back = n - counter - 1;
            if back != counter && rows[back] == event {
                return Some(Anchor::Back(back));
            }
        }
        None
    }

    fn verify_edges(&self, event: u64, first: i64, last: i64) -> Result<()> {
        if first < 0 || last < 0 || last < first || last as usize >= self.row_events.len() {
            return Err(not_contiguous(event, first, last));
        }
        Ok(())
    }

    fn cross_check(&self, event: u64, first: usize, last: usize) -> Result<()> {
        let total = self.row_events.iter().filter(|&&e| e == event).count();
        if total != last - first + 1 {
            return Err(not_contiguous(event, first as i64, last as i64));
        }
        Ok(())
    }
}

fn not_contiguous(event: u64, first_row: i64, last_row: i64) -> Error {
    log::error!(
        "rows of event {} are not contiguous: resolved {}..={}",
        event,
        first_row,
        last_row
    );
    ErrorKind::EventRowsNotContiguous {
        event,
        first_row,
        last_row,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use chunktab_common::error::ErrorKind;

    use super::EventRowIndex;

    #[test]
    fn test_small_scenario() {
        let index = EventRowIndex::from_ids(vec![5, 5, 5, 7, 7, 9]);
        assert_eq!(index.row_range(5).unwrap(), Some(0..=2));
        assert_eq!(index.row_range(7).unwrap(), Some(3..=4));
        assert_eq!(index.row_range(9).unwrap(), Some(5..=5));
        assert_eq!(index.row_edges(7).unwrap(), (3, 4));
        assert_eq!(index.row_edges(9).unwrap(), (5, 5));
        assert_eq!(index.events().into_iter().collect::<Vec<_>>(), vec![5, 7, 9]);
    }

    #[test]
    fn test_absent_event() {
        let index = EventRowIndex::from_ids(vec![1, 1, 2, 3]);
        assert_eq!(index.row_range(4).unwrap(), None);
        assert_eq!(index.row_edges(4).unwrap(), (-1, -1));
        assert_eq!(EventRowIndex::default().row_edges(0).unwrap(), (-1, -1));
    }

    #[test]
    fn test_middle_row_of_odd_length() {
        let index = EventRowIndex::from_ids(vec![1, 1, 2, 3, 3]);
        assert_eq!(index.row_range(2).unwrap(), Some(2..=2));
        let single = EventRowIndex::from_ids(vec![8]);
        assert_eq!(single.row_range(8).unwrap(), Some(0..=0));
    }

    #[test]
    fn test_whole_table_single_event() {
        let index = EventRowIndex::from_ids(vec![4; 7]);
        assert_eq!(index.row_range(4).unwrap(), Some(0..=6));
        assert_eq!(index.events().len(), 1);
    }

    #[test]
    fn test_unordered_event_ids() {
        let ids = vec![30, 30, 10, 20, 20, 20, 0, 0];
        let index = EventRowIndex::from_ids(ids.clone());
        for event in index.events() {
            let range = index.row_range(event).unwrap().unwrap();
            let (first, last) = (*range.start() as usize, *range.end() as usize);
            assert!(ids[first..=last].iter().all(|&e| e == event));
            assert!(first == 0 || ids[first - 1] != event);
            assert!(last + 1 == ids.len() || ids[last + 1] != event);
        }
    }

    #[test]
    fn test_from_column_values() {
        let index = EventRowIndex::from_column_values(&[3.0, 3.0, 4.0]).unwrap();
        assert_eq!(index.as_slice(), &[3, 3, 4]);
        assert!(EventRowIndex::from_column_values(&[1.0, -2.0]).is_err());
        assert!(EventRowIndex::from_column_values(&[1.5]).is_err());
        assert!(EventRowIndex::from_column_values(&[f32::NAN]).is_err());
    }

    #[test]
    fn test_check_contiguity() {
        assert!(EventRowIndex::from_ids(vec![1, 1, 2, 3]).check_contiguity().is_ok());
        let err = EventRowIndex::from_ids(vec![1, 2, 2, 1])
            .check_contiguity()
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::EventRowsNotContiguous { event: 1, first_row: 0, last_row: 3 }
        ));
    }

    #[test]
    #[cfg(debug_assertions)]
    fn test_split_event_detected_in_debug_builds() {
        let index = EventRowIndex::from_ids(vec![5, 7, 5, 9]);
        let err = index.row_range(5).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::EventRowsNotContiguous { event: 5, .. }
        ));
        // Unaffected events still resolve.
        assert_eq!(index.row_range(9).unwrap(), Some(3..=3));
    }
}
