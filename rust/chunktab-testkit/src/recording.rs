//! Store wrappers for observing and disturbing physical reads.

use std::cell::{Cell, RefCell};

use chunktab_common::{Result, error::Error};
use chunktab_format::{ChunkedStore, Extent, Hyperslab, MemShape};

/// One physical read issued against a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRead {
    pub slab: Hyperslab,
    pub mem: MemShape,
}

/// Wraps a store and records every hyperslab request passed through it.
pub struct RecordingStore<S> {
    inner: S,
    reads: RefCell<Vec<RecordedRead>>,
}

impl<S> RecordingStore<S> {
    pub fn new(inner: S) -> RecordingStore<S> {
        RecordingStore {
            inner,
            reads: RefCell::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// All reads recorded since creation or the last [`clear`](Self::clear).
    pub fn reads(&self) -> Vec<RecordedRead> {
        self.reads.borrow().clone()
    }

    pub fn read_count(&self) -> usize {
        self.reads.borrow().len()
    }

    pub fn clear(&self) {
        self.reads.borrow_mut().clear();
    }
}

impl<S: ChunkedStore> ChunkedStore for RecordingStore<S> {
    fn extent(&self) -> Extent {
        self.inner.extent()
    }

    fn row_chunking(&self) -> Option<u64> {
        self.inner.row_chunking()
    }

    fn read_hyperslab(&self, slab: &Hyperslab, mem: MemShape, dest: &mut [f32]) -> Result<()> {
        self.reads.borrow_mut().push(RecordedRead {
            slab: slab.clone(),
            mem,
        });
        self.inner.read_hyperslab(slab, mem, dest)
    }

    fn read_string_array_attribute(&self, name: &str) -> Result<Vec<String>> {
        self.inner.read_string_array_attribute(name)
    }
}

/// Wraps a store and fails the physical read with the given zero-based ordinal.
pub struct FailingStore<S> {
    inner: S,
    fail_at: usize,
    reads: Cell<usize>,
}

impl<S> FailingStore<S> {
    pub fn new(inner: S, fail_at: usize) -> FailingStore<S> {
        FailingStore {
            inner,
            fail_at,
            reads: Cell::new(0),
        }
    }

    /// Number of reads attempted so far, including the failed one.
    pub fn attempts(&self) -> usize {
        self.reads.get()
    }
}

impl<S: ChunkedStore> ChunkedStore for FailingStore<S> {
    fn extent(&self) -> Extent {
        self.inner.extent()
    }

    fn row_chunking(&self) -> Option<u64> {
        self.inner.row_chunking()
    }

    fn read_hyperslab(&self, slab: &Hyperslab, mem: MemShape, dest: &mut [f32]) -> Result<()> {
        let ordinal = self.reads.get();
        self.reads.set(ordinal + 1);
        if ordinal == self.fail_at {
            return Err(Error::io(
                format!("injected failure reading rows {:?}", slab.rows),
                std::io::Error::other("injected"),
            ));
        }
        self.inner.read_hyperslab(slab, mem, dest)
    }

    fn read_string_array_attribute(&self, name: &str) -> Result<Vec<String>> {
        self.inner.read_string_array_attribute(name)
    }
}

#[cfg(test)]
mod tests {
    use chunktab_format::{ChunkedStore, Hyperslab, MemShape, MemoryTable};

    use super::{FailingStore, RecordingStore};

    fn table() -> MemoryTable {
        MemoryTable::new(2, (0..8).map(|v| v as f32).collect()).unwrap()
    }

    #[test]
    fn test_recording() {
        let store = RecordingStore::new(table());
        let mut dest = [0.0; 2];
        store
            .read_hyperslab(&Hyperslab::column(1..3, 0), MemShape::flat(2), &mut dest)
            .unwrap();
        assert_eq!(dest, [2.0, 4.0]);
        assert_eq!(store.read_count(), 1);
        assert_eq!(store.reads()[0].slab, Hyperslab::column(1..3, 0));
        store.clear();
        assert_eq!(store.read_count(), 0);
    }

    #[test]
    fn test_failing() {
        let store = FailingStore::new(table(), 1);
        let mut dest = [0.0; 1];
        let slab = Hyperslab::column(0..1, 0);
        assert!(store.read_hyperslab(&slab, MemShape::flat(1), &mut dest).is_ok());
        let err = store
            .read_hyperslab(&slab, MemShape::flat(1), &mut dest)
            .unwrap_err();
        assert!(err.is_io());
        assert!(store.read_hyperslab(&slab, MemShape::flat(1), &mut dest).is_ok());
        assert_eq!(store.attempts(), 3);
    }
}
