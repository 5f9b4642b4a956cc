//! Column name catalog.

use std::sync::Arc;

use ahash::AHashMap;
use chunktab_common::{
    Result,
    error::{Error, ErrorKind},
};
use chunktab_format::ChunkedStore;

/// The ordered list of column names of a table, parallel to the physical column
/// index, with a prebuilt name lookup.
///
/// Names are unique within a catalog.
#[derive(Debug, Clone)]
pub struct ColumnCatalog {
    names: Vec<Arc<str>>,
    lookup: AHashMap<Arc<str>, usize>,
}

impl ColumnCatalog {
    /// Builds the catalog from the string-array attribute `attribute` of `store`.
    ///
    /// Fails if the attribute is missing or not a string array, if it lists a
    /// different number of names than the table has columns, or if a name repeats.
    pub fn from_store<S: ChunkedStore + ?Sized>(store: &S, attribute: &str) -> Result<ColumnCatalog> {
        let names = store.read_string_array_attribute(attribute)?;
        let cols = store.extent().cols;
        if names.len() as u64 != cols {
            return Err(Error::invalid_format(
                attribute,
                format!("{} column names for a table of {cols} columns", names.len()),
            ));
        }
        let catalog = ColumnCatalog::from_names(names)?;
        log::debug!("column catalog '{}': {:?}", attribute, catalog.names);
        Ok(catalog)
    }

    /// Builds the catalog from an explicit list of names.
    pub fn from_names<I, S>(names: I) -> Result<ColumnCatalog>
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        let names: Vec<Arc<str>> = names.into_iter().map(Into::into).collect();
        let mut lookup = AHashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            if let Some(previous) = lookup.insert(name.clone(), index) {
                return Err(Error::invalid_format(
                    "column_names",
                    format!("duplicate column name '{name}' at {previous} and {index}"),
                ));
            }
        }
        Ok(ColumnCatalog { names, lookup })
    }

    /// Resolves a column name to its zero-based index.
    pub fn resolve(&self, name: &str) -> Result<usize> {
        self.position(name).ok_or_else(|| {
            ErrorKind::ColumnNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|name| name.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|name| name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
