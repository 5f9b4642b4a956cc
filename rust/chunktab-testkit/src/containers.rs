//! Writing generated tables into container files.

use std::{collections::BTreeMap, path::PathBuf};

use chunktab_format::{AttributeValue, ContainerWriter, TableLayout};

use crate::data_gen::GeneratedTable;

/// A container file inside a temporary directory, removed on drop.
pub struct TempContainer {
    pub dir: tempfile::TempDir,
    pub path: PathBuf,
}

/// Writes `table` as `table_name` into a new container in a temporary directory,
/// with the column names stored under `names_attribute`.
///
/// `layout.cols` is overridden with the table's column count.
pub fn write_temp_container(
    table: &GeneratedTable,
    table_name: &str,
    layout: TableLayout,
    names_attribute: &str,
) -> anyhow::Result<TempContainer> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("table.ctab");
    let layout = TableLayout {
        cols: table.cols as u64,
        ..layout
    };
    let mut attributes = BTreeMap::new();
    attributes.insert(
        names_attribute.to_string(),
        AttributeValue::StringArray(table.column_names.clone()),
    );
    let mut writer = ContainerWriter::create(&path)?;
    writer.add_table(table_name, &layout, &table.values, attributes)?;
    writer.finish()?;
    Ok(TempContainer { dir, path })
}
