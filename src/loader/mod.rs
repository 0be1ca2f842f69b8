//! Local emulation of the warehouse bulk copy: source resolution, the
//! JSONPaths subset, and record-to-row mapping.

pub mod jsonpath;
pub mod record;
pub mod source;

pub use jsonpath::*;
pub use record::*;
pub use source::*;

use crate::error::{EtlError, Result};
use crate::sql::{BulkLoad, RecordFormat};
use crate::ui::Ui;

/// Build the record mapper a load's format descriptor asks for
pub fn record_mapper(
    load: &BulkLoad,
    resolver: &SourceResolver,
    ui: &mut impl Ui,
) -> Result<RecordMapper> {
    let mapper = match &load.format {
        RecordFormat::Auto { ignore_case } => RecordMapper::Auto {
            ignore_case: *ignore_case,
        },
        RecordFormat::JsonPaths(location) => {
            let bytes = resolver.read_single(location, ui)?;
            let paths = parse_descriptor(&bytes)
                .map_err(|e| EtlError::load(load.table.name, format!("{}: {}", location, e)))?;
            RecordMapper::JsonPaths(paths)
        }
    };

    mapper
        .check(load.table)
        .map_err(|e| EtlError::load(load.table.name, e))?;

    Ok(mapper)
}
