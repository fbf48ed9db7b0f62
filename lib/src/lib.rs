use polars::prelude::*;
use std::path::Path;

mod error;
pub mod features;
pub mod filter;
pub mod player;
pub mod stats;
pub mod store;
pub mod table;

pub use error::Error;
pub use player::{DraftStatus, Player, PlayerId, Score, Test, TestName};
pub use stats::{get_percentile, Group, Percentile};
pub use store::CombineStore;
pub use table::{build_aggregate_table, AggregateQuery, AggregateTable, Variable};

pub type Result<T> = std::result::Result<T, error::Error>;

/// Writes `df` as `.csv` or `.parquet`, chosen by the file extension.
pub fn write_table<P: AsRef<Path>>(df: &mut DataFrame, path: P) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("parquet") => {
            let mut file = std::fs::File::create(path)?;
            ParquetWriter::new(&mut file).finish(df)?;
        }
        Some("csv") => {
            let mut file = std::fs::File::create(path)?;
            CsvWriter::new(&mut file).include_header(true).finish(df)?;
        }
        _ => {
            return Err(Error::Validation(format!(
                "unsupported table format '{}', use .csv or .parquet",
                path.display()
            )))
        }
    }
    log::info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}
