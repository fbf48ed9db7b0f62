use polars::error::PolarsError;
use std::io::Error as IoError;

use crate::player::TestName;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] IoError),

    #[error("Parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No player with id '{0}'")]
    PlayerNotFound(String),

    #[error("Test '{test_id}' references unknown player '{player_id}'")]
    OrphanTest { test_id: String, player_id: String },

    #[error("Test '{0}' was recorded more than once")]
    DuplicateTest(String),

    #[error("No recorded {test} results in {year} to rank against")]
    EmptyPopulation { test: TestName, year: u16 },
}
