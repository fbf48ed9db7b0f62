use crate::{
    error::Error,
    player::{DraftStatus, Player, TestName},
    store::CombineStore,
    Result,
};
use derive_deref::Deref;
use itertools::Itertools;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const DRAFT_STATUS: &str = "Draft Status";
pub const POSITION: &str = "Pos";

/// A per-player quantity that can be put in a table column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Variable {
    Height,
    Weight,
    Test(TestName),
}

impl Variable {
    /// Column name, matching the input file headers.
    pub fn name(&self) -> String {
        self.to_string()
    }

    pub fn resolve(&self, player: &Player) -> Option<f64> {
        match self {
            Variable::Height => player.height(),
            Variable::Weight => player.weight(),
            Variable::Test(test) => player.get_score(*test).value(),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Height => f.write_str("Ht"),
            Variable::Weight => f.write_str("Wt"),
            Variable::Test(test) => write!(f, "{}", test),
        }
    }
}

impl FromStr for Variable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Ht" => Ok(Variable::Height),
            "Wt" => Ok(Variable::Weight),
            _ => s.parse::<TestName>().map(Variable::Test).map_err(|_| {
                Error::Validation(format!(
                    "unknown variable '{}', expected Ht, Wt or one of {}",
                    s,
                    TestName::ALL.iter().join(", ")
                ))
            }),
        }
    }
}

/// One retained player: draft status, one value per requested variable, position.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Row {
    pub status: DraftStatus,
    pub values: Vec<f64>,
    pub position: String,
}

pub(crate) fn check_variables(variables: &[Variable]) -> Result<()> {
    if variables.is_empty() {
        return Err(Error::Validation("at least one variable is required".into()));
    }
    let repeated: Vec<_> = variables.iter().duplicates().collect();
    if !repeated.is_empty() {
        return Err(Error::Validation(format!(
            "variables requested more than once: {}",
            repeated.iter().join(", ")
        )));
    }
    Ok(())
}

/// Players matching `year`/`position` that have every variable. A single missing value drops
/// the whole player.
pub(crate) fn collect_rows(
    store: &CombineStore,
    variables: &[Variable],
    year: Option<u16>,
    position: Option<&str>,
) -> Vec<Row> {
    let mut dropped = 0;
    let rows: Vec<Row> = store
        .all()
        .iter()
        .filter(|p| year.map_or(true, |y| p.year() == y))
        .filter(|p| position.map_or(true, |pos| p.position() == pos))
        .filter_map(|p| {
            let values: Option<Vec<f64>> = variables.iter().map(|v| v.resolve(p)).collect();
            if values.is_none() {
                dropped += 1;
            }
            values.map(|values| Row {
                status: p.draft_status(),
                values,
                position: p.position().to_string(),
            })
        })
        .collect();
    log::debug!("{} rows kept, {} players dropped for missing values", rows.len(), dropped);
    rows
}

/// Parameters for [`build_aggregate_table`].
#[derive(Clone, Debug)]
pub struct AggregateQuery {
    year: u16,
    variables: Vec<Variable>,
    position: Option<String>,
    with_position: bool,
}

impl AggregateQuery {
    pub fn new(year: u16) -> Self {
        Self {
            year,
            variables: Vec::new(),
            position: None,
            with_position: false,
        }
    }

    pub fn variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn variables(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.variables.extend(variables);
        self
    }

    /// Only keep players listed at exactly this position.
    pub fn position(mut self, position: &str) -> Self {
        self.position = Some(position.to_string());
        self
    }

    /// Add a `Pos` column, as clustering inputs need.
    pub fn with_position(mut self) -> Self {
        self.with_position = true;
        self
    }
}

/// Plot-ready table: `Draft Status`, one column per variable, and optionally `Pos`.
#[derive(Clone, Deref)]
pub struct AggregateTable(DataFrame);

pub fn build_aggregate_table(store: &CombineStore, query: &AggregateQuery) -> Result<AggregateTable> {
    log::trace!("table::build_aggregate_table {:?}", query);
    check_variables(&query.variables)?;
    let rows = collect_rows(
        store,
        &query.variables,
        Some(query.year),
        query.position.as_deref(),
    );

    let mut columns = Vec::with_capacity(query.variables.len() + 2);
    let statuses: Vec<String> = rows.iter().map(|r| r.status.to_string()).collect();
    columns.push(Series::new(DRAFT_STATUS, statuses));
    for (i, variable) in query.variables.iter().enumerate() {
        let values: Vec<f64> = rows.iter().map(|r| r.values[i]).collect();
        columns.push(Series::new(&variable.name(), values));
    }
    if query.with_position {
        let positions: Vec<String> = rows.iter().map(|r| r.position.clone()).collect();
        columns.push(Series::new(POSITION, positions));
    }

    let df = DataFrame::new(columns)?;
    Ok(AggregateTable(df))
}

impl AggregateTable {
    pub fn into_inner(self) -> DataFrame {
        self.0
    }

    /// Mean of `variable` per draft status, sorted by status. Statuses with no rows are absent.
    pub fn grouped_mean_frame(&self, variable: Variable) -> Result<DataFrame> {
        let name = variable.name();
        let df = self
            .0
            .clone()
            .lazy()
            .group_by([col(DRAFT_STATUS)])
            .agg([col(name.as_str()).mean()])
            .sort([DRAFT_STATUS], SortMultipleOptions::default())
            .collect()?;
        Ok(df)
    }

    pub fn grouped_mean(&self, variable: Variable) -> Result<BTreeMap<DraftStatus, f64>> {
        let df = self.grouped_mean_frame(variable)?;
        let statuses = df.column(DRAFT_STATUS)?.str()?;
        let means = df.column(variable.name().as_str())?.f64()?;

        let mut out = BTreeMap::new();
        for (status, mean) in statuses.into_iter().zip(means.into_iter()) {
            if let (Some(status), Some(mean)) = (status, mean) {
                let status = status
                    .parse::<DraftStatus>()
                    .map_err(|_| Error::Validation(format!("unexpected draft status '{}'", status)))?;
                out.insert(status, mean);
            }
        }
        Ok(out)
    }

    /// Saves the table as `.csv` or `.parquet`, chosen by extension.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::write_table(&mut self.0.clone(), path)
    }
}
