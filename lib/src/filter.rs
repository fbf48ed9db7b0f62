use crate::{
    player::{Player, TestName},
    Result,
};
use derive_deref::Deref;
use polars::{prelude::*, sql::SQLContext};

pub fn query_sql(players: LazyFrame, tests: LazyFrame, query: &str) -> Result<LazyFrame> {
    let mut ctx = SQLContext::new();
    ctx.register("players", players);
    ctx.register("tests", tests);
    let df = ctx.execute(query)?;
    Ok(df)
}

/// All test rows across the store. DNP values are nulls in the `value` column.
#[derive(Clone, Deref)]
pub struct TestsDf(DataFrame);

impl TestsDf {
    pub(crate) fn from_players(players: &[Player]) -> Result<Self> {
        let tests: Vec<_> = players.iter().flat_map(|p| p.tests()).collect();
        let df = df!(
            "test_id" => tests.iter().map(|t| t.id()).collect::<Vec<_>>(),
            "player_id" => tests.iter().map(|t| t.player_id().to_string()).collect::<Vec<_>>(),
            "pos" => tests.iter().map(|t| t.position().to_string()).collect::<Vec<_>>(),
            "year" => tests.iter().map(|t| t.year() as i32).collect::<Vec<_>>(),
            "test" => tests.iter().map(|t| t.name().to_string()).collect::<Vec<_>>(),
            "value" => tests.iter().map(|t| t.score().value()).collect::<Vec<_>>(),
        )?;
        log::debug!("{} rows in tests relation", df.height());
        Ok(TestsDf(df))
    }

    pub fn into_inner(self) -> DataFrame {
        self.0
    }

    pub fn filter(self, filter: Expr) -> Result<Self> {
        let df = self.0.lazy().filter(filter).collect()?;
        Ok(TestsDf(df))
    }

    /// Recorded values only; DNP rows are skipped.
    pub fn values(&self) -> Result<Vec<f64>> {
        let values = self.column("value")?.f64()?.into_iter().flatten().collect();
        Ok(values)
    }
}

#[derive(Clone)]
pub struct TestFilter {
    filter_expr: Option<Expr>,
}

impl Default for TestFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFilter {
    pub fn new() -> Self {
        Self { filter_expr: None }
    }

    pub fn test(mut self, test: TestName) -> Self {
        let expr = col("test").eq(lit(test.to_string()));
        self.extend_filter(expr)
    }

    pub fn year(mut self, year: u16) -> Self {
        let expr = col("year").eq(lit(year as i32));
        self.extend_filter(expr)
    }

    pub fn position(mut self, position: &str) -> Self {
        let expr = col("pos").eq(lit(position.to_string()));
        self.extend_filter(expr)
    }

    // Combines the current filter with a new one using AND logic
    fn extend_filter(&mut self, new_expr: Expr) -> Self {
        self.filter_expr = match self.filter_expr.take() {
            Some(existing_expr) => Some(existing_expr.and(new_expr)),
            None => Some(new_expr),
        };
        self.clone()
    }

    pub fn build(self) -> Expr {
        self.filter_expr.unwrap_or_else(|| lit(true))
    }
}
