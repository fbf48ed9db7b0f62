//! Feature matrix and position labels for an external position classifier.

use crate::{
    error::Error,
    store::CombineStore,
    table::{check_variables, collect_rows, Variable},
    Result,
};
use polars::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub struct FeatureSet {
    variables: Vec<Variable>,
    x: Vec<Vec<f64>>,
    y: Vec<usize>,
    classes: Vec<String>,
}

impl FeatureSet {
    /// Players with every variable recorded, optionally limited to one draft year.
    pub fn from_store(store: &CombineStore, variables: &[Variable], year: Option<u16>) -> Result<Self> {
        check_variables(variables)?;
        let rows = collect_rows(store, variables, year, None);

        let mut classes: Vec<String> = Vec::new();
        let mut x = Vec::with_capacity(rows.len());
        let mut y = Vec::with_capacity(rows.len());
        for row in rows {
            let label = match classes.iter().position(|c| *c == row.position) {
                Some(label) => label,
                None => {
                    classes.push(row.position);
                    classes.len() - 1
                }
            };
            x.push(row.values);
            y.push(label);
        }

        let set = Self {
            variables: variables.to_vec(),
            x,
            y,
            classes,
        };
        log::info!("feature shape: {:?}, label shape: ({},)", set.shape(), set.y.len());
        Ok(set)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// One row per player, one column per variable.
    pub fn x(&self) -> &[Vec<f64>] {
        &self.x
    }

    /// Index into `classes()` for each row.
    pub fn y(&self) -> &[usize] {
        &self.y
    }

    /// Positions in the order they were first seen.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// (rows, features)
    pub fn shape(&self) -> (usize, usize) {
        (self.x.len(), self.variables.len())
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Splits off the last `test_fraction` of rows, keeping row order.
    pub fn train_test_split(&self, test_fraction: f64) -> Result<(FeatureSet, FeatureSet)> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(Error::Validation(format!(
                "test fraction must be between 0 and 1, got {}",
                test_fraction
            )));
        }
        let n_test = (self.x.len() as f64 * test_fraction).round() as usize;
        let cut = self.x.len() - n_test;
        let part = |range: std::ops::Range<usize>| FeatureSet {
            variables: self.variables.clone(),
            x: self.x[range.clone()].to_vec(),
            y: self.y[range].to_vec(),
            classes: self.classes.clone(),
        };
        Ok((part(0..cut), part(cut..self.x.len())))
    }

    /// Features plus a `label` column of class indices.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.variables.len() + 1);
        for (i, variable) in self.variables.iter().enumerate() {
            let values: Vec<f64> = self.x.iter().map(|row| row[i]).collect();
            columns.push(Series::new(&variable.name(), values));
        }
        let labels: Vec<u32> = self.y.iter().map(|&l| l as u32).collect();
        columns.push(Series::new("label", labels));
        Ok(DataFrame::new(columns)?)
    }
}

/// Confusion matrix normalised over all samples; rows are true labels, columns predictions.
pub fn confusion_matrix(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> Result<Vec<Vec<f64>>> {
    if y_true.len() != y_pred.len() {
        return Err(Error::Validation(format!(
            "{} true labels but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(Error::Validation("no labels to compare".into()));
    }
    let mut cm = vec![vec![0.0; n_classes]; n_classes];
    for (&t, &p) in y_true.iter().zip(y_pred) {
        if t >= n_classes || p >= n_classes {
            return Err(Error::Validation(format!(
                "label {} outside of {} classes",
                t.max(p),
                n_classes
            )));
        }
        cm[t][p] += 1.0;
    }
    let total = y_true.len() as f64;
    for row in cm.iter_mut() {
        for cell in row.iter_mut() {
            *cell /= total;
        }
    }
    Ok(cm)
}
