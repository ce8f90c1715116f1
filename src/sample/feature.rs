//! A single feature column, stored in dense or sparse form.
use std::mem;
use std::ops::Index;

use polars::prelude::*;

use crate::{
    constants::BUFFER_SIZE,
    error::Result,
};

/// A column of a [`Sample`](crate::Sample).
/// Sparse columns keep the non-zero entries as `(row, value)` pairs
/// sorted by `row`.
#[derive(Debug, Clone)]
pub enum Feature {
    /// Every value is stored.
    Dense {
        /// The column name.
        name: String,
        /// Values indexed by row.
        vals: Vec<f64>,
    },
    /// Only non-zero values are stored.
    Sparse {
        /// The column name.
        name: String,
        /// Non-zero `(row, value)` pairs.
        vals: Vec<(usize, f64)>,
        /// The number of rows.
        size: usize,
    },
}

impl Feature {
    /// Returns the column name.
    pub fn name(&self) -> &str {
        match self {
            Self::Dense  { name, .. } => name,
            Self::Sparse { name, .. } => name,
        }
    }

    /// Construct an empty dense column.
    pub fn dense<T: ToString>(name: T) -> Self {
        Self::Dense {
            name: name.to_string(),
            vals: Vec::with_capacity(BUFFER_SIZE),
        }
    }

    /// Construct an empty sparse column with `size` rows.
    pub fn sparse<T: ToString>(name: T, size: usize) -> Self {
        Self::Sparse {
            name: name.to_string(),
            vals: Vec::with_capacity(BUFFER_SIZE),
            size,
        }
    }

    /// Convert a `polars::Series` into a dense column.
    /// Integer columns are cast to `f64`.
    pub fn from_series(series: &Series) -> Result<Self> {
        let name = series.name().to_string();
        let casted = series.cast(&DataType::Float64)?;
        let vals = casted.f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect::<Vec<_>>();

        Ok(Self::Dense { name, vals, })
    }

    /// Consumes `self` and returns the dense values.
    pub fn into_vals(self) -> Vec<f64> {
        match self {
            Self::Dense  { vals, .. } => vals,
            Self::Sparse { vals, size, .. } => {
                let mut ret = vec![0f64; size];
                vals.into_iter()
                    .for_each(|(i, v)| { ret[i] = v; });
                ret
            },
        }
    }

    /// Returns `true` if `self` is stored in the sparse form.
    pub fn is_sparse(&self) -> bool {
        match self {
            Self::Dense  { .. } => false,
            Self::Sparse { .. } => true,
        }
    }

    /// Append the value `val` at row `ix`.
    /// Dense columns ignore `ix`.
    pub fn append(&mut self, (ix, val): (usize, f64)) {
        match self {
            Self::Dense  { vals, .. } => vals.push(val),
            Self::Sparse { vals, .. } => {
                if val != 0f64 { vals.push((ix, val)); }
            },
        }
    }

    pub(crate) fn replace_name<T>(&mut self, name: T)
        -> String
        where T: ToString,
    {
        let n = name.to_string();
        match self {
            Self::Dense  { name, .. } => { mem::replace(name, n) },
            Self::Sparse { name, .. } => { mem::replace(name, n) },
        }
    }

    pub(crate) fn set_size(&mut self, size: usize) {
        let s = size;
        if let Self::Sparse { size, .. } = self { *size = s; }
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Dense  { vals, .. } => vals.len(),
            Self::Sparse { size, .. } => *size,
        }
    }

    /// Returns `true` if no value is stored.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Dense  { vals, .. } => { vals.is_empty() },
            Self::Sparse { vals, .. } => { vals.is_empty() },
        }
    }

    fn zero_counts(&self) -> usize {
        match self {
            Self::Dense  { vals, ..       } => {
                vals.iter()
                    .filter(|&&v| v == 0f64)
                    .count()
            },
            Self::Sparse { vals, size, .. } => { size - vals.len() },
        }
    }

    /// Returns `true` if some row takes value `0`.
    pub fn has_zero(&self) -> bool {
        self.zero_counts() > 0
    }

    /// Returns the number of distinct values in this column.
    pub fn distinct_value_count(&self) -> usize {
        let mut values = match self {
            Self::Dense  { vals, .. } => { vals.clone() },
            Self::Sparse { vals, .. } => {
                let mut values = vals.iter()
                    .map(|&(_, v)| v)
                    .collect::<Vec<_>>();
                if self.has_zero() { values.push(0f64); }
                values
            },
        };

        if values.is_empty() { return 0; }

        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();
        values.len()
    }

    /// Returns a new column whose `k`-th row is the `ix[k]`-th row
    /// of `self`.
    /// `ix` may contain duplicates.
    pub fn subset(&self, ix: &[usize]) -> Self {
        match self {
            Self::Dense { name, vals } => {
                let vals = ix.iter()
                    .map(|&i| vals[i])
                    .collect();
                Self::Dense { name: name.clone(), vals, }
            },
            Self::Sparse { name, .. } => {
                let mut feature = Self::sparse(name, ix.len());
                ix.iter()
                    .enumerate()
                    .for_each(|(k, &i)| feature.append((k, self[i])));
                feature
            },
        }
    }
}

impl Index<usize> for Feature {
    type Output = f64;
    fn index(&self, idx: usize) -> &Self::Output {
        match self {
            Self::Dense  { vals, .. } => &vals[idx],
            Self::Sparse { vals, .. } => {
                let pos = vals.binary_search_by(|(i, _)| i.cmp(&idx));
                match pos {
                    Ok(p)  => &vals[p].1,
                    Err(_) => &0f64,
                }
            },
        }
    }
}
