use std::num::NonZeroUsize;

use ndarray::{Array2, ArrayView2, Axis};
use rand::{Rng, seq::SliceRandom};

use crate::{MlErr, Result};

/// The expected outputs of a dataset, one per row.
#[derive(Debug, Clone, PartialEq)]
pub enum Targets {
    /// Real valued targets, of shape `(rows, y_size)`.
    Values(Array2<f64>),
    /// One class index per row.
    Classes(Vec<usize>),
}

impl Targets {
    pub fn len(&self) -> usize {
        match self {
            Targets::Values(y) => y.nrows(),
            Targets::Classes(classes) => classes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The name of the kind of targets, `values` or `classes`.
    pub fn kind(&self) -> &'static str {
        match self {
            Targets::Values(_) => "values",
            Targets::Classes(_) => "classes",
        }
    }

    fn select(&self, rows: &[usize]) -> Targets {
        match self {
            Targets::Values(y) => Targets::Values(y.select(Axis(0), rows)),
            Targets::Classes(classes) => {
                Targets::Classes(rows.iter().map(|&i| classes[i]).collect())
            }
        }
    }
}

/// A batch of samples, the first dimension of `x` always matches the amount of targets.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    x: Array2<f64>,
    y: Targets,
}

impl Batch {
    /// Creates a new `Batch`.
    ///
    /// # Returns
    /// An error if `x` and `y` don't have the same amount of rows.
    pub fn new(x: Array2<f64>, y: Targets) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(MlErr::ShapeMismatch {
                what: "batch targets",
                got: y.len(),
                expected: x.nrows(),
            });
        }

        Ok(Self { x, y })
    }

    pub fn x(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    pub fn y(&self) -> &Targets {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.x.nrows() == 0
    }
}

/// An in-memory dataset of rows and their targets.
///
/// The rows are visited in an order that `shuffle` can permute, the samples themselves never
/// move.
#[derive(Debug, Clone)]
pub struct Dataset {
    x: Array2<f64>,
    y: Targets,
    order: Vec<usize>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `x` - The inputs, one sample per row.
    /// * `y` - The targets, one per row of `x`.
    ///
    /// # Returns
    /// An error if there are no samples or the amount of targets doesn't match.
    pub fn new(x: Array2<f64>, y: Targets) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(MlErr::EmptyDataset);
        }

        if x.nrows() != y.len() {
            return Err(MlErr::ShapeMismatch {
                what: "dataset targets",
                got: y.len(),
                expected: x.nrows(),
            });
        }

        let order = (0..x.nrows()).collect();
        Ok(Self { x, y, order })
    }

    /// Creates a regression dataset out of flat rows of `x_size` inputs followed by `y_size`
    /// targets.
    pub fn from_rows(data: Vec<f64>, x_size: usize, y_size: usize) -> Result<Self> {
        let row_size = x_size + y_size;
        let rows = split_rows(&data, row_size)?;

        let full = Array2::from_shape_vec((rows, row_size), data)
            .map_err(|e| MlErr::InvalidConfig(e.to_string()))?;
        let (x, y) = full.view().split_at(Axis(1), x_size);

        Self::new(x.to_owned(), Targets::Values(y.to_owned()))
    }

    /// Creates a classification dataset out of flat rows of `x_size` inputs followed by the
    /// index of the row's class.
    ///
    /// # Returns
    /// An error if a class isn't a non-negative integer.
    pub fn labeled(data: Vec<f64>, x_size: usize) -> Result<Self> {
        let row_size = x_size + 1;
        let rows = split_rows(&data, row_size)?;

        let mut x = Vec::with_capacity(rows * x_size);
        let mut classes = Vec::with_capacity(rows);

        for (i, row) in data.chunks_exact(row_size).enumerate() {
            let (features, label) = row.split_at(x_size);
            let label = label[0];

            if label < 0. || label.fract() != 0. || !label.is_finite() {
                return Err(MlErr::InvalidConfig(format!(
                    "row {i} has label {label}, which is not a class index"
                )));
            }

            x.extend_from_slice(features);
            classes.push(label as usize);
        }

        let x = Array2::from_shape_vec((rows, x_size), x)
            .map_err(|e| MlErr::InvalidConfig(e.to_string()))?;

        Self::new(x, Targets::Classes(classes))
    }

    /// Returns the amount of samples.
    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.x.nrows() == 0
    }

    pub fn x_size(&self) -> usize {
        self.x.ncols()
    }

    pub fn x(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    pub fn y(&self) -> &Targets {
        &self.y
    }

    /// Randomly permutes the order in which `batches` visits the samples.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.order.shuffle(rng);
    }

    /// Returns the whole dataset as a single batch, in its original order.
    pub fn full(&self) -> Batch {
        Batch {
            x: self.x.clone(),
            y: self.y.clone(),
        }
    }

    /// Iterates the dataset in batches of `batch_size` samples, the last one may be shorter.
    ///
    /// Every call starts a fresh pass over the dataset.
    pub fn batches(&self, batch_size: NonZeroUsize) -> Batches<'_> {
        Batches {
            dataset: self,
            chunks: self.order.chunks(batch_size.get()),
        }
    }

    /// Returns the amount of batches a pass of `batches(batch_size)` yields.
    pub fn num_batches(&self, batch_size: NonZeroUsize) -> usize {
        self.len().div_ceil(batch_size.get())
    }
}

/// Iterator over the batches of a `Dataset`.
#[derive(Debug, Clone)]
pub struct Batches<'a> {
    dataset: &'a Dataset,
    chunks: std::slice::Chunks<'a, usize>,
}

impl Iterator for Batches<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Self::Item> {
        let rows = self.chunks.next()?;

        Some(Batch {
            x: self.dataset.x.select(Axis(0), rows),
            y: self.dataset.y.select(rows),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Batches<'_> {}

fn split_rows(data: &[f64], row_size: usize) -> Result<usize> {
    if data.is_empty() {
        return Err(MlErr::EmptyDataset);
    }

    if row_size == 0 || data.len() % row_size != 0 {
        return Err(MlErr::ShapeMismatch {
            what: "dataset row length",
            got: data.len(),
            expected: row_size,
        });
    }

    Ok(data.len() / row_size)
}
