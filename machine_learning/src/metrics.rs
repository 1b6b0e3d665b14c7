use ndarray::ArrayView2;

use crate::{MlErr, Result, graph::argmax_rows};

/// Fraction of rows whose largest logit is the expected class.
///
/// # Returns
/// An error if there isn't exactly one class per row. An empty batch has an accuracy of 0.
pub fn accuracy(logits: ArrayView2<f64>, classes: &[usize]) -> Result<f64> {
    if logits.nrows() != classes.len() {
        return Err(MlErr::ShapeMismatch {
            what: "class targets",
            got: classes.len(),
            expected: logits.nrows(),
        });
    }

    if classes.is_empty() {
        return Ok(0.);
    }

    let hits = argmax_rows(logits)
        .into_iter()
        .zip(classes)
        .filter(|(predicted, expected)| predicted == *expected)
        .count();

    Ok(hits as f64 / classes.len() as f64)
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn counts_rows_whose_argmax_matches() {
        let logits = array![[0.1, 0.9], [2.0, -1.0], [0.3, 0.2], [-1.0, 1.0]];
        let acc = accuracy(logits.view(), &[1, 0, 1, 1]).unwrap();
        assert_eq!(acc, 0.75);
    }

    #[test]
    fn needs_one_class_per_row() {
        let logits = array![[0.1, 0.9]];
        assert!(matches!(
            accuracy(logits.view(), &[1, 0]),
            Err(MlErr::ShapeMismatch { .. })
        ));
    }
}
