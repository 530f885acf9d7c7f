//! Common metrics for performance evaluation of classifier
//!
//! Scoring is essential for classification tasks. This module implements common scoring
//! functions like precision, accuracy, recall, f1-score, the classification report, ROC and ROC
//! Area-Under-Curve.
use std::collections::HashMap;
use std::fmt;

use ndarray::prelude::*;
use ndarray::Data;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::dataset::{AsTargets, Float, Label};
use crate::error::{Error, Result};

/// Confusion matrix for multi-label evaluation
///
/// A confusion matrix shows predictions in a matrix, where rows correspond to target and columns
/// to predicted. The diagonal entries are correct predictions. Classes are sorted, so for a
/// binary `0`/`1` task the layout is
///
/// ```text
///             Predicted:0  Predicted:1
/// Actual:0        TN           FP
/// Actual:1        FN           TP
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, PartialEq)]
pub struct ConfusionMatrix<A> {
    matrix: Array2<usize>,
    members: Array1<A>,
}

impl<A> ConfusionMatrix<A> {
    /// The raw counts, rows are ground truth and columns predictions
    pub fn matrix(&self) -> &Array2<usize> {
        &self.matrix
    }

    /// The sorted classes labelling rows and columns
    pub fn members(&self) -> &Array1<A> {
        &self.members
    }

    /// Calculate precision for every class
    ///
    /// The precision of a class is the fraction of samples predicted as that class which really
    /// belong to it. A class which was never predicted gets a precision of zero.
    pub fn precision(&self) -> Array1<f32> {
        let sum = self.matrix.sum_axis(Axis(0));

        Array1::from_iter(
            self.matrix
                .diag()
                .iter()
                .zip(sum.iter())
                .map(|(a, b)| ratio(*a, *b)),
        )
    }

    /// Calculate recall for every class
    ///
    /// The recall of a class is the fraction of its samples which were predicted correctly.
    pub fn recall(&self) -> Array1<f32> {
        let sum = self.matrix.sum_axis(Axis(1));

        Array1::from_iter(
            self.matrix
                .diag()
                .iter()
                .zip(sum.iter())
                .map(|(a, b)| ratio(*a, *b)),
        )
    }

    /// Number of ground truth samples for every class
    pub fn support(&self) -> Array1<usize> {
        self.matrix.sum_axis(Axis(1))
    }

    /// Return mean accuracy
    pub fn accuracy(&self) -> f32 {
        ratio(self.matrix.diag().sum(), self.matrix.sum())
    }

    /// Fraction of wrongly classified samples, `1 - accuracy`
    pub fn misclassification_rate(&self) -> f32 {
        1.0 - self.accuracy()
    }

    /// Return beta score for every class
    pub fn f_score(&self, beta: f32) -> Array1<f32> {
        let sb = beta * beta;
        let precision = self.precision();
        let recall = self.recall();

        Array::from_iter(precision.iter().zip(recall.iter()).map(|(p, r)| {
            let denom = sb * p + r;
            if denom > 0.0 {
                (1.0 + sb) * (p * r) / denom
            } else {
                0.0
            }
        }))
    }

    /// Return beta=1 score for every class
    pub fn f1_score(&self) -> Array1<f32> {
        self.f_score(1.0)
    }

    /// Return the Matthew Correlation Coefficients
    ///
    /// Estimates the normalized cross-correlation between target and predicted variable
    pub fn mcc(&self) -> f32 {
        let mut cov_xy = 0.0;
        for k in 0..self.members.len() {
            for l in 0..self.members.len() {
                for m in 0..self.members.len() {
                    cov_xy += self.matrix[(k, k)] as f32 * self.matrix[(l, m)] as f32;
                    cov_xy -= self.matrix[(k, l)] as f32 * self.matrix[(m, k)] as f32;
                }
            }
        }

        let sum = self.matrix.sum();
        let sum_over_cols = self.matrix.sum_axis(Axis(0));
        let sum_over_rows = self.matrix.sum_axis(Axis(1));

        let mut cov_xx: f32 = 0.0;
        let mut cov_yy: f32 = 0.0;
        for k in 0..self.members.len() {
            cov_xx += (sum_over_rows[k] * (sum - sum_over_rows[k])) as f32;
            cov_yy += (sum_over_cols[k] * (sum - sum_over_cols[k])) as f32;
        }

        cov_xy / cov_xx.sqrt() / cov_yy.sqrt()
    }
}

impl<A: PartialEq> ConfusionMatrix<A> {
    /// Number of samples of class `truth` which were predicted as `predicted`
    ///
    /// Returns zero if one of the classes never appeared.
    pub fn get(&self, truth: &A, predicted: &A) -> usize {
        let row = self.members.iter().position(|x| x == truth);
        let col = self.members.iter().position(|x| x == predicted);

        match (row, col) {
            (Some(row), Some(col)) => self.matrix[(row, col)],
            _ => 0,
        }
    }
}

impl<A: Clone> ConfusionMatrix<A> {
    /// Summarize precision, recall, f1-score and support of every class
    pub fn classification_report(&self) -> ClassificationReport<A> {
        let precision = self.precision();
        let recall = self.recall();
        let f1 = self.f1_score();
        let support = self.support();

        let classes = self
            .members
            .iter()
            .enumerate()
            .map(|(i, class)| ClassScores {
                class: class.clone(),
                precision: precision[i],
                recall: recall[i],
                f1_score: f1[i],
                support: support[i],
            })
            .collect();

        ClassificationReport {
            classes,
            accuracy: self.accuracy(),
            total: self.matrix.sum(),
        }
    }
}

fn ratio(a: usize, b: usize) -> f32 {
    if b == 0 {
        0.0
    } else {
        a as f32 / b as f32
    }
}

/// Print a confusion matrix as a labelled table
impl<A: fmt::Display> fmt::Display for ConfusionMatrix<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let width = self
            .members
            .iter()
            .map(|m| format!("Predicted:{}", m).len())
            .max()
            .unwrap_or(0)
            .max(8);

        write!(f, "{:width$}", "", width = width)?;
        for member in self.members.iter() {
            write!(f, "  {:>width$}", format!("Predicted:{}", member), width = width)?;
        }
        writeln!(f)?;

        for (i, member) in self.members.iter().enumerate() {
            write!(f, "{:width$}", format!("Actual:{}", member), width = width)?;
            for j in 0..self.members.len() {
                write!(f, "  {:>width$}", self.matrix[(i, j)], width = width)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl<A: fmt::Display> fmt::Debug for ConfusionMatrix<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let len = self.matrix.len_of(Axis(0));
        for _ in 0..len * 4 + 1 {
            write!(f, "-")?;
        }
        writeln!(f)?;

        for i in 0..len {
            write!(f, "| ")?;

            for j in 0..len {
                write!(f, "{} | ", self.matrix[(i, j)])?;
            }
            writeln!(f)?;
        }

        for _ in 0..len * 4 + 1 {
            write!(f, "-")?;
        }

        Ok(())
    }
}

/// Scores of a single class in a [`ClassificationReport`]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScores<A> {
    pub class: A,
    pub precision: f32,
    pub recall: f32,
    pub f1_score: f32,
    pub support: usize,
}

/// Per-class precision, recall, f1-score and support together with accuracy and averages
///
/// The text rendering follows the usual layout with a `macro avg` (unweighted mean over classes)
/// and a `weighted avg` (mean weighted by support) row.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport<A> {
    pub classes: Vec<ClassScores<A>>,
    pub accuracy: f32,
    pub total: usize,
}

impl<A> ClassificationReport<A> {
    /// Unweighted mean of precision, recall and f1-score over all classes
    pub fn macro_avg(&self) -> (f32, f32, f32) {
        let n = self.classes.len().max(1) as f32;
        let (p, r, f) = self.classes.iter().fold((0.0, 0.0, 0.0), |acc, c| {
            (acc.0 + c.precision, acc.1 + c.recall, acc.2 + c.f1_score)
        });

        (p / n, r / n, f / n)
    }

    /// Mean of precision, recall and f1-score weighted by the support of each class
    pub fn weighted_avg(&self) -> (f32, f32, f32) {
        let n = self.total.max(1) as f32;
        let (p, r, f) = self.classes.iter().fold((0.0, 0.0, 0.0), |acc, c| {
            let w = c.support as f32;
            (
                acc.0 + w * c.precision,
                acc.1 + w * c.recall,
                acc.2 + w * c.f1_score,
            )
        });

        (p / n, r / n, f / n)
    }
}

impl<A: fmt::Display> fmt::Display for ClassificationReport<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                c.class.to_string(),
                c.precision,
                c.recall,
                c.f1_score,
                c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.total
        )?;
        let (p, r, s) = self.macro_avg();
        writeln!(
            f,
            "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
            "macro avg", p, r, s, self.total
        )?;
        let (p, r, s) = self.weighted_avg();
        writeln!(
            f,
            "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
            "weighted avg", p, r, s, self.total
        )
    }
}

/// Classification functions
///
/// Contains only routine for Confusion Matrix, as all other current metrices can be derived from
/// the entries in the matrix.
pub trait ToConfusionMatrix<A, T> {
    fn confusion_matrix(&self, ground_truth: T) -> Result<ConfusionMatrix<A>>;
}

impl<L: Label + Ord, S: Data<Elem = L>, T: AsTargets<Elem = L>> ToConfusionMatrix<L, T>
    for ArrayBase<S, Ix1>
{
    fn confusion_matrix(&self, ground_truth: T) -> Result<ConfusionMatrix<L>> {
        let ground_truth = ground_truth.as_targets();
        if ground_truth.len() != self.len() {
            return Err(Error::MismatchedShapes(self.len(), ground_truth.len()));
        }

        // create a sorted set of all labels
        let mut classes = ground_truth
            .iter()
            .chain(self.iter())
            .cloned()
            .collect::<Vec<_>>();
        classes.sort();
        classes.dedup();

        let indices = classes
            .iter()
            .enumerate()
            .map(|(i, class)| (class.clone(), i))
            .collect::<HashMap<_, _>>();

        // count each index tuple in the confusion matrix
        let mut confusion_matrix = Array2::zeros((classes.len(), classes.len()));
        for (truth, predicted) in ground_truth.iter().zip(self.iter()) {
            confusion_matrix[(indices[truth], indices[predicted])] += 1;
        }

        Ok(ConfusionMatrix {
            matrix: confusion_matrix,
            members: Array1::from(classes),
        })
    }
}

/// Integration using the trapezoidal rule.
fn trapezoidal<A: Float>(vals: &[(A, A)]) -> A {
    let mut prev_x = vals[0].0;
    let mut prev_y = vals[0].1;
    let mut integral = A::zero();

    for (x, y) in vals.iter().skip(1) {
        integral += (*x - prev_x) * (prev_y + *y) / A::cast(2.0);
        prev_x = *x;
        prev_y = *y;
    }
    integral
}

/// Receiver operating characteristic of a binary classifier
///
/// The curve is stored as `(false positive rate, true positive rate)` points starting in `(0, 0)`
/// and ending in `(1, 1)`. Every point belongs to a threshold, samples with a score larger or
/// equal to the threshold are classified as positive. The first threshold is infinite.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiverOperatingCharacteristic<A> {
    curve: Vec<(A, A)>,
    thresholds: Vec<A>,
}

impl<A: Float> ReceiverOperatingCharacteristic<A> {
    pub fn get_curve(&self) -> Vec<(A, A)> {
        self.curve.clone()
    }

    pub fn get_thresholds(&self) -> Vec<A> {
        self.thresholds.clone()
    }

    pub fn area_under_curve(&self) -> A {
        trapezoidal(&self.curve)
    }
}

/// Binary classification functions
pub trait BinaryClassification<A> {
    fn roc(&self, y: &[bool]) -> Result<ReceiverOperatingCharacteristic<A>>;
}

/// The ROC curve gives insight about the seperability of a binary classification task. This
/// functions returns the ROC curve and threshold belonging to each position on the curve.
///
/// Samples with equal scores are merged into a single point.
impl<A: Float, D: Data<Elem = A>> BinaryClassification<A> for ArrayBase<D, Ix1> {
    fn roc(&self, y: &[bool]) -> Result<ReceiverOperatingCharacteristic<A>> {
        if self.len() != y.len() {
            return Err(Error::MismatchedShapes(self.len(), y.len()));
        }

        let mut tuples = self
            .iter()
            .zip(y.iter())
            .map(|(a, b)| (*a, *b))
            .collect::<Vec<(A, bool)>>();

        // descending scores, NaN scores last
        tuples.sort_unstable_by(|a, b| {
            b.0.partial_cmp(&a.0).unwrap_or_else(|| a.0.is_nan().cmp(&b.0.is_nan()))
        });

        let max_tp = A::cast(y.iter().filter(|x| **x).count());
        let max_fp = A::cast(y.iter().filter(|x| !**x).count());
        if max_tp == A::zero() || max_fp == A::zero() {
            return Err(Error::SingleClass);
        }

        let (mut tp, mut fp) = (A::zero(), A::zero());
        let mut curve = vec![(A::zero(), A::zero())];
        let mut thresholds = vec![A::infinity()];

        for (i, (s, t)) in tuples.iter().enumerate() {
            if *t {
                tp += A::one();
            } else {
                fp += A::one();
            }

            let last_of_score = tuples.get(i + 1).map(|next| next.0 != *s).unwrap_or(true);
            if last_of_score {
                curve.push((fp / max_fp, tp / max_tp));
                thresholds.push(*s);
            }
        }

        Ok(ReceiverOperatingCharacteristic { curve, thresholds })
    }
}
