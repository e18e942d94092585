//! Tolerance comparison of two observable sets.

use super::io::results::{Observable, ObservableSet};
use std::fmt;
use std::io::{self, Write};
use std::path::Path;

pub const DEFAULT_RTOL: f64 = 1e-5;
pub const DEFAULT_ATOL: f64 = 1e-8;

/// Relative and absolute tolerance for element-wise comparison.
///
/// Two values `a` (test) and `b` (reference) are close when
/// `|a - b| <= atol + rtol * |a|`, so the relative bound scales with the test
/// value. Equal infinities are close, NaN never is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
        }
    }
}

impl Tolerance {
    pub fn is_close(&self, test: f64, reference: f64) -> bool {
        if test == reference {
            return true;
        }
        if !test.is_finite() || !reference.is_finite() {
            return false;
        }
        (test - reference).abs() <= self.atol + self.rtol * test.abs()
    }

    /// Element-wise closeness of two equally long sequences.
    pub fn all_close(&self, test: &[f64], reference: &[f64]) -> bool {
        test.len() == reference.len()
            && test
                .iter()
                .zip(reference)
                .all(|(t, r)| self.is_close(*t, *r))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonEntry {
    pub name: String,
    pub close: bool,
    /// Scalar values shown alongside the verdict, `(reference, test)`.
    pub scalars: Option<(Vec<[f64; 2]>, Option<Vec<[f64; 2]>>)>,
}

/// Outcome of comparing a test run against a reference run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComparisonReport {
    pub entries: Vec<ComparisonEntry>,
}

impl ComparisonReport {
    /// Compares every scalar record of `reference` first, then every
    /// equal-time record. A record missing from `test` or of a different
    /// shape counts as not close.
    pub fn compare(reference: &ObservableSet, test: &ObservableSet, tolerance: Tolerance) -> Self {
        let mut entries = Vec::new();

        for (name, observable) in reference {
            let Observable::Scalar(ref_scal) = observable else {
                continue;
            };
            let test_scal = test.get(name).and_then(Observable::as_scalar);
            let close = test_scal.is_some_and(|t| {
                tolerance.all_close(t.obs.as_flattened(), ref_scal.obs.as_flattened())
            });
            entries.push(ComparisonEntry {
                name: name.clone(),
                close,
                scalars: Some((ref_scal.obs.clone(), test_scal.map(|t| t.obs.clone()))),
            });
        }

        for (name, observable) in reference {
            let Observable::EqualTime(ref_eq) = observable else {
                continue;
            };
            let close = test
                .get(name)
                .and_then(Observable::as_equal_time)
                .is_some_and(|t| {
                    t.shape() == ref_eq.shape()
                        && tolerance.all_close(&t.flat_values(), &ref_eq.flat_values())
                });
            entries.push(ComparisonEntry {
                name: name.clone(),
                close,
                scalars: None,
            });
        }

        Self { entries }
    }

    pub fn all_close(&self) -> bool {
        self.entries.iter().all(|e| e.close)
    }

    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        write!(writer, "{}", self)
    }

    pub fn write_to_path(&self, path: &Path) -> io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        self.write_to(&mut file)
    }
}

struct PairList<'a>(&'a [[f64; 2]]);

impl fmt::Display for PairList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, [mean, error]) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[{mean}, {error}]")?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(
                f,
                "{}: {}",
                entry.name,
                if entry.close { "True" } else { "False" }
            )?;
            if let Some((reference, test)) = &entry.scalars {
                writeln!(f, "    reference: {}", PairList(reference))?;
                match test {
                    Some(test) => writeln!(f, "         test: {}", PairList(test))?,
                    None => writeln!(f, "         test: missing")?,
                }
            }
        }
        Ok(())
    }
}
