use super::error::{ObservableError, ParseErrorKind};
use std::io::{self, BufRead};

/// How strictly record shapes inferred from line counts are checked.
///
/// Result files do not store their dimensions; they are derived from line
/// and field counts. `Strict` rejects files whose line count does not divide
/// into whole records. `Legacy` truncates to the largest whole number of
/// records and ignores the rest, which is how older tooling read them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeMode {
    #[default]
    Strict,
    Legacy,
}

pub(crate) fn read_lines(reader: &mut impl BufRead) -> io::Result<Vec<String>> {
    reader.lines().collect()
}

fn parse_float(token: &str, line: usize) -> Result<f64, ObservableError> {
    token.parse().map_err(|_| ObservableError::Parse {
        line,
        kind: ParseErrorKind::InvalidFloat {
            value: token.to_string(),
        },
    })
}

/// Parses the last `N` whitespace-separated fields of a line, ignoring any
/// leading label columns. `index` is the 0-based line index.
pub(crate) fn trailing_floats<const N: usize>(
    content: &str,
    index: usize,
) -> Result<[f64; N], ObservableError> {
    let line = index + 1;
    let fields: Vec<&str> = content.split_whitespace().collect();
    if fields.len() < N {
        return Err(ObservableError::Parse {
            line,
            kind: ParseErrorKind::TooFewFields {
                expected: N,
                found: fields.len(),
            },
        });
    }
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(&fields[fields.len() - N..]) {
        *slot = parse_float(token, line)?;
    }
    Ok(out)
}

/// Parses a line that must consist of exactly `N` float fields.
pub(crate) fn exact_floats<const N: usize>(
    content: &str,
    index: usize,
) -> Result<[f64; N], ObservableError> {
    let line = index + 1;
    let found = content.split_whitespace().count();
    if found != N {
        return Err(ObservableError::Parse {
            line,
            kind: ParseErrorKind::FieldCount { expected: N, found },
        });
    }
    trailing_floats(content, index)
}
