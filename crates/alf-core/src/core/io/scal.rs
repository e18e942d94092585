//! Analysed scalar observables (`*_scalJ`).
//!
//! Layout: two header lines, then one `<label...> <mean> <error>` line per
//! observable followed by a filler line, and finally the average sign as
//! `<label...> <mean> <error>` on the last line.

use super::error::ObservableError;
use super::shape::{ShapeMode, read_lines, trailing_floats};
use super::traits::ObservableFile;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarObservable {
    /// Mean and error of the Monte Carlo sign.
    pub sign: [f64; 2],
    /// Mean and error of each observable, in file order.
    pub obs: Vec<[f64; 2]>,
}

impl ScalarObservable {
    pub fn n_obs(&self) -> usize {
        self.obs.len()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarFile {
    mode: ShapeMode,
}

impl ScalarFile {
    pub fn new(mode: ShapeMode) -> Self {
        Self { mode }
    }

    pub fn parse_lines(&self, lines: &[String]) -> Result<ScalarObservable, ObservableError> {
        let n_lines = lines.len();
        if n_lines == 0 {
            return Err(ObservableError::Empty);
        }

        let n_obs = n_lines.saturating_sub(2) / 2;
        match self.mode {
            ShapeMode::Strict => {
                if n_lines < 3 || (n_lines - 3) % 2 != 0 {
                    return Err(ObservableError::Shape(format!(
                        "scalar file has {} lines; expected 2 header lines, an even number of data lines and a sign line",
                        n_lines
                    )));
                }
            }
            ShapeMode::Legacy => {
                if n_lines < 3 || (n_lines - 3) % 2 != 0 {
                    warn!(
                        "Scalar file has {} lines, reading {} observable(s) and ignoring the remainder.",
                        n_lines, n_obs
                    );
                }
            }
        }
        debug!("Reading {} scalar observable(s).", n_obs);

        let last = n_lines - 1;
        let sign = trailing_floats::<2>(&lines[last], last)?;
        let obs = (0..n_obs)
            .map(|i| {
                let index = 2 * i + 2;
                trailing_floats::<2>(&lines[index], index)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ScalarObservable { sign, obs })
    }
}

impl ObservableFile for ScalarFile {
    type Record = ScalarObservable;
    type Error = ObservableError;

    fn read_from(&self, reader: &mut impl BufRead) -> Result<Self::Record, Self::Error> {
        let lines = read_lines(reader)?;
        self.parse_lines(&lines)
    }

    fn write_to(&self, record: &Self::Record, writer: &mut impl Write) -> Result<(), Self::Error> {
        writeln!(writer, " Number of observables: {}", record.n_obs())?;
        writeln!(writer)?;
        for (i, [mean, error]) in record.obs.iter().enumerate() {
            writeln!(writer, " OBS : {:>5} {:>25e} {:>25e}", i + 1, mean, error)?;
            writeln!(writer)?;
        }
        writeln!(
            writer,
            " OBS : {:>5} {:>25e} {:>25e}",
            record.n_obs() + 1,
            record.sign[0],
            record.sign[1]
        )?;
        Ok(())
    }
}
