//! Analysed equal-time correlation functions (`*_eqJK`, `*_eqJR`).
//!
//! The file is a sequence of blocks, one per momentum (or real-space) point.
//! Each block is a two-field coordinate header followed by `N_orb * N_orb`
//! data lines in row-major orbital order; only the last four fields of a data
//! line carry values. Neither `N_orb` nor the number of blocks is stored, so
//! both are inferred: the first later line with exactly two fields is the
//! second block's header.

use super::error::ObservableError;
use super::shape::{ShapeMode, exact_floats, read_lines, trailing_floats};
use super::traits::ObservableFile;
use nalgebra::{Vector2, Vector4};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// Whether coordinates are lattice momenta or real-space distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Space {
    Momentum,
    Real,
}

impl Space {
    /// The trailing letter of the file-name suffix (`_eqJK` / `_eqJR`).
    pub fn suffix(self) -> char {
        match self {
            Space::Momentum => 'K',
            Space::Real => 'R',
        }
    }

    /// Conventional name of the coordinate axis, `k` or `r`.
    pub fn axis_name(self) -> &'static str {
        match self {
            Space::Momentum => "k",
            Space::Real => "r",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EqualTimeCorrelator {
    space: Space,
    n_orb: usize,
    coordinates: Vec<Vector2<f64>>,
    data: Vec<Vector4<f64>>,
}

impl EqualTimeCorrelator {
    /// Assembles a record from its parts.
    ///
    /// `data` holds `coordinates.len() * n_orb * n_orb` entries ordered by
    /// coordinate, then first orbital, then second orbital.
    pub fn new(
        space: Space,
        n_orb: usize,
        coordinates: Vec<Vector2<f64>>,
        data: Vec<Vector4<f64>>,
    ) -> Result<Self, ObservableError> {
        let Some(expected) = n_orb
            .checked_mul(n_orb)
            .and_then(|pairs| pairs.checked_mul(coordinates.len()))
        else {
            return Err(ObservableError::Shape(format!(
                "{} coordinate(s) with {} orbital(s) exceed the addressable size",
                coordinates.len(),
                n_orb
            )));
        };
        if data.len() != expected {
            return Err(ObservableError::Shape(format!(
                "{} coordinate(s) with {} orbital(s) need {} data entries, got {}",
                coordinates.len(),
                n_orb,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            space,
            n_orb,
            coordinates,
            data,
        })
    }

    pub fn space(&self) -> Space {
        self.space
    }

    pub fn n_x(&self) -> usize {
        self.coordinates.len()
    }

    pub fn n_orb(&self) -> usize {
        self.n_orb
    }

    /// `[N_x, N_orb, N_orb, 4]`
    pub fn shape(&self) -> [usize; 4] {
        [self.n_x(), self.n_orb, self.n_orb, 4]
    }

    pub fn coordinates(&self) -> &[Vector2<f64>] {
        &self.coordinates
    }

    pub fn data(&self) -> &[Vector4<f64>] {
        &self.data
    }

    pub fn get(&self, i_x: usize, orb1: usize, orb2: usize) -> Option<&Vector4<f64>> {
        if i_x >= self.n_x() || orb1 >= self.n_orb || orb2 >= self.n_orb {
            return None;
        }
        self.data
            .get((i_x * self.n_orb + orb1) * self.n_orb + orb2)
    }

    /// All values as a flat slice in `[x, orb1, orb2, component]` order.
    pub fn flat_values(&self) -> Vec<f64> {
        self.data.iter().flat_map(|v| v.iter().copied()).collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EqualTimeFile {
    space: Space,
    mode: ShapeMode,
}

impl EqualTimeFile {
    pub fn new(space: Space, mode: ShapeMode) -> Self {
        Self { space, mode }
    }

    pub fn parse_lines(&self, lines: &[String]) -> Result<EqualTimeCorrelator, ObservableError> {
        let n_lines = lines.len();
        if n_lines == 0 {
            return Err(ObservableError::Empty);
        }

        // A single-block file has no second header; the end of the file
        // plays that role.
        let next_header = lines
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, line)| line.split_whitespace().count() == 2)
            .map_or(n_lines, |(i, _)| i);
        let block_body = next_header - 1;
        let n_orb = block_body.isqrt();
        let block_len = 1 + n_orb * n_orb;
        let n_x = n_lines / block_len;

        match self.mode {
            ShapeMode::Strict => {
                if n_orb == 0 {
                    return Err(ObservableError::Shape(
                        "no data lines follow the first coordinate header".to_string(),
                    ));
                }
                if n_orb * n_orb != block_body {
                    return Err(ObservableError::Shape(format!(
                        "first block has {} data lines, which is not a square number of orbital pairs",
                        block_body
                    )));
                }
                if n_lines % block_len != 0 {
                    return Err(ObservableError::Shape(format!(
                        "{} lines do not divide into blocks of {} lines",
                        n_lines, block_len
                    )));
                }
            }
            ShapeMode::Legacy => {
                if n_lines % block_len != 0 || n_orb * n_orb != block_body {
                    warn!(
                        "Equal-time file with {} lines read as {} block(s) of {} orbital(s); trailing lines ignored.",
                        n_lines, n_x, n_orb
                    );
                }
            }
        }
        debug!(
            "Reading equal-time correlator: N_x = {}, N_orb = {}.",
            n_x, n_orb
        );

        let mut coordinates = Vec::with_capacity(n_x);
        let mut data = Vec::with_capacity(n_x * n_orb * n_orb);
        for i_x in 0..n_x {
            let start = i_x * block_len;
            let [x, y] = exact_floats::<2>(&lines[start], start)?;
            coordinates.push(Vector2::new(x, y));
            for offset in 1..block_len {
                let index = start + offset;
                let [c0, c1, c2, c3] = trailing_floats::<4>(&lines[index], index)?;
                data.push(Vector4::new(c0, c1, c2, c3));
            }
        }

        EqualTimeCorrelator::new(self.space, n_orb, coordinates, data)
    }
}

impl ObservableFile for EqualTimeFile {
    type Record = EqualTimeCorrelator;
    type Error = ObservableError;

    fn read_from(&self, reader: &mut impl BufRead) -> Result<Self::Record, Self::Error> {
        let lines = read_lines(reader)?;
        self.parse_lines(&lines)
    }

    fn write_to(&self, record: &Self::Record, writer: &mut impl Write) -> Result<(), Self::Error> {
        let n_orb = record.n_orb();
        for (i_x, coord) in record.coordinates().iter().enumerate() {
            writeln!(writer, "{:>25e} {:>25e}", coord.x, coord.y)?;
            for orb1 in 0..n_orb {
                for orb2 in 0..n_orb {
                    let v = &record.data()[(i_x * n_orb + orb1) * n_orb + orb2];
                    writeln!(
                        writer,
                        "{:>5} {:>5} {:>25e} {:>25e} {:>25e} {:>25e}",
                        orb1 + 1,
                        orb2 + 1,
                        v[0],
                        v[1],
                        v[2],
                        v[3]
                    )?;
                }
            }
        }
        Ok(())
    }
}
