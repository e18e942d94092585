use super::eqj::Space;
use super::results::{Observable, ObservableSet};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// One line of the flat CSV export. Columns that do not apply to a record
/// kind are left empty.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    name: &'a str,
    kind: &'static str,
    index: Option<usize>,
    coord_x: Option<f64>,
    coord_y: Option<f64>,
    orb1: Option<usize>,
    orb2: Option<usize>,
    c0: f64,
    c1: f64,
    c2: Option<f64>,
    c3: Option<f64>,
}

impl<'a> CsvRow<'a> {
    fn scalar(name: &'a str, kind: &'static str, index: Option<usize>, pair: [f64; 2]) -> Self {
        Self {
            name,
            kind,
            index,
            coord_x: None,
            coord_y: None,
            orb1: None,
            orb2: None,
            c0: pair[0],
            c1: pair[1],
            c2: None,
            c3: None,
        }
    }
}

fn kind_label(space: Space) -> &'static str {
    match space {
        Space::Momentum => "eqK",
        Space::Real => "eqR",
    }
}

/// Writes every record of `set` as CSV rows with 1-based indices.
pub fn write_csv<W: Write>(set: &ObservableSet, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (name, observable) in set {
        match observable {
            Observable::Scalar(scal) => {
                for (i, pair) in scal.obs.iter().enumerate() {
                    csv_writer.serialize(CsvRow::scalar(name, "scalar", Some(i + 1), *pair))?;
                }
                csv_writer.serialize(CsvRow::scalar(name, "sign", None, scal.sign))?;
            }
            Observable::EqualTime(eq) => {
                let kind = kind_label(eq.space());
                let n_orb = eq.n_orb();
                for (i_x, coord) in eq.coordinates().iter().enumerate() {
                    for orb1 in 0..n_orb {
                        for orb2 in 0..n_orb {
                            let v = &eq.data()[(i_x * n_orb + orb1) * n_orb + orb2];
                            csv_writer.serialize(CsvRow {
                                name,
                                kind,
                                index: Some(i_x + 1),
                                coord_x: Some(coord.x),
                                coord_y: Some(coord.y),
                                orb1: Some(orb1 + 1),
                                orb2: Some(orb2 + 1),
                                c0: v[0],
                                c1: v[1],
                                c2: Some(v[2]),
                                c3: Some(v[3]),
                            })?;
                        }
                    }
                }
            }
        }
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv_path(path: &Path, set: &ObservableSet) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path)?;
    write_csv(set, file)
}
