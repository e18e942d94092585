//! Self-describing TOML storage for collected observables.
//!
//! Unlike the analysis output, every record in an archive carries its own
//! dimensions, so decoding never has to guess a shape from line counts.
//! A declared dimension that disagrees with the stored data is an error.

use super::eqj::{EqualTimeCorrelator, Space};
use super::error::ObservableError;
use super::results::{Observable, ObservableSet};
use super::scal::ScalarObservable;
use nalgebra::{Vector2, Vector4};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const ARCHIVE_FORMAT: &str = "alfkit-observables";
pub const ARCHIVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode archive: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("Failed to decode archive: {0}")]
    Decode(#[from] toml::de::Error),

    #[error("Not an observable archive (format '{0}')")]
    UnknownFormat(String),

    #[error("Unsupported archive version {0}")]
    UnsupportedVersion(u32),

    #[error("Record '{name}': {message}")]
    Shape { name: String, message: String },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ArchiveDocument {
    format: String,
    version: u32,
    #[serde(default)]
    observables: BTreeMap<String, ArchiveRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
enum ArchiveRecord {
    Scalar {
        n_obs: usize,
        sign: [f64; 2],
        obs: Vec<[f64; 2]>,
    },
    EqualTime {
        space: Space,
        n_x: usize,
        n_orb: usize,
        coordinates: Vec<[f64; 2]>,
        data: Vec<[f64; 4]>,
    },
}

impl From<&Observable> for ArchiveRecord {
    fn from(observable: &Observable) -> Self {
        match observable {
            Observable::Scalar(scal) => ArchiveRecord::Scalar {
                n_obs: scal.n_obs(),
                sign: scal.sign,
                obs: scal.obs.clone(),
            },
            Observable::EqualTime(eq) => ArchiveRecord::EqualTime {
                space: eq.space(),
                n_x: eq.n_x(),
                n_orb: eq.n_orb(),
                coordinates: eq.coordinates().iter().map(|c| [c.x, c.y]).collect(),
                data: eq.data().iter().map(|v| [v[0], v[1], v[2], v[3]]).collect(),
            },
        }
    }
}

impl ArchiveRecord {
    fn into_observable(self, name: &str) -> Result<Observable, ArchiveError> {
        let shape_error = |message: String| ArchiveError::Shape {
            name: name.to_string(),
            message,
        };
        match self {
            ArchiveRecord::Scalar { n_obs, sign, obs } => {
                if obs.len() != n_obs {
                    return Err(shape_error(format!(
                        "declares {} observable(s) but stores {}",
                        n_obs,
                        obs.len()
                    )));
                }
                Ok(Observable::Scalar(ScalarObservable { sign, obs }))
            }
            ArchiveRecord::EqualTime {
                space,
                n_x,
                n_orb,
                coordinates,
                data,
            } => {
                if coordinates.len() != n_x {
                    return Err(shape_error(format!(
                        "declares {} coordinate(s) but stores {}",
                        n_x,
                        coordinates.len()
                    )));
                }
                let coordinates = coordinates
                    .into_iter()
                    .map(|[x, y]| Vector2::new(x, y))
                    .collect();
                let data = data
                    .into_iter()
                    .map(|[c0, c1, c2, c3]| Vector4::new(c0, c1, c2, c3))
                    .collect();
                EqualTimeCorrelator::new(space, n_orb, coordinates, data)
                    .map(Observable::EqualTime)
                    .map_err(|e| match e {
                        ObservableError::Shape(message) => shape_error(message),
                        other => shape_error(other.to_string()),
                    })
            }
        }
    }
}

/// Encodes a set of observables as an archive document.
pub fn to_archive_string(set: &ObservableSet) -> Result<String, ArchiveError> {
    let document = ArchiveDocument {
        format: ARCHIVE_FORMAT.to_string(),
        version: ARCHIVE_VERSION,
        observables: set
            .iter()
            .map(|(name, obs)| (name.clone(), ArchiveRecord::from(obs)))
            .collect(),
    };
    Ok(toml::to_string(&document)?)
}

/// Decodes an archive document, validating every declared shape.
pub fn from_archive_str(content: &str) -> Result<ObservableSet, ArchiveError> {
    let document: ArchiveDocument = toml::from_str(content)?;
    if document.format != ARCHIVE_FORMAT {
        return Err(ArchiveError::UnknownFormat(document.format));
    }
    if document.version != ARCHIVE_VERSION {
        return Err(ArchiveError::UnsupportedVersion(document.version));
    }
    document
        .observables
        .into_iter()
        .map(|(name, record)| {
            let observable = record.into_observable(&name)?;
            Ok((name, observable))
        })
        .collect()
}

pub fn write_archive(path: &Path, set: &ObservableSet) -> Result<(), ArchiveError> {
    fs::write(path, to_archive_string(set)?)?;
    Ok(())
}

pub fn read_archive(path: &Path) -> Result<ObservableSet, ArchiveError> {
    from_archive_str(&fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_set() -> ObservableSet {
        let mut set = ObservableSet::new();
        set.insert(
            "Ener_scalJ".to_string(),
            Observable::Scalar(ScalarObservable {
                sign: [0.98, 1e-4],
                obs: vec![[-1.25, 0.003], [4.5, 0.25]],
            }),
        );
        set.insert(
            "SpinZ_eqJK".to_string(),
            Observable::EqualTime(
                EqualTimeCorrelator::new(
                    Space::Momentum,
                    2,
                    vec![Vector2::new(0.0, 0.0)],
                    vec![
                        Vector4::new(1.0, 0.5, 0.0, 0.0),
                        Vector4::new(-0.5, 0.25, 0.0, 0.0),
                        Vector4::new(-0.5, 0.25, 0.0, 0.0),
                        Vector4::new(1.0, 0.5, 0.0, 0.0),
                    ],
                )
                .unwrap(),
            ),
        );
        set
    }

    #[test]
    fn archive_preserves_records_and_states_shapes() {
        let set = sample_set();
        let text = to_archive_string(&set).unwrap();

        assert!(text.contains("format = \"alfkit-observables\""));
        assert!(text.contains("n_obs = 2"));
        assert!(text.contains("n_x = 1"));
        assert!(text.contains("n_orb = 2"));
        assert!(text.contains("space = \"momentum\""));

        assert_eq!(from_archive_str(&text).unwrap(), set);
    }

    #[test]
    fn archive_file_helpers_use_the_same_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("observables.toml");
        let set = sample_set();

        write_archive(&path, &set).unwrap();
        assert_eq!(read_archive(&path).unwrap(), set);
    }

    #[test]
    fn mismatched_scalar_count_is_rejected() {
        let text = r#"
format = "alfkit-observables"
version = 1

[observables.Ener_scalJ]
kind = "scalar"
n_obs = 3
sign = [1.0, 0.0]
obs = [[1.0, 0.1]]
"#;
        match from_archive_str(text) {
            Err(ArchiveError::Shape { name, .. }) => assert_eq!(name, "Ener_scalJ"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn mismatched_orbital_count_is_rejected() {
        let text = r#"
format = "alfkit-observables"
version = 1

[observables.Green_eqJR]
kind = "equal-time"
space = "real"
n_x = 1
n_orb = 2
coordinates = [[0.0, 0.0]]
data = [[1.0, 0.0, 0.0, 0.0]]
"#;
        assert!(matches!(
            from_archive_str(text),
            Err(ArchiveError::Shape { .. })
        ));
    }

    #[test]
    fn overflowing_orbital_count_is_rejected() {
        let text = r#"
format = "alfkit-observables"
version = 1

[observables.SpinZ_eqJK]
kind = "equal-time"
space = "momentum"
n_x = 1
n_orb = 4294967296
coordinates = [[0.0, 0.0]]
data = []
"#;
        match from_archive_str(text) {
            Err(ArchiveError::Shape { name, .. }) => assert_eq!(name, "SpinZ_eqJK"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn mismatched_coordinate_count_is_rejected() {
        let text = r#"
format = "alfkit-observables"
version = 1

[observables.Green_eqJR]
kind = "equal-time"
space = "real"
n_x = 2
n_orb = 1
coordinates = [[0.0, 0.0]]
data = [[1.0, 0.0, 0.0, 0.0], [2.0, 0.0, 0.0, 0.0]]
"#;
        assert!(matches!(
            from_archive_str(text),
            Err(ArchiveError::Shape { .. })
        ));
    }

    #[test]
    fn foreign_documents_are_rejected() {
        assert!(matches!(
            from_archive_str("format = \"something-else\"\nversion = 1\n"),
            Err(ArchiveError::UnknownFormat(_))
        ));
        assert!(matches!(
            from_archive_str("format = \"alfkit-observables\"\nversion = 7\n"),
            Err(ArchiveError::UnsupportedVersion(7))
        ));
        assert!(matches!(
            from_archive_str("format = \"alfkit-observables\"\nversion = 1\nextra = true\n"),
            Err(ArchiveError::Decode(_))
        ));
    }
}
