use super::eqj::{EqualTimeCorrelator, EqualTimeFile, Space};
use super::error::ObservableError;
use super::scal::{ScalarFile, ScalarObservable};
use super::shape::ShapeMode;
use super::traits::ObservableFile;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// The result-file layouts recognised by their name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservableKind {
    Scalar,
    EqualTime(Space),
}

impl ObservableKind {
    /// Classifies a file name, returning `None` for files that are not
    /// analysed results.
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with("_scalJ") {
            Some(Self::Scalar)
        } else if name.ends_with("_eqJK") {
            Some(Self::EqualTime(Space::Momentum))
        } else if name.ends_with("_eqJR") {
            Some(Self::EqualTime(Space::Real))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Observable {
    Scalar(ScalarObservable),
    EqualTime(EqualTimeCorrelator),
}

impl Observable {
    pub fn kind(&self) -> ObservableKind {
        match self {
            Observable::Scalar(_) => ObservableKind::Scalar,
            Observable::EqualTime(eq) => ObservableKind::EqualTime(eq.space()),
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarObservable> {
        match self {
            Observable::Scalar(scal) => Some(scal),
            Observable::EqualTime(_) => None,
        }
    }

    pub fn as_equal_time(&self) -> Option<&EqualTimeCorrelator> {
        match self {
            Observable::EqualTime(eq) => Some(eq),
            Observable::Scalar(_) => None,
        }
    }
}

/// Analysed results of one simulation directory, keyed by file name.
pub type ObservableSet = BTreeMap<String, Observable>;

/// Parses a single result file according to its kind.
pub fn read_observable(
    path: &Path,
    kind: ObservableKind,
    mode: ShapeMode,
) -> Result<Observable, ObservableError> {
    let result = match kind {
        ObservableKind::Scalar => ScalarFile::new(mode)
            .read_from_path(path)
            .map(Observable::Scalar),
        ObservableKind::EqualTime(space) => EqualTimeFile::new(space, mode)
            .read_from_path(path)
            .map(Observable::EqualTime),
    };
    result.map_err(|source| ObservableError::File {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

/// Collects the analysed results in `sim_dir`.
///
/// With `names` given only those files are considered; otherwise every
/// directory entry is, in sorted order. Names without a recognised suffix
/// are skipped.
pub fn read_observables(
    sim_dir: &Path,
    names: Option<&[String]>,
    mode: ShapeMode,
) -> Result<ObservableSet, ObservableError> {
    let candidates: Vec<String> = match names {
        Some(names) => names.to_vec(),
        None => {
            let mut entries = fs::read_dir(sim_dir)?
                .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
                .collect::<Result<Vec<_>, _>>()?;
            entries.sort();
            entries
        }
    };

    let mut set = ObservableSet::new();
    for name in candidates {
        let Some(kind) = ObservableKind::from_file_name(&name) else {
            trace!("Skipping '{}', not an analysed result.", name);
            continue;
        };
        let path = sim_dir.join(&name);
        debug!("Reading {:?} observable from {}", kind, path.display());
        let observable = read_observable(&path, kind, mode)?;
        set.insert(name, observable);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Vector2, Vector4};
    use tempfile::tempdir;

    fn write_scalar(dir: &Path, name: &str) -> ScalarObservable {
        let record = ScalarObservable {
            sign: [1.0, 0.0],
            obs: vec![[-2.5, 0.01]],
        };
        ScalarFile::default()
            .write_to_path(&record, dir.join(name))
            .unwrap();
        record
    }

    fn write_eq(dir: &Path, name: &str, space: Space) -> EqualTimeCorrelator {
        let record = EqualTimeCorrelator::new(
            space,
            1,
            vec![Vector2::new(0.0, 0.0), Vector2::new(1.5, 0.0)],
            vec![Vector4::new(1.0, 0.1, 0.0, 0.0), Vector4::new(2.0, 0.2, 0.0, 0.0)],
        )
        .unwrap();
        EqualTimeFile::new(space, ShapeMode::Strict)
            .write_to_path(&record, dir.join(name))
            .unwrap();
        record
    }

    #[test]
    fn classifies_file_names_by_suffix() {
        assert_eq!(
            ObservableKind::from_file_name("Ener_scalJ"),
            Some(ObservableKind::Scalar)
        );
        assert_eq!(
            ObservableKind::from_file_name("SpinZ_eqJK"),
            Some(ObservableKind::EqualTime(Space::Momentum))
        );
        assert_eq!(
            ObservableKind::from_file_name("Green_eqJR"),
            Some(ObservableKind::EqualTime(Space::Real))
        );
        assert_eq!(ObservableKind::from_file_name("Ener_scal"), None);
        assert_eq!(ObservableKind::from_file_name("parameters"), None);
    }

    #[test]
    fn collects_every_result_in_directory() {
        let dir = tempdir().unwrap();
        let ener = write_scalar(dir.path(), "Ener_scalJ");
        let spin = write_eq(dir.path(), "SpinZ_eqJK", Space::Momentum);
        let green = write_eq(dir.path(), "Green_eqJR", Space::Real);
        fs::write(dir.path().join("parameters"), "&VAR_QMC\n/\n").unwrap();
        fs::write(dir.path().join("Ener_scal"), "raw bins").unwrap();

        let set = read_observables(dir.path(), None, ShapeMode::Strict).unwrap();

        assert_eq!(
            set.keys().collect::<Vec<_>>(),
            vec!["Ener_scalJ", "Green_eqJR", "SpinZ_eqJK"]
        );
        assert_eq!(set["Ener_scalJ"].as_scalar(), Some(&ener));
        assert_eq!(set["SpinZ_eqJK"].as_equal_time(), Some(&spin));
        assert_eq!(set["Green_eqJR"].as_equal_time(), Some(&green));
        assert_eq!(
            set["Green_eqJR"].kind(),
            ObservableKind::EqualTime(Space::Real)
        );
    }

    #[test]
    fn explicit_names_restrict_the_collection() {
        let dir = tempdir().unwrap();
        write_scalar(dir.path(), "Ener_scalJ");
        write_scalar(dir.path(), "Kin_scalJ");

        let names = vec!["Kin_scalJ".to_string(), "notes.txt".to_string()];
        let set = read_observables(dir.path(), Some(&names), ShapeMode::Strict).unwrap();
        assert_eq!(set.keys().collect::<Vec<_>>(), vec!["Kin_scalJ"]);
    }

    #[test]
    fn failures_name_the_offending_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Bad_scalJ"), "h1\nh2\nA 1.0 x\n\nsign 1 0\n").unwrap();

        let err = read_observables(dir.path(), None, ShapeMode::Strict).unwrap_err();
        match err {
            ObservableError::File { path, source } => {
                assert!(path.ends_with("Bad_scalJ"));
                assert!(matches!(*source, ObservableError::Parse { line: 3, .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_named_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let names = vec!["Ener_scalJ".to_string()];
        let err = read_observables(dir.path(), Some(&names), ShapeMode::Strict).unwrap_err();
        assert!(matches!(
            err,
            ObservableError::File { source, .. } if matches!(*source, ObservableError::Io(_))
        ));
    }
}
