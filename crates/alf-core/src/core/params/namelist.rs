use super::ParamError;
use super::defaults::{GENERIC_NAMELISTS, NamelistSpec, model_namelists};
use super::value::{Overrides, ParamValue};
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Name of the file the simulation reads its namelists from.
pub const PARAMETERS_FILE: &str = "parameters";

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: Cow<'static, str>,
    pub value: ParamValue,
    pub comment: Cow<'static, str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Namelist {
    pub name: Cow<'static, str>,
    pub variables: Vec<Variable>,
}

impl From<&NamelistSpec> for Namelist {
    fn from(spec: &NamelistSpec) -> Self {
        Self {
            name: Cow::Borrowed(spec.name),
            variables: spec
                .params
                .iter()
                .map(|p| Variable {
                    name: Cow::Borrowed(p.name),
                    value: p.default.clone(),
                    comment: Cow::Borrowed(p.comment),
                })
                .collect(),
        }
    }
}

/// The complete, ordered set of namelists for one simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    namelists: Vec<Namelist>,
}

impl ParameterSet {
    /// Default parameters of a Hamiltonian: its model namelists followed by
    /// the generic ones.
    pub fn defaults(ham_name: &str) -> Result<Self, ParamError> {
        let namelists = model_namelists(ham_name)?
            .iter()
            .chain(GENERIC_NAMELISTS.iter())
            .map(|spec| Namelist::from(*spec))
            .collect();
        Ok(Self { namelists })
    }

    /// Defaults plus the `VAR_ham_name` namelist, with every override applied.
    pub fn for_simulation(ham_name: &str, overrides: &Overrides) -> Result<Self, ParamError> {
        let mut set = Self::defaults(ham_name)?;
        set.namelists.push(Namelist {
            name: Cow::Borrowed("VAR_ham_name"),
            variables: vec![Variable {
                name: Cow::Borrowed("ham_name"),
                value: ParamValue::from(ham_name),
                comment: Cow::Borrowed("Name of Hamiltonian"),
            }],
        });
        for (name, value) in overrides.iter() {
            set.update(name, value.clone())?;
        }
        Ok(set)
    }

    /// Replaces the value of the first variable whose name matches
    /// case-insensitively, scanning namelists in order.
    pub fn update(&mut self, name: &str, value: ParamValue) -> Result<(), ParamError> {
        let variable = self
            .namelists
            .iter_mut()
            .flat_map(|nl| nl.variables.iter_mut())
            .find(|var| var.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ParamError::UnknownParameter(name.to_string()))?;
        variable.value = value;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.namelists
            .iter()
            .flat_map(|nl| nl.variables.iter())
            .find(|var| var.name.eq_ignore_ascii_case(name))
            .map(|var| &var.value)
    }

    pub fn namelists(&self) -> &[Namelist] {
        &self.namelists
    }

    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        for namelist in &self.namelists {
            writeln!(writer, "&{}", namelist.name)?;
            for var in &namelist.variables {
                writeln!(
                    writer,
                    "{} = {}  ! {}",
                    var.name,
                    var.value.to_namelist(),
                    var.comment
                )?;
            }
            writeln!(writer, "/\n")?;
        }
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(set: &ParameterSet) -> String {
        let mut buf = Vec::new();
        set.write_to(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn defaults_put_model_namelists_before_generic_ones() {
        let set = ParameterSet::defaults("Hubbard").unwrap();
        let names: Vec<_> = set.namelists().iter().map(|nl| nl.name.as_ref()).collect();
        assert_eq!(
            names,
            vec![
                "VAR_Lattice",
                "VAR_Model_Generic",
                "VAR_Hubbard",
                "VAR_QMC",
                "VAR_errors",
                "VAR_TEMP",
                "VAR_Max_Stoch",
            ]
        );
    }

    #[test]
    fn for_simulation_appends_ham_name_and_applies_overrides() {
        let overrides: Overrides = [
            ("ham_u", ParamValue::Float(8.0)),
            ("NBIN", ParamValue::Int(20)),
            ("lattice_type", ParamValue::from("N_leg_ladder")),
        ]
        .into_iter()
        .collect();

        let set = ParameterSet::for_simulation("Hubbard", &overrides).unwrap();

        assert_eq!(set.namelists().last().unwrap().name, "VAR_ham_name");
        assert_eq!(set.get("ham_name"), Some(&ParamValue::from("Hubbard")));
        assert_eq!(set.get("Ham_U"), Some(&ParamValue::Float(8.0)));
        assert_eq!(set.get("Nbin"), Some(&ParamValue::Int(20)));
        assert_eq!(set.get("NBins"), Some(&ParamValue::Int(250)));
        assert_eq!(set.get("Lattice_type"), Some(&ParamValue::from("N_leg_ladder")));
    }

    #[test]
    fn unknown_override_is_an_error() {
        let overrides: Overrides = [("ham_JK", ParamValue::Float(1.0))].into_iter().collect();
        assert_eq!(
            ParameterSet::for_simulation("Hubbard", &overrides),
            Err(ParamError::UnknownParameter("ham_JK".to_string()))
        );
    }

    #[test]
    fn write_to_produces_fortran_namelists() {
        let overrides: Overrides = [("L1", ParamValue::Int(4))].into_iter().collect();
        let set = ParameterSet::for_simulation("Hubbard_Plain_Vanilla", &overrides).unwrap();
        let text = render(&set);

        assert!(text.starts_with(
            "&VAR_Lattice\nL1 = 4  ! \nL2 = 6  ! \nLattice_type = \"Square\"  ! \nModel = \"Hubbard\"  ! \n/\n\n"
        ));
        assert!(text.contains("&VAR_Hubbard_Plain_Vanilla\nham_T = 1.0d0  ! \n"));
        assert!(text.contains("Projector = .F.  ! \n"));
        assert!(text.contains("Nt_sequential_end = -1  ! \n"));
        assert!(text.contains("Om_st = -10.0d0  ! Frequency range lower bound.\n"));
        assert!(text.ends_with("&VAR_ham_name\nham_name = \"Hubbard_Plain_Vanilla\"  ! Name of Hamiltonian\n/\n\n"));
    }

    #[test]
    fn write_to_path_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PARAMETERS_FILE);
        let set = ParameterSet::defaults("tV").unwrap();

        set.write_to_path(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, render(&set));
        assert!(content.contains("&VAR_tV\n"));
    }
}
