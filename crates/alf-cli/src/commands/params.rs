use crate::cli::{ParamsArgs, ParamsCommands};
use crate::config::overrides_from_set_values;
use crate::error::{CliError, Result};
use alfkit::core::params::ParamError;
use alfkit::core::params::defaults::{hamiltonians, model_namelists};
use alfkit::core::params::namelist::ParameterSet;
use alfkit::core::params::naming::directory_name;
use std::io::Write;
use tracing::info;

pub async fn run(args: ParamsArgs) -> Result<()> {
    match args.command {
        ParamsCommands::Show { ham, generic } => {
            show(&ham, generic, &mut std::io::stdout().lock())?;
        }
        ParamsCommands::Write {
            ham,
            set_values,
            output,
        } => {
            let params = parameters(&ham, &set_values)?;
            match output {
                Some(path) => {
                    params.write_to_path(&path)?;
                    info!("Wrote parameters for {} to {:?}", ham, &path);
                    println!("Parameters written to: {}", path.display());
                }
                None => params.write_to(&mut std::io::stdout().lock())?,
            }
        }
        ParamsCommands::Dirname {
            ham,
            set_values,
            tempering,
        } => {
            println!("{}", dirname(&ham, &set_values, tempering)?);
        }
    }
    Ok(())
}

/// Lists the parameters of `ham` grouped by namelist, with their defaults.
fn show(ham: &str, generic: bool, out: &mut impl Write) -> Result<()> {
    let defaults = ParameterSet::defaults(ham).map_err(with_hint)?;
    let shown = if generic {
        defaults.namelists().len()
    } else {
        model_namelists(ham)?.len()
    };

    for namelist in defaults.namelists().iter().take(shown) {
        writeln!(out, "[{}]", namelist.name)?;
        for var in &namelist.variables {
            if var.comment.is_empty() {
                writeln!(out, "  {} = {}", var.name, var.value.to_namelist())?;
            } else {
                writeln!(
                    out,
                    "  {} = {}  ({})",
                    var.name,
                    var.value.to_namelist(),
                    var.comment
                )?;
            }
        }
    }
    Ok(())
}

fn parameters(ham: &str, set_values: &[String]) -> Result<ParameterSet> {
    let overrides = overrides_from_set_values(set_values)?;
    ParameterSet::for_simulation(ham, &overrides).map_err(with_hint)
}

fn dirname(ham: &str, set_values: &[String], tempering: bool) -> Result<String> {
    let overrides = overrides_from_set_values(set_values)?;
    ParameterSet::for_simulation(ham, &overrides).map_err(with_hint)?;
    Ok(directory_name(ham, &overrides, tempering)?)
}

/// Names the supported Hamiltonians when an unknown one was asked for.
fn with_hint(e: ParamError) -> CliError {
    match e {
        ParamError::UnknownHamiltonian(name) => CliError::Argument(format!(
            "Unknown Hamiltonian '{}'. Known: {}",
            name,
            hamiltonians().join(", ")
        )),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alfkit::engine::error::EngineError;

    fn set(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn show_text(ham: &str, generic: bool) -> Result<String> {
        let mut out = Vec::new();
        show(ham, generic, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn show_lists_model_groups_only_by_default() {
        let text = show_text("Hubbard", false).unwrap();
        assert!(text.starts_with("[VAR_Lattice]\n  L1 = 6\n"));
        assert!(text.contains("[VAR_Hubbard]"));
        assert!(!text.contains("[VAR_QMC]"));

        let all = show_text("Hubbard", true).unwrap();
        assert!(all.contains("[VAR_QMC]"));
        assert!(all.contains("  Nsweep = 100  (Number of sweeps per bin.)"));
    }

    #[test]
    fn show_reports_write_failures() {
        let err = show("Hubbard", false, &mut ClosedPipe).unwrap_err();
        assert!(matches!(err, CliError::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn write_renders_overrides() {
        let params = parameters("Hubbard", &set(&["L1=4", "ham_u=2.5"])).unwrap();
        let mut out = Vec::new();
        params.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("L1 = 4  ! \n"));
        assert!(text.contains("ham_U = 2.5d0  ! \n"));
        assert!(text.ends_with("&VAR_ham_name\nham_name = \"Hubbard\"  ! Name of Hamiltonian\n/\n\n"));
    }

    #[test]
    fn dirname_follows_override_order() {
        assert_eq!(
            dirname("Hubbard", &set(&["L1=4", "Ham_U=4.0", "Nsweep=10"]), false).unwrap(),
            "Hubbard_L1=4_U=4.0"
        );
        assert_eq!(
            dirname("Kondo", &set(&[]), true).unwrap(),
            "temper_Kondo"
        );
    }

    #[test]
    fn unknown_hamiltonian_lists_the_known_ones() {
        match show_text("Heisenberg", false).unwrap_err() {
            CliError::Argument(msg) => assert!(msg.contains("Hubbard, Hubbard_Plain_Vanilla")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let err = dirname("Hubbard", &set(&["bogus=1"]), false).unwrap_err();
        assert!(matches!(
            err,
            CliError::Engine(EngineError::Param(ParamError::UnknownParameter(_)))
        ));
    }
}
