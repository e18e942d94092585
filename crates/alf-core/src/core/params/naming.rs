use super::ParamError;
use super::defaults::params_list;
use super::value::Overrides;

/// Builds the simulation directory name from a set of overrides.
///
/// Only model parameters contribute; generic Monte Carlo settings such as
/// `Nsweep` never show up in the name. A `Ham_` prefix is dropped from the
/// parameter name, `Lattice_type` contributes its bare value and `Model` only
/// contributes when it differs from the Hamiltonian name.
pub fn directory_name(
    ham_name: &str,
    overrides: &Overrides,
    tempering: bool,
) -> Result<String, ParamError> {
    let model_params = params_list(ham_name, false)?;

    let mut dirname = if tempering {
        format!("temper_{}_", ham_name)
    } else {
        format!("{}_", ham_name)
    };

    for (name, value) in overrides.iter() {
        let upper = name.to_uppercase();
        if !model_params.contains(&upper) {
            continue;
        }
        match upper.as_str() {
            "MODEL" => {
                if value.as_str() != Some(ham_name) {
                    dirname.push_str(&format!("{}_", value));
                }
            }
            "LATTICE_TYPE" => dirname.push_str(&format!("{}_", value)),
            _ => {
                let short = match name.get(..4) {
                    Some(prefix) if prefix.eq_ignore_ascii_case("HAM_") => &name[4..],
                    _ => name,
                };
                dirname.push_str(&format!("{}={}_", short, value));
            }
        }
    }

    dirname.pop();
    Ok(dirname)
}
