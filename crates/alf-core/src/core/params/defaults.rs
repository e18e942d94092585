//! Default values for every namelist the simulation reads.
//!
//! The generic groups apply to every Hamiltonian; the model groups are
//! attached per Hamiltonian through [`HAMILTONIANS`].

use super::ParamError;
use super::value::ParamValue;
use phf::{Map, phf_map};

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: ParamValue,
    pub comment: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamelistSpec {
    pub name: &'static str,
    pub params: &'static [ParamSpec],
}

const fn p(name: &'static str, default: ParamValue, comment: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        default,
        comment,
    }
}

const fn b(v: bool) -> ParamValue {
    ParamValue::Bool(v)
}

const fn i(v: i64) -> ParamValue {
    ParamValue::Int(v)
}

const fn f(v: f64) -> ParamValue {
    ParamValue::Float(v)
}

const fn s(v: &'static str) -> ParamValue {
    ParamValue::str(v)
}

pub static VAR_QMC: NamelistSpec = NamelistSpec {
    name: "VAR_QMC",
    params: &[
        p("Nwrap", i(10), "Stabilization. Green functions will be computed from scratch after each time interval Nwrap*Dtau."),
        p("Nsweep", i(100), "Number of sweeps per bin."),
        p("Nbin", i(5), "Number of bins."),
        p("Ltau", i(1), "1 to calculate time-displaced Green functions; 0 otherwise."),
        p("LOBS_ST", i(0), "Start measurements at time slice LOBS_ST"),
        p("LOBS_EN", i(0), "End measurements at time slice LOBS_EN"),
        p("CPU_MAX", f(0.0), "Code stops after CPU_MAX hours, if 0 or not specified, the code stops after Nbin bins"),
        p("Propose_S0", b(false), "Proposes single spin flip moves with probability exp(-S0)."),
        p("Global_moves", b(false), "Allows for global moves in space and time."),
        p("N_global", i(1), "Number of global moves per sweep."),
        p("Global_tau_moves", b(false), "Allows for global moves on a single time slice."),
        p("N_global_tau", i(1), "Number of global moves that will be carried out on a single time slice."),
        p("Nt_sequential_start", i(0), ""),
        p("Nt_sequential_end", i(-1), ""),
        p("Langevin", b(false), "Langevin update"),
        p("Delta_t_Langevin_HMC", f(0.01), "Time step for Langevin or HMC"),
        p("Max_Force", f(1.5), "Max Force for Langevin"),
        p("HMC", b(false), "HMC update"),
        p("Leapfrog_steps", i(0), "Number of leapfrog steps"),
    ],
};

pub static VAR_ERRORS: NamelistSpec = NamelistSpec {
    name: "VAR_errors",
    params: &[
        p("N_skip", i(1), "Number of bins to be skipped."),
        p("N_rebin", i(1), "Rebinning: Number of bins to combine into one."),
        p("N_Cov", i(0), "If set to 1, covariance computed for time-displaced correlation functions."),
        p("N_Back", i(1), "If set to 1, substract background in correlation functions."),
        p("N_auto", i(0), "If > 0, calculate autocorrelation."),
    ],
};

pub static VAR_TEMP: NamelistSpec = NamelistSpec {
    name: "VAR_TEMP",
    params: &[
        p("N_exchange_steps", i(6), "Number of exchange moves."),
        p("N_Tempering_frequency", i(10), "The frequency, in units of sweeps, at which the exchange moves are carried out."),
        p("mpi_per_parameter_set", i(2), "Number of mpi-processes per parameter set."),
        p("Tempering_calc_det", b(true), "Specifies whether the fermion weight has to be taken into account while tempering. Can be set to .F. if the parameters that get varied only enter the Ising action S_0"),
    ],
};

pub static VAR_MAX_STOCH: NamelistSpec = NamelistSpec {
    name: "VAR_Max_Stoch",
    params: &[
        p("Ngamma", i(400), "Number of Dirac delta-functions for parametrization."),
        p("Om_st", f(-10.0), "Frequency range lower bound."),
        p("Om_en", f(10.0), "Frequency range upper bound."),
        p("Ndis", i(2000), "Number of boxes for histogram."),
        p("NBins", i(250), "Number of bins for Monte Carlo."),
        p("NSweeps", i(70), "Number of sweeps per bin."),
        p("Nwarm", i(20), "The Nwarm first bins will be ommitted."),
        p("N_alpha", i(14), "Number of temperatures."),
        p("alpha_st", f(1.0), ""),
        p("R", f(1.2), ""),
        p("Checkpoint", b(false), ""),
        p("Tolerance", f(0.1), ""),
    ],
};

pub static VAR_LATTICE: NamelistSpec = NamelistSpec {
    name: "VAR_Lattice",
    params: &[
        p("L1", i(6), ""),
        p("L2", i(6), ""),
        p("Lattice_type", s("Square"), ""),
        p("Model", s("Hubbard"), ""),
    ],
};

pub static VAR_MODEL_GENERIC: NamelistSpec = NamelistSpec {
    name: "VAR_Model_Generic",
    params: &[
        p("Checkerboard", b(true), ""),
        p("Symm", b(true), ""),
        p("N_SUN", i(2), ""),
        p("N_FL", i(1), ""),
        p("Phi_X", f(0.0), ""),
        p("Phi_Y", f(0.0), ""),
        p("Bulk", b(true), ""),
        p("N_Phi", i(0), ""),
        p("Dtau", f(0.1), ""),
        p("Beta", f(5.0), ""),
        p("Projector", b(false), ""),
        p("Theta", f(10.0), ""),
    ],
};

pub static VAR_HUBBARD: NamelistSpec = NamelistSpec {
    name: "VAR_Hubbard",
    params: &[
        p("Mz", b(true), ""),
        p("ham_T", f(1.0), ""),
        p("ham_chem", f(0.0), ""),
        p("ham_U", f(4.0), ""),
        p("ham_T2", f(1.0), ""),
        p("ham_U2", f(4.0), ""),
        p("ham_Tperp", f(1.0), ""),
        p("Continuous", b(false), "Continuous HS transformation"),
    ],
};

pub static VAR_TV: NamelistSpec = NamelistSpec {
    name: "VAR_tV",
    params: &[
        p("ham_T", f(1.0), ""),
        p("ham_chem", f(0.0), ""),
        p("ham_V", f(0.5), ""),
        p("ham_T2", f(1.0), ""),
        p("ham_V2", f(0.5), ""),
        p("ham_Tperp", f(1.0), ""),
        p("ham_Vperp", f(0.5), ""),
    ],
};

pub static VAR_HUBBARD_PLAIN_VANILLA: NamelistSpec = NamelistSpec {
    name: "VAR_Hubbard_Plain_Vanilla",
    params: &[
        p("ham_T", f(1.0), ""),
        p("ham_chem", f(0.0), ""),
        p("ham_U", f(4.0), ""),
        p("Dtau", f(0.1), ""),
        p("Beta", f(5.0), ""),
        p("Projector", b(false), ""),
        p("Theta", f(10.0), ""),
        p("Symm", b(true), ""),
    ],
};

pub static VAR_KONDO: NamelistSpec = NamelistSpec {
    name: "VAR_Kondo",
    params: &[
        p("ham_T", f(1.0), ""),
        p("ham_chem", f(0.0), ""),
        p("ham_Uc", f(0.0), ""),
        p("ham_Uf", f(2.0), ""),
        p("ham_JK", f(2.0), ""),
    ],
};

pub static VAR_LRC: NamelistSpec = NamelistSpec {
    name: "VAR_LRC",
    params: &[
        p("ham_T", f(1.0), ""),
        p("ham_T2", f(1.0), ""),
        p("ham_Tperp", f(1.0), ""),
        p("ham_chem", f(0.0), ""),
        p("ham_U", f(4.0), ""),
        p("ham_alpha", f(0.1), ""),
        p("Percent_change", f(0.1), ""),
    ],
};

pub static VAR_Z2_MATTER: NamelistSpec = NamelistSpec {
    name: "VAR_Z2_Matter",
    params: &[
        p("ham_T", f(1.0), "Hopping for fermions"),
        p("ham_TZ2", f(1.0), "Hopping for orthogonal fermions"),
        p("ham_chem", f(0.0), "Chemical potential for fermions"),
        p("ham_U", f(0.0), "Hubbard for fermions"),
        p("Ham_J", f(1.0), "Hopping Z2 matter fields"),
        p("Ham_K", f(1.0), "Plaquette term for gauge fields"),
        p("Ham_h", f(1.0), "sigma^x-term for matter"),
        p("Ham_g", f(1.0), "tau^x-term for gauge"),
        p("Dtau", f(0.1), ""),
        p("Beta", f(10.0), ""),
        p("N_SUN", i(2), ""),
        p("Projector", b(false), ""),
        p("Theta", f(10.0), ""),
    ],
};

/// Namelists that every Hamiltonian reads, in file order.
pub static GENERIC_NAMELISTS: &[&NamelistSpec] = &[&VAR_QMC, &VAR_ERRORS, &VAR_TEMP, &VAR_MAX_STOCH];

/// Model namelists read by each supported Hamiltonian, in file order.
pub static HAMILTONIANS: Map<&'static str, &'static [&'static NamelistSpec]> = phf_map! {
    "Hubbard" => &[&VAR_LATTICE, &VAR_MODEL_GENERIC, &VAR_HUBBARD],
    "Hubbard_Plain_Vanilla" => &[&VAR_LATTICE, &VAR_HUBBARD_PLAIN_VANILLA],
    "Kondo" => &[&VAR_LATTICE, &VAR_MODEL_GENERIC, &VAR_KONDO],
    "tV" => &[&VAR_LATTICE, &VAR_MODEL_GENERIC, &VAR_TV],
    "LRC" => &[&VAR_LATTICE, &VAR_MODEL_GENERIC, &VAR_LRC],
    "Z2_Matter" => &[&VAR_LATTICE, &VAR_Z2_MATTER],
};

pub fn model_namelists(ham_name: &str) -> Result<&'static [&'static NamelistSpec], ParamError> {
    HAMILTONIANS
        .get(ham_name)
        .copied()
        .ok_or_else(|| ParamError::UnknownHamiltonian(ham_name.to_string()))
}

/// Names of all supported Hamiltonians, sorted.
pub fn hamiltonians() -> Vec<&'static str> {
    let mut names: Vec<_> = HAMILTONIANS.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Upper-cased names of every parameter the Hamiltonian accepts.
///
/// Generic parameters are only included when `include_generic` is set; the
/// model-only list is what decides which overrides show up in a directory name.
pub fn params_list(ham_name: &str, include_generic: bool) -> Result<Vec<String>, ParamError> {
    let mut names: Vec<String> = model_namelists(ham_name)?
        .iter()
        .flat_map(|nl| nl.params.iter())
        .map(|spec| spec.name.to_uppercase())
        .collect();
    if include_generic {
        names.extend(
            GENERIC_NAMELISTS
                .iter()
                .flat_map(|nl| nl.params.iter())
                .map(|spec| spec.name.to_uppercase()),
        );
    }
    Ok(names)
}
