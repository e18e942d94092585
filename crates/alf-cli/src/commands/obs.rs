use crate::cli::{ObsArgs, OutputFormat};
use crate::error::Result;
use alfkit::core::io::archive::to_archive_string;
use alfkit::core::io::export::write_csv;
use alfkit::core::io::results::{Observable, ObservableSet, read_observables};
use alfkit::core::io::shape::ShapeMode;
use std::fs::File;
use std::io::{self, Write};
use tracing::info;

pub async fn run(args: ObsArgs) -> Result<()> {
    let mode = if args.legacy {
        ShapeMode::Legacy
    } else {
        ShapeMode::Strict
    };
    let names = (!args.names.is_empty()).then_some(args.names.as_slice());

    info!("Reading observables from {:?}", &args.dir);
    let observables = read_observables(&args.dir, names, mode)?;
    info!("Decoded {} observable(s).", observables.len());

    match &args.output {
        Some(path) => {
            let file = File::create(path)?;
            write_observables(&observables, args.format, file)?;
            println!(
                "Wrote {} observable(s) to {}",
                observables.len(),
                path.display()
            );
        }
        None => write_observables(&observables, args.format, io::stdout().lock())?,
    }
    Ok(())
}

pub fn write_observables<W: Write>(
    set: &ObservableSet,
    format: OutputFormat,
    mut writer: W,
) -> Result<()> {
    match format {
        OutputFormat::Table => write_table(set, &mut writer)?,
        OutputFormat::Csv => write_csv(set, writer).map_err(anyhow::Error::from)?,
        OutputFormat::Toml => writer.write_all(to_archive_string(set)?.as_bytes())?,
    }
    Ok(())
}

/// Human readable summary: means and errors of scalars, dimensions of
/// correlators.
pub fn write_table<W: Write>(set: &ObservableSet, writer: &mut W) -> io::Result<()> {
    if set.is_empty() {
        return writeln!(writer, "No analysed observables found.");
    }
    for (name, observable) in set {
        match observable {
            Observable::Scalar(scal) => {
                writeln!(
                    writer,
                    "{name}  sign = {:.6e} +/- {:.6e}",
                    scal.sign[0], scal.sign[1]
                )?;
                for (i, [mean, error]) in scal.obs.iter().enumerate() {
                    writeln!(writer, "  [{}] {:>15.8e} +/- {:.6e}", i + 1, mean, error)?;
                }
            }
            Observable::EqualTime(eq) => {
                writeln!(
                    writer,
                    "{name}  {} points, {} orbital(s)",
                    eq.n_x(),
                    eq.n_orb()
                )?;
            }
        }
    }
    Ok(())
}
