mod cli;

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use drummap_core::{Converter, Error, Mapping};

use cli::Args;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_logging(args: &Args) {
    env_logger::Builder::new()
        .filter_level(args.log_level.into())
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        })
        .init();
}

fn run(args: &Args) -> Result<()> {
    // Checked ahead of loading the drum map so a bad path fails first
    if !args.infile.is_file() {
        return Err(Error::FileNotFound(args.infile.clone()).into());
    }

    let mapping = match &args.drum_map {
        Some(path) => Mapping::from_path(path)?,
        None => Mapping::bundled(),
    };
    log::debug!("Drum map has {} entries", mapping.len());

    let config = args.config();
    let report = Converter::new(&mapping, &config)
        .convert(&args.infile, &args.outfile)
        .with_context(|| format!("Failed to convert {}", args.infile.display()))?;
    log::info!("{}", report);

    if args.report_json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
    }

    Ok(())
}

/// 2 for bad input the user can fix, 1 for everything else
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<Error>() {
        Some(e) if e.is_validation() => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes() {
        let missing = anyhow::Error::from(Error::FileNotFound(PathBuf::from("x.mid")));
        assert_eq!(exit_code(&missing), 2);

        let no_map = anyhow::Error::from(Error::ResourceNotFound(PathBuf::from("map.csv")))
            .context("while loading");
        assert_eq!(exit_code(&no_map), 2);

        let broken = anyhow::Error::from(Error::conversion(
            "Failed to parse MIDI file",
            std::io::Error::new(std::io::ErrorKind::InvalidData, "bad header"),
        ));
        assert_eq!(exit_code(&broken), 1);

        assert_eq!(exit_code(&anyhow::anyhow!("something else")), 1);
    }

    #[test]
    fn test_missing_input_checked_before_map() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::try_parse_from([
            "drummap",
            dir.path().join("missing.mid").to_str().unwrap(),
            dir.path().join("out.mid").to_str().unwrap(),
            "--drum-map",
            dir.path().join("missing.csv").to_str().unwrap(),
        ])
        .unwrap();

        let err = run(&args).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::FileNotFound(_))));
        assert_eq!(exit_code(&err), 2);
    }
}
