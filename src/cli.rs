//! Command line arguments.

use bidsify_config::Overrides;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Organize per-subject NIfTI scans into a BIDS directory layout.
///
/// Settings come from the config file, `BIDSIFY_*` environment variables and
/// these flags, in increasing order of priority.
#[derive(Debug, Parser)]
#[command(name = "bidsify", version, about)]
pub struct Args {
    /// Config file (TOML, YAML or JSON); defaults to `bidsify/config.toml`
    /// in the platform config directory when present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// CSV lookup table mapping accessions to record ids.
    #[arg(long, value_name = "CSV")]
    pub mapping: Option<PathBuf>,
    /// Root of the per-subject NIfTI tree.
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,
    /// Root of the BIDS tree to write.
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,
    /// Session label, rendered as `ses-<LABEL>`.
    #[arg(long, value_name = "LABEL")]
    pub session: Option<String>,
    /// Lookup table column holding the accession.
    #[arg(long, value_name = "NAME")]
    pub accession_column: Option<String>,
    /// Destination path template (upon syntax).
    #[arg(long, value_name = "TEMPLATE")]
    pub template: Option<String>,
    /// Classify and report without writing anything.
    #[arg(long)]
    pub dry_run: bool,
    /// More logging; repeat for trace output.
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,
    /// Only log warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,
}
impl Args {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            mapping: self.mapping.clone(),
            source: self.source.clone(),
            output: self.output.clone(),
            session: self.session.clone(),
            accession_column: self.accession_column.clone(),
            template: self.template.clone(),
        }
    }

    /// Default filter directive, used when `RUST_LOG` is unset.
    pub fn log_directive(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "bidsify=warn",
            (false, 0) => "bidsify=info",
            (false, 1) => "bidsify=debug",
            (false, _) => "bidsify=trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[rstest]
    #[case(&[], "bidsify=info")]
    #[case(&["-v"], "bidsify=debug")]
    #[case(&["-vv"], "bidsify=trace")]
    #[case(&["-vvv"], "bidsify=trace")]
    #[case(&["-q"], "bidsify=warn")]
    fn test_log_directive(#[case] flags: &[&str], #[case] expected: &str) {
        let args = Args::try_parse_from(["bidsify"].iter().chain(flags)).unwrap();
        assert_eq!(args.log_directive(), expected);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Args::try_parse_from(["bidsify", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_overrides_only_carry_given_flags() {
        let args =
            Args::try_parse_from(["bidsify", "--source", "/data/nifti", "--session", "baseline", "--dry-run"]).unwrap();
        let overrides = args.overrides();
        assert_eq!(overrides.source, Some(PathBuf::from("/data/nifti")));
        assert_eq!(overrides.session.as_deref(), Some("baseline"));
        assert!(overrides.mapping.is_none());
        assert!(overrides.output.is_none());
        assert!(args.dry_run);
    }
}
