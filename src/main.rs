mod cli;
mod error;
mod report;

use crate::cli::Args;
use crate::error::{ErrorKind, Result};
use crate::report::Summary;
use bidsify_config::Config;
use bidsify_identity::SubjectMappingTable;
use bidsify_library::organize::organize;
use bidsify_library::{Context, DEFAULT_TEMPLATE, PathGenerator};
use bidsify_storage::BackendHandle;
use bidsify_storage::backend::{LocalBackend, ReadOnlyBackend};
use clap::Parser;
use exn::ResultExt;
use futures::StreamExt;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_directive())))
        .with(fmt::layer())
        .init();

    match run(args).await {
        Ok(summary) => {
            tracing::info!(
                subjects = summary.subjects,
                fallbacks = summary.fallbacks,
                copied = summary.copied,
                unchanged = summary.unchanged,
                unmatched = summary.unmatched,
                skipped = summary.skipped,
                failed = summary.failed,
                "Organizing complete"
            );
            ExitCode::SUCCESS
        },
        Err(e) => {
            tracing::error!("{e:?}");
            ExitCode::FAILURE
        },
    }
}

/// Compiles the configured destination template, or the BIDS default.
fn path_generator(template: Option<&str>) -> Result<PathGenerator> {
    template.unwrap_or(DEFAULT_TEMPLATE).parse::<PathGenerator>().or_raise(|| ErrorKind::Template)
}

async fn run(args: Args) -> Result<Summary> {
    let config = Config::load(args.config.as_deref(), args.overrides()).or_raise(|| ErrorKind::Config)?;
    let mapping = SubjectMappingTable::from_path(&config.mapping, &config.accession_column)
        .or_raise(|| ErrorKind::Mapping)?;
    let template = path_generator(config.template.as_deref())?;

    let source_root = std::path::absolute(&config.source).or_raise(|| ErrorKind::Source)?;
    let output_root = std::path::absolute(&config.output).or_raise(|| ErrorKind::Output)?;
    let source: BackendHandle =
        Arc::new(LocalBackend::open("source", &source_root).or_raise(|| ErrorKind::Source)?);
    let destination: BackendHandle = match args.dry_run {
        true => {
            let output = LocalBackend::unchecked("output", &output_root).or_raise(|| ErrorKind::Output)?;
            Arc::new(ReadOnlyBackend::new(Arc::new(output)))
        },
        false => Arc::new(LocalBackend::new("output", &output_root).or_raise(|| ErrorKind::Output)?),
    };
    tracing::info!(
        source = %source_root.display(),
        output = %output_root.display(),
        session = %config.session,
        dry_run = args.dry_run,
        "Organizing into BIDS layout"
    );

    let ctx = Context::new(mapping, config.session, template);
    let mut summary = Summary::default();
    let mut events = std::pin::pin!(organize(&source, &destination, &ctx));
    while let Some(event) = events.next().await {
        summary.record(event);
    }
    if !summary.complete {
        exn::bail!(ErrorKind::Aborted);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bidsify_classify::Category;
    use bidsify_library::Destination;
    use rstest::rstest;

    #[rstest]
    #[case(None, "sub-RID0042/ses-research/anat/sub-RID0042_ses-research_T1w.nii.gz")]
    #[case(Some("{{ subject }}/{{ category }}/{{ suffix }}"), "sub-RID0042/anat/T1w.nii.gz")]
    fn test_path_generator_uses_configured_template(#[case] template: Option<&str>, #[case] expected: &str) {
        let generator = path_generator(template).unwrap();
        let destination = Destination {
            subject: "sub-RID0042",
            session: "research",
            category: Category::Anat,
            suffix: "T1w",
        };
        assert_eq!(generator.generate_with_ext(&destination, "nii.gz").unwrap(), expected);
    }

    #[test]
    fn test_path_generator_rejects_unknown_variable() {
        let err = path_generator(Some("{{ subject }}/{{ modality }}")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Template));
    }
}
