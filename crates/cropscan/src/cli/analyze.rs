//! The `cropscan analyze` command.

use clap::Args;
use cropscan_core::{Analyzer, Assessment, Config, ImageFile, ProductLabel};
use std::path::PathBuf;
use std::time::Duration;

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Photo of the product to assess
    #[arg(required = true)]
    pub image: String,

    /// Product shown in the photo (see `cropscan crops`)
    #[arg(short, long)]
    pub crop: String,

    /// MIME type to send instead of the one inferred from the extension
    #[arg(long)]
    pub mime_type: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Wrap the result with its provenance (remote, simulated or failed)
    #[arg(long)]
    pub provenance: bool,
}

/// Execute the analyze command.
pub async fn execute(args: AnalyzeArgs, config: &Config) -> anyhow::Result<()> {
    let label = ProductLabel::new(&args.crop)?;
    let mut image = ImageFile::new(expand_path(&args.image));
    if let Some(mime_type) = args.mime_type {
        image = image.with_mime_type(mime_type);
    }

    let analyzer = Analyzer::from_config(config);
    let assessment = run_with_spinner(&analyzer, &label, &image).await;

    let json = render(&assessment, args.provenance, args.pretty)?;
    println!("{json}");
    Ok(())
}

/// Expand `~` in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

/// Run one assessment while a spinner shows on stderr.
pub async fn run_with_spinner(
    analyzer: &Analyzer,
    label: &ProductLabel,
    image: &ImageFile,
) -> Assessment {
    let spinner = create_spinner(label);
    let assessment = analyzer.assess(label, image).await;
    spinner.finish_and_clear();
    assessment
}

/// Serialize either the bare result or the provenance-tagged assessment.
pub fn render(
    assessment: &Assessment,
    with_provenance: bool,
    pretty: bool,
) -> anyhow::Result<String> {
    let value = if with_provenance {
        serde_json::to_value(assessment)?
    } else {
        serde_json::to_value(&assessment.result)?
    };
    let json = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(json)
}

/// Create the "Analyzing..." spinner.
fn create_spinner(label: &ProductLabel) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Analyzing {label}..."));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
