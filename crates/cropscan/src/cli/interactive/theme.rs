//! Dialoguer theme, banner and result card for interactive mode.

use console::{style, Style};
use cropscan_core::{Assessment, Provenance};
use dialoguer::theme::ColorfulTheme;

/// Returns a `ColorfulTheme` with CropScan's green accent.
pub fn cropscan_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().green(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().green(),
        active_item_style: Style::new().for_stderr().green(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Prints the CropScan banner to stderr so stdout stays clean.
pub fn print_banner() {
    let version_line = format!("CropScan v{}", cropscan_core::VERSION);
    let tagline = "AI crop quality check";

    let inner_width = tagline.len().max(version_line.len()) + 4;

    let green = Style::new().for_stderr().green();

    eprintln!();
    eprintln!("{}", green.apply_to(format!("  ╔{:═<inner_width$}╗", "")));
    eprintln!("{}", green.apply_to(format!("  ║{version_line:^inner_width$}║")));
    eprintln!("{}", green.apply_to(format!("  ║{tagline:^inner_width$}║")));
    eprintln!("{}", green.apply_to(format!("  ╚{:═<inner_width$}╝", "")));
    eprintln!();
}

/// Grade colour: green for A, yellow for B, red for everything else.
fn grade_style(grade: &str) -> Style {
    match grade {
        "A" => Style::new().for_stderr().green().bold(),
        "B" => Style::new().for_stderr().yellow().bold(),
        _ => Style::new().for_stderr().red().bold(),
    }
}

/// Prints an assessment as a labelled card on stderr.
pub fn print_result_card(assessment: &Assessment) {
    let result = &assessment.result;
    let label = Style::new().for_stderr().bold();
    let dim = Style::new().for_stderr().dim();

    eprintln!();
    eprintln!("  {}", label.apply_to(&result.product_name));
    eprintln!(
        "    {:<18} {}",
        label.apply_to("Freshness:"),
        result.freshness_status
    );
    eprintln!(
        "    {:<18} {}",
        label.apply_to("Overall quality:"),
        grade_style(&result.overall_quality).apply_to(&result.overall_quality)
    );
    eprintln!(
        "    {:<18} {}%",
        label.apply_to("Confidence:"),
        result.confidence
    );
    if let Some(consumable) = result.consumable {
        eprintln!(
            "    {:<18} {}",
            label.apply_to("Consumable:"),
            if consumable { "yes" } else { "no" }
        );
    }
    eprintln!(
        "    {:<18} {}",
        label.apply_to("Justification:"),
        result.justification
    );
    if assessment.provenance != Provenance::Remote {
        eprintln!(
            "    {}",
            dim.apply_to(format!("(source: {})", assessment.provenance))
        );
    }
    eprintln!();
}
