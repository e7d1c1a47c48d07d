//! Interactive CLI mode: guided experience for bare `cropscan` invocation.
//!
//! Mirrors the storefront's quality-check tab: pick a crop, point at a photo,
//! read the verdict. Uses the same analyzer as `cropscan analyze`.

pub mod analyze;
pub mod theme;

use console::Style;
use cropscan_core::{Config, CROP_CATALOG};
use dialoguer::Select;

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Main menu options presented to the user.
const MENU_ITEMS: &[&str] = &[
    "Check a crop photo",
    "List crops",
    "Show configuration",
    "Exit",
];

/// Entry point for interactive mode.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    theme::print_banner();

    let theme = theme::cropscan_theme();

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => analyze::guided_analyze(config).await?,
            Some(1) => list_crops(),
            Some(2) => show_config(config),
            Some(3) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

fn list_crops() {
    let dim = Style::new().for_stderr().dim();
    eprintln!();
    for crop in CROP_CATALOG {
        eprintln!("    {:<12} {}", crop.display_name, dim.apply_to(crop.value));
    }
    eprintln!();
}

/// Summary of the settings that shape an analysis.
fn show_config(config: &Config) {
    let dim = Style::new().for_stderr().dim();
    let label = Style::new().for_stderr().bold();

    let config_path = Config::default_path();
    let path_note = if config_path.exists() {
        "(exists)"
    } else {
        "(using defaults)"
    };

    eprintln!();
    eprintln!(
        "    {:<18} {} {}",
        label.apply_to("Config file:"),
        config_path.display(),
        dim.apply_to(path_note)
    );
    eprintln!(
        "    {:<18} {}",
        label.apply_to("Model:"),
        config.gemini.model
    );
    eprintln!(
        "    {:<18} {} attempts, {}ms base delay",
        label.apply_to("Retry:"),
        config.retry.max_attempts,
        config.retry.base_delay_ms
    );
    eprintln!(
        "    {:<18} {}",
        label.apply_to("Fallback:"),
        if config.simulator.enabled {
            format!("simulated ({}ms latency)", config.simulator.latency_ms)
        } else {
            "disabled".to_string()
        }
    );
    eprintln!(
        "    {:<18} {}",
        label.apply_to("Log level:"),
        config.logging.level
    );
    eprintln!();
}
