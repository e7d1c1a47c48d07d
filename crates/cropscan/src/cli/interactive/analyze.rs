//! Guided crop check.
//!
//! Walks the user through: crop → photo path → analysis → result card.

use crate::cli::analyze::{expand_path, run_with_spinner};
use console::Style;
use cropscan_core::{Analyzer, Config, ImageFile, ProductLabel, CROP_CATALOG};
use dialoguer::{Confirm, Input, Select};

use super::theme::{cropscan_theme, print_result_card};

/// Walk the user through one or more crop checks.
pub async fn guided_analyze(config: &Config) -> anyhow::Result<()> {
    let theme = cropscan_theme();
    let analyzer = Analyzer::from_config(config);

    loop {
        // ── Step 1: Crop ────────────────────────────────────────────────────

        let mut items: Vec<&str> = CROP_CATALOG.iter().map(|c| c.display_name).collect();
        items.push("Other...");

        let Some(choice) = Select::with_theme(&theme)
            .with_prompt("Which crop is in the photo?")
            .items(&items)
            .default(0)
            .interact_opt()?
        else {
            return Ok(());
        };

        let label = match CROP_CATALOG.get(choice) {
            Some(crop) => ProductLabel::new(crop.value)?,
            None => {
                let Some(raw) = super::handle_interrupt(
                    Input::<String>::with_theme(&theme)
                        .with_prompt("Product name")
                        .validate_with(|input: &String| {
                            ProductLabel::new(input).map(|_| ()).map_err(|e| e.to_string())
                        })
                        .interact_text(),
                )?
                else {
                    return Ok(());
                };
                ProductLabel::new(raw)?
            }
        };

        // ── Step 2: Photo path ──────────────────────────────────────────────

        let image = loop {
            let Some(raw_path) = super::handle_interrupt(
                Input::<String>::with_theme(&theme)
                    .with_prompt("Path to photo")
                    .interact_text(),
            )?
            else {
                return Ok(());
            };

            let path = expand_path(&raw_path);
            if !path.is_file() {
                let warn = Style::new().for_stderr().yellow();
                eprintln!(
                    "  {}",
                    warn.apply_to(format!("Not a file: {}", path.display()))
                );
                continue;
            }
            break ImageFile::new(path);
        };

        // ── Step 3: Analysis ────────────────────────────────────────────────

        let assessment = run_with_spinner(&analyzer, &label, &image).await;
        print_result_card(&assessment);

        let again = Confirm::with_theme(&theme)
            .with_prompt("Check another photo?")
            .default(false)
            .interact_opt()?;
        if again != Some(true) {
            return Ok(());
        }
    }
}
