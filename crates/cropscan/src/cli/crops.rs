//! The `cropscan crops` command.

use cropscan_core::CROP_CATALOG;

/// Print the crop catalog, one `value  Display Name` pair per line.
pub fn execute() -> anyhow::Result<()> {
    let width = CROP_CATALOG
        .iter()
        .map(|c| c.value.len())
        .max()
        .unwrap_or(0);

    for crop in CROP_CATALOG {
        println!("{:<width$}  {}", crop.value, crop.display_name);
    }
    Ok(())
}
