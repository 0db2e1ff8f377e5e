//! Output formatting for `discover`: table or JSON.

use std::io::{self, IsTerminal, Write};

use bedcontrol_core::AccessoryContext;
use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

#[derive(Tabled)]
struct BedRow {
    #[tabled(rename = "Bed ID")]
    bed_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Privacy")]
    privacy: String,
    #[tabled(rename = "Foundation")]
    foundation: String,
    #[tabled(rename = "Accessories")]
    capabilities: String,
}

fn flag(enabled: bool, color: bool) -> String {
    match (enabled, color) {
        (true, true) => "yes".green().to_string(),
        (false, true) => "no".dimmed().to_string(),
        (true, false) => "yes".into(),
        (false, false) => "no".into(),
    }
}

fn bed_row(context: &AccessoryContext, color: bool) -> BedRow {
    let features = &context.bed_features;
    let capabilities = features
        .capabilities()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    BedRow {
        bed_id: context.bed_id().to_owned(),
        name: context.name().to_owned(),
        model: context.bed_stats.model.clone(),
        privacy: flag(features.privacy, color),
        foundation: flag(features.foundation, color),
        capabilities,
    }
}

/// Render discovered beds in the chosen format.
pub fn render_beds(
    format: OutputFormat,
    beds: &[AccessoryContext],
    color: bool,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<BedRow> = beds.iter().map(|b| bed_row(b, color)).collect();
            Ok(Table::new(rows).with(Style::rounded()).to_string())
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(beds)?),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}
