//! Contains the logic for the `show` command.
use std::fs;
use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use prettytable::{format, Cell, Row, Table};
use relbump_common::config::DEFAULT_FORMULA_PATH;
use relbump_common::error::{RelbumpError, Result};
use relbump_common::formula::Descriptor;
use relbump_common::model::artifact::Checksum;

#[derive(Args, Debug)]
pub struct Show {
    /// Path to the formula to inspect
    #[arg(long, default_value = DEFAULT_FORMULA_PATH)]
    pub formula: PathBuf,

    /// Emit the references as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl Show {
    pub async fn run(&self) -> Result<()> {
        let text = fs::read_to_string(&self.formula)?;
        let descriptor = Descriptor::parse(&text)?;
        let references = descriptor.references();

        if self.json {
            let rendered = serde_json::to_string_pretty(&references).map_err(|e| {
                RelbumpError::Generic(format!("Failed to serialize references: {e}"))
            })?;
            println!("{rendered}");
            return Ok(());
        }

        if references.is_empty() {
            println!("{}", "No artifact references found".yellow());
            return Ok(());
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
        table.add_row(Row::new(vec![
            Cell::new("Platform").style_spec("b"),
            Cell::new("URL").style_spec("b"),
            Cell::new("Checksum").style_spec("b"),
        ]));
        for reference in &references {
            let checksum_cell = match &reference.checksum {
                Checksum::Pending(_) => Cell::new("pending").style_spec("Fy"),
                Checksum::Pinned(digest) => Cell::new(digest),
            };
            table.add_row(Row::new(vec![
                Cell::new(reference.platform.describe()).style_spec("Fg"),
                Cell::new(&reference.url),
                checksum_cell,
            ]));
        }
        table.printstd();
        Ok(())
    }
}
