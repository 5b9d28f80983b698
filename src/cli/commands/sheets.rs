use anyhow::Context;
use clap::{Args, Subcommand, ValueEnum};

use office_hooks::core::sheets::{build_range, MajorDimension, RangeTarget, ValueBlock};
use office_hooks::infra::google::GoogleSheetsClient;

use super::print_json;

#[derive(Debug, Args)]
pub struct SheetsArgs {
    #[command(subcommand)]
    pub command: SheetsCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Dimension {
    Rows,
    Columns,
}

impl From<Dimension> for MajorDimension {
    fn from(value: Dimension) -> Self {
        match value {
            Dimension::Rows => MajorDimension::Rows,
            Dimension::Columns => MajorDimension::Columns,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum SheetsCommand {
    /// Print every populated row of a sheet
    Dump {
        #[arg(long)]
        sheet_id: String,
        #[arg(long)]
        sheet_name: String,
    },
    /// Batch-get one or more ranges
    Get {
        #[arg(long)]
        sheet_id: String,
        #[arg(long = "range", required = true)]
        ranges: Vec<String>,
        #[arg(long, value_enum, default_value = "rows")]
        dimension: Dimension,
    },
    /// Write a JSON block of values (`[["a","b"],["c","d"]]`)
    Post {
        #[arg(long)]
        sheet_id: String,
        #[arg(long)]
        values: String,
        /// Explicit target range; otherwise derived from --sheet-name/--row/--col
        #[arg(long, conflicts_with_all = ["sheet_name", "row", "col"])]
        range: Option<String>,
        #[arg(long, required_unless_present = "range")]
        sheet_name: Option<String>,
        #[arg(long, default_value_t = 1)]
        row: u32,
        #[arg(long, default_value_t = 1)]
        col: u32,
        /// Address the anchored block in A1 notation instead of R1C1
        #[arg(long, conflicts_with = "range")]
        a1: bool,
        #[arg(long, value_enum, default_value = "rows")]
        dimension: Dimension,
    },
}

/// Anchored target for `values`. With `a1` the extent is computed here and
/// sent as an explicit `Sheet1!C2:D4` range.
fn anchor_target(
    values: &ValueBlock,
    sheet_name: String,
    row: u32,
    col: u32,
    a1: bool,
) -> anyhow::Result<RangeTarget> {
    if a1 {
        let range = build_range(&sheet_name, values, row, col)?;
        return Ok(RangeTarget::Explicit(range.to_a1()));
    }
    Ok(RangeTarget::Anchor {
        sheet_name,
        start_row: row,
        start_col: col,
    })
}

pub async fn run(args: SheetsArgs) -> anyhow::Result<()> {
    let client = GoogleSheetsClient::from_env().await?;

    match args.command {
        SheetsCommand::Dump {
            sheet_id,
            sheet_name,
        } => {
            print_json(&client.get_sheet_values(&sheet_id, &sheet_name).await?)?;
        }
        SheetsCommand::Get {
            sheet_id,
            ranges,
            dimension,
        } => {
            let ranges: Vec<&str> = ranges.iter().map(String::as_str).collect();
            let response = client
                .get_values(&sheet_id, &ranges, dimension.into())
                .await?;
            let blocks: Vec<&ValueBlock> = response.value_ranges.iter().map(|r| &r.values).collect();
            print_json(&blocks)?;
        }
        SheetsCommand::Post {
            sheet_id,
            values,
            range,
            sheet_name,
            row,
            col,
            a1,
            dimension,
        } => {
            let values: ValueBlock =
                serde_json::from_str(&values).context("--values must be a JSON array of rows")?;
            let target = match (range, sheet_name) {
                (Some(range), _) => RangeTarget::Explicit(range),
                (None, Some(sheet_name)) => anchor_target(&values, sheet_name, row, col, a1)?,
                (None, None) => anyhow::bail!("Either --range or --sheet-name is required"),
            };
            let updated = client
                .post_values(&sheet_id, values, &target, dimension.into())
                .await?;
            println!(
                "{}",
                updated.updated_range.unwrap_or_else(|| "(nothing updated)".to_string())
            );
        }
    }

    Ok(())
}
