#![forbid(unsafe_code)]
//! Report runner: read a snapshot envelope JSON file, aggregate it, and
//! print the publication as JSON (default) or markdown.
//!
//! Usage: `board_report <snapshot.json> [--today YYYY-MM-DD] [--markdown]`

use std::fs;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use compliance_board::{BoardConfig, SnapshotEnvelope, TemporalContext, publish_board};

struct Args {
    snapshot_path: String,
    today: Option<NaiveDate>,
    markdown: bool,
}

fn parse_args() -> Result<Args> {
    let mut raw = std::env::args().skip(1);
    let mut snapshot_path: Option<String> = None;
    let mut today: Option<NaiveDate> = None;
    let mut markdown = false;

    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--today" => {
                let Some(value) = raw.next() else {
                    bail!("--today requires a YYYY-MM-DD value");
                };
                today = Some(
                    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                        .with_context(|| format!("invalid --today value `{value}`"))?,
                );
            }
            "--markdown" => markdown = true,
            "--help" | "-h" => {
                eprintln!(
                    "Usage: board_report <snapshot.json> [--today YYYY-MM-DD] [--markdown]"
                );
                std::process::exit(0);
            }
            other if other.starts_with("--") => bail!("unknown argument: {other}"),
            other => {
                if snapshot_path.is_some() {
                    bail!("unexpected extra argument: {other}");
                }
                snapshot_path = Some(other.to_string());
            }
        }
    }

    let Some(snapshot_path) = snapshot_path else {
        bail!("missing snapshot file path; see --help");
    };
    Ok(Args {
        snapshot_path,
        today,
        markdown,
    })
}

fn main() -> Result<()> {
    let args = parse_args()?;

    let raw = fs::read_to_string(&args.snapshot_path)
        .with_context(|| format!("reading {}", args.snapshot_path))?;
    let envelope: SnapshotEnvelope =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", args.snapshot_path))?;

    let today = args
        .today
        .unwrap_or_else(|| TemporalContext::for_today().today());
    let config = BoardConfig::default();

    let publication = publish_board(envelope, today, &config)
        .map_err(|err| anyhow::anyhow!("{err} ({})", err.stable_code()))?;

    if args.markdown {
        print!("{}", publication.to_markdown_report());
    } else {
        println!("{}", publication.to_json_pretty()?);
    }
    Ok(())
}
