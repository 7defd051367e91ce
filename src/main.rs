use std::path::PathBuf;

use clap::Parser;
use panel_nesting::input::NestingRequest;
use panel_nesting::{BoardRuleResolver, NestingReport};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "panel_nesting",
    about = "Packs furniture panels onto raw-material boards"
)]
struct Cli {
    /// JSON request with the piece list
    #[arg(long)]
    input: PathBuf,

    /// JSON rule table replacing the built-in board sizes
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Inter-piece gap in mm (overrides the request)
    #[arg(long)]
    gap: Option<f64>,

    /// Edge margin in mm (overrides the request)
    #[arg(long)]
    margin: Option<f64>,

    /// Pack each project separately
    #[arg(long)]
    by_project: bool,

    /// Log packing progress to stderr
    #[arg(long)]
    verbose: bool,

    /// Print a one-line-per-group summary instead of JSON
    #[arg(long)]
    summary: bool,
}

fn load_request(cli: &Cli) -> Result<NestingRequest, String> {
    let text = std::fs::read_to_string(&cli.input)
        .map_err(|e| format!("cannot read '{}': {e}", cli.input.display()))?;
    let mut request = NestingRequest::from_json(&text).map_err(|e| e.to_string())?;

    if let Some(gap) = cli.gap {
        request.settings.gap_mm = gap;
    }
    if let Some(margin) = cli.margin {
        request.settings.edge_margin_mm = margin;
    }
    if cli.by_project {
        request.settings.group_by_project = true;
    }
    Ok(request)
}

fn print_summary(report: &NestingReport) {
    for row in &report.rows {
        println!(
            "{}: {} board{} ({}x{}), {} pieces, {} unplaced, {:.1}% used",
            row.group_key,
            row.board_count,
            if row.board_count == 1 { "" } else { "s" },
            row.board_width_mm,
            row.board_height_mm,
            row.piece_count,
            row.unplaced_count,
            row.utilization * 100.0,
        );
    }
    for issue in &report.issues {
        println!(
            "{}: no board rule, {} pieces skipped",
            issue.key(),
            issue.pieces().len()
        );
    }
    println!(
        "Summary: {} boards, {} placed, {} unplaced, {} unresolved, {:.1}% used",
        report.totals.board_count,
        report.totals.placed_count,
        report.totals.unplaced_count,
        report.totals.unresolved_count,
        report.global_utilization * 100.0,
    );
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let request = load_request(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let resolver = match &cli.rules {
        Some(path) => BoardRuleResolver::from_json_file(path).unwrap_or_else(|e| {
            eprintln!("Error: {}: {}", path.display(), e);
            std::process::exit(1);
        }),
        None => BoardRuleResolver::default(),
    };

    let report = panel_nesting::nest(&request, &resolver).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if cli.summary {
        print_summary(&report);
        return;
    }

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
