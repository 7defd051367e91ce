//! Nesting engine for furniture panels.
//!
//! Pieces are grouped by material and finish, each group gets the board size
//! its material calls for, and a greedy guillotine packer lays the pieces out
//! over as many boards as needed. The report module turns a run into
//! utilization figures and per-board layouts for external renderers.

pub mod error;
pub mod free_rects;
pub mod guillotine;
pub mod input;
pub mod orchestrator;
pub mod report;
pub mod rules;
pub mod types;

pub use error::{Error, Result};
pub use guillotine::GuillotinePacker;
pub use orchestrator::{GroupIssue, NestingRun};
pub use report::NestingReport;
pub use rules::BoardRuleResolver;
pub use types::{GroupKey, PackResult, PackSettings, PieceItem, PieceRecord};

/// Validates a request, packs every group and builds the report.
pub fn nest(
    request: &input::NestingRequest,
    resolver: &BoardRuleResolver,
) -> Result<NestingReport> {
    let pieces = input::expand_rows(&request.pieces)?;
    let run = orchestrator::run(&pieces, resolver, request.settings)?;
    Ok(report::build(&run))
}
