// Business logic services layer
//
// Pure computations over records fetched by the reconciler, shared by the
// CLI commands.

pub mod summary;

pub use summary::{DayShares, PerformanceSummary, format_money, recent_shares, summarize};
