//! Pipeline stages
//!
//! The backtest chain has a fixed topology:
//!
//! ```text
//! ingest (optional)
//!   └─> enhance
//!         ├─> metadata
//!         └─> simulate
//!               └─> aggregate
//!                     ├─> graph(years)
//!                     ├─> graph(stops)
//!                     └─> graph(bestTraders)
//!                           └─> extract
//!                                 └─> lens
//!                                       └─> summary
//! ```
//!
//! `extract` waits on the bestTraders graph only; the other two graphs are
//! side outputs nothing downstream reads.

use std::fmt;

/// R script run by a graph job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphScript {
    Years,
    Stops,
    BestTraders,
}

impl GraphScript {
    /// Submission order of the graph siblings
    pub const ALL: [GraphScript; 3] = [
        GraphScript::Years,
        GraphScript::Stops,
        GraphScript::BestTraders,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GraphScript::Years => "years",
            GraphScript::Stops => "stops",
            GraphScript::BestTraders => "bestTraders",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            GraphScript::Years => "years.r",
            GraphScript::Stops => "stops.r",
            GraphScript::BestTraders => "bestTraders.r",
        }
    }
}

/// One node of the backtest chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Ingest,
    Enhance,
    Metadata,
    Simulate,
    Aggregate,
    Graph(GraphScript),
    Extract,
    Lens,
    Summary,
}

impl Stage {
    /// Topological submission order
    pub const ORDER: [Stage; 11] = [
        Stage::Ingest,
        Stage::Enhance,
        Stage::Metadata,
        Stage::Simulate,
        Stage::Aggregate,
        Stage::Graph(GraphScript::Years),
        Stage::Graph(GraphScript::Stops),
        Stage::Graph(GraphScript::BestTraders),
        Stage::Extract,
        Stage::Lens,
        Stage::Summary,
    ];

    /// Name used in logs and error reports
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Graph(GraphScript::Years) => "graph-years",
            Stage::Graph(GraphScript::Stops) => "graph-stops",
            Stage::Graph(GraphScript::BestTraders) => "graph-bestTraders",
            other => other.task_type(),
        }
    }

    /// Job definition the backend runs for this stage
    pub fn job_definition(&self) -> &'static str {
        match self {
            Stage::Ingest => "polygon-extract",
            Stage::Enhance => "trade-data-enhancer",
            Stage::Metadata => "ticker-meta",
            Stage::Simulate | Stage::Aggregate => "mochi-trades",
            Stage::Graph(_) => "r-graphs",
            Stage::Extract => "trade-extract",
            Stage::Lens => "py-trade-lens",
            Stage::Summary => "trade-summary",
        }
    }

    /// Value of the `TaskType` tag
    pub fn task_type(&self) -> &'static str {
        match self {
            Stage::Ingest => "polygon-extract",
            Stage::Enhance => "trade-data-enhancer",
            Stage::Metadata => "ticker-meta",
            Stage::Simulate => "trade",
            Stage::Aggregate => "aggregation",
            Stage::Graph(_) => "graph",
            Stage::Extract => "trade-extract",
            Stage::Lens => "py-trade-lens",
            Stage::Summary => "trade_summary",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
