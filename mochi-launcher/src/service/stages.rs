//! Stage definitions
//!
//! Builds the [`JobNode`] for every stage of the backtest chain: command line,
//! environment, tags and dependency list. Pure functions of the launch
//! context; nothing here talks to a backend.

use mochi_core::domain::artifact::{MarketDataKeys, SOURCE_POLYGON};
use mochi_core::domain::group_tag::GroupTag;
use mochi_core::domain::job::{
    JobId, JobNode, JobRef, TAG_SCENARIO, TAG_SUBMISSION_GROUP, TAG_SYMBOL, TAG_TASK_TYPE,
    TAG_TICKER, TAG_TRADE_TYPE,
};
use mochi_core::domain::request::PipelineRequest;
use mochi_core::domain::stage::{GraphScript, Stage};

use crate::config::{Buckets, LauncherConfig};

/// Trade direction of the simulated scenario
const TRADE_TYPE: &str = "long";

/// A stage paired with the node to submit for it
#[derive(Debug, Clone)]
pub struct PlannedJob {
    pub stage: Stage,
    pub node: JobNode,
}

/// Everything a stage needs to build its node
pub struct StageContext<'a> {
    config: &'a LauncherConfig,
    request: &'a PipelineRequest,
    group_tag: &'a GroupTag,
    keys: &'a MarketDataKeys,
}

impl<'a> StageContext<'a> {
    pub fn new(
        config: &'a LauncherConfig,
        request: &'a PipelineRequest,
        group_tag: &'a GroupTag,
        keys: &'a MarketDataKeys,
    ) -> Self {
        Self {
            config,
            request,
            group_tag,
            keys,
        }
    }

    // =========================================================================
    // Derived names
    // =========================================================================

    /// Parameter sweep handed to the trade simulator
    ///
    /// Duration and timeout ranges are pinned to the requested values.
    pub fn scenario_template(&self) -> String {
        let duration = self.request.trade_duration;
        let timeout = self.request.trade_timeout;
        format!(
            "s_-3000..-100..400___l_100..7500..400___o_-800..800..100___d_{duration}..{duration}..7___out_{timeout}..{timeout}..4"
        )
    }

    /// Input file name the simulator resolves against the prepared bucket
    pub fn symbol_file(&self) -> String {
        format!("{}-1mF.csv", self.request.ticker)
    }

    /// Scenario plus symbol file, as the simulator expects it
    pub fn full_scenario(&self) -> String {
        format!("{}___{}", self.scenario_template(), self.symbol_file())
    }

    /// Ticker qualified with provider and granularity, e.g. `AAPL_polygon_min`
    pub fn symbol_with_provider(&self) -> String {
        format!("{}_{}_min", self.request.ticker, SOURCE_POLYGON)
    }

    /// Aggregated results file a graph job reads
    pub fn aggregation_file(&self) -> String {
        let symbol = self.symbol_with_provider();
        let scenario = self.scenario_template();
        format!("{symbol}/{scenario}/aggregated-{symbol}_{scenario}_aggregationQueryTemplate-all.csv.lzo")
    }

    fn node(&self, stage: Stage, name: &str) -> JobNode {
        JobNode::new(name, self.config.job_queue.as_str(), stage.job_definition())
            .tag(TAG_SUBMISSION_GROUP, self.group_tag.as_str())
            .tag(TAG_TASK_TYPE, stage.task_type())
    }

    fn planned(stage: Stage, node: JobNode) -> PlannedJob {
        PlannedJob { stage, node }
    }

    // =========================================================================
    // Stages
    // =========================================================================

    /// Fetch raw minute/hour/day bars from the data provider
    pub fn ingest(&self) -> PlannedJob {
        let ticker = self.request.ticker.as_str();
        let buckets = &self.config.buckets;

        let node = self
            .node(Stage::Ingest, &format!("polygon-job-{}-{}", ticker, self.group_tag))
            .args(["python", "src/main.py", "--tickers", ticker])
            .args(self.key_args("--s3_key_min", "--s3_key_hour", "--s3_key_day"))
            .args(["--from_date", self.request.from_date.as_str()])
            .args(["--to_date", self.request.to_date.as_str()])
            .env("POLYGON_API_KEY", self.config.polygon_api_key.expose())
            .env("OUTPUT_BUCKET_NAME", buckets.raw.as_str())
            .tag(TAG_TICKER, ticker);

        Self::planned(Stage::Ingest, node)
    }

    /// Derive indicators from the raw bars
    ///
    /// Waits on ingestion only when ingestion was submitted.
    pub fn enhance(&self, ingest: &JobRef) -> PlannedJob {
        let ticker = self.request.ticker.as_str();
        let buckets = &self.config.buckets;

        let node = self
            .node(
                Stage::Enhance,
                &format!("trade-data-enhancer-{}-{}", ticker, self.group_tag),
            )
            .args(["python", "src/enhancer.py", "--ticker", ticker])
            .args(["--provider", SOURCE_POLYGON])
            .args(self.key_args("--s3_key_min", "--s3_key_hour", "--s3_key_day"))
            .args([
                "--short_atr_period".to_string(),
                self.request.short_atr_period.to_string(),
                "--long_atr_period".to_string(),
                self.request.long_atr_period.to_string(),
                "--alpha".to_string(),
                self.request.alpha.to_string(),
            ])
            .env("INPUT_BUCKET_NAME", buckets.raw.as_str())
            .env("OUTPUT_BUCKET_NAME", buckets.prepared.as_str())
            .depends_on(ingest.as_dependencies())
            .tag(TAG_TICKER, ticker);

        Self::planned(Stage::Enhance, node)
    }

    /// Extract ticker metadata from the prepared data
    pub fn metadata(&self, enhance: &JobId) -> PlannedJob {
        let ticker = self.request.ticker.as_str();
        let buckets = &self.config.buckets;

        let node = self
            .node(Stage::Metadata, &format!("ticker-meta-{}-{}", ticker, self.group_tag))
            .args(["python", "src/ticker_meta.py", "--ticker", ticker])
            .args(["--s3_key_min", self.keys.minute.as_str()])
            .env("INPUT_BUCKET_NAME", buckets.prepared.as_str())
            .env("OUTPUT_BUCKET_NAME", buckets.ticker_meta.as_str())
            .depends_on(vec![enhance.clone()])
            .tag(TAG_TICKER, ticker);

        Self::planned(Stage::Metadata, node)
    }

    /// Simulate trades over the scenario sweep
    pub fn simulate(&self, enhance: &JobId) -> PlannedJob {
        let node = self
            .node(
                Stage::Simulate,
                &format!("Trades{}-{}", self.request.ticker, self.group_tag),
            )
            .args(["-scenario".to_string(), self.full_scenario()])
            .args(["-output_dir", "results", "-write_trades", "-upload_to_s3"])
            .args(["-s3_key_min", self.keys.minute.as_str()])
            .envs_for_trades(&self.config.buckets)
            .depends_on(vec![enhance.clone()]);

        Self::planned(Stage::Simulate, self.scenario_tags(node))
    }

    /// Aggregate the simulated trades
    pub fn aggregate(&self, trades: &JobId) -> PlannedJob {
        let buckets = &self.config.buckets;

        let node = self
            .node(
                Stage::Aggregate,
                &format!("Aggregate{}-{}", self.request.ticker, self.group_tag),
            )
            .args(["-scenario".to_string(), self.full_scenario()])
            .args(["-output_dir", "results", "-upload_to_s3", "-aggregate"])
            .args(["-s3_key_min", self.keys.minute.as_str()])
            .envs_for_trades(buckets)
            .env("MOCHI_AGGREGATION_BUCKET", buckets.aggregation.as_str())
            .env(
                "MOCHI_AGGREGATION_BUCKET_STAGING",
                buckets.aggregation_staging.as_str(),
            )
            .depends_on(vec![trades.clone()]);

        Self::planned(Stage::Aggregate, self.scenario_tags(node))
    }

    /// Render one graph from the aggregated results
    pub fn graph(&self, script: GraphScript, aggregate: &JobId) -> PlannedJob {
        let buckets = &self.config.buckets;
        let stage = Stage::Graph(script);

        let node = self
            .node(
                stage,
                &format!(
                    "Graphs{}-{}-{}",
                    self.request.ticker,
                    script.name(),
                    self.group_tag
                ),
            )
            .args([self.aggregation_file(), script.file_name().to_string()])
            .env("MOCHI_AGGREGATION_BUCKET", buckets.aggregation.as_str())
            .env("MOCHI_GRAPHS_BUCKET", buckets.graphs.as_str())
            .depends_on(vec![aggregate.clone()])
            .tag(TAG_SCENARIO, self.scenario_template())
            .tag(TAG_SYMBOL, self.request.ticker.as_str())
            .tag(TAG_TRADE_TYPE, TRADE_TYPE);

        Self::planned(stage, node)
    }

    /// Extract the trades of the best traders
    pub fn extract(&self, best_traders: &JobId) -> PlannedJob {
        let buckets = &self.config.buckets;

        let node = self
            .node(
                Stage::Extract,
                &format!("trade-extract-{}-{}", self.request.ticker, self.group_tag),
            )
            .args(self.symbol_and_scenario_args())
            .env("MOCHI_GRAPHS_BUCKET", buckets.graphs.as_str())
            .env("MOCHI_TRADES_BUCKET", buckets.trades.as_str())
            .env("MOCHI_PROD_TRADE_EXTRACTS", buckets.trade_extracts.as_str())
            .depends_on(vec![best_traders.clone()])
            .tag(TAG_SCENARIO, self.scenario_template())
            .tag(TAG_SYMBOL, self.request.ticker.as_str());

        Self::planned(Stage::Extract, node)
    }

    /// Analyse the extracted trades
    pub fn lens(&self, extract: &JobId) -> PlannedJob {
        let node = self
            .node(
                Stage::Lens,
                &format!("py-trade-lens-{}-{}", self.request.ticker, self.group_tag),
            )
            .args(self.symbol_and_scenario_args())
            .depends_on(vec![extract.clone()])
            .tag(TAG_SCENARIO, self.scenario_template())
            .tag(TAG_SYMBOL, self.request.ticker.as_str());

        Self::planned(Stage::Lens, node)
    }

    /// Summarise the run
    pub fn summary(&self, lens: &JobId) -> PlannedJob {
        let node = self
            .node(
                Stage::Summary,
                &format!("trade_summary-{}-{}", self.request.ticker, self.group_tag),
            )
            .args(["--symbol".to_string(), self.symbol_with_provider()])
            .depends_on(vec![lens.clone()])
            .tag(TAG_SYMBOL, self.request.ticker.as_str());

        Self::planned(Stage::Summary, node)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn key_args(&self, minute: &str, hour: &str, day: &str) -> Vec<String> {
        vec![
            minute.to_string(),
            self.keys.minute.to_string(),
            hour.to_string(),
            self.keys.hour.to_string(),
            day.to_string(),
            self.keys.day.to_string(),
        ]
    }

    fn symbol_and_scenario_args(&self) -> [String; 4] {
        [
            "--symbol".to_string(),
            self.symbol_with_provider(),
            "--scenario".to_string(),
            self.scenario_template(),
        ]
    }

    fn scenario_tags(&self, node: JobNode) -> JobNode {
        node.tag(TAG_SCENARIO, self.full_scenario())
            .tag(TAG_SYMBOL, self.symbol_file())
            .tag(TAG_TRADE_TYPE, TRADE_TYPE)
    }
}

/// Bucket wiring shared by the simulator invocations
trait TradeEnvironment {
    fn envs_for_trades(self, buckets: &Buckets) -> Self;
}

impl TradeEnvironment for JobNode {
    fn envs_for_trades(self, buckets: &Buckets) -> Self {
        self.env("MOCHI_DATA_BUCKET", buckets.prepared.as_str())
            .env("MOCHI_TRADES_BUCKET", buckets.trades.as_str())
            .env("MOCHI_TRADERS_BUCKET", buckets.traders.as_str())
    }
}
