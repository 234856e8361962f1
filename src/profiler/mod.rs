//! Wall-clock profiling of measured component operations.
//!
//! A component opts in by implementing [`Measured`], naming itself and
//! the operations worth timing. [`Profiler::wrap`] then decorates it so
//! every call to a measured operation is recorded, and the collected
//! totals can be written as a textual report. Wrapping a component that
//! declares no measured operations is a configuration error.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::error::{ConfigError, ParseError};
use crate::parser::{PageData, PageParser};

/// Operation name for [`PageParser::parse`]
const PARSE_OP: &str = "parse";

/// A component whose operations can be timed by the profiler
pub trait Measured {
    /// Name the component reports under
    fn component_name(&self) -> &'static str;

    /// Operations the profiler is allowed to time
    fn measured_operations(&self) -> &'static [&'static str];
}

/// Accumulated timing for one operation
#[derive(Debug, Clone, Copy, Default)]
struct OperationStats {
    calls: u64,
    total: Duration,
}

/// Shared store of per-operation timings, keyed `Component::operation`
#[derive(Debug, Clone, Default)]
struct ProfilingRecords {
    by_operation: Arc<DashMap<String, OperationStats>>,
}

impl ProfilingRecords {
    /// Record one timed call; failed calls are recorded like any other
    fn record(&self, component: &str, operation: &str, elapsed: Duration) {
        let key = format!("{}::{}", component, operation);
        let mut stats = self.by_operation.entry(key).or_default();
        stats.calls += 1;
        stats.total += elapsed;
    }

    /// Write one line per operation, sorted by key
    fn write(&self, out: &mut dyn Write) -> io::Result<()> {
        let mut lines: Vec<(String, OperationStats)> = self
            .by_operation
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        lines.sort_by(|(key_a, _), (key_b, _)| key_a.cmp(key_b));

        for (operation, stats) in lines {
            writeln!(
                out,
                "  {}  {} calls, {:?} total",
                operation, stats.calls, stats.total
            )?;
        }

        Ok(())
    }
}

/// Profiler for measured component operations
///
/// Cheap to clone; all clones and every wrapper created through `wrap`
/// feed the same records.
#[derive(Debug, Clone)]
pub struct Profiler {
    /// Stamped onto every report this profiler writes
    started_at: DateTime<Utc>,
    records: ProfilingRecords,
}

impl Profiler {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            records: ProfilingRecords::default(),
        }
    }

    /// Wrap a parser so its measured operations are timed.
    ///
    /// Fails fast when the component declares no measured operations,
    /// since the wrapper would never record anything.
    pub fn wrap<P>(&self, parser: P) -> Result<ProfiledParser<P>, ConfigError>
    where
        P: PageParser + Measured,
    {
        let operations = parser.measured_operations();
        if operations.is_empty() {
            return Err(ConfigError::NoMeasuredOperations {
                component: parser.component_name().to_string(),
            });
        }

        Ok(ProfiledParser {
            component: parser.component_name(),
            measure_parse: operations.contains(&PARSE_OP),
            records: self.records.clone(),
            inner: parser,
        })
    }

    /// Write the report: the run timestamp, then per-operation totals
    pub fn write_report(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Run at {}", self.started_at.to_rfc2822())?;
        self.records.write(out)?;
        writeln!(out)
    }

    /// Append the report to a file, creating it if needed
    pub fn append_to_file(&self, path: &Path) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        self.write_report(&mut file)
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Decorator timing the measured operations of a wrapped parser
///
/// Operations the component did not designate as measured pass straight
/// through without being recorded.
pub struct ProfiledParser<P> {
    inner: P,
    component: &'static str,
    measure_parse: bool,
    records: ProfilingRecords,
}

#[async_trait]
impl<P> PageParser for ProfiledParser<P>
where
    P: PageParser + Send + Sync,
{
    async fn parse(&self, url: &str) -> Result<PageData, ParseError> {
        if !self.measure_parse {
            return self.inner.parse(url).await;
        }

        let started = Instant::now();
        let result = self.inner.parse(url).await;
        self.records.record(self.component, PARSE_OP, started.elapsed());
        result
    }
}
