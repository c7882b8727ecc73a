// src/pipeline.rs
// =============================================================================
// The whole crawl in one call.
//
// What happens in `run`:
// 1. Fetch the root document (the docs index) on its own, before the batch
// 2. Resolve it into one task per module document
// 3. Run the tasks through the BoundedExecutor; each task fetches its
//    document and transforms it into a ModuleRecord
// 4. Group the successful records by stability; list the failed tasks
//
// A Pipeline holds no state between runs. Dropping the future returned by
// `run` cancels that run and everything it has in flight.
// =============================================================================

use crate::aggregate::{aggregate, GroupedResult};
use crate::config::PipelineConfig;
use crate::error::{ConfigError, FetchError, PipelineError, TaskError};
use crate::executor::{BoundedExecutor, ExecutionObserver, Task};
use crate::fetch::Fetcher;
use crate::index::resolve_index;
use crate::transform::{ModuleRecord, Transformer};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// A task that did not produce a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskFailure {
    pub index: usize,
    pub address: String,
    pub error: TaskError,
}

/// Result of a run: the grouped modules plus whatever failed along the way.
///
/// In fail-fast mode `failures` is always empty; the run errors instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub grouped: GroupedResult,
    pub failures: Vec<TaskFailure>,
}

impl RunReport {
    /// True when every module document was fetched and transformed
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Pipeline {
    fetcher: Arc<dyn Fetcher>,
    transformer: Transformer,
    executor: BoundedExecutor,
    timeout: Option<Duration>,
}

impl Pipeline {
    /// Builds a pipeline; an invalid config is rejected here, not at run time.
    pub fn new(fetcher: Arc<dyn Fetcher>, config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let executor = BoundedExecutor::new(config.concurrency)?.fail_fast(config.fail_fast);

        Ok(Self {
            fetcher,
            timeout: config.timeout(),
            transformer: Transformer::new(config.overrides),
            executor,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.executor = self.executor.with_observer(observer);
        self
    }

    pub async fn run(&self, root_address: &str) -> Result<RunReport, PipelineError> {
        tracing::info!(root = root_address, "fetching index");
        let index = fetch_with_timeout(self.fetcher.as_ref(), root_address, self.timeout)
            .await
            .map_err(PipelineError::RootFetchFailed)?;

        let tasks = resolve_index(root_address, &index)?;
        tracing::info!(modules = tasks.len(), "index resolved");

        let results = self
            .executor
            .run(tasks, |task| self.process(task))
            .await
            .map_err(|failure| PipelineError::BatchFailed {
                index: failure.index,
                address: failure.address,
                cause: failure.cause,
            })?;

        let mut records = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for result in results {
            match result.outcome {
                Ok(record) => records.push(record),
                Err(error) => failures.push(TaskFailure {
                    index: result.index,
                    address: result.address,
                    error,
                }),
            }
        }

        let grouped = aggregate(records);
        tracing::info!(
            groups = grouped.len(),
            modules = grouped.module_count(),
            failed = failures.len(),
            "crawl finished"
        );

        Ok(RunReport { grouped, failures })
    }

    // One task: fetch the module document, then classify it
    async fn process(&self, task: Task) -> Result<ModuleRecord, TaskError> {
        let content = fetch_with_timeout(self.fetcher.as_ref(), &task.address, self.timeout).await?;
        Ok(self.transformer.transform(&task.name, &content)?)
    }
}

// Enforces the timeout even for fetchers that ignore the hint
async fn fetch_with_timeout(
    fetcher: &dyn Fetcher,
    address: &str,
    timeout: Option<Duration>,
) -> Result<String, FetchError> {
    let fetch = fetcher.fetch(address, timeout);
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fetch)
            .await
            .unwrap_or_else(|_| {
                Err(FetchError::Timeout {
                    address: address.to_string(),
                })
            }),
        None => fetch.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::transform::Stability;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::time::sleep;

    const ROOT: &str = "https://docs.test/api/index.json";

    // Serves canned documents after a per-address delay. It deliberately
    // ignores the timeout hint so the pipeline has to enforce it.
    #[derive(Default)]
    struct StubFetcher {
        docs: HashMap<String, (u64, Result<String, FetchError>)>,
    }

    impl StubFetcher {
        fn doc(mut self, name: &str, delay_ms: u64, body: &str) -> Self {
            self.docs
                .insert(address(name), (delay_ms, Ok(body.to_string())));
            self
        }

        fn failing(mut self, name: &str, status: u16) -> Self {
            let err = FetchError::BadStatus {
                address: address(name),
                status,
            };
            self.docs.insert(address(name), (0, Err(err)));
            self
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(
            &self,
            address: &str,
            _timeout: Option<Duration>,
        ) -> Result<String, FetchError> {
            match self.docs.get(address) {
                Some((delay, result)) => {
                    sleep(Duration::from_millis(*delay)).await;
                    result.clone()
                }
                None => Err(FetchError::BadStatus {
                    address: address.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn address(name: &str) -> String {
        format!("https://docs.test/api/{}.json", name)
    }

    fn index_of(names: &[&str]) -> String {
        let links: Vec<_> = names.iter().map(|n| format!("{}.json", n)).collect();
        serde_json::to_string(&links).unwrap()
    }

    fn node_docs() -> StubFetcher {
        StubFetcher::default()
            .doc("index", 0, &index_of(&["fs", "net", "vm", "repl"]))
            .doc("fs", 40, r#"{"modules":[{"stability":2}]}"#)
            .doc("net", 5, r#"{"modules":[{"stability":2}]}"#)
            .doc("vm", 20, r#"{"globals":[{"stability":1}]}"#)
            .doc("repl", 0, r#"{"type":"module"}"#)
    }

    fn pipeline(fetcher: StubFetcher, config: PipelineConfig) -> Pipeline {
        Pipeline::new(Arc::new(fetcher), config).unwrap()
    }

    fn names(report: &RunReport, key: Stability) -> Vec<String> {
        report.grouped.get(&key).map(<[String]>::to_vec).unwrap_or_default()
    }

    #[tokio::test]
    async fn test_groups_in_submission_order() {
        let report = pipeline(node_docs(), PipelineConfig::default())
            .run(ROOT)
            .await
            .unwrap();

        assert!(report.is_complete());
        // fs finishes last but is still listed first
        assert_eq!(names(&report, Stability::Level(2)), vec!["fs", "net"]);
        assert_eq!(names(&report, Stability::Level(1)), vec!["vm"]);
        assert_eq!(names(&report, Stability::Unknown), vec!["repl"]);
    }

    #[tokio::test]
    async fn test_runs_are_idempotent() {
        let pipeline = pipeline(node_docs(), PipelineConfig::default());
        let first = pipeline.run(ROOT).await.unwrap();
        let second = pipeline.run(ROOT).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first.grouped).unwrap(),
            serde_json::to_string(&second.grouped).unwrap()
        );
    }

    #[test]
    fn test_zero_concurrency_rejected_at_construction() {
        let config = PipelineConfig {
            concurrency: 0,
            ..PipelineConfig::default()
        };
        let result = Pipeline::new(Arc::new(StubFetcher::default()), config);
        assert!(matches!(result, Err(ConfigError::NonPositiveConcurrency)));
    }

    #[tokio::test]
    async fn test_empty_index_yields_empty_result() {
        let fetcher = StubFetcher::default().doc("index", 0, "[]");
        let report = pipeline(fetcher, PipelineConfig::default())
            .run(ROOT)
            .await
            .unwrap();
        assert!(report.grouped.is_empty());
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_root_fetch_failure() {
        let err = pipeline(StubFetcher::default(), PipelineConfig::default())
            .run(ROOT)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PipelineError::RootFetchFailed(FetchError::BadStatus {
                address: ROOT.to_string(),
                status: 404,
            })
        );
    }

    #[tokio::test]
    async fn test_unreadable_index() {
        let fetcher = StubFetcher::default().doc("index", 0, "not json");
        let err = pipeline(fetcher, PipelineConfig::default())
            .run(ROOT)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidIndex(_)));
    }

    #[tokio::test]
    async fn test_default_mode_reports_failures_and_keeps_going() {
        let fetcher = node_docs()
            .failing("net", 503)
            .doc("vm", 0, "<!doctype html>");
        let report = pipeline(fetcher, PipelineConfig::default())
            .run(ROOT)
            .await
            .unwrap();

        assert_eq!(names(&report, Stability::Level(2)), vec!["fs"]);
        assert_eq!(names(&report, Stability::Unknown), vec!["repl"]);
        assert_eq!(report.failures.len(), 2);

        assert_eq!(report.failures[0].index, 1);
        assert_eq!(
            report.failures[0].error,
            TaskError::Fetch(FetchError::BadStatus {
                address: address("net"),
                status: 503,
            })
        );
        assert_eq!(report.failures[1].index, 2);
        assert!(matches!(
            report.failures[1].error,
            TaskError::Transform(TransformError::MalformedDocument { .. })
        ));
    }

    #[tokio::test]
    async fn test_fail_fast_surfaces_first_failure() {
        // Task 1 fails immediately while task 0 is still sleeping
        let fetcher = StubFetcher::default()
            .doc("index", 0, &index_of(&["a", "b", "c", "d"]))
            .doc("a", 50, r#"{"stability":2}"#)
            .failing("b", 500)
            .doc("c", 50, r#"{"stability":2}"#)
            .doc("d", 50, r#"{"stability":2}"#);
        let config = PipelineConfig {
            concurrency: 2,
            fail_fast: true,
            ..PipelineConfig::default()
        };

        let err = pipeline(fetcher, config).run(ROOT).await.unwrap_err();
        match err {
            PipelineError::BatchFailed { index, address: failed, cause } => {
                assert_eq!(index, 1);
                assert_eq!(failed, address("b"));
                assert_eq!(
                    cause,
                    TaskError::Fetch(FetchError::BadStatus {
                        address: address("b"),
                        status: 500,
                    })
                );
            }
            other => panic!("expected BatchFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fail_fast_on_unparseable_document() {
        // b fetches fine but its body is an HTML error page
        let fetcher = StubFetcher::default()
            .doc("index", 0, &index_of(&["a", "b", "c"]))
            .doc("a", 50, r#"{"stability":2}"#)
            .doc("b", 0, "<!doctype html><title>oops</title>")
            .doc("c", 50, r#"{"stability":2}"#);
        let config = PipelineConfig {
            concurrency: 2,
            fail_fast: true,
            ..PipelineConfig::default()
        };

        let err = pipeline(fetcher, config).run(ROOT).await.unwrap_err();
        match err {
            PipelineError::BatchFailed { index, address: failed, cause } => {
                assert_eq!(index, 1);
                assert_eq!(failed, address("b"));
                assert!(matches!(
                    cause,
                    TaskError::Transform(TransformError::MalformedDocument { .. })
                ));
            }
            other => panic!("expected BatchFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_only_affects_slow_task() {
        let fetcher = node_docs().doc("fs", 500, r#"{"modules":[{"stability":2}]}"#);
        let config = PipelineConfig {
            timeout_ms: Some(100),
            ..PipelineConfig::default()
        };

        let report = pipeline(fetcher, config).run(ROOT).await.unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].error,
            TaskError::Fetch(FetchError::Timeout { address: address("fs") })
        );
        assert_eq!(names(&report, Stability::Level(2)), vec!["net"]);
        assert_eq!(names(&report, Stability::Level(1)), vec!["vm"]);
    }

    #[tokio::test]
    async fn test_overrides_apply() {
        let mut config = PipelineConfig::default();
        config.add_override("repl=3").unwrap();

        let report = pipeline(node_docs(), config).run(ROOT).await.unwrap();
        assert_eq!(names(&report, Stability::Level(3)), vec!["repl"]);
        assert!(report.grouped.get(&Stability::Unknown).is_none());
    }
}
