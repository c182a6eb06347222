//! Testing utilities for the autotest workspace
//!
//! Scripted collaborators, sample plans and source fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use autotest_core::{
    ExpectedOutcome, GenerationError, PlanRequest, TestCase, TestInputs, TestPlanner, TestSuite,
    TestWriter, WriteRequest,
};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

pub const ADD_SOURCE: &str = r#"def add(a: int, b: int) -> int:
    """Adds two integers and returns the result."""
    if type(a) is not int or type(b) is not int:
        raise TypeError("Parameter(s) of invalid type")
    return a + b
"#;

/// Write `source` to `<dir>/<relative>`, creating parent directories
pub fn write_source_fixture(dir: &tempfile::TempDir, relative: &str, source: &str) -> PathBuf {
    let path = dir.path().join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, source).unwrap();
    path
}

pub fn pending_case(description: &str, inputs: &str, expected: ExpectedOutcome) -> TestCase {
    TestCase::new(description, TestInputs::Pending(inputs.to_string()), expected)
}

/// Plan for `add` with serialized inputs, one of them malformed
pub fn sample_suite() -> TestSuite {
    TestSuite::new(
        vec![
            pending_case("adds two positives", r#"{"a": 1, "b": 2}"#, ExpectedOutcome::returns(3)),
            pending_case("adds negatives", r#"{"a": -1, "b": -2}"#, ExpectedOutcome::returns(-3)),
        ],
        vec![pending_case("adds zeros", r#"{"a": 0, "b": 0}"#, ExpectedOutcome::returns(0))],
        vec![
            pending_case("rejects strings", r#"{"a": "1", "b": 2}"#, ExpectedOutcome::raises("TypeError")),
            pending_case("garbled inputs", "{bad json", ExpectedOutcome::raises("TypeError")),
        ],
    )
}

/// Planner returning a fixed suite and counting calls
#[derive(Debug, Default)]
pub struct ScriptedPlanner {
    suite: TestSuite,
    calls: Mutex<Vec<PlanRequest>>,
}

impl ScriptedPlanner {
    pub fn new(suite: TestSuite) -> Arc<Self> {
        Arc::new(Self {
            suite,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<PlanRequest> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl TestPlanner for ScriptedPlanner {
    async fn plan(&self, request: PlanRequest) -> Result<TestSuite, GenerationError> {
        self.calls.lock().push(request);
        Ok(self.suite.clone())
    }
}

/// Writer emitting `def test_<n>():` bodies and recording every request
#[derive(Debug, Default)]
pub struct RecordingWriter {
    requests: Mutex<Vec<WriteRequest>>,
    fail_on_call: Option<usize>,
}

impl RecordingWriter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail the call with this zero-based index
    pub fn failing_at(index: usize) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            fail_on_call: Some(index),
        })
    }

    pub fn requests(&self) -> Vec<WriteRequest> {
        self.requests.lock().clone()
    }

    /// Descriptions of the cases handed to the writer, in call order
    pub fn descriptions(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .map(|r| {
                serde_json::from_str::<serde_json::Value>(&r.test_case_json)
                    .ok()
                    .and_then(|v| v["description"].as_str().map(str::to_string))
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Code the writer returns for call `index`
    pub fn code_for(index: usize) -> String {
        format!("def test_case_{index}():\n    assert True\n")
    }
}

#[async_trait]
impl TestWriter for RecordingWriter {
    async fn write_test(&self, request: WriteRequest) -> Result<String, GenerationError> {
        let mut requests = self.requests.lock();
        let index = requests.len();
        requests.push(request);

        if self.fail_on_call == Some(index) {
            return Err(GenerationError::other(format!("scripted failure at call {index}")));
        }
        Ok(Self::code_for(index))
    }
}
