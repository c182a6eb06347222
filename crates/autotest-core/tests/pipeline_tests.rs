use autotest_core::stages::{module_path, seed_imports};
use autotest_core::{
    ExpectedOutcome, GraphExecutor, Node, PipelineError, PipelineState, TestInputs, TestSuite,
};
use autotest_test_utils::{
    pending_case, sample_suite, write_source_fixture, RecordingWriter, ScriptedPlanner, ADD_SOURCE,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn fixture() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source_fixture(&dir, "pkg/code.py", ADD_SOURCE);
    (dir, path)
}

#[tokio::test]
async fn full_run_generates_one_test_per_case() {
    let (_dir, path) = fixture();
    let planner = ScriptedPlanner::new(sample_suite());
    let writer = RecordingWriter::new();
    let executor = GraphExecutor::new(planner.clone(), writer.clone());

    let outcome = executor.run(PipelineState::new(&path, "add")).await.unwrap();

    assert_eq!(outcome.summary.generation_steps, 5);
    assert_eq!(outcome.state.iteration_count(), 5 + 3);
    assert_eq!(outcome.state.pending_len(), 0);
    assert_eq!(planner.calls().len(), 1);
    assert_eq!(
        writer.descriptions(),
        vec![
            "adds two positives",
            "adds negatives",
            "adds zeros",
            "rejects strings",
            "garbled inputs"
        ]
    );

    let mut expected = seed_imports(&module_path(&path), "add");
    for i in 0..5 {
        expected.push_str("\n\n");
        expected.push_str(RecordingWriter::code_for(i).trim());
        expected.push('\n');
    }
    assert_eq!(outcome.state.generated_test_code().unwrap(), expected);
}

#[tokio::test]
async fn planner_sees_signature_and_default_docstring() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source_fixture(&dir, "mul.py", "def mul(x, y=2):\n    return x * y\n");
    let planner = ScriptedPlanner::new(TestSuite::default());

    GraphExecutor::new(planner.clone(), RecordingWriter::new())
        .run(PipelineState::new(&path, "mul"))
        .await
        .unwrap();

    let calls = planner.calls();
    let analysis: serde_json::Value = serde_json::from_str(&calls[0].analysis).unwrap();
    assert_eq!(analysis["signature"], "def mul(x, y=2):");
    assert_eq!(analysis["docstring"], "No docstring provided.");
    assert!(calls[0].function_code.contains("return x * y"));
}

#[tokio::test]
async fn malformed_inputs_reach_writer_as_null() {
    let (_dir, path) = fixture();
    let writer = RecordingWriter::new();
    let executor = GraphExecutor::new(ScriptedPlanner::new(sample_suite()), writer.clone());

    let outcome = executor.run(PipelineState::new(&path, "add")).await.unwrap();

    let plan = outcome.state.test_plan().unwrap();
    assert_eq!(plan.error_conditions[1].inputs, TestInputs::Unresolved);
    assert!(plan.happy_path_cases[0].inputs.as_resolved().is_some());

    let last: serde_json::Value = serde_json::from_str(&writer.requests()[4].test_case_json).unwrap();
    assert_eq!(last["inputs"], serde_json::Value::Null);
    assert_eq!(last["expected_outcome"]["raises"], "TypeError");
}

#[tokio::test]
async fn nested_string_inputs_reach_writer_intact() {
    let (_dir, path) = fixture();
    let suite = TestSuite::new(
        vec![pending_case("sums a matrix", r#"{"m": [[1, 2], [3, 4]]}"#, ExpectedOutcome::returns(10))],
        vec![],
        vec![],
    );
    let writer = RecordingWriter::new();
    let executor = GraphExecutor::new(ScriptedPlanner::new(suite), writer.clone());

    executor.run(PipelineState::new(&path, "add")).await.unwrap();

    let sent: serde_json::Value = serde_json::from_str(&writer.requests()[0].test_case_json).unwrap();
    assert_eq!(sent["inputs"], serde_json::json!({"m": [[1, 2], [3, 4]]}));
}

#[tokio::test]
async fn empty_plan_output_is_seed_block() {
    let (_dir, path) = fixture();
    let writer = RecordingWriter::new();
    let executor = GraphExecutor::new(ScriptedPlanner::new(TestSuite::default()), writer.clone());

    let outcome = executor.run(PipelineState::new(&path, "add")).await.unwrap();

    assert_eq!(outcome.summary.generation_steps, 0);
    assert!(writer.requests().is_empty());
    assert_eq!(
        outcome.state.generated_test_code().unwrap(),
        seed_imports(&module_path(&path), "add")
    );
}

#[tokio::test]
async fn writer_failure_aborts_without_skipping() {
    let (_dir, path) = fixture();
    let writer = RecordingWriter::failing_at(2);
    let executor = GraphExecutor::new(ScriptedPlanner::new(sample_suite()), writer.clone());

    let mut run = executor.start(PipelineState::new(&path, "add"));
    let err = loop {
        match run.step().await {
            Ok(Node::Done) => panic!("run should not complete"),
            Ok(_) => {}
            Err(e) => break e,
        }
    };

    assert!(matches!(
        err,
        PipelineError::GenerationFailed { stage: Node::GenerateSingleTest, .. }
    ));
    assert_eq!(run.current(), Node::GenerateSingleTest);
    assert_eq!(run.state().pending_len(), 3);
    assert!(!run.state().is_finalized());
    assert_eq!(writer.requests().len(), 3);
}

#[tokio::test]
async fn missing_function_stops_before_planning() {
    let (_dir, path) = fixture();
    let planner = ScriptedPlanner::new(sample_suite());
    let executor = GraphExecutor::new(planner.clone(), RecordingWriter::new());

    let err = executor.run(PipelineState::new(&path, "mul")).await.unwrap_err();

    assert!(matches!(err, PipelineError::NotFound { .. }));
    assert!(planner.calls().is_empty());
}

#[tokio::test]
async fn stepping_never_mutates_earlier_snapshots() {
    let (_dir, path) = fixture();
    let executor = GraphExecutor::new(ScriptedPlanner::new(sample_suite()), RecordingWriter::new());

    let mut run = executor.start(PipelineState::new(&path, "add"));
    let mut history = Vec::new();
    while !run.is_done() {
        let before = run.state().clone();
        let encoded = serde_json::to_value(&before).unwrap();
        run.step().await.unwrap();
        assert_eq!(serde_json::to_value(&before).unwrap(), encoded);
        history.push(before);
    }
    history.push(run.state().clone());

    // the same snapshot can be fed to a stage twice
    let ready = &history[3];
    let a = executor.execute_stage(Node::GenerateSingleTest, ready).await.unwrap();
    let b = executor.execute_stage(Node::GenerateSingleTest, ready).await.unwrap();
    assert_eq!(a.pending_len(), 4);
    assert_eq!(b.pending_len(), 4);
    assert_eq!(ready.pending_len(), 5);

    let lens: Vec<usize> = history.iter().map(PipelineState::pending_len).collect();
    assert_eq!(lens, vec![0, 0, 0, 5, 4, 3, 2, 1, 0, 0]);
}

#[tokio::test]
async fn finalized_state_is_returned_unchanged() {
    let (_dir, path) = fixture();
    let writer = RecordingWriter::new();
    let executor = GraphExecutor::new(ScriptedPlanner::new(sample_suite()), writer.clone());

    let first = executor.run(PipelineState::new(&path, "add")).await.unwrap();
    let second = executor.run(first.state.clone()).await.unwrap();

    assert_eq!(second.state, first.state);
    assert!(second.summary.visited.is_empty());
    assert_eq!(writer.requests().len(), 5);
}

#[test]
fn mermaid_text_has_loop_edges() {
    let text = GraphExecutor::mermaid();
    assert!(text.contains("generate_single_test -->|continue_generation| generate_single_test"));
    assert!(text.contains("prepare_iteration -->|finalize| finalize_file"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_generation_steps_match_plan_size(happy in 0usize..4, edge in 0usize..4, error in 0usize..4) {
        let (_dir, path) = fixture();
        let case = |n: usize| pending_case(&format!("case {n}"), "{}", ExpectedOutcome::returns(0));
        let suite = TestSuite::new(
            (0..happy).map(case).collect(),
            (happy..happy + edge).map(case).collect(),
            (happy + edge..happy + edge + error).map(case).collect(),
        );
        let total = suite.len();

        let writer = RecordingWriter::new();
        let executor = GraphExecutor::new(ScriptedPlanner::new(suite), writer.clone());
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let outcome = runtime.block_on(executor.run(PipelineState::new(&path, "add"))).unwrap();

        prop_assert_eq!(outcome.summary.generation_steps, total);
        prop_assert_eq!(outcome.state.iteration_count() as usize, total + 3);

        let expected: Vec<String> = (0..total).map(|n| format!("case {n}")).collect();
        prop_assert_eq!(writer.descriptions(), expected);
    }
}
