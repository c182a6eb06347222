use autotest_cli::{save_test_file, test_file_path};
use autotest_core::{GraphExecutor, PipelineState};
use autotest_test_utils::{sample_suite, write_source_fixture, RecordingWriter, ScriptedPlanner, ADD_SOURCE};
use std::path::Path;

#[tokio::test]
async fn generated_module_is_saved_beside_mirrored_source() {
    let workspace = tempfile::tempdir().unwrap();
    let source = write_source_fixture(&workspace, "example_code/code.py", ADD_SOURCE);

    let executor = GraphExecutor::new(ScriptedPlanner::new(sample_suite()), RecordingWriter::new());
    let outcome = executor.run(PipelineState::new(&source, "add")).await.unwrap();
    let code = outcome.state.generated_test_code().unwrap();

    let tests_dir = workspace.path().join("tests");
    let relative = Path::new("example_code/code.py");
    let saved = save_test_file(code, relative, "add", &tests_dir).unwrap();

    assert_eq!(saved, test_file_path(relative, "add", &tests_dir));
    assert!(saved.ends_with("example_code/code/test_add.py"));

    let written = std::fs::read_to_string(&saved).unwrap();
    assert!(written.starts_with("import pytest\n"));
    assert_eq!(written.matches("def test_case_").count(), 5);
}
