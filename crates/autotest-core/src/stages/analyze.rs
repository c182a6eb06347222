use crate::error::PipelineError;
use crate::state::PipelineState;

/// Locate the target function and record its descriptor
///
/// Resets the iteration counter. Extraction failures end the run.
///
/// # Errors
/// [`PipelineError::NotFound`], [`PipelineError::ExtractionFailed`] or
/// [`PipelineError::Io`] from the extractor.
pub fn analyze(state: &PipelineState) -> Result<PipelineState, PipelineError> {
    tracing::info!(
        "Analyzing function '{}' in {}",
        state.function_name(),
        state.file_path().display()
    );

    let descriptor = autotest_extract::extract(state.file_path(), state.function_name())
        .map_err(|e| {
            tracing::error!("Analysis failed: {}", e);
            PipelineError::from(e)
        })?;

    tracing::debug!("Extracted signature: {}", descriptor.signature);
    Ok(state.clone().with_analysis(descriptor))
}
