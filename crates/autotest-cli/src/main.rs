use anyhow::{Context, Result};
use autotest_cli::logging::{self, LogFormat};
use autotest_cli::{command, save_test_file, GenerateArgs};
use autotest_core::{
    AutotestConfig, DirectoryTemplates, GraphExecutor, LlmTestPlanner, LlmTestWriter,
    OpenAiChatModel, PipelineState,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = command().get_matches();

    let format = if matches.get_flag("log-json") {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logging::init(matches.get_flag("verbose"), format);

    let result = match matches.subcommand() {
        Some(("generate", args)) => {
            let args = GenerateArgs::from_matches(args).context("missing generate arguments")?;
            generate(args).await
        }
        Some(("list", args)) => {
            let file = args
                .get_one::<std::path::PathBuf>("file")
                .context("missing file argument")?;
            list(file)
        }
        Some(("graph", _)) => {
            print!("{}", GraphExecutor::mermaid());
            Ok(())
        }
        _ => {
            command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}

async fn generate(args: GenerateArgs) -> Result<()> {
    let mut config = AutotestConfig::load(args.config.as_deref())?;
    if let Some(model) = args.model {
        config = config.with_model(model);
    }
    if let Some(dir) = args.prompts_dir {
        config = config.with_prompts_dir(dir);
    }
    if let Some(dir) = args.tests_dir {
        config = config.with_tests_dir(dir);
    }
    tracing::debug!("Configuration: {:?}", config);

    let model = Arc::new(OpenAiChatModel::from_config(&config)?);
    let templates = DirectoryTemplates::new(&config.prompts_dir);
    let planner = LlmTestPlanner::new(model.clone(), &templates)?;
    let writer = LlmTestWriter::new(model, &templates)?;

    tracing::info!("Building pipeline for '{}' in {}", args.function, args.file.display());
    let executor = GraphExecutor::new(Arc::new(planner), Arc::new(writer));
    let outcome = executor
        .run(PipelineState::new(&args.file, args.function.as_str()))
        .await?;

    if let Some(path) = &args.dump_state {
        let json = serde_json::to_string_pretty(&outcome.state)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write state to {}", path.display()))?;
    }

    let code = outcome
        .state
        .generated_test_code()
        .context("pipeline finished without generated code")?;

    if args.dry_run {
        print!("{code}");
    } else {
        let path = save_test_file(code, &args.file, &args.function, &config.tests_dir)
            .with_context(|| format!("failed to save tests under {}", config.tests_dir.display()))?;
        println!("{}", path.display());
    }
    Ok(())
}

fn list(file: &std::path::Path) -> Result<()> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    for name in autotest_extract::list_functions(&source)? {
        println!("{name}");
    }
    Ok(())
}
