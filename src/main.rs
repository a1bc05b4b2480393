use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use pdftune::core::config::AppPaths;
use pdftune::llm::{strip_prompt_echo, GenerationError, SamplingParams};
use pdftune::probe::{probe, DEFAULT_PROBE_URL};
use pdftune::state::AppState;

const DEFAULT_MODEL_DIR: &str = "./fine_tuned_model";
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Fine-tune causal language models on PDF documents and chat with them
#[derive(Parser)]
#[command(name = "pdftune", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP service
    Serve,
    /// Fine-tune a model on a PDF
    Train {
        pdf: PathBuf,
        #[arg(long, default_value = DEFAULT_MODEL_DIR)]
        output_dir: PathBuf,
        /// Overrides `training.block_size` from config.yml
        #[arg(long, allow_negative_numbers = true)]
        block_size: Option<i64>,
    },
    /// Print the text extracted from a PDF
    Extract { pdf: PathBuf },
    /// Generate a single reply from a fine-tuned model
    Chat {
        #[arg(long)]
        model_dir: PathBuf,
        #[arg(long)]
        prompt: String,
    },
    /// Chat with a fine-tuned model until `exit` or `quit`
    Interactive {
        #[arg(long, default_value = DEFAULT_MODEL_DIR)]
        model_dir: PathBuf,
    },
    /// GET an endpoint and print its status and body
    Probe {
        #[arg(long, default_value = DEFAULT_PROBE_URL)]
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let paths = Arc::new(AppPaths::new());
    pdftune::core::logging::init(&paths.log_dir);

    match cli.command {
        Command::Serve => {
            let state = Arc::new(AppState::initialize(paths)?);
            pdftune::server::serve(state).await?;
        }
        Command::Train {
            pdf,
            output_dir,
            block_size,
        } => {
            let state = AppState::initialize(paths)?;
            let pipeline = match block_size {
                Some(block_size) => state.pipeline.with_block_size(block_size),
                None => state.pipeline,
            };
            let report = pipeline.run(&pdf, &output_dir).await?;
            println!("{}", report.logs);
            println!(
                "Model saved to {} ({} blocks, {} tokens, {} dropped)",
                report.output_dir.display(),
                report.block_count,
                report.token_count,
                report.dropped_tokens
            );
        }
        Command::Extract { pdf } => {
            let state = AppState::initialize(paths)?;
            let text = state.pipeline.extractor().extract(&pdf).await?;
            print!("{}", text);
        }
        Command::Chat { model_dir, prompt } => {
            let state = AppState::initialize(paths)?;
            let params = SamplingParams::from_config(&state.config.generation);
            match state.generator.generate(&model_dir, &prompt, &params).await {
                Ok(generated) => println!("{}", strip_prompt_echo(&generated, &prompt)),
                Err(err @ GenerationError::ModelNotFound(_)) => {
                    eprintln!("Error: {}", err);
                    return Ok(ExitCode::FAILURE);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Interactive { model_dir } => {
            if !model_dir.is_dir() {
                eprintln!("Error: {}", GenerationError::ModelNotFound(model_dir));
                return Ok(ExitCode::FAILURE);
            }
            let state = AppState::initialize(paths)?;
            interactive(&state, &model_dir).await?;
        }
        Command::Probe { url } => match probe(&url, PROBE_TIMEOUT).await {
            Ok(report) => println!("{}", report),
            Err(err) => println!("Error: {}", err),
        },
    }

    Ok(ExitCode::SUCCESS)
}

async fn interactive(state: &AppState, model_dir: &Path) -> anyhow::Result<()> {
    let params = SamplingParams::interactive(&state.config.generation);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Chat with the model. Type 'exit' or 'quit' to leave.");
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(prompt) = lines.next_line().await? else {
            break;
        };
        if prompt.eq_ignore_ascii_case("exit") || prompt.eq_ignore_ascii_case("quit") {
            break;
        }

        match state.generator.generate(model_dir, &prompt, &params).await {
            Ok(generated) => println!("Model: {}", generated.trim()),
            Err(err) => eprintln!("Error: {}", err),
        }
        println!("{}", "-".repeat(50));
    }

    Ok(())
}
