use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use super::types::SamplingParams;
use crate::core::config::GenerationConfig;
use crate::core::process::{resolve_program, run_captured, ProcessError};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Model directory '{}' not found.", .0.display())]
    ModelNotFound(PathBuf),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("generator failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the decoded output, which starts with the prompt.
    async fn generate(
        &self,
        model_dir: &Path,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, GenerationError>;
}

/// Runs a generator executable once per request.
#[derive(Debug, Clone)]
pub struct ProcessGenerator {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ProcessGenerator {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            program: resolve_program(&config.command.program),
            args: config.command.args.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl TextGenerator for ProcessGenerator {
    fn name(&self) -> &str {
        "process"
    }

    async fn generate(
        &self,
        model_dir: &Path,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, GenerationError> {
        if !model_dir.is_dir() {
            return Err(GenerationError::ModelNotFound(model_dir.to_path_buf()));
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--model_dir")
            .arg(model_dir)
            .arg("--prompt")
            .arg(prompt)
            .arg("--max_length")
            .arg(params.max_length.to_string())
            .arg("--top_k")
            .arg(params.top_k.to_string())
            .arg("--top_p")
            .arg(params.top_p.to_string());

        let output = run_captured("generator", cmd, Some(self.timeout)).await?;
        if !output.success() {
            return Err(GenerationError::Failed(output.failure_detail()));
        }

        Ok(output.stdout.trim_end_matches('\n').to_string())
    }
}

/// Drops the echoed prompt from generated text and trims what is left.
///
/// Falls back to the whole trimmed text when the output does not start with
/// the prompt.
pub fn strip_prompt_echo(generated: &str, prompt: &str) -> String {
    generated
        .strip_prefix(prompt)
        .unwrap_or(generated)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CommandConfig;

    #[test]
    fn strips_prompt_prefix() {
        assert_eq!(
            strip_prompt_echo("What is Rust? A systems language.", "What is Rust?"),
            "A systems language."
        );
    }

    #[test]
    fn keeps_text_without_echo() {
        assert_eq!(strip_prompt_echo("  something else \n", "prompt"), "something else");
    }

    #[test]
    fn prompt_only_output_is_empty() {
        assert_eq!(strip_prompt_echo("hello", "hello"), "");
    }

    #[tokio::test]
    async fn missing_model_dir_is_reported() {
        let generator = ProcessGenerator::new(&GenerationConfig::default());
        let err = generator
            .generate(Path::new("/nonexistent/model"), "hi", &SamplingParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::ModelNotFound(_)));
        assert_eq!(err.to_string(), "Model directory '/nonexistent/model' not found.");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn passes_prompt_and_sampling_args() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ProcessGenerator::new(&GenerationConfig {
            command: CommandConfig {
                program: "sh".to_string(),
                args: vec!["-c".to_string(), "echo \"$4 $6 $8 ${10}\"".to_string(), "sh".to_string()],
            },
            ..GenerationConfig::default()
        });

        let output = generator
            .generate(dir.path(), "Once upon", &SamplingParams::default())
            .await
            .unwrap();

        assert_eq!(output, "Once upon 150 50 0.95");
    }
}
