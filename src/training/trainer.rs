use std::ffi::OsString;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;

use super::TrainingError;
use crate::core::config::TrainingConfig;
use crate::core::process::{resolve_program, run_captured};

/// Everything an external trainer needs to fine-tune one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingJob {
    pub dataset_path: PathBuf,
    pub output_dir: PathBuf,
    pub base_model: String,
    pub epochs: u32,
    pub batch_size: u32,
    pub save_steps: u32,
    pub save_total_limit: u32,
}

impl TrainingJob {
    pub fn new(config: &TrainingConfig, dataset_path: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            dataset_path,
            output_dir,
            base_model: config.base_model.clone(),
            epochs: config.epochs,
            batch_size: config.batch_size,
            save_steps: config.save_steps,
            save_total_limit: config.save_total_limit,
        }
    }

    pub fn to_args(&self) -> Vec<OsString> {
        vec![
            "--dataset".into(),
            self.dataset_path.clone().into_os_string(),
            "--output_dir".into(),
            self.output_dir.clone().into_os_string(),
            "--base_model".into(),
            self.base_model.clone().into(),
            "--epochs".into(),
            self.epochs.to_string().into(),
            "--batch_size".into(),
            self.batch_size.to_string().into(),
            "--save_steps".into(),
            self.save_steps.to_string().into(),
            "--save_total_limit".into(),
            self.save_total_limit.to_string().into(),
        ]
    }
}

#[async_trait]
pub trait TrainerBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Runs the job to completion and returns the trainer's output.
    async fn train(&self, job: &TrainingJob) -> Result<String, TrainingError>;
}

/// Runs training in a child process.
#[derive(Debug, Clone)]
pub struct ProcessTrainer {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessTrainer {
    pub fn new(config: &TrainingConfig) -> Self {
        Self {
            program: resolve_program(&config.command.program),
            args: config.command.args.clone(),
        }
    }
}

#[async_trait]
impl TrainerBackend for ProcessTrainer {
    fn name(&self) -> &str {
        "process"
    }

    async fn train(&self, job: &TrainingJob) -> Result<String, TrainingError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).args(job.to_args());

        tracing::info!(
            "Starting trainer {} for {}",
            self.program.display(),
            job.output_dir.display()
        );
        let output = run_captured("trainer", cmd, None).await?;
        tracing::info!("Trainer exited with {}", output.status);

        if output.success() {
            Ok(output.stdout)
        } else {
            Err(TrainingError::TrainerFailed {
                logs: output.failure_detail(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CommandConfig;

    fn job() -> TrainingJob {
        TrainingJob::new(
            &TrainingConfig::default(),
            PathBuf::from("out/dataset.json"),
            PathBuf::from("out"),
        )
    }

    #[test]
    fn args_carry_training_settings() {
        let args: Vec<String> = job()
            .to_args()
            .into_iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();

        assert_eq!(
            args,
            vec![
                "--dataset",
                "out/dataset.json",
                "--output_dir",
                "out",
                "--base_model",
                "gpt2",
                "--epochs",
                "3",
                "--batch_size",
                "4",
                "--save_steps",
                "10000",
                "--save_total_limit",
                "2",
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_trainer_returns_stdout() {
        let config = TrainingConfig {
            command: CommandConfig {
                program: "sh".to_string(),
                args: vec!["-c".to_string(), "echo trained $4".to_string(), "sh".to_string()],
            },
            ..TrainingConfig::default()
        };

        let logs = ProcessTrainer::new(&config).train(&job()).await.unwrap();

        assert_eq!(logs, "trained out\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_trainer_reports_failure_output() {
        let config = TrainingConfig {
            command: CommandConfig {
                program: "sh".to_string(),
                args: vec!["-c".to_string(), "echo out of memory 1>&2; exit 1".to_string()],
            },
            ..TrainingConfig::default()
        };

        let err = ProcessTrainer::new(&config).train(&job()).await.unwrap_err();

        assert_eq!(err.logs(), Some("out of memory"));
    }
}
