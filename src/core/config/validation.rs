use super::service::ConfigError;
use super::types::{AppConfig, CommandConfig};

pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    validate_required_string(&config.server.host, "server.host")?;
    validate_min_usize(config.server.max_upload_bytes, "server.max_upload_bytes", 1)?;
    for (index, origin) in config.server.cors_allowed_origins.iter().enumerate() {
        validate_required_string(origin, &format!("server.cors_allowed_origins[{}]", index))?;
    }

    validate_required_string(&config.hub.endpoint, "hub.endpoint")?;
    validate_range_u64(
        config.hub.download_timeout_secs,
        "hub.download_timeout_secs",
        1,
        86_400,
    )?;

    config
        .training
        .block_size()
        .map_err(|err| invalid("training.block_size", &err.to_string()))?;
    validate_required_string(&config.training.base_model, "training.base_model")?;
    validate_range_u64(config.training.epochs.into(), "training.epochs", 1, 10_000)?;
    validate_range_u64(config.training.batch_size.into(), "training.batch_size", 1, 65_536)?;
    validate_range_u64(config.training.save_steps.into(), "training.save_steps", 1, u32::MAX.into())?;
    validate_command(&config.training.command, "training.command")?;

    validate_command(&config.generation.command, "generation.command")?;
    validate_range_u64(config.generation.max_length.into(), "generation.max_length", 1, 1_000_000)?;
    validate_range_u64(
        config.generation.interactive_max_length.into(),
        "generation.interactive_max_length",
        1,
        1_000_000,
    )?;
    validate_range_u64(config.generation.timeout_secs, "generation.timeout_secs", 1, 86_400)?;
    let top_p = config.generation.top_p;
    if !(top_p > 0.0 && top_p <= 1.0) {
        return Err(invalid("generation.top_p", "must be in (0, 1]"));
    }

    validate_required_string(&config.remote_chat.endpoint, "remote_chat.endpoint")?;
    validate_required_string(&config.remote_chat.model, "remote_chat.model")?;
    validate_range_u64(
        config.remote_chat.max_tokens.into(),
        "remote_chat.max_tokens",
        1,
        1_000_000,
    )?;

    Ok(())
}

fn validate_command(command: &CommandConfig, path: &str) -> Result<(), ConfigError> {
    validate_required_string(&command.program, &format!("{}.program", path))
}

fn validate_required_string(value: &str, path: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(invalid(path, "value cannot be empty"));
    }
    Ok(())
}

fn validate_range_u64(value: u64, path: &str, min: u64, max: u64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(invalid(
            path,
            &format!("must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

fn validate_min_usize(value: usize, path: &str, min: usize) -> Result<(), ConfigError> {
    if value < min {
        return Err(invalid(path, &format!("must be at least {}", min)));
    }
    Ok(())
}

fn invalid(path: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn rejects_non_positive_block_size() {
        for block_size in [0, -1] {
            let mut config = AppConfig::default();
            config.training.block_size = block_size;
            let err = validate_config(&config).unwrap_err();
            assert!(err.to_string().contains("training.block_size"), "{}", err);
        }
    }

    #[test]
    fn rejects_zero_download_timeout() {
        let mut config = AppConfig::default();
        config.hub.download_timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_top_p_out_of_range() {
        let mut config = AppConfig::default();
        config.generation.top_p = 1.5;
        assert!(validate_config(&config).is_err());
        config.generation.top_p = 0.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_empty_program() {
        let mut config = AppConfig::default();
        config.training.command.program = "  ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("training.command.program"));
    }
}
