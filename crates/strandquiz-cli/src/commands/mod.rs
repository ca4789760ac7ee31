pub mod catalog;
pub mod init;
pub mod strands;
pub mod take;
pub mod validate;

use anyhow::Result;

use strandquiz_client::{load_config_from, QuizConfig};

use crate::ServiceArgs;

/// Load the config file, then apply command-line overrides.
pub fn load_config(args: &ServiceArgs) -> Result<QuizConfig> {
    let mut config = load_config_from(args.config.as_deref())?;
    if let Some(url) = &args.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(dir) = &args.questions_dir {
        config.questions_dir = Some(dir.clone());
    }
    tracing::debug!(
        api = %config.api_base_url,
        questions_dir = ?config.questions_dir,
        "configuration loaded"
    );
    Ok(config)
}
