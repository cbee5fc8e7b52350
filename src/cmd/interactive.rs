//! Interactive learning command.

use anyhow::Result;
use serde_json::json;
use std::collections::BTreeMap;

use dialogue_train::config::Config;
use dialogue_train::interactive::{
    CommandSession, InteractiveFlags, InteractiveRequest, dispatch, validate_flags,
};
use dialogue_train::stories::resolve_stories;

use crate::Cli;

pub async fn cmd_interactive(
    cli: &Cli,
    config: &Config,
    core: bool,
    finetune: bool,
    skip_visualization: bool,
) -> Result<()> {
    let flags = InteractiveFlags {
        core,
        finetune,
        skip_visualization,
    };
    // Fail before any download.
    validate_flags(&flags)?;

    let stories = resolve_stories(&config.resolve(&cli.stories), cli.url.as_deref()).await?;

    let configs: Vec<_> = cli.config.iter().map(|p| config.resolve(p)).collect();
    let mut server_args = BTreeMap::new();
    server_args.insert("domain".to_string(), json!(config.resolve(&cli.domain)));
    server_args.insert("out".to_string(), json!(config.resolve(&cli.out)));
    server_args.insert("config".to_string(), json!(configs));
    server_args.insert("dump_stories".to_string(), json!(cli.dump_stories));
    server_args.insert("url".to_string(), json!(cli.url));
    server_args.insert("loglevel".to_string(), json!(cli.loglevel));
    server_args.insert("verbose".to_string(), json!(cli.verbose));
    server_args.insert("augmentation".to_string(), json!(cli.augmentation));
    server_args.insert("debug_plots".to_string(), json!(cli.debug_plots));

    let request = InteractiveRequest {
        stories,
        flags,
        extra_args: config.extra_args(),
        server_args,
    };

    let session = CommandSession::new(config.interactive_cmd(), &config.working_dir);
    dispatch(&session, &request).await
}
