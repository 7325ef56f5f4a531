use std::path::PathBuf;

use clap::Args;

use crate::config::{Overrides, Settings};
use crate::error::ExitError;
use crate::fizzy::FizzyClient;
use crate::relay::{Agent, Scheduler, Shutdown};
use crate::webhook::OpenClawClient;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Fizzy base URL (e.g. https://app.fizzy.do)
    #[arg(long)]
    pub url: Option<String>,
    /// Fizzy personal access token (single agent mode)
    #[arg(long)]
    pub token: Option<String>,
    /// Config file for multi-agent mode (TOML, YAML or JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// OpenClaw webhook base URL
    #[arg(long)]
    pub webhook_url: Option<String>,
    /// OpenClaw webhook token
    #[arg(long)]
    pub webhook_token: Option<String>,
    /// Print webhook requests instead of sending them, and never mark notifications read
    #[arg(long)]
    pub dry_run: bool,
    /// Print full request/response headers and bodies
    #[arg(long)]
    pub verbose: bool,
}

impl RunArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            token: self.token.clone(),
            config: self.config.clone(),
            webhook_url: self.webhook_url.clone(),
            webhook_token: self.webhook_token.clone(),
            dry_run: self.dry_run,
            verbose: self.verbose,
        }
    }

    pub fn execute(&self) -> anyhow::Result<()> {
        let settings = Settings::resolve(&self.overrides())?;

        let agents = settings
            .agents
            .iter()
            .map(|a| {
                let client = FizzyClient::new(&settings.url, &a.token, settings.verbose);
                Agent::new(&a.name, client, settings.dry_run)
            })
            .collect();

        // Dry-run never posts, so an unconfigured webhook only shows up in
        // the "would POST to" line.
        let (webhook_url, webhook_token) = settings
            .webhook
            .as_ref()
            .map_or(("", ""), |w| (w.url.as_str(), w.token.as_str()));
        let sink = OpenClawClient::new(webhook_url, webhook_token, settings.verbose);

        let shutdown = Shutdown::new();
        let handler = shutdown.clone();
        ctrlc::set_handler(move || {
            tracing::info!("received interrupt signal");
            handler.trigger();
        })
        .map_err(|e| ExitError::Other(format!("installing signal handler: {e}")))?;

        if settings.dry_run {
            tracing::info!("dry run: notifications stay unread and nothing is posted");
        }

        Scheduler::new(agents, sink, settings.intervals, settings.dry_run).run(&shutdown)?;
        Ok(())
    }
}
