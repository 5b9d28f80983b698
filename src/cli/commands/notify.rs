use clap::Args;

use office_hooks::infra::aws::{ParameterStore, DEFAULT_REGION};
use office_hooks::infra::slack::SlackWebhook;

#[derive(Debug, Args)]
pub struct SlackArgs {
    /// Incoming webhook URL
    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    pub webhook: String,

    pub text: String,

    /// Display name for the post (defaults to Notification-Bot)
    #[arg(long)]
    pub username: Option<String>,
}

#[derive(Debug, Args)]
pub struct ParamsArgs {
    /// Parameter name, e.g. /prod/chatwork/token
    pub key: String,

    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    pub region: String,
}

pub async fn run_slack(args: SlackArgs) -> anyhow::Result<()> {
    SlackWebhook::new(args.webhook)
        .post(&args.text, args.username.as_deref())
        .await?;
    Ok(())
}

pub async fn run_params(args: ParamsArgs) -> anyhow::Result<()> {
    let store = ParameterStore::new(&args.region).await;
    println!("{}", store.get(&args.key).await?);
    Ok(())
}
