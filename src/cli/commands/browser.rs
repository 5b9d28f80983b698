use clap::Args;

use office_hooks::core::browser::BrowserProfile;
use office_hooks::infra::webdriver::{WebDriverClient, DEFAULT_WEBDRIVER_URL};

#[derive(Debug, Args)]
pub struct BrowserArgs {
    /// chromedriver endpoint
    #[arg(long, env = "WEBDRIVER_URL", default_value = DEFAULT_WEBDRIVER_URL)]
    pub webdriver: String,

    /// Use the Lambda download directory (also implied by AWS_LAMBDA_FUNCTION_NAME)
    #[arg(long)]
    pub lambda: bool,

    /// Page to open once the session is up
    #[arg(long)]
    pub url: Option<String>,
}

pub async fn run(args: BrowserArgs) -> anyhow::Result<()> {
    let is_lambda = args.lambda || std::env::var_os("AWS_LAMBDA_FUNCTION_NAME").is_some();
    let profile = BrowserProfile::for_environment(is_lambda);

    let session = WebDriverClient::new(args.webdriver)
        .start_session(&profile)
        .await?;

    // Close the session even when navigation fails.
    let visited = match &args.url {
        Some(url) => match session.navigate(url).await {
            Ok(()) => session.current_url().await.map(Some),
            Err(e) => Err(e),
        },
        None => Ok(None),
    };

    println!("{}", session.session_id());
    let closed = session.close().await;

    if let Some(current) = visited? {
        println!("{}", current);
    }
    closed?;
    Ok(())
}
