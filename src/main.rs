use review_relay::{
    app,
    config::Config,
    services::{Directory, GithubClient, GithubService, JiraClient, JiraService, SlackClient, SlackService},
    state::AppState,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "review_relay=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting review-relay service...");

    dotenv::dotenv().ok();
    let config = Config::from_env()?;
    info!(
        "Loaded configuration: {} mapped user(s), {} blocklisted, {} environment",
        config.users.len(),
        config.blocklist.len(),
        config.environment
    );

    let directory = Directory::from_config(&config);
    let slack_service = SlackService::new(Arc::new(SlackClient::new(&config)), directory.clone());
    let github_service = GithubService::new(
        Arc::new(GithubClient::new(&config)),
        directory.clone(),
        slack_service.clone(),
    );
    let jira_service = JiraService::new(Arc::new(JiraClient::new(&config)), directory, slack_service);

    let app_state = Arc::new(AppState {
        config: config.clone(),
        github_service,
        jira_service,
    });

    let addr = format!("{}:{}", config.server_host, config.server_port);
    info!("Starting server on http://{}", addr);

    axum::Server::bind(&addr.parse()?)
        .serve(app(app_state).into_make_service())
        .await?;

    Ok(())
}
