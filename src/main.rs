use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use luct_dashboard::{view, Access, ApiClient, Config, Dashboard, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "luct_dashboard=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let credentials = config.require_credentials()?;
    let api = ApiClient::new(&config.api_url);
    tracing::info!(api = %config.api_url, "connecting");

    let session = Session::init(api, credentials).await?;
    let Access::Dashboard(role, view_config) = view::resolve(session.current_user()) else {
        anyhow::bail!("not signed in");
    };

    let mut dashboard = Dashboard::new(&session)?.with_export_timeout(config.export_timeout);
    dashboard.set_search(config.search.clone());
    dashboard.mount().await;

    for &tab in view_config.tabs {
        if let Some(rows) = dashboard.tab(tab) {
            tracing::info!(%role, tab = tab.title(), rows = rows.len(), "tab loaded");
            println!("== {} ==", tab.title());
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    if env::var("LUCT_EXPORT").is_ok_and(|v| v == "1") {
        let path = dashboard.export_reports(&config.export_dir).await?;
        tracing::info!(path = %path.display(), "reports exported");
    }

    for notice in dashboard.take_notices() {
        tracing::info!(title = notice.title, message = %notice.message, "notice");
    }
    Ok(())
}
