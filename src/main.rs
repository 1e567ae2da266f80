//! portal-fill
//!
//! Fetches a waste profile, maps it to portal field ids and fills the
//! portal form in a Chromium tab.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use portal_filler::client::DEFAULT_TARGET_PORTAL;
use portal_filler::{
    respond, Error, FieldMapping, FillConfig, FillResponse, Filler, PortalBrowser, PortalClient,
    Request, Result,
};

#[derive(Parser)]
#[command(name = "portal-fill")]
#[command(about = "Fill a SAP-UI5 portal form from a mapped waste profile")]
struct Cli {
    /// Profile to fetch and map
    #[arg(short, long, required_unless_present = "mapping_file")]
    profile_id: Option<String>,

    /// Read the field mapping from a JSON file instead of the mapping service
    #[arg(short, long)]
    mapping_file: Option<PathBuf>,

    #[arg(long, env = "PORTAL_PROFILE_URL")]
    profile_url: Option<String>,

    #[arg(long, env = "PORTAL_MAPPING_URL")]
    mapping_url: Option<String>,

    #[arg(long, default_value = DEFAULT_TARGET_PORTAL)]
    target_portal: String,

    /// Portal form URL; an open tab containing it is reused
    #[arg(short = 'u', long)]
    portal_url: String,

    /// DevTools websocket of a running Chrome to attach to
    #[arg(long)]
    connect: Option<String>,

    #[arg(long)]
    headless: bool,

    #[arg(long)]
    chrome_path: Option<String>,

    /// Rows to add to the destination table before filling
    #[arg(long, default_value_t = 10)]
    rows: u32,

    /// Give up on the whole fill after this many seconds
    #[arg(long, default_value_t = 240)]
    timeout_secs: u64,

    /// Save a full-page screenshot after filling
    #[arg(long)]
    screenshot: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(response) => report(&response),
        Err(e) => {
            eprintln!("Error processing data: {e}");
            1
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<FillResponse> {
    let mapping = load_mapping(&cli).await?;

    let mut browser_config = PortalBrowser::builder().headless(cli.headless);
    if let Some(ref path) = cli.chrome_path {
        browser_config = browser_config.chrome_path(path);
    }
    let browser = match cli.connect {
        Some(ref ws_url) => PortalBrowser::connect(ws_url, browser_config.build_config()).await?,
        None => browser_config.build().await?,
    };

    let page = match browser.find_page(&cli.portal_url).await? {
        Some(page) => page,
        None => browser.open(&cli.portal_url).await?,
    };
    info!(title = %page.title().await.unwrap_or_default(), "filling portal page");

    let config = FillConfig::builder().row_count(cli.rows).build();
    let filler = Arc::new(Filler::new(page.clone(), config));
    let (responder, rx) = respond::channel();

    let fill_task = {
        let filler = Arc::clone(&filler);
        let responder = responder.clone();
        tokio::spawn(async move {
            filler
                .serve(Request::FillForm { data: mapping }, responder)
                .await
        })
    };
    let timeout = Duration::from_secs(cli.timeout_secs);
    let timer_task = tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        if responder.respond(FillResponse::Error {
            error: "Form fill timed out".into(),
        }) {
            warn!(?timeout, "form fill timed out");
        }
    });

    let response = rx
        .await
        .map_err(|_| Error::RunAbort("fill task ended without a response".into()))?;
    timer_task.abort();
    fill_task.abort();

    if let Some(path) = cli.screenshot {
        page.screenshot_to_file(&path).await?;
        info!(path = %path.display(), "saved screenshot");
    }
    Ok(response)
}

async fn load_mapping(cli: &Cli) -> Result<FieldMapping> {
    if let Some(ref path) = cli.mapping_file {
        let text = tokio::fs::read_to_string(path).await?;
        return Ok(serde_json::from_str(&text)?);
    }

    let (Some(profile_url), Some(mapping_url)) = (&cli.profile_url, &cli.mapping_url) else {
        return Err(Error::Http(
            "--profile-url and --mapping-url (or PORTAL_PROFILE_URL / PORTAL_MAPPING_URL) are required"
                .into(),
        ));
    };
    let profile_id = cli.profile_id.as_deref().unwrap_or_default();

    let client = PortalClient::new(profile_url, mapping_url).target_portal(&cli.target_portal);
    let profile = client.fetch_profile(profile_id).await?;

    let field = |key: &str| profile.get(key).and_then(Value::as_str).unwrap_or("N/A");
    info!(
        id = %profile_label(&serde_json::Value::Object(profile.clone()), profile_id),
        name = field("Name"),
        waste_stream = field("WasteStreamDescription"),
        process = field("ProcessGeneratingTheWaste"),
        "fetched profile"
    );

    client.map_profile(&profile).await
}

/// The profile id for logs: strings unquoted, numbers as written.
fn profile_label(profile: &Value, fallback: &str) -> String {
    match profile.get("CustomerProfile_id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Null) | None => fallback.to_string(),
        Some(other) => other.to_string(),
    }
}

fn report(response: &FillResponse) -> i32 {
    if let Ok(json) = serde_json::to_string_pretty(response) {
        println!("{json}");
    }
    match response {
        FillResponse::Success { .. } => {
            println!("Form filled successfully!");
            0
        }
        FillResponse::Partial { failed_fields, .. } => {
            println!("Partially filled. Failed fields: {}", failed_fields.join(", "));
            0
        }
        FillResponse::Error { error } => {
            eprintln!("Error filling form: {error}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_label_is_unquoted() {
        assert_eq!(profile_label(&json!({"CustomerProfile_id": "123"}), "x"), "123");
        assert_eq!(profile_label(&json!({"CustomerProfile_id": 456}), "x"), "456");
        assert_eq!(profile_label(&json!({"Name": "n"}), "789"), "789");
    }
}
