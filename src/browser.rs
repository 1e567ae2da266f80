use chromiumoxide::browser::{Browser as CrBrowser, BrowserConfig as CrBrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use tracing::{debug, info};

use crate::config::{BrowserBuilder, BrowserConfig};
use crate::error::{Error, Result};
use crate::page::Page;

/// Chrome flags that improve performance without affecting functionality.
const PERF_ARGS: &[&str] = &[
    "disable-gpu",
    "metrics-recording-only",
    "mute-audio",
    "no-default-browser-check",
    "disable-client-side-phishing-detection",
    "disable-popup-blocking",
    "disable-prompt-on-repost",
];

/// A Chromium instance hosting the portal, either launched here or attached to.
pub struct PortalBrowser {
    browser: CrBrowser,
    default_timeout: std::time::Duration,
    _handler_task: tokio::task::JoinHandle<()>,
}

impl PortalBrowser {
    /// Create a new BrowserBuilder for configuring and launching a browser.
    pub fn builder() -> BrowserBuilder {
        BrowserBuilder::new()
    }

    /// Launch a browser instance with the given configuration.
    pub async fn launch(config: BrowserConfig) -> Result<Self> {
        let mut builder = CrBrowserConfig::builder();

        if config.headless {
            builder = builder.new_headless_mode().no_sandbox();
        } else {
            builder = builder.with_head().no_sandbox();
        }

        for arg in PERF_ARGS {
            builder = builder.arg(*arg);
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder = builder.viewport(Viewport {
            width: config.viewport_width,
            height: config.viewport_height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: false,
            has_touch: false,
        });

        let cr_config = builder
            .build()
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let (browser, mut handler) = CrBrowser::launch(cr_config)
            .await
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        info!(headless = config.headless, "browser launched");
        Ok(Self {
            browser,
            default_timeout: config.default_timeout,
            _handler_task: handler_task,
        })
    }

    /// Attach to a Chrome started with `--remote-debugging-port`, e.g. one
    /// where the user is already logged in to the portal.
    pub async fn connect(ws_url: &str, config: BrowserConfig) -> Result<Self> {
        let (mut browser, mut handler) = CrBrowser::connect(ws_url)
            .await
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        // Tabs that existed before we attached are only listed once discovered.
        let targets = browser.fetch_targets().await?;
        info!(ws_url, targets = targets.len(), "attached to running browser");
        Ok(Self {
            browser,
            default_timeout: config.default_timeout,
            _handler_task: handler_task,
        })
    }

    /// Open a new page (tab) navigated to the given URL.
    pub async fn open(&self, url: &str) -> Result<Page> {
        let cr_page = tokio::time::timeout(self.default_timeout, self.browser.new_page(url))
            .await
            .map_err(|_| Error::Timeout(format!("opening {url}")))?
            .map_err(|e| Error::NavigationError(e.to_string()))?;
        Ok(Page::new(cr_page))
    }

    /// Find an open tab whose URL contains `fragment`.
    pub async fn find_page(&self, fragment: &str) -> Result<Option<Page>> {
        for page in self.pages().await? {
            let url = match page.url().await {
                Ok(url) => url,
                Err(e) => {
                    debug!(error = %e, "skipping page without URL");
                    continue;
                }
            };
            if url.contains(fragment) {
                debug!(url, "found portal tab");
                return Ok(Some(page));
            }
        }
        Ok(None)
    }

    /// Return all currently open pages (tabs).
    pub async fn pages(&self) -> Result<Vec<Page>> {
        let cr_pages = self.browser.pages().await?;
        Ok(cr_pages.into_iter().map(Page::new).collect())
    }
}
