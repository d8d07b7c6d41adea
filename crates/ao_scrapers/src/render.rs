use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::debug;

use ao_core::{Error, Result};

/// One headless browser session. The session owns the websocket handler
/// task and must be `close()`d on every path that launched it.
pub(crate) struct RenderSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

pub(crate) struct RenderOptions {
    pub user_agent: String,
    pub navigation_timeout: Duration,
    pub settle_delay: Duration,
    pub stealth: bool,
}

impl RenderSession {
    /// Launch a headless browser. A launch failure means the rendering
    /// backend itself is unavailable, which callers must not swallow.
    pub async fn launch(stealth: bool) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(1920, 1080)
            .args(vec!["--disable-dev-shm-usage", "--disable-gpu"]);
        if stealth {
            builder = builder.arg("--disable-blink-features=AutomationControlled");
        }
        let config = builder.build().map_err(Error::RenderUnavailable)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::RenderUnavailable(e.to_string()))?;
        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        Ok(Self { browser, handler })
    }

    /// Navigate to `url` and return the script-executed document HTML.
    /// The page is closed on success and failure alike.
    pub async fn fetch_html(&self, url: &str, options: &RenderOptions) -> Result<String> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(render_err)?;

        let html = Self::drive(&page, url, options).await;
        if let Err(e) = page.close().await {
            debug!("Failed to close page for {}: {}", url, e);
        }
        html
    }

    async fn drive(page: &Page, url: &str, options: &RenderOptions) -> Result<String> {
        if options.stealth {
            page.enable_stealth_mode().await.map_err(render_err)?;
        }
        page.set_user_agent(options.user_agent.clone())
            .await
            .map_err(render_err)?;

        timeout(options.navigation_timeout, async {
            page.goto(url).await.map_err(render_err)?;
            page.wait_for_navigation().await.map_err(render_err)?;
            Ok::<_, Error>(())
        })
        .await
        .map_err(|_| Error::Render(format!("navigation to {} timed out", url)))??;

        // Give dynamic content a moment to land before reading the DOM.
        sleep(options.settle_delay).await;

        page.content().await.map_err(render_err)
    }

    pub async fn close(mut self) {
        let _ = self.browser.close().await;
        self.handler.abort();
    }
}

fn render_err(e: chromiumoxide::error::CdpError) -> Error {
    Error::Render(e.to_string())
}
