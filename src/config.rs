use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::browser::PortalBrowser;
use crate::error::Result;

pub struct BrowserConfig {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub chrome_path: Option<String>,
    /// Default timeout for page lookups and navigation (default: 30s).
    pub default_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            viewport_width: 1920,
            viewport_height: 1080,
            chrome_path: None,
            default_timeout: Duration::from_secs(30),
        }
    }
}

pub struct BrowserBuilder {
    config: BrowserConfig,
}

impl BrowserBuilder {
    pub fn new() -> Self {
        Self {
            config: BrowserConfig::default(),
        }
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<String>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    /// Set the default timeout for page lookups and navigation.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    pub fn build_config(self) -> BrowserConfig {
        self.config
    }

    pub async fn build(self) -> Result<PortalBrowser> {
        PortalBrowser::launch(self.build_config()).await
    }
}

impl Default for BrowserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Every fixed wait the fill engine performs.
///
/// The defaults are tuned to the portal's rendering latency. None of them
/// back off; each one is slept exactly as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    /// Interval between element lookups in `await_locate`.
    pub locate_interval: Duration,
    /// Number of lookups `await_locate` makes before giving up.
    pub locate_attempts: u32,
    /// Pause between clearing an input and setting its final value.
    pub type_settle: Duration,
    /// Same pause for textareas.
    pub textarea_settle: Duration,
    /// Pause after the tab-out workaround.
    pub tab_out_settle: Duration,
    /// Pause after clicking a multi-select open.
    pub multi_open_settle: Duration,
    /// Pause after committing one chip with Tab.
    pub multi_commit_settle: Duration,
    /// Pause after emptying the multi-select buffer.
    pub multi_clear_settle: Duration,
    /// Pause between typing into a dropdown and looking for its listbox.
    pub dropdown_settle: Duration,
    /// Interval between listbox lookups.
    pub popup_interval: Duration,
    /// Number of listbox lookups.
    pub popup_attempts: u32,
    /// Pause after the dropdown's Tab fallback.
    pub dropdown_tab_settle: Duration,
    /// Pause after each add-row click sequence.
    pub row_click_settle: Duration,
    /// Pause after the last add-row click sequence.
    pub row_render_settle: Duration,
    /// Pause between table growth and the first field.
    pub post_growth_settle: Duration,
    /// Interval between `document.readyState` checks.
    pub load_poll: Duration,
    /// Pause before each field of the initial pass.
    pub field_pacing: Duration,
    /// Pause before the retry pass starts.
    pub retry_settle: Duration,
    /// Pause before each retried field.
    pub retry_pacing: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            locate_interval: Duration::from_millis(100),
            locate_attempts: 5,
            type_settle: Duration::from_millis(300),
            textarea_settle: Duration::from_millis(300),
            tab_out_settle: Duration::from_millis(300),
            multi_open_settle: Duration::from_millis(500),
            multi_commit_settle: Duration::from_millis(500),
            multi_clear_settle: Duration::from_millis(1000),
            dropdown_settle: Duration::from_millis(250),
            popup_interval: Duration::from_millis(100),
            popup_attempts: 5,
            dropdown_tab_settle: Duration::from_millis(300),
            row_click_settle: Duration::from_millis(750),
            row_render_settle: Duration::from_millis(1500),
            post_growth_settle: Duration::from_millis(2000),
            load_poll: Duration::from_millis(100),
            field_pacing: Duration::from_millis(200),
            retry_settle: Duration::from_millis(1000),
            retry_pacing: Duration::from_millis(300),
        }
    }
}

/// Portal quirk: controls whose id matches only commit their value after a
/// Tab keypress.
const TAB_OUT_PATTERN: &str =
    r"(__input5-__clone|__cas0-__clone|__input6-__clone|__input7-__clone).*-inner";

static TAB_OUT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TAB_OUT_PATTERN).expect("Invalid regex"));

/// Layout and timing knobs for one portal form.
#[derive(Debug, Clone)]
pub struct FillConfig {
    pub timings: Timings,
    /// Rows added to the destination table before filling.
    pub row_count: u32,
    pub add_row_selector: String,
    pub add_row_inner_selector: String,
    /// Id token that marks a field as a multi-select box.
    pub multi_select_marker: String,
    /// Class names the portal puts on multi-select inputs.
    pub multi_select_classes: Vec<String>,
    /// Class name of auto-growing textareas.
    pub grow_textarea_class: String,
    pub listbox_fallback_selector: String,
    pub option_selector: String,
    /// Field ids that need the tab-out workaround.
    pub tab_out_patterns: Vec<Regex>,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            timings: Timings::default(),
            row_count: 10,
            add_row_selector: "#__button20".into(),
            add_row_inner_selector: "#__button20-inner".into(),
            multi_select_marker: "__box".into(),
            multi_select_classes: vec![
                "sapMInputBaseInner".into(),
                "sapMMultiComboBoxInner".into(),
            ],
            grow_textarea_class: "sapMTextAreaGrow".into(),
            listbox_fallback_selector: r#"[role="listbox"]"#.into(),
            option_selector: r#"[role="option"]"#.into(),
            tab_out_patterns: vec![TAB_OUT_REGEX.clone()],
        }
    }
}

impl FillConfig {
    pub fn builder() -> FillConfigBuilder {
        FillConfigBuilder::new()
    }

    pub fn needs_tab_out(&self, id: &str) -> bool {
        self.tab_out_patterns.iter().any(|re| re.is_match(id))
    }
}

pub struct FillConfigBuilder {
    config: FillConfig,
}

impl FillConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: FillConfig::default(),
        }
    }

    pub fn timings(mut self, timings: Timings) -> Self {
        self.config.timings = timings;
        self
    }

    pub fn row_count(mut self, rows: u32) -> Self {
        self.config.row_count = rows;
        self
    }

    pub fn add_row_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.add_row_selector = selector.into();
        self
    }

    pub fn add_row_inner_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.add_row_inner_selector = selector.into();
        self
    }

    /// Replace the tab-out workaround list.
    pub fn tab_out_patterns(mut self, patterns: Vec<Regex>) -> Self {
        self.config.tab_out_patterns = patterns;
        self
    }

    pub fn build(self) -> FillConfig {
        self.config
    }
}

impl Default for FillConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
