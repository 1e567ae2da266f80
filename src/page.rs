use std::path::Path;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::Page as CrPage;
use chromiumoxide::page::ScreenshotParams;
use serde::de::DeserializeOwned;

use crate::dom::Dom;
use crate::element::{DomEvent, ElementInfo, ElementRef, FrameRef};
use crate::error::{Error, Result};

/// Helpers injected in front of every element script. `__resolve` turns a
/// serialized [`ElementRef`] back into a node, or `null`.
const RESOLVE_JS: &str = r#"
    const __docOf = (frame) => {
        if (frame === 'top') return document;
        const f = document.getElementsByTagName('iframe')[frame.frame];
        if (!f) return null;
        try {
            return f.contentDocument || (f.contentWindow && f.contentWindow.document) || null;
        } catch (e) {
            return null;
        }
    };
    const __resolve = (ref) => {
        const doc = __docOf(ref.frame);
        if (!doc) return null;
        if ('id' in ref.target) return doc.getElementById(ref.target.id);
        if ('selector' in ref.target) return doc.querySelector(ref.target.selector);
        const scope = __resolve(ref.target.within.scope);
        return scope ? scope.querySelector(ref.target.within.selector) : null;
    };
"#;

/// Wrapper around a chromiumoxide Page that drives the portal document.
#[derive(Clone)]
pub struct Page {
    inner: CrPage,
}

impl Page {
    pub(crate) fn new(inner: CrPage) -> Self {
        Self { inner }
    }

    /// Returns a reference to the underlying chromiumoxide Page.
    pub fn inner(&self) -> &CrPage {
        &self.inner
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Get the current page URL.
    pub async fn url(&self) -> Result<String> {
        self.inner
            .url()
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?
            .ok_or_else(|| Error::NavigationError("No URL found".into()))
    }

    /// Get the current page title.
    pub async fn title(&self) -> Result<String> {
        let result = self
            .inner
            .evaluate("document.title")
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        match result.into_value::<String>() {
            Ok(title) => Ok(title),
            Err(_) => Ok(String::new()),
        }
    }

    /// Take a screenshot and save it to a file.
    pub async fn screenshot_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        self.inner
            .save_screenshot(params, path)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        Ok(())
    }

    // ── Script plumbing ─────────────────────────────────────────────

    /// Evaluate an expression that returns a `JSON.stringify`'d value.
    async fn eval_json<T: DeserializeOwned>(&self, js: String) -> Result<T> {
        let result = self
            .inner
            .evaluate(js)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        let json: String = result
            .into_value()
            .map_err(|e| Error::JsError(e.to_string()))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Run `body` with `el` bound to the resolved element. Throws in the page
    /// when the element is gone.
    async fn on_element<T: DeserializeOwned>(&self, el: &ElementRef, body: &str) -> Result<T> {
        let target = serde_json::to_string(el)?;
        let js = format!(
            r#"(() => {{
                {RESOLVE_JS}
                const el = __resolve({target});
                if (!el) throw new Error('element not found: ' + JSON.stringify({target}.target));
                {body}
            }})()"#
        );
        self.eval_json(js).await
    }

    async fn exists(&self, el: ElementRef) -> Result<Option<ElementRef>> {
        let target = serde_json::to_string(&el)?;
        let js = format!(
            r#"(() => {{
                {RESOLVE_JS}
                return JSON.stringify(__resolve({target}) !== null);
            }})()"#
        );
        let found: bool = self.eval_json(js).await?;
        Ok(found.then_some(el))
    }
}

#[async_trait]
impl Dom for Page {
    async fn accessible_frames(&self) -> Result<Vec<FrameRef>> {
        let js = r#"
            JSON.stringify(
                Array.from(document.getElementsByTagName('iframe')).flatMap((f, i) => {
                    try {
                        const doc = f.contentDocument || f.contentWindow.document;
                        return doc ? [i] : [];
                    } catch (e) {
                        return [];
                    }
                })
            )
        "#;
        let indices: Vec<usize> = self.eval_json(js.to_string()).await?;
        Ok(indices.into_iter().map(FrameRef::Frame).collect())
    }

    async fn find_by_id(&self, frame: FrameRef, id: &str) -> Result<Option<ElementRef>> {
        self.exists(ElementRef::by_id(frame, id)).await
    }

    async fn query_selector(&self, frame: FrameRef, selector: &str) -> Result<Option<ElementRef>> {
        self.exists(ElementRef::by_selector(frame, selector)).await
    }

    async fn query_within(
        &self,
        scope: &ElementRef,
        selector: &str,
    ) -> Result<Option<ElementRef>> {
        self.exists(ElementRef::within(scope, selector)).await
    }

    async fn describe(&self, el: &ElementRef) -> Result<ElementInfo> {
        self.on_element(
            el,
            r#"return JSON.stringify({
                tag: el.tagName.toLowerCase(),
                classes: Array.from(el.classList),
                ariaHaspopup: el.getAttribute('aria-haspopup'),
                ariaControls: el.getAttribute('aria-controls'),
                multiple: !!el.multiple,
            });"#,
        )
        .await
    }

    async fn set_value(&self, el: &ElementRef, value: &str) -> Result<()> {
        let value = serde_json::to_string(value)?;
        self.on_element(el, &format!("el.value = {value}; return 'null';"))
            .await
    }

    async fn dispatch(&self, el: &ElementRef, event: DomEvent) -> Result<()> {
        let ctor = event.js_constructor();
        self.on_element(el, &format!("el.dispatchEvent({ctor}); return 'null';"))
            .await
    }

    async fn click(&self, el: &ElementRef) -> Result<()> {
        self.on_element(el, "el.click(); return 'null';").await
    }

    async fn focus(&self, el: &ElementRef) -> Result<()> {
        self.on_element(el, "el.focus(); return 'null';").await
    }

    async fn blur(&self, el: &ElementRef) -> Result<()> {
        self.on_element(el, "el.blur(); return 'null';").await
    }

    async fn select_options(&self, el: &ElementRef, values: &[String]) -> Result<usize> {
        let wanted = serde_json::to_string(values)?;
        let body = format!(
            r#"const wanted = {wanted};
            const options = Array.from(el.options);
            options.forEach(o => {{ o.selected = false; }});
            wanted.forEach(v => {{
                const o = options.find(o => o.value === v);
                if (o) o.selected = true;
            }});
            return JSON.stringify(options.filter(o => o.selected).length);"#
        );
        self.on_element(el, &body).await
    }

    async fn fit_to_content(&self, el: &ElementRef) -> Result<()> {
        self.on_element(
            el,
            "el.style.height = 'auto'; el.style.height = el.scrollHeight + 'px'; return 'null';",
        )
        .await
    }

    async fn is_loaded(&self) -> Result<bool> {
        self.eval_json("JSON.stringify(document.readyState === 'complete')".to_string())
            .await
    }
}
