//! The DOM capability the fill engine runs against.
//!
//! Everything the engine knows about the page goes through [`Dom`]. The
//! CDP-backed implementation lives in [`crate::page::Page`].

use async_trait::async_trait;

use crate::element::{DomEvent, ElementInfo, ElementRef, FrameRef};
use crate::error::Result;

#[async_trait]
pub trait Dom: Send + Sync {
    /// Iframes of the top-level document whose content can be read, in
    /// document order. Cross-origin frames are left out without an error.
    async fn accessible_frames(&self) -> Result<Vec<FrameRef>>;

    /// `getElementById` in the given document.
    async fn find_by_id(&self, frame: FrameRef, id: &str) -> Result<Option<ElementRef>>;

    /// `querySelector` in the given document.
    async fn query_selector(&self, frame: FrameRef, selector: &str) -> Result<Option<ElementRef>>;

    /// `scope.querySelector(selector)` on the node `scope` resolves to.
    async fn query_within(&self, scope: &ElementRef, selector: &str) -> Result<Option<ElementRef>>;

    async fn describe(&self, el: &ElementRef) -> Result<ElementInfo>;

    /// Assign the `value` property directly, without events.
    async fn set_value(&self, el: &ElementRef, value: &str) -> Result<()>;

    async fn dispatch(&self, el: &ElementRef, event: DomEvent) -> Result<()>;

    /// Native `element.click()`.
    async fn click(&self, el: &ElementRef) -> Result<()>;

    /// Native `element.focus()`.
    async fn focus(&self, el: &ElementRef) -> Result<()>;

    /// Native `element.blur()`.
    async fn blur(&self, el: &ElementRef) -> Result<()>;

    /// Deselect every option of a `<select multiple>`, then select those whose
    /// value is in `values`. Returns how many options ended up selected.
    async fn select_options(&self, el: &ElementRef, values: &[String]) -> Result<usize>;

    /// Resize an auto-growing textarea to its scroll height.
    async fn fit_to_content(&self, el: &ElementRef) -> Result<()>;

    /// Whether `document.readyState` is `complete`.
    async fn is_loaded(&self) -> Result<bool>;
}
