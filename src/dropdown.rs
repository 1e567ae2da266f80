use tracing::{debug, warn};

use crate::config::FillConfig;
use crate::dom::Dom;
use crate::element::{ElementRef, FrameRef};
use crate::error::Result;
use crate::locator;
use crate::simulator;
use crate::steps::sleep;

/// Type into a popup-driven input and pick the first suggestion.
///
/// When no suggestion list shows up the value is committed with Tab and the
/// field still counts as filled. That success is not verified.
pub async fn fill_dropdown<D: Dom + ?Sized>(
    dom: &D,
    config: &FillConfig,
    id: &str,
    value: &str,
) -> bool {
    let el = match locator::await_locate(dom, id, &config.timings).await {
        Ok(Some(el)) => el,
        Ok(None) => return false,
        Err(e) => {
            warn!(id, error = %e, "dropdown lookup failed");
            return false;
        }
    };

    match select_first_option(dom, config, id, &el, value).await {
        Ok(()) => true,
        Err(e) => {
            warn!(id, error = %e, "dropdown fill failed");
            false
        }
    }
}

async fn select_first_option<D: Dom + ?Sized>(
    dom: &D,
    config: &FillConfig,
    id: &str,
    el: &ElementRef,
    value: &str,
) -> Result<()> {
    let t = &config.timings;

    simulator::type_into(dom, el, value, t.type_settle).await?;
    sleep(t.dropdown_settle).await;

    let controls = dom.describe(el).await?.aria_controls;
    if let Some(listbox) = find_listbox(dom, config, controls.as_deref()).await? {
        if let Some(option) = dom.query_within(&listbox, &config.option_selector).await? {
            debug!(id, "clicking first listbox option");
            dom.click(&option).await?;
            return Ok(());
        }
    }

    warn!(id, "no listbox option appeared; committing with Tab");
    simulator::press_tab(dom, el).await?;
    sleep(t.dropdown_tab_settle).await;
    Ok(())
}

async fn find_listbox<D: Dom + ?Sized>(
    dom: &D,
    config: &FillConfig,
    controls: Option<&str>,
) -> Result<Option<ElementRef>> {
    let t = &config.timings;
    let attempts = t.popup_attempts.max(1);

    for attempt in 1..=attempts {
        if let Some(id) = controls {
            if let Some(found) = dom.find_by_id(FrameRef::Top, id).await? {
                return Ok(Some(found));
            }
        }
        if let Some(found) = dom
            .query_selector(FrameRef::Top, &config.listbox_fallback_selector)
            .await?
        {
            return Ok(Some(found));
        }
        if attempt < attempts {
            sleep(t.popup_interval).await;
        }
    }
    Ok(None)
}
