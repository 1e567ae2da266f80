use tracing::debug;

use crate::config::Timings;
use crate::dom::Dom;
use crate::element::{ElementRef, FrameRef};
use crate::error::Result;
use crate::steps::sleep;

/// Find `id` in the top-level document, then in each readable iframe.
pub async fn locate<D: Dom + ?Sized>(dom: &D, id: &str) -> Result<Option<ElementRef>> {
    if let Some(el) = dom.find_by_id(FrameRef::Top, id).await? {
        return Ok(Some(el));
    }

    for frame in dom.accessible_frames().await? {
        if let Some(el) = dom.find_by_id(frame, id).await? {
            debug!(id, ?frame, "found element in iframe");
            return Ok(Some(el));
        }
    }
    Ok(None)
}

/// [`locate`] with a fixed polling budget for elements still being rendered.
pub async fn await_locate<D: Dom + ?Sized>(
    dom: &D,
    id: &str,
    timings: &Timings,
) -> Result<Option<ElementRef>> {
    let attempts = timings.locate_attempts.max(1);
    for attempt in 1..=attempts {
        if let Some(el) = locate(dom, id).await? {
            return Ok(Some(el));
        }
        if attempt < attempts {
            sleep(timings.locate_interval).await;
        }
    }
    debug!(id, attempts, "element did not appear");
    Ok(None)
}
