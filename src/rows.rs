use tracing::{debug, error, info};

use crate::config::FillConfig;
use crate::dom::Dom;
use crate::element::{DomEvent, FrameRef};
use crate::error::Result;
use crate::steps::sleep;

/// Events fired at the add-row button for each new row. UI5 binds its press
/// handler below the level a lone synthetic click reaches.
const ADD_ROW_SEQUENCE: [DomEvent; 4] = [
    DomEvent::MouseDown,
    DomEvent::MouseUp,
    DomEvent::Click,
    DomEvent::FocusWithView,
];

/// Press the add-row button `row_count` times.
///
/// Returns `Ok(false)` when the button is missing.
pub async fn grow_table<D: Dom + ?Sized>(
    dom: &D,
    config: &FillConfig,
    row_count: u32,
) -> Result<bool> {
    info!(row_count, "adding rows to table");
    let t = &config.timings;

    let Some(button) = dom
        .query_selector(FrameRef::Top, &config.add_row_selector)
        .await?
    else {
        error!(selector = %config.add_row_selector, "add row button not found");
        return Ok(false);
    };

    for row in 1..=row_count {
        debug!(row, row_count, "adding row");
        for event in ADD_ROW_SEQUENCE {
            dom.dispatch(&button, event).await?;
        }
        if let Some(inner) = dom
            .query_selector(FrameRef::Top, &config.add_row_inner_selector)
            .await?
        {
            dom.click(&inner).await?;
        }
        sleep(t.row_click_settle).await;
    }

    sleep(t.row_render_settle).await;
    info!("finished adding rows");
    Ok(true)
}
