use tracing::{debug, warn};

use crate::config::FillConfig;
use crate::dom::Dom;
use crate::element::ElementRef;
use crate::error::Result;
use crate::locator;
use crate::simulator;
use crate::steps::{self, sleep, Step};

/// Add each value as a chip of a UI5 multi-select box.
///
/// The input must be emptied between chips, otherwise the next typed value
/// is appended to the previous one.
pub async fn fill_multi_select<D: Dom + ?Sized>(
    dom: &D,
    config: &FillConfig,
    id: &str,
    values: &[String],
) -> bool {
    debug!(id, ?values, "filling multi-select");

    let el = match locator::locate(dom, id).await {
        Ok(Some(el)) => el,
        Ok(None) => {
            debug!(id, "multi-select input not found");
            return false;
        }
        Err(e) => {
            warn!(id, error = %e, "multi-select lookup failed");
            return false;
        }
    };

    match add_chips(dom, config, &el, values).await {
        Ok(()) => true,
        Err(e) => {
            warn!(id, error = %e, "multi-select fill failed");
            false
        }
    }
}

async fn add_chips<D: Dom + ?Sized>(
    dom: &D,
    config: &FillConfig,
    el: &ElementRef,
    values: &[String],
) -> Result<()> {
    let t = &config.timings;

    dom.click(el).await?;
    sleep(t.multi_open_settle).await;

    for value in values {
        simulator::type_into(dom, el, value, t.type_settle).await?;
        simulator::press_tab(dom, el).await?;
        sleep(t.multi_commit_settle).await;

        let mut clear = simulator::clear_plan();
        clear.push(Step::Wait(t.multi_clear_settle));
        steps::run(dom, el, &clear).await?;
    }
    Ok(())
}
