//! Classifies a located control and fills it the way that control needs.

use tracing::{debug, warn};

use crate::config::FillConfig;
use crate::dom::Dom;
use crate::dropdown;
use crate::element::{DomEvent, ElementInfo, ElementRef};
use crate::error::{Error, Result};
use crate::locator;
use crate::mapping::FieldValue;
use crate::multi_select;
use crate::simulator;
use crate::steps::{self, sleep, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    NativeSelect,
    NativeTextArea,
    CustomMultiSelect,
    CustomDropdown,
    PlainInput,
}

/// Pick the fill strategy for a control. The first matching rule wins.
pub fn classify(id: &str, value: &FieldValue, info: &ElementInfo, config: &FillConfig) -> WidgetKind {
    let multi_skin = config
        .multi_select_classes
        .iter()
        .any(|class| info.has_class(class));

    if value.as_list().is_some() && id.contains(config.multi_select_marker.as_str()) && multi_skin {
        WidgetKind::CustomMultiSelect
    } else if info.aria_haspopup.as_deref() == Some("listbox") {
        WidgetKind::CustomDropdown
    } else if info.tag == "select" {
        WidgetKind::NativeSelect
    } else if info.tag == "textarea" {
        WidgetKind::NativeTextArea
    } else {
        WidgetKind::PlainInput
    }
}

/// Fill one field. Never fails: any problem comes back as `false`.
pub async fn set_field_value<D: Dom + ?Sized>(
    dom: &D,
    config: &FillConfig,
    id: &str,
    value: &FieldValue,
) -> bool {
    debug!(id, ?value, "setting field value");

    let result = match locator::await_locate(dom, id, &config.timings).await {
        Ok(Some(el)) => fill_located(dom, config, id, &el, value)
            .await
            .map_err(|e| Error::WidgetInteraction(e.to_string())),
        Ok(None) => Err(Error::ElementNotFound(id.to_string())),
        Err(e) => Err(e),
    };

    match result {
        Ok(filled) => filled,
        Err(e) => {
            warn!(id, error = %e, "field not filled");
            false
        }
    }
}

async fn fill_located<D: Dom + ?Sized>(
    dom: &D,
    config: &FillConfig,
    id: &str,
    el: &ElementRef,
    value: &FieldValue,
) -> Result<bool> {
    let t = &config.timings;
    let info = dom.describe(el).await?;
    let kind = classify(id, value, &info, config);
    debug!(id, ?kind, "classified control");

    match kind {
        WidgetKind::CustomMultiSelect => {
            let values = value.as_list().unwrap_or_default();
            return Ok(multi_select::fill_multi_select(dom, config, id, values).await);
        }
        WidgetKind::CustomDropdown => {
            return Ok(dropdown::fill_dropdown(dom, config, id, &value.to_text()).await);
        }
        WidgetKind::NativeSelect => {
            match value.as_list() {
                Some(values) if info.multiple => {
                    let selected = dom.select_options(el, values).await?;
                    if selected < values.len() {
                        debug!(id, selected, requested = values.len(), "some options did not exist");
                    }
                }
                _ => dom.set_value(el, &value.to_text()).await?,
            }
            dom.dispatch(el, DomEvent::Change).await?;
        }
        WidgetKind::NativeTextArea => {
            let mut plan = vec![
                Step::SetValue(String::new()),
                Step::Focus,
                Step::Emit(DomEvent::Focus),
                Step::Emit(DomEvent::Input),
                Step::Wait(t.textarea_settle),
                Step::SetValue(value.to_text()),
                Step::Emit(DomEvent::Input),
                Step::Emit(DomEvent::Change),
            ];
            if info.has_class(&config.grow_textarea_class) {
                plan.push(Step::FitToContent);
            }
            plan.extend([Step::Blur, Step::Emit(DomEvent::Blur)]);
            steps::run(dom, el, &plan).await?;
        }
        WidgetKind::PlainInput => {
            simulator::type_into(dom, el, &value.to_text(), t.type_settle).await?;
        }
    }

    if config.needs_tab_out(id) {
        debug!(id, "tabbing out to commit");
        simulator::press_tab(dom, el).await?;
        sleep(t.tab_out_settle).await;
    }

    Ok(true)
}
