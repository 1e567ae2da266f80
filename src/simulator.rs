//! Synthetic input that the portal's UI5 listeners accept as user interaction.
//!
//! UI5 only reacts to value *transitions*, so typing is a clear, a settle
//! delay, then the final value with input and change notifications.

use std::time::Duration;

use crate::dom::Dom;
use crate::element::{DomEvent, ElementRef};
use crate::error::Result;
use crate::steps::{self, Step};

/// Two-phase clear-then-set sequence.
pub fn typing_plan(text: &str, settle: Duration) -> Vec<Step> {
    vec![
        Step::SetValue(String::new()),
        Step::Emit(DomEvent::Input),
        Step::Wait(settle),
        Step::SetValue(text.to_owned()),
        Step::Emit(DomEvent::Input),
        Step::Emit(DomEvent::Change),
    ]
}

pub fn tab_plan() -> Vec<Step> {
    vec![Step::Emit(DomEvent::TabKeyDown)]
}

/// Empty the value and announce it, without a commit.
pub fn clear_plan() -> Vec<Step> {
    vec![Step::SetValue(String::new()), Step::Emit(DomEvent::Input)]
}

pub async fn type_into<D: Dom + ?Sized>(
    dom: &D,
    el: &ElementRef,
    text: &str,
    settle: Duration,
) -> Result<()> {
    steps::run(dom, el, &typing_plan(text, settle)).await
}

/// Fire a Tab keydown so the portal's tab-triggered commit logic runs.
pub async fn press_tab<D: Dom + ?Sized>(dom: &D, el: &ElementRef) -> Result<()> {
    steps::run(dom, el, &tab_plan()).await
}
