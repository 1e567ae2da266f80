use std::time::Duration;

use tracing::trace;

use crate::dom::Dom;
use crate::element::{DomEvent, ElementRef};
use crate::error::Result;

/// One action against a single element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    SetValue(String),
    Emit(DomEvent),
    Click,
    Focus,
    Blur,
    FitToContent,
    Wait(Duration),
}

/// Run `steps` in order against `el`, stopping at the first error.
pub async fn run<D: Dom + ?Sized>(dom: &D, el: &ElementRef, steps: &[Step]) -> Result<()> {
    for step in steps {
        trace!(?step, target = ?el.target, "step");
        match step {
            Step::SetValue(value) => dom.set_value(el, value).await?,
            Step::Emit(event) => dom.dispatch(el, *event).await?,
            Step::Click => dom.click(el).await?,
            Step::Focus => dom.focus(el).await?,
            Step::Blur => dom.blur(el).await?,
            Step::FitToContent => dom.fit_to_content(el).await?,
            Step::Wait(d) => sleep(*d).await,
        }
    }
    Ok(())
}

/// Sleep that skips the timer entirely for zero durations.
pub async fn sleep(d: Duration) {
    if !d.is_zero() {
        tokio::time::sleep(d).await;
    }
}
