use serde::{Deserialize, Serialize};

/// The document an element lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameRef {
    /// The top-level document.
    Top,
    /// The n-th `<iframe>` of the top-level document, in document order.
    Frame(usize),
}

/// How an element is found again inside its document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Id(String),
    Selector(String),
    /// First match of `selector` below the element `scope` resolves to.
    Within {
        scope: Box<ElementRef>,
        selector: String,
    },
}

/// Address of a DOM node owned by the page.
///
/// This is not a live handle: every operation resolves it again, so holding
/// one never keeps a node alive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    pub frame: FrameRef,
    pub target: Target,
}

impl ElementRef {
    pub fn by_id(frame: FrameRef, id: impl Into<String>) -> Self {
        Self {
            frame,
            target: Target::Id(id.into()),
        }
    }

    pub fn by_selector(frame: FrameRef, selector: impl Into<String>) -> Self {
        Self {
            frame,
            target: Target::Selector(selector.into()),
        }
    }

    /// Address of the first element matching `selector` inside `scope`.
    pub fn within(scope: &ElementRef, selector: impl Into<String>) -> Self {
        Self {
            frame: scope.frame,
            target: Target::Within {
                scope: Box::new(scope.clone()),
                selector: selector.into(),
            },
        }
    }
}

/// Snapshot of the attributes the widget classifier looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    /// Lower-cased tag name.
    pub tag: String,
    pub classes: Vec<String>,
    pub aria_haspopup: Option<String>,
    pub aria_controls: Option<String>,
    /// The `multiple` property of a `<select>`.
    pub multiple: bool,
}

impl ElementInfo {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Synthetic events the simulator dispatches. All of them bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomEvent {
    Input,
    Change,
    /// Plain `Event('focus')`.
    Focus,
    /// `FocusEvent('focus')` bound to the window, as a real press leaves it.
    FocusWithView,
    Blur,
    /// `keydown` for Tab (keyCode 9).
    TabKeyDown,
    MouseDown,
    MouseUp,
    /// `click` with `detail: 1`.
    Click,
}

impl DomEvent {
    /// Constructor expression used when the event is created in the page.
    pub fn js_constructor(self) -> &'static str {
        match self {
            DomEvent::Input => "new Event('input', { bubbles: true })",
            DomEvent::Change => "new Event('change', { bubbles: true })",
            DomEvent::Focus => "new Event('focus', { bubbles: true })",
            DomEvent::FocusWithView => {
                "new FocusEvent('focus', { bubbles: true, cancelable: true, view: window })"
            }
            DomEvent::Blur => "new Event('blur', { bubbles: true })",
            DomEvent::TabKeyDown => {
                "new KeyboardEvent('keydown', { key: 'Tab', code: 'Tab', keyCode: 9, which: 9, bubbles: true })"
            }
            DomEvent::MouseDown => {
                "new MouseEvent('mousedown', { bubbles: true, cancelable: true, view: window })"
            }
            DomEvent::MouseUp => {
                "new MouseEvent('mouseup', { bubbles: true, cancelable: true, view: window })"
            }
            DomEvent::Click => {
                "new MouseEvent('click', { bubbles: true, cancelable: true, view: window, detail: 1 })"
            }
        }
    }
}
