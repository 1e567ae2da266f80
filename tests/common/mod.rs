//! In-memory [`Dom`] used by the integration tests.
//!
//! Every mutation is logged together with the (paused) tokio clock so tests
//! can assert both the order of interactions and the waits between them.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use portal_filler::{Dom, DomEvent, ElementInfo, ElementRef, Error, FrameRef, Result};
use portal_filler::element::Target;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetValue(String),
    Dispatch(DomEvent),
    Click,
    Focus,
    Blur,
    Select(Vec<String>),
    Fit,
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub at: Duration,
    pub id: String,
    pub action: Action,
}

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub info: ElementInfo,
    pub value: String,
    /// `(value, selected)` pairs of a `<select>`.
    pub options: Vec<(String, bool)>,
    /// Lookups that miss before the element "renders".
    pub hidden_lookups: u32,
    /// `set_value` calls that fail before writes start succeeding.
    pub failing_writes: u32,
}

impl FakeElement {
    pub fn new(tag: &str) -> Self {
        Self {
            info: ElementInfo {
                tag: tag.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn input() -> Self {
        Self::new("input")
    }

    pub fn class(mut self, class: &str) -> Self {
        self.info.classes.push(class.into());
        self
    }

    pub fn popup(mut self, controls: Option<&str>) -> Self {
        self.info.aria_haspopup = Some("listbox".into());
        self.info.aria_controls = controls.map(Into::into);
        self
    }

    pub fn select(options: &[&str], multiple: bool) -> Self {
        let mut el = Self::new("select");
        el.info.multiple = multiple;
        el.options = options.iter().map(|o| (o.to_string(), false)).collect();
        el
    }

    pub fn appears_after(mut self, lookups: u32) -> Self {
        self.hidden_lookups = lookups;
        self
    }

    pub fn failing_writes(mut self, n: u32) -> Self {
        self.failing_writes = n;
        self
    }
}

#[derive(Default)]
struct State {
    elements: HashMap<(FrameRef, String), FakeElement>,
    /// CSS selectors the page answers, pointing at element ids.
    selectors: HashMap<(FrameRef, String), String>,
    /// `(scope id, selector)` answered inside an element, pointing at element ids.
    children: HashMap<(String, String), String>,
    /// Accessibility of each iframe, in document order.
    frames: Vec<bool>,
    log: Vec<Entry>,
    load_polls_left: u32,
    load_broken: bool,
}

pub struct FakeDom {
    start: Instant,
    state: Mutex<State>,
}

impl FakeDom {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            state: Mutex::new(State::default()),
        }
    }

    /// A page with the add-row button and its inner span.
    pub fn portal() -> Self {
        let dom = Self::new();
        dom.add("__button20", FakeElement::new("button"));
        dom.add("__button20-inner", FakeElement::new("span"));
        dom.selector("#__button20", "__button20");
        dom.selector("#__button20-inner", "__button20-inner");
        dom
    }

    pub fn add(&self, id: &str, el: FakeElement) {
        self.add_in(FrameRef::Top, id, el);
    }

    pub fn add_in(&self, frame: FrameRef, id: &str, el: FakeElement) {
        let mut s = self.state.lock().unwrap();
        s.elements.insert((frame, id.to_string()), el);
    }

    pub fn remove(&self, id: &str) {
        let mut s = self.state.lock().unwrap();
        s.elements.retain(|(_, k), _| k != id);
    }

    pub fn selector(&self, selector: &str, id: &str) {
        let mut s = self.state.lock().unwrap();
        s.selectors
            .insert((FrameRef::Top, selector.to_string()), id.to_string());
    }

    /// Make `selector` inside element `scope` answer with element `id`.
    pub fn child(&self, scope: &str, selector: &str, id: &str) {
        let mut s = self.state.lock().unwrap();
        s.children
            .insert((scope.to_string(), selector.to_string()), id.to_string());
    }

    /// Append an iframe; `false` models a cross-origin frame.
    pub fn frame(&self, accessible: bool) -> FrameRef {
        let mut s = self.state.lock().unwrap();
        s.frames.push(accessible);
        FrameRef::Frame(s.frames.len() - 1)
    }

    pub fn loads_after(&self, polls: u32) {
        self.state.lock().unwrap().load_polls_left = polls;
    }

    pub fn break_load(&self) {
        self.state.lock().unwrap().load_broken = true;
    }

    pub fn value(&self, id: &str) -> Option<String> {
        let s = self.state.lock().unwrap();
        s.elements
            .iter()
            .find(|((_, k), _)| k == id)
            .map(|(_, el)| el.value.clone())
    }

    pub fn selected(&self, id: &str) -> Vec<String> {
        let s = self.state.lock().unwrap();
        s.elements
            .iter()
            .find(|((_, k), _)| k == id)
            .map(|(_, el)| {
                el.options
                    .iter()
                    .filter(|(_, on)| *on)
                    .map(|(v, _)| v.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn log(&self) -> Vec<Entry> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn actions(&self, id: &str) -> Vec<Action> {
        self.log()
            .into_iter()
            .filter(|e| e.id == id)
            .map(|e| e.action)
            .collect()
    }

    /// Ids in the order they were first touched.
    pub fn touched(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.log()
            .into_iter()
            .filter(|e| seen.insert(e.id.clone()))
            .map(|e| e.id)
            .collect()
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn key(s: &State, el: &ElementRef) -> Option<(FrameRef, String)> {
        match &el.target {
            Target::Id(id) => Some((el.frame, id.clone())),
            Target::Selector(sel) => s
                .selectors
                .get(&(el.frame, sel.clone()))
                .map(|id| (el.frame, id.clone())),
            Target::Within { scope, selector } => {
                let (frame, scope_id) = Self::key(s, scope)?;
                s.children
                    .get(&(scope_id, selector.clone()))
                    .map(|id| (frame, id.clone()))
            }
        }
    }

    fn with_element<T>(
        &self,
        el: &ElementRef,
        action: Action,
        f: impl FnOnce(&mut FakeElement) -> Result<T>,
    ) -> Result<T> {
        let mut s = self.state.lock().unwrap();
        let key = Self::key(&s, el)
            .filter(|k| s.elements.contains_key(k))
            .ok_or_else(|| Error::ElementNotFound(format!("{:?}", el.target)))?;
        let at = self.start.elapsed();
        let out = f(s.elements.get_mut(&key).unwrap())?;
        s.log.push(Entry {
            at,
            id: key.1,
            action,
        });
        Ok(out)
    }
}

#[async_trait]
impl Dom for FakeDom {
    async fn accessible_frames(&self) -> Result<Vec<FrameRef>> {
        let s = self.state.lock().unwrap();
        Ok(s.frames
            .iter()
            .enumerate()
            .filter(|(_, ok)| **ok)
            .map(|(i, _)| FrameRef::Frame(i))
            .collect())
    }

    async fn find_by_id(&self, frame: FrameRef, id: &str) -> Result<Option<ElementRef>> {
        let mut s = self.state.lock().unwrap();
        match s.elements.get_mut(&(frame, id.to_string())) {
            Some(el) if el.hidden_lookups > 0 => {
                el.hidden_lookups -= 1;
                Ok(None)
            }
            Some(_) => Ok(Some(ElementRef::by_id(frame, id))),
            None => Ok(None),
        }
    }

    async fn query_selector(&self, frame: FrameRef, selector: &str) -> Result<Option<ElementRef>> {
        let s = self.state.lock().unwrap();
        let found = s
            .selectors
            .get(&(frame, selector.to_string()))
            .filter(|id| s.elements.contains_key(&(frame, (*id).clone())));
        Ok(found.map(|_| ElementRef::by_selector(frame, selector)))
    }

    async fn query_within(&self, scope: &ElementRef, selector: &str) -> Result<Option<ElementRef>> {
        let s = self.state.lock().unwrap();
        let el = ElementRef::within(scope, selector);
        let found = Self::key(&s, &el).filter(|k| s.elements.contains_key(k));
        Ok(found.map(|_| el))
    }

    async fn describe(&self, el: &ElementRef) -> Result<ElementInfo> {
        let s = self.state.lock().unwrap();
        Self::key(&s, el)
            .and_then(|k| s.elements.get(&k))
            .map(|e| e.info.clone())
            .ok_or_else(|| Error::ElementNotFound(format!("{:?}", el.target)))
    }

    async fn set_value(&self, el: &ElementRef, value: &str) -> Result<()> {
        self.with_element(el, Action::SetValue(value.to_string()), |e| {
            if e.failing_writes > 0 {
                e.failing_writes -= 1;
                return Err(Error::JsError("value setter threw".into()));
            }
            e.value = value.to_string();
            Ok(())
        })
    }

    async fn dispatch(&self, el: &ElementRef, event: DomEvent) -> Result<()> {
        self.with_element(el, Action::Dispatch(event), |_| Ok(()))
    }

    async fn click(&self, el: &ElementRef) -> Result<()> {
        self.with_element(el, Action::Click, |_| Ok(()))
    }

    async fn focus(&self, el: &ElementRef) -> Result<()> {
        self.with_element(el, Action::Focus, |_| Ok(()))
    }

    async fn blur(&self, el: &ElementRef) -> Result<()> {
        self.with_element(el, Action::Blur, |_| Ok(()))
    }

    async fn select_options(&self, el: &ElementRef, values: &[String]) -> Result<usize> {
        self.with_element(el, Action::Select(values.to_vec()), |e| {
            for (value, on) in e.options.iter_mut() {
                *on = values.contains(value);
            }
            Ok(e.options.iter().filter(|(_, on)| *on).count())
        })
    }

    async fn fit_to_content(&self, el: &ElementRef) -> Result<()> {
        self.with_element(el, Action::Fit, |_| Ok(()))
    }

    async fn is_loaded(&self) -> Result<bool> {
        let mut s = self.state.lock().unwrap();
        if s.load_broken {
            return Err(Error::JsError("document is gone".into()));
        }
        if s.load_polls_left > 0 {
            s.load_polls_left -= 1;
            return Ok(false);
        }
        Ok(true)
    }
}
