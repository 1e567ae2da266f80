pub mod browser;
pub mod client;
pub mod config;
pub mod dom;
pub mod dropdown;
pub mod element;
pub mod error;
pub mod filler;
pub mod locator;
pub mod mapping;
pub mod multi_select;
pub mod page;
pub mod respond;
pub mod rows;
pub mod simulator;
pub mod steps;
pub mod widget;

pub use browser::PortalBrowser;
pub use client::PortalClient;
pub use config::{BrowserConfig, FillConfig, Timings};
pub use dom::Dom;
pub use element::{DomEvent, ElementInfo, ElementRef, FrameRef};
pub use error::{Error, Result};
pub use filler::{FillResponse, Filler, Request, RunOutcome};
pub use mapping::{FieldMapping, FieldValue};
pub use page::Page;
pub use widget::WidgetKind;
