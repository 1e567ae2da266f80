//! Runs one fill over a whole field mapping.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::FillConfig;
use crate::dom::Dom;
use crate::error::{Error, Result};
use crate::mapping::{FieldMapping, FieldValue};
use crate::respond::Responder;
use crate::rows;
use crate::steps::sleep;
use crate::widget;

/// Inbound trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Request {
    #[serde(rename = "fillForm")]
    FillForm { data: FieldMapping },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success { filled_count: usize },
    Partial { filled_count: usize, failed_fields: Vec<String> },
    Error { message: String },
}

impl RunOutcome {
    pub fn filled_count(&self) -> usize {
        match self {
            RunOutcome::Success { filled_count } | RunOutcome::Partial { filled_count, .. } => {
                *filled_count
            }
            RunOutcome::Error { .. } => 0,
        }
    }

    pub fn failed_fields(&self) -> &[String] {
        match self {
            RunOutcome::Partial { failed_fields, .. } => failed_fields,
            RunOutcome::Success { .. } | RunOutcome::Error { .. } => &[],
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RunOutcome::Error { .. })
    }
}

/// Wire shape of a [`RunOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FillResponse {
    Success {
        #[serde(rename = "filledCount")]
        filled_count: usize,
        #[serde(rename = "failedFields")]
        failed_fields: Vec<String>,
    },
    Partial {
        #[serde(rename = "filledCount")]
        filled_count: usize,
        #[serde(rename = "failedFields")]
        failed_fields: Vec<String>,
    },
    Error {
        error: String,
    },
}

impl From<RunOutcome> for FillResponse {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Success { filled_count } => FillResponse::Success {
                filled_count,
                failed_fields: Vec::new(),
            },
            RunOutcome::Partial {
                filled_count,
                failed_fields,
            } => FillResponse::Partial {
                filled_count,
                failed_fields,
            },
            RunOutcome::Error { message } => FillResponse::Error { error: message },
        }
    }
}

/// Per-field bookkeeping for one run.
///
/// `filled + failed.len()` always equals the number of fields seen.
#[derive(Debug, Default)]
struct Tally<'a> {
    filled: usize,
    failed: Vec<(&'a str, &'a FieldValue)>,
}

pub struct Filler<D> {
    dom: D,
    config: FillConfig,
}

impl<D: Dom> Filler<D> {
    pub fn new(dom: D, config: FillConfig) -> Self {
        Self { dom, config }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn config(&self) -> &FillConfig {
        &self.config
    }

    /// Handle a trigger and deliver its response through `responder`.
    /// Returns whether this call was the one that responded.
    pub async fn serve(&self, request: Request, responder: Responder<FillResponse>) -> bool {
        match request {
            Request::FillForm { data } => {
                let outcome = self.fill(&data).await;
                responder.respond(outcome.into())
            }
        }
    }

    pub async fn fill(&self, mapping: &FieldMapping) -> RunOutcome {
        info!(fields = mapping.len(), "starting form fill");
        match self.run(mapping).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "form fill aborted");
                let message = match e {
                    Error::RunAbort(message) => message,
                    other => other.to_string(),
                };
                RunOutcome::Error { message }
            }
        }
    }

    async fn run(&self, mapping: &FieldMapping) -> Result<RunOutcome> {
        let t = &self.config.timings;

        // A missing add-row button is logged by the driver and is not fatal.
        rows::grow_table(&self.dom, &self.config, self.config.row_count).await?;
        sleep(t.post_growth_settle).await;
        self.wait_until_loaded().await?;

        let mut tally = Tally::default();
        for (id, value) in mapping.iter() {
            sleep(t.field_pacing).await;
            if widget::set_field_value(&self.dom, &self.config, id, value).await {
                tally.filled += 1;
            } else {
                tally.failed.push((id, value));
            }
        }

        if !tally.failed.is_empty() {
            info!(count = tally.failed.len(), "retrying failed fields");
            sleep(t.retry_settle).await;

            let first_pass = std::mem::take(&mut tally.failed);
            for (id, value) in first_pass {
                sleep(t.retry_pacing).await;
                if widget::set_field_value(&self.dom, &self.config, id, value).await {
                    tally.filled += 1;
                } else {
                    tally.failed.push((id, value));
                }
            }
        }

        let filled_count = tally.filled;
        if tally.failed.is_empty() {
            info!(filled_count, "form filled");
            Ok(RunOutcome::Success { filled_count })
        } else {
            let failed_fields: Vec<String> =
                tally.failed.iter().map(|(id, _)| id.to_string()).collect();
            warn!(filled_count, ?failed_fields, "form partially filled");
            Ok(RunOutcome::Partial {
                filled_count,
                failed_fields,
            })
        }
    }

    async fn wait_until_loaded(&self) -> Result<()> {
        while !self.dom.is_loaded().await? {
            sleep(self.config.timings.load_poll).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_wire_shape() {
        let partial: FillResponse = RunOutcome::Partial {
            filled_count: 3,
            failed_fields: vec!["a".into()],
        }
        .into();
        assert_eq!(
            serde_json::to_value(&partial).unwrap(),
            serde_json::json!({"status": "partial", "filledCount": 3, "failedFields": ["a"]})
        );

        let success: FillResponse = RunOutcome::Success { filled_count: 0 }.into();
        assert_eq!(
            serde_json::to_value(&success).unwrap(),
            serde_json::json!({"status": "success", "filledCount": 0, "failedFields": []})
        );

        let error: FillResponse = RunOutcome::Error {
            message: "boom".into(),
        }
        .into();
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            serde_json::json!({"status": "error", "error": "boom"})
        );
    }

    #[test]
    fn request_parses_fill_form_message() {
        let req: Request = serde_json::from_str(
            r#"{"action": "fillForm", "data": {"__input3-__clone54-inner": "Solvent", "__box3-__clone72-inner": ["IGNITABLE"]}}"#,
        )
        .unwrap();
        let Request::FillForm { data } = req;
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(serde_json::from_str::<Request>(r#"{"action": "ping"}"#).is_err());
    }
}
