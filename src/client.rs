use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::mapping::FieldMapping;

/// Portal tag the mapping service dispatches on.
pub const DEFAULT_TARGET_PORTAL: &str = "tradebe";

/// Client for the profile lookup and field-mapping endpoints.
pub struct PortalClient {
    http: reqwest::Client,
    profile_url: String,
    mapping_url: String,
    target_portal: String,
}

impl PortalClient {
    pub fn new(profile_url: impl Into<String>, mapping_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            profile_url: profile_url.into(),
            mapping_url: mapping_url.into(),
            target_portal: DEFAULT_TARGET_PORTAL.to_string(),
        }
    }

    pub fn target_portal(mut self, portal: impl Into<String>) -> Self {
        self.target_portal = portal.into();
        self
    }

    /// Fetch a waste profile by id.
    pub async fn fetch_profile(&self, profile_id: &str) -> Result<Map<String, Value>> {
        debug!(profile_id, "fetching profile");
        let response = self
            .http
            .get(&self.profile_url)
            .query(&[("id", profile_id)])
            .send()
            .await?
            .error_for_status()?;

        match response.json::<Value>().await? {
            Value::Object(profile) => Ok(profile),
            other => Err(Error::Http(format!(
                "expected a profile object, got {}",
                kind_of(&other)
            ))),
        }
    }

    /// Turn a profile into field ids and values for the target portal.
    pub async fn map_profile(&self, profile: &Map<String, Value>) -> Result<FieldMapping> {
        let body = mapping_request(&self.target_portal, profile);
        let response = self
            .http
            .post(&self.mapping_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        let mapping: FieldMapping = serde_json::from_str(&text)?;
        info!(fields = mapping.len(), portal = %self.target_portal, "received field mapping");
        Ok(mapping)
    }
}

/// `{"targetPortal": portal, ...profile}`.
pub fn mapping_request(portal: &str, profile: &Map<String, Value>) -> Value {
    let mut body = Map::with_capacity(profile.len() + 1);
    body.insert("targetPortal".into(), Value::String(portal.to_string()));
    for (key, value) in profile {
        body.insert(key.clone(), value.clone());
    }
    Value::Object(body)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mapping_request_spreads_profile_after_tag() {
        let profile = json!({"Name": "Spent solvent", "RCRAExempt": "No"});
        let body = mapping_request("tradebe", profile.as_object().unwrap());
        assert_eq!(
            body,
            json!({"targetPortal": "tradebe", "Name": "Spent solvent", "RCRAExempt": "No"})
        );
    }

    #[test]
    fn profile_fields_win_over_tag() {
        let profile = json!({"targetPortal": "other"});
        let body = mapping_request("tradebe", profile.as_object().unwrap());
        assert_eq!(body["targetPortal"], "other");
    }
}
