use std::time::Duration;

use async_trait::async_trait;
use nhelper_core::{CoreError, Narrative, NarrativeGenerator, NarrativeParameters};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::CozeError;

/// Connection settings for [`CozeClient`].
#[derive(Debug, Clone)]
pub struct CozeClientSettings {
    pub token: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for CozeClientSettings {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: "https://api.coze.cn".into(),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CozeClient {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    workflow_id: &'a str,
    parameters: &'a NarrativeParameters,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Default, Deserialize)]
struct WorkflowOutput {
    #[serde(default)]
    output: String,
    #[serde(default)]
    reasoning: String,
}

impl CozeClient {
    pub fn new(settings: CozeClientSettings) -> Result<Self, CozeError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", settings.token))
            .map_err(|err| CozeError::Decode(format!("invalid token header: {err}")))?;
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/v1/workflow/run", settings.base_url.trim_end_matches('/')),
        })
    }

    /// Runs `workflow_id` and decodes its `output` and `reasoning` fields.
    pub async fn run_workflow(
        &self,
        workflow_id: &str,
        parameters: &NarrativeParameters,
    ) -> Result<Narrative, CozeError> {
        let body = RunRequest {
            workflow_id,
            parameters,
        };
        debug!(workflow_id, "running workflow");
        let response: RunResponse = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.code != 0 {
            return Err(CozeError::Workflow {
                code: response.code,
                message: response.msg,
            });
        }
        let output = decode_output(response.data)?;
        Ok(Narrative {
            summary: output.output,
            rationale: output.reasoning,
        })
    }
}

/// `data` is normally a JSON document serialized into a string.
fn decode_output(data: Value) -> Result<WorkflowOutput, CozeError> {
    match data {
        Value::String(raw) => {
            serde_json::from_str(&raw).map_err(|err| CozeError::Decode(err.to_string()))
        }
        Value::Object(_) => {
            serde_json::from_value(data).map_err(|err| CozeError::Decode(err.to_string()))
        }
        Value::Null => Err(CozeError::Decode("workflow returned no data".into())),
        other => Err(CozeError::Decode(format!("unexpected data: {other}"))),
    }
}

#[async_trait]
impl NarrativeGenerator for CozeClient {
    async fn run(
        &self,
        workflow_id: &str,
        parameters: &NarrativeParameters,
    ) -> Result<Narrative, CoreError> {
        Ok(self.run_workflow(workflow_id, parameters).await?)
    }
}
