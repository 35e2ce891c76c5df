#[cfg(test)]
#[path = "charts_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::Value;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

#[derive(Clone, Debug, Serialize)]
pub struct ChartTransformRequest {
    pub chart_type: String,
    pub x_axis: String,
    pub y_axes: Vec<String>,
    pub raw_result: Value,
}

#[derive(Clone, Debug, Deserialize)]
struct ChartTransformResponse {
    chart_payload: String,
}

pub struct ChartsClient {
    url: String,
}

impl Default for ChartsClient {
    fn default() -> ChartsClient {
        return ChartsClient {
            url: Config::get(ConfigKey::ApiBaseURL),
        };
    }
}

impl ChartsClient {
    /// Asks the server to reshape a raw result into a renderable chart. The
    /// reply wraps the chart as a JSON-encoded string.
    pub async fn transform(&self, request: &ChartTransformRequest) -> Result<Value> {
        let res = reqwest::Client::new()
            .post(format!("{url}/charts/transform", url = self.url))
            .json(request)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Chart transform failed");
            bail!("Chart transform failed");
        }

        let body = res.json::<ChartTransformResponse>().await?;
        return Ok(serde_json::from_str(&body.chart_payload)?);
    }
}
