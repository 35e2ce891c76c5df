#[cfg(test)]
#[path = "entities_test.rs"]
mod tests;

use std::collections::HashMap;

use anyhow::bail;
use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Entity;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessEntitiesResponse {
    pub assets: Vec<Entity>,
    pub funds: Vec<Entity>,
}

impl BusinessEntitiesResponse {
    pub fn into_map(self) -> HashMap<String, Vec<Entity>> {
        let mut map = HashMap::new();
        map.insert("assets".to_string(), self.assets);
        map.insert("funds".to_string(), self.funds);
        return map;
    }
}

pub struct EntitiesClient {
    url: String,
}

impl Default for EntitiesClient {
    fn default() -> EntitiesClient {
        return EntitiesClient {
            url: Config::get(ConfigKey::ApiBaseURL),
        };
    }
}

impl EntitiesClient {
    pub async fn fetch(&self) -> Result<BusinessEntitiesResponse> {
        let res = reqwest::Client::new()
            .get(format!("{url}/business-entities", url = self.url))
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                "Business entities request failed"
            );
            bail!("Business entities request failed");
        }

        return Ok(res.json::<BusinessEntitiesResponse>().await?);
    }
}
