use anyhow::Result;
use serde_json::json;

use super::ChartTransformRequest;
use super::ChartsClient;

impl ChartsClient {
    fn with_url(url: String) -> ChartsClient {
        return ChartsClient { url };
    }
}

fn request() -> ChartTransformRequest {
    return ChartTransformRequest {
        chart_type: "bar".to_string(),
        x_axis: "fund".to_string(),
        y_axes: vec!["net_irr".to_string()],
        raw_result: json!({"rows": [{"fund": "Fund II", "net_irr": 0.123}]}),
    };
}

#[tokio::test]
async fn it_transforms_raw_results_into_charts() -> Result<()> {
    let body = serde_json::to_string(&json!({
        "chart_payload": "{\"series\": [{\"name\": \"net_irr\", \"data\": [0.123]}]}"
    }))?;

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/charts/transform")
        .with_status(200)
        .with_body(body)
        .create();

    let client = ChartsClient::with_url(server.url());
    let res = client.transform(&request()).await?;

    assert_eq!(res["series"][0]["name"], json!("net_irr"));
    mock.assert();

    return Ok(());
}

#[tokio::test]
async fn it_fails_when_the_nested_payload_is_invalid() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/charts/transform")
        .with_status(200)
        .with_body(r#"{"chart_payload": "{not json"}"#)
        .create();

    let client = ChartsClient::with_url(server.url());
    let res = client.transform(&request()).await;

    assert!(res.is_err());
    mock.assert();
}

#[tokio::test]
async fn it_fails_on_server_error() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/charts/transform")
        .with_status(503)
        .create();

    let client = ChartsClient::with_url(server.url());
    let res = client.transform(&request()).await;

    assert!(res.is_err());
    mock.assert();
}
