use async_trait::async_trait;
use chrono::Local;
use log::trace;
use reqwest::Client;
use serde_json::{Map, Value};

use crate::config::CrawlerConfig;
use crate::error::{AppError, Result};
use crate::model::{Company, StockQuote};

/// Seam between the fetch strategies and the quote transport, so batch
/// behavior stays testable without a live endpoint.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quote(&self, company: &Company) -> Result<StockQuote>;
}

/// HTTP client for the per-company quote endpoint. Failures here are always
/// per-item: callers capture them as outcomes and keep the batch running.
pub struct QuoteClient {
    client: Client,
    quote_url: String,
}

impl QuoteClient {
    pub fn new(client: Client, config: &CrawlerConfig) -> Self {
        Self {
            client,
            quote_url: config.quote_url.clone(),
        }
    }
}

#[async_trait]
impl QuoteSource for QuoteClient {
    async fn fetch_quote(&self, company: &Company) -> Result<StockQuote> {
        let response = self
            .client
            .get(&self.quote_url)
            .query(&[("itemcode", company.code.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transport {
                url: self.quote_url.clone(),
                status,
            });
        }

        let body = response.text().await?;
        trace!("quote payload for {}: {} bytes", company.code, body.len());
        parse_quote(company, &body)
    }
}

/// Map the item-summary payload onto a quote. Absent fields stay `None`:
/// halted or freshly listed issues legitimately omit trading statistics, and
/// absence must not collapse into zero.
fn parse_quote(company: &Company, body: &str) -> Result<StockQuote> {
    let json: Value = serde_json::from_str(body).map_err(|err| {
        AppError::parse(format!(
            "malformed quote payload for {}: {}",
            company.code, err
        ))
    })?;

    let record = json.as_object().ok_or_else(|| {
        AppError::parse(format!(
            "quote payload for {} is not a JSON object",
            company.code
        ))
    })?;

    Ok(StockQuote {
        code: company.code.clone(),
        company_name: company.name.clone(),
        market_cap: field_i64(record, "marketSum"),
        last_price: field_i64(record, "now"),
        change: field_i64(record, "diff"),
        change_rate: field_f64(record, "rate"),
        volume: field_i64(record, "quant"),
        high: field_i64(record, "high"),
        low: field_i64(record, "low"),
        observed_at: Local::now(),
    })
}

fn field_i64(record: &Map<String, Value>, key: &str) -> Option<i64> {
    record.get(key).and_then(Value::as_i64)
}

fn field_f64(record: &Map<String, Value>, key: &str) -> Option<f64> {
    record.get(key).and_then(Value::as_f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samsung() -> Company {
        Company::new("005930", "Samsung Electronics")
    }

    fn client_for(server: &mockito::ServerGuard) -> QuoteClient {
        let config = CrawlerConfig {
            quote_url: format!("{}/itemSummary.naver", server.url()),
            ..CrawlerConfig::default()
        };
        QuoteClient::new(Client::new(), &config)
    }

    #[tokio::test]
    async fn maps_full_payload_onto_quote() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/itemSummary.naver?itemcode=005930")
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "marketSum": 4181112,
                    "now": 70000,
                    "diff": -500,
                    "rate": -0.71,
                    "quant": 11093291,
                    "high": 70900,
                    "low": 69800
                }"#,
            )
            .create_async()
            .await;

        let quote = client_for(&server)
            .fetch_quote(&samsung())
            .await
            .expect("fetch quote");

        assert_eq!(quote.code, "005930");
        assert_eq!(quote.company_name, "Samsung Electronics");
        assert_eq!(quote.last_price, Some(70_000));
        assert_eq!(quote.change, Some(-500));
        assert_eq!(quote.change_rate, Some(-0.71));
        assert_eq!(quote.high, Some(70_900));
        assert_eq!(quote.low, Some(69_800));
    }

    #[tokio::test]
    async fn absent_fields_stay_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/itemSummary.naver?itemcode=005930")
            .with_body(r#"{"now": 70000, "quant": 11093291}"#)
            .create_async()
            .await;

        let quote = client_for(&server)
            .fetch_quote(&samsung())
            .await
            .expect("fetch quote");

        assert_eq!(quote.last_price, Some(70_000));
        assert_eq!(quote.high, None);
        assert_eq!(quote.low, None);
        assert_eq!(quote.market_cap, None);
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/itemSummary.naver?itemcode=005930")
            .with_body("<html>maintenance window</html>")
            .create_async()
            .await;

        let err = client_for(&server)
            .fetch_quote(&samsung())
            .await
            .expect_err("garbage body should fail");
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[tokio::test]
    async fn non_success_status_is_a_transport_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/itemSummary.naver?itemcode=005930")
            .with_status(404)
            .create_async()
            .await;

        let err = client_for(&server)
            .fetch_quote(&samsung())
            .await
            .expect_err("404 should fail");
        assert!(matches!(err, AppError::Transport { .. }));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = parse_quote(&samsung(), "[1, 2, 3]").expect_err("array payload should fail");
        assert!(matches!(err, AppError::Parse(_)));
    }
}
