//! Liquid staking yields
//!
//! vSUI is a configured constant; haSUI and afSUI come from their issuers'
//! public endpoints. A failing endpoint leaves its entry absent.

use bucket_core::ApyConfig;
use serde_json::Value;

use crate::state::TokenApys;

/// haSUI publishes `{"data": {"apy": <number>}}`
pub fn parse_hasui_apy(body: &Value) -> Option<f64> {
    match &body["data"]["apy"] {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// afSUI publishes a bare fraction such as `0.0412`
pub fn parse_afsui_apy(body: &str) -> Option<f64> {
    body.trim()
        .trim_matches('"')
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v * 100.0)
}

async fn fetch_hasui(http: &reqwest::Client, url: &str) -> Result<f64, String> {
    let body: Value = http
        .get(url)
        .send()
        .await
        .map_err(|e| e.to_string())?
        .json()
        .await
        .map_err(|e| e.to_string())?;
    parse_hasui_apy(&body).ok_or_else(|| "missing data.apy".to_string())
}

async fn fetch_afsui(http: &reqwest::Client, url: &str) -> Result<f64, String> {
    let body = http
        .get(url)
        .send()
        .await
        .map_err(|e| e.to_string())?
        .text()
        .await
        .map_err(|e| e.to_string())?;
    parse_afsui_apy(&body).ok_or_else(|| format!("not a number: {}", body))
}

pub async fn fetch_apys(http: &reqwest::Client, config: &ApyConfig) -> TokenApys {
    let hasui = match fetch_hasui(http, &config.hasui_url).await {
        Ok(apy) => Some(apy),
        Err(e) => {
            tracing::warn!(url = %config.hasui_url, error = %e, "haSUI APY unavailable");
            None
        }
    };
    let afsui = match fetch_afsui(http, &config.afsui_url).await {
        Ok(apy) => Some(apy),
        Err(e) => {
            tracing::warn!(url = %config.afsui_url, error = %e, "afSUI APY unavailable");
            None
        }
    };

    TokenApys {
        vsui: config.vsui_apy,
        hasui,
        afsui,
    }
}
