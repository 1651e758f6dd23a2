//! Balloon feed client
//!
//! Fetches every hourly payload concurrently and assembles a snapshot.
//! Hours that fail to download or decode are left missing.

use crate::config::GatewayConfig;
use crate::GatewayError;
use balloon_tracking::{Report, Snapshot};
use fleet_analyzer::feed::parse_feed_payload;
use futures::future::join_all;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Feed returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("Payload could not be decoded")]
    Unreadable,
}

pub struct FeedClient {
    client: reqwest::Client,
    base_url: String,
    hours: u8,
}

impl FeedClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.feed_base_url.clone(),
            hours: config.feed_hours,
        })
    }

    pub fn hour_url(&self, hour: u8) -> String {
        format!("{}/{:02}.json", self.base_url, hour)
    }

    /// Fetch and decode one hour
    pub async fn fetch_hour(&self, hour: u8) -> Result<Vec<Report>, FeedError> {
        let response = self.client.get(self.hour_url(hour)).send().await?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status()));
        }

        let text = response.text().await?;
        parse_feed_payload(&text).ok_or(FeedError::Unreadable)
    }

    /// Fetch all configured hours in parallel
    ///
    /// Fails only when no hour at all could be retrieved.
    pub async fn fetch_snapshot(&self) -> Result<Snapshot, GatewayError> {
        let fetches = (0..self.hours).map(|hour| async move { (hour, self.fetch_hour(hour).await) });

        let mut snapshot = Snapshot::new();
        for (hour, result) in join_all(fetches).await {
            match result {
                Ok(reports) => {
                    tracing::debug!("Hour {:02}: {} reports", hour, reports.len());
                    snapshot.insert(hour, reports)?;
                }
                Err(e) => tracing::warn!("Hour {:02} unavailable: {}", hour, e),
            }
        }

        if snapshot.hours_present().next().is_none() {
            return Err(GatewayError::FeedUnavailable);
        }

        tracing::info!(
            "Fetched {} reports across {} of {} hours",
            snapshot.total_reports(),
            snapshot.hours_present().count(),
            self.hours
        );

        Ok(snapshot)
    }
}
