//! Typed reads of the instance event paths: spot interruptions, rebalance
//! recommendations and scheduled maintenance.

use crate::error::ImdsError;
use crate::error::Result;
use crate::path::ImdsPath;
use crate::transport::MetadataTransport;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const SPOT_TERMINATION_TIME_PATH: &str = "meta-data/spot/termination-time";
pub const SPOT_INSTANCE_ACTION_PATH: &str = "meta-data/spot/instance-action";
pub const REBALANCE_RECOMMENDATION_PATH: &str = "meta-data/events/recommendations/rebalance";
pub const SCHEDULED_MAINTENANCE_PATH: &str = "meta-data/events/maintenance/scheduled";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct InstanceAction {
    pub action: String,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RebalanceRecommendation {
    #[serde(rename = "noticeTime", with = "time::serde::rfc3339")]
    pub notice_time: OffsetDateTime,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScheduledEvent {
    pub code: String,
    pub description: String,
    #[serde(rename = "EventId")]
    pub event_id: String,
    pub state: String,
    pub not_before: String,
    #[serde(default)]
    pub not_after: Option<String>,
}

/// When the spot instance will be reclaimed. `None` until an interruption is
/// scheduled.
pub async fn spot_termination_time<T>(transport: &T) -> Result<Option<OffsetDateTime>>
where
    T: MetadataTransport + ?Sized,
{
    let Some(raw) = fetch_optional(transport, SPOT_TERMINATION_TIME_PATH).await? else {
        return Ok(None);
    };
    let raw = raw.trim();
    OffsetDateTime::parse(raw, &Rfc3339)
        .map(Some)
        .map_err(|err| ImdsError::InvalidValue {
            path: SPOT_TERMINATION_TIME_PATH.to_string(),
            message: format!("invalid time {raw:?}: {err}"),
        })
}

pub async fn spot_instance_action<T>(transport: &T) -> Result<Option<InstanceAction>>
where
    T: MetadataTransport + ?Sized,
{
    fetch_json(transport, SPOT_INSTANCE_ACTION_PATH).await
}

pub async fn rebalance_recommendation<T>(transport: &T) -> Result<Option<RebalanceRecommendation>>
where
    T: MetadataTransport + ?Sized,
{
    fetch_json(transport, REBALANCE_RECOMMENDATION_PATH).await
}

/// Scheduled maintenance events. Empty when nothing is scheduled.
pub async fn scheduled_maintenance<T>(transport: &T) -> Result<Vec<ScheduledEvent>>
where
    T: MetadataTransport + ?Sized,
{
    Ok(fetch_json(transport, SCHEDULED_MAINTENANCE_PATH)
        .await?
        .unwrap_or_default())
}

async fn fetch_optional<T>(transport: &T, path: &str) -> Result<Option<String>>
where
    T: MetadataTransport + ?Sized,
{
    let path = ImdsPath::parse(path)?;
    match transport.fetch(&path).await {
        Ok(body) => Ok(Some(String::from_utf8_lossy(&body).into_owned())),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

async fn fetch_json<T, V>(transport: &T, path: &str) -> Result<Option<V>>
where
    T: MetadataTransport + ?Sized,
    V: DeserializeOwned,
{
    let Some(raw) = fetch_optional(transport, path).await? else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| ImdsError::InvalidValue {
            path: path.to_string(),
            message: err.to_string(),
        })
}
