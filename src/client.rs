use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::auth::ZoomAuth;
use crate::config::ZoomConfig;
use crate::error::ProviderError;
use crate::models::meeting::{CreatedMeeting, Meeting, MeetingCreate};
use crate::services::identity::MeetingIdMapper;

// Zoom meeting type 2 = scheduled meeting.
const SCHEDULED_MEETING_TYPE: u8 = 2;
const LIST_PAGE_SIZE: u32 = 300;

/// Operations the booking coordinator needs from a conferencing provider.
///
/// Every call is a live round-trip; implementations must not cache meetings.
#[async_trait]
pub trait MeetingProvider: Send + Sync {
    async fn create_meeting(&self, candidate: &MeetingCreate)
        -> Result<CreatedMeeting, ProviderError>;

    async fn list_meetings(&self) -> Result<Vec<Meeting>, ProviderError>;
}

#[derive(Debug, Serialize)]
pub struct ZoomCreateMeetingRequest {
    pub topic: String,
    #[serde(rename = "type")]
    pub meeting_type: u8,
    pub start_time: String,
    pub duration: u32,
    pub timezone: String,
}

impl From<&MeetingCreate> for ZoomCreateMeetingRequest {
    fn from(candidate: &MeetingCreate) -> Self {
        Self {
            topic: candidate.topic.clone(),
            meeting_type: SCHEDULED_MEETING_TYPE,
            start_time: candidate
                .start_date
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            duration: candidate.duration_minutes,
            timezone: "UTC".to_string(),
        }
    }
}

// Every field optional: presence is checked during translation so a bad
// payload surfaces as MalformedResponse instead of a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoomMeeting {
    pub uuid: Option<String>,
    pub id: Option<i64>,
    pub topic: Option<String>,
    pub start_time: Option<String>,
    pub duration: Option<u32>,
    pub join_url: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ZoomMeetingList {
    #[serde(default)]
    pub meetings: Vec<ZoomMeeting>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub total_records: Option<u32>,
}

impl ZoomMeeting {
    /// Translate a listed meeting into the domain representation.
    pub fn to_meeting(&self, ids: &MeetingIdMapper) -> Result<Meeting, ProviderError> {
        let native_id = required(self.uuid.as_deref(), "uuid")?;
        let start_time = required(self.start_time.as_deref(), "start_time")?;
        let duration = self.duration.ok_or_else(|| missing("duration"))?;

        let start_date = DateTime::parse_from_rfc3339(start_time)
            .map_err(|e| {
                ProviderError::MalformedResponse(format!(
                    "unparsable start_time {:?}: {}",
                    start_time, e
                ))
            })?
            .with_timezone(&Utc);

        Ok(Meeting {
            id: ids.local_id(native_id),
            start_date,
            duration_minutes: duration,
        })
    }

    /// Translate a freshly created meeting, which must carry a join link.
    pub fn to_created_meeting(
        &self,
        ids: &MeetingIdMapper,
    ) -> Result<CreatedMeeting, ProviderError> {
        let meeting = self.to_meeting(ids)?;
        let join_link = required(self.join_url.as_deref(), "join_url")?;
        Ok(CreatedMeeting {
            meeting,
            join_link: join_link.to_string(),
        })
    }
}

fn missing(field: &str) -> ProviderError {
    ProviderError::MalformedResponse(format!("missing {}", field))
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ProviderError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(missing(field)),
    }
}

/// Client for the Zoom meetings REST API
pub struct ZoomMeetingClient {
    client: Client,
    auth: ZoomAuth,
    api_base_url: String,
    user_id: String,
    ids: MeetingIdMapper,
}

impl ZoomMeetingClient {
    pub fn new(config: &ZoomConfig, ids: MeetingIdMapper) -> Self {
        let client = Client::new();
        let auth = ZoomAuth::new(
            client.clone(),
            &config.oauth_base_url,
            &config.account_id,
            &config.client_id,
            &config.client_secret,
        );

        Self {
            client,
            auth,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            user_id: config.user_id.clone(),
            ids,
        }
    }

    pub fn id_mapper(&self) -> &MeetingIdMapper {
        &self.ids
    }

    fn meetings_url(&self) -> String {
        format!("{}/users/{}/meetings", self.api_base_url, self.user_id)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ProviderError> {
        let token = self.auth.access_token().await?;
        let res = request.bearer_auth(token).send().await?;
        info!("Response received with status: {}", res.status());

        let status = res.status();
        if status == StatusCode::UNAUTHORIZED {
            // Revoked before its expiry; fetch a new one on the next call.
            warn!("Zoom rejected the access token, clearing the cached token");
            self.auth.invalidate().await;
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }
        Ok(res)
    }

    async fn list_page(&self, page_token: Option<&str>) -> Result<ZoomMeetingList, ProviderError> {
        let mut query = vec![
            ("type", "scheduled".to_string()),
            ("page_size", LIST_PAGE_SIZE.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("next_page_token", token.to_string()));
        }

        let request = self.client.get(self.meetings_url()).query(&query);
        let page = self.send(request).await?.json::<ZoomMeetingList>().await?;
        debug!(
            "Fetched page with {} meetings (total_records: {:?})",
            page.meetings.len(),
            page.total_records
        );
        Ok(page)
    }
}

#[async_trait]
impl MeetingProvider for ZoomMeetingClient {
    async fn create_meeting(
        &self,
        candidate: &MeetingCreate,
    ) -> Result<CreatedMeeting, ProviderError> {
        let body = ZoomCreateMeetingRequest::from(candidate);
        info!("Making request to create meeting: {}", body.topic);
        debug!("API URL: {}", self.meetings_url());

        let request = self.client.post(self.meetings_url()).json(&body);
        let response = self.send(request).await?.json::<ZoomMeeting>().await?;

        response.to_created_meeting(&self.ids)
    }

    async fn list_meetings(&self) -> Result<Vec<Meeting>, ProviderError> {
        info!("Making request to list meetings");

        let mut meetings = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        loop {
            let page = self.list_page(page_token.as_deref()).await?;
            for zoom_meeting in &page.meetings {
                meetings.push(zoom_meeting.to_meeting(&self.ids)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => {
                    if !seen_tokens.insert(token.clone()) {
                        return Err(ProviderError::MalformedResponse(format!(
                            "next_page_token {:?} repeated",
                            token
                        )));
                    }
                    page_token = Some(token);
                }
                _ => break,
            }
        }

        Ok(meetings)
    }
}
