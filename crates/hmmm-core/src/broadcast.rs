//! Threaded broadcast — posts the starred papers as a reply chain.
//!
//! ```text
//!  Idle ──opener ok──▶ ThreadOpened ──▶ Posting(0) ─▶ … ─▶ Posting(N-1) ──▶ Done
//!    │                                      │
//!    └─opener failed──▶ Failed              └─Esc──▶ Cancelled
//! ```
//!
//! Every item post replies to the most recent *successful* post, so a
//! rejected item never becomes a reply target and the chain stays intact.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::item::Item;

/// Remote identifier of a published post.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostId(pub String);

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("post rejected with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait BroadcastClient: Send + Sync {
    /// Publish `text`, optionally as a reply to `reply_to`.
    async fn post(&self, text: &str, reply_to: Option<&PostId>) -> Result<PostId, BroadcastError>;
}

/// Client for the X (Twitter) v2 "create post" endpoint, authenticated with
/// an OAuth2 user-context bearer token.
pub struct XClient {
    http: reqwest::Client,
    api_base: String,
    access_token: String,
}

#[derive(Serialize)]
struct CreatePost<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<ReplyTo<'a>>,
}

#[derive(Serialize)]
struct ReplyTo<'a> {
    in_reply_to_tweet_id: &'a str,
}

#[derive(Deserialize)]
struct CreatePostResponse {
    data: CreatedPost,
}

#[derive(Deserialize)]
struct CreatedPost {
    id: String,
}

impl XClient {
    pub fn new(
        api_base: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, BroadcastError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("hmmm/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }
}

#[async_trait]
impl BroadcastClient for XClient {
    async fn post(&self, text: &str, reply_to: Option<&PostId>) -> Result<PostId, BroadcastError> {
        let body = CreatePost {
            text,
            reply: reply_to.map(|id| ReplyTo {
                in_reply_to_tweet_id: id.0.as_str(),
            }),
        };

        let response = self
            .http
            .post(format!("{}/2/tweets", self.api_base))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BroadcastError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreatePostResponse = response
            .json()
            .await
            .map_err(|e| BroadcastError::Decode(e.to_string()))?;
        Ok(PostId(created.data.id))
    }
}

/// Texts that make up a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadTemplate {
    pub intro: String,
    /// Per-item text; `%TITLE%` and `%URL%` are substituted.
    pub body: String,
    /// Sent as a reply to the last successful post once all items are out.
    pub closing: Option<String>,
}

impl ThreadTemplate {
    pub fn render(&self, item: &Item) -> String {
        self.body
            .replace("%TITLE%", &item.title)
            .replace("%URL%", &item.bookmark_url())
    }
}

/// Delays that keep the thread under the platform's rate limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pacing {
    /// Pause before every item post.
    pub item_delay: Duration,
    /// Long pause taken every `backoff_every` posts.
    pub backoff: Duration,
    pub backoff_every: usize,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            item_delay: Duration::from_secs(10),
            backoff: Duration::from_secs(3 * 60 * 60),
            backoff_every: 200,
        }
    }
}

impl Pacing {
    pub fn immediate() -> Self {
        Self {
            item_delay: Duration::ZERO,
            backoff: Duration::ZERO,
            backoff_every: 0,
        }
    }

    /// True when a long pause belongs after item `i` of `total`. Posts sent
    /// so far are the opener plus `i + 1` items. Never after the last item.
    pub fn needs_backoff(&self, i: usize, total: usize) -> bool {
        self.backoff_every > 0 && i + 1 < total && (i + 2) % self.backoff_every == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadPhase {
    Idle,
    ThreadOpened,
    Posting(usize),
    Done,
    Cancelled,
    Failed,
}

/// Receives progress while a thread is being posted.
pub trait ProgressSink {
    /// About to post item `i` of `total` (before the pacing delay).
    fn posting(&mut self, i: usize, total: usize);

    /// Item `i` was rejected; the thread carries on.
    fn item_failed(&mut self, i: usize, item: &Item, error: &BroadcastError);

    fn phase_changed(&mut self, _phase: ThreadPhase) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFailure {
    pub index: usize,
    pub item: Item,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub phase: ThreadPhase,
    pub opener: PostId,
    /// `(item index, post id)` for every item that went out.
    pub posted: Vec<(usize, PostId)>,
    pub failures: Vec<PostFailure>,
    pub closing_error: Option<String>,
}

/// Sleep for `duration` unless cancelled first. Returns false on cancel.
async fn pause(duration: Duration, cancel: &CancellationToken) -> bool {
    if duration.is_zero() {
        return !cancel.is_cancelled();
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = cancel.cancelled() => false,
    }
}

/// Post `items` as a thread under the template's opener.
///
/// An opener failure aborts before any item is posted and is returned as the
/// error. Item failures are reported to `sink`, collected in the report and
/// never abort the run.
pub async fn broadcast_thread<C, P>(
    client: &C,
    items: &[Item],
    template: &ThreadTemplate,
    pacing: &Pacing,
    sink: &mut P,
    cancel: &CancellationToken,
) -> Result<BroadcastReport, BroadcastError>
where
    C: BroadcastClient + ?Sized,
    P: ProgressSink + ?Sized,
{
    let total = items.len();
    sink.phase_changed(ThreadPhase::Idle);

    let opener = match client.post(&template.intro, None).await {
        Ok(id) => id,
        Err(e) => {
            error!("unable to open thread: {}", e);
            sink.phase_changed(ThreadPhase::Failed);
            return Err(e);
        }
    };
    info!(opener = %opener, items = total, "thread opened");
    sink.phase_changed(ThreadPhase::ThreadOpened);

    let mut report = BroadcastReport {
        phase: ThreadPhase::ThreadOpened,
        opener: opener.clone(),
        posted: Vec::with_capacity(total),
        failures: Vec::new(),
        closing_error: None,
    };
    let mut last = opener;

    for (i, item) in items.iter().enumerate() {
        if cancel.is_cancelled() {
            report.phase = ThreadPhase::Cancelled;
            break;
        }
        report.phase = ThreadPhase::Posting(i);
        sink.phase_changed(report.phase);
        sink.posting(i, total);

        if !pause(pacing.item_delay, cancel).await {
            report.phase = ThreadPhase::Cancelled;
            break;
        }

        match client.post(&template.render(item), Some(&last)).await {
            Ok(id) => {
                debug!(index = i, post = %id, reply_to = %last, "item posted");
                report.posted.push((i, id.clone()));
                last = id;
            }
            Err(e) => {
                warn!("unable to add [{}] to thread: {}", item.title, e);
                sink.item_failed(i, item, &e);
                report.failures.push(PostFailure {
                    index: i,
                    item: item.clone(),
                    error: e.to_string(),
                });
            }
        }

        if pacing.needs_backoff(i, total) {
            info!(after = i + 1, pause = ?pacing.backoff, "backing off");
            if !pause(pacing.backoff, cancel).await {
                report.phase = ThreadPhase::Cancelled;
                break;
            }
        }
    }

    if report.phase == ThreadPhase::Cancelled {
        warn!(posted = report.posted.len(), "broadcast cancelled");
        sink.phase_changed(ThreadPhase::Cancelled);
        return Ok(report);
    }

    if let Some(closing) = &template.closing {
        if let Err(e) = client.post(closing, Some(&last)).await {
            warn!("closing post failed: {}", e);
            report.closing_error = Some(e.to_string());
        }
    }

    report.phase = ThreadPhase::Done;
    sink.phase_changed(ThreadPhase::Done);
    info!(
        posted = report.posted.len(),
        failed = report.failures.len(),
        "thread done"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_render() {
        let template = ThreadTemplate {
            intro: "Today's picks".to_string(),
            body: "%TITLE% %URL%".to_string(),
            closing: None,
        };
        assert_eq!(
            template.render(&Item::new("2401.1", "Neat")),
            "Neat http://sciencewise.info/bookmarks/2401.1/add"
        );
    }

    #[test]
    fn test_backoff_schedule() {
        let pacing = Pacing::default();
        // opener + 199 items is the 200th post
        assert!(pacing.needs_backoff(198, 500));
        assert!(!pacing.needs_backoff(197, 500));
        assert!(pacing.needs_backoff(398, 500));
        // never after the final item
        assert!(!pacing.needs_backoff(198, 199));
        assert!(!Pacing::immediate().needs_backoff(198, 500));
    }

    #[test]
    fn test_create_post_body() {
        let reply = PostId("42".to_string());
        let opener = serde_json::to_value(CreatePost {
            text: "hi",
            reply: None,
        })
        .unwrap();
        assert_eq!(opener, serde_json::json!({ "text": "hi" }));

        let item = serde_json::to_value(CreatePost {
            text: "next",
            reply: Some(ReplyTo {
                in_reply_to_tweet_id: &reply.0,
            }),
        })
        .unwrap();
        assert_eq!(
            item,
            serde_json::json!({ "text": "next", "reply": { "in_reply_to_tweet_id": "42" } })
        );
    }
}
