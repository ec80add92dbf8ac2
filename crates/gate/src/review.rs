//! Human review of decisions the gate did not auto-approve.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sri_core::{Decision, Profile, ReviewId, Time};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Resolved tickets kept in memory before the oldest are dropped.
pub const DEFAULT_MAX_RESOLVED: usize = 1000;

/// Timeout for a webhook notification.
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Review ticket state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    /// Waiting for a reviewer
    Pending,
    /// Reviewer confirmed the recommendation
    Approved,
    /// Reviewer turned the recommendation down
    Rejected,
}

impl std::fmt::Display for ReviewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewState::Pending => write!(f, "pending"),
            ReviewState::Approved => write!(f, "approved"),
            ReviewState::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ReviewState {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReviewState::Pending),
            "approved" => Ok(ReviewState::Approved),
            "rejected" => Ok(ReviewState::Rejected),
            other => Err(ReviewError::InvalidState(other.to_string())),
        }
    }
}

/// A decision waiting for (or having received) human review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewTicket {
    /// Unique ID
    pub id: ReviewId,
    /// Profile the recommendation was made for
    pub profile: Profile,
    /// Decision under review
    pub decision: Decision,
    /// Current state
    pub state: ReviewState,
    /// Opened timestamp
    pub created_at: Time,
    /// Resolution timestamp
    pub resolved_at: Option<Time>,
    /// Who resolved the ticket
    pub reviewer: Option<String>,
    /// Reviewer comments
    pub comments: String,
}

/// A reviewer's verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    /// Whether the recommendation is confirmed
    pub approved: bool,
    /// Reviewer name
    pub reviewer: String,
    /// Free-form comments
    #[serde(default)]
    pub comments: String,
}

/// Filter for listing tickets.
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    /// Only tickets in this state
    pub state: Option<ReviewState>,
    /// Maximum results to return
    pub limit: Option<usize>,
}

/// Review queue errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    /// No ticket with that ID
    #[error("review {0} not found")]
    NotFound(ReviewId),

    /// Ticket was already approved or rejected
    #[error("review {id} already {state}")]
    AlreadyResolved {
        /// Ticket ID
        id: ReviewId,
        /// State it was resolved to
        state: ReviewState,
    },

    /// Unknown state name
    #[error("unknown review state: {0}")]
    InvalidState(String),
}

/// Queue of decisions awaiting human review.
#[async_trait]
pub trait ReviewQueue: Send + Sync {
    /// Open a ticket for a decision.
    async fn submit(&self, profile: Profile, decision: Decision) -> ReviewTicket;

    /// Get a ticket.
    async fn get(&self, id: ReviewId) -> Option<ReviewTicket>;

    /// List tickets, oldest first.
    async fn list(&self, filter: ReviewFilter) -> Vec<ReviewTicket>;

    /// Record a reviewer's verdict on a pending ticket.
    async fn resolve(&self, id: ReviewId, resolution: Resolution) -> Result<ReviewTicket, ReviewError>;
}

/// Where new-ticket notifications go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationChannel {
    /// Structured log line only
    #[default]
    Log,
    /// POST the ticket as JSON
    Webhook {
        /// Target URL
        url: String,
    },
}

/// Sends new-ticket notifications. Failures are logged, never returned.
///
/// Webhook delivery runs in a background task; the submitter does not wait
/// for it.
#[derive(Clone)]
pub struct ReviewNotifier {
    channel: NotificationChannel,
    client: reqwest::Client,
}

impl ReviewNotifier {
    /// Create a notifier for a channel.
    pub fn new(channel: NotificationChannel) -> Self {
        Self {
            channel,
            client: reqwest::Client::builder()
                .timeout(WEBHOOK_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Announce a newly opened ticket.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn notify(&self, ticket: &ReviewTicket) {
        match &self.channel {
            NotificationChannel::Log => {
                info!(
                    review_id = %ticket.id,
                    product_id = ticket.decision.judgment().product_id(),
                    confidence = ticket.decision.judgment().confidence(),
                    "Recommendation awaiting human review"
                );
            }
            NotificationChannel::Webhook { url } => {
                let client = self.client.clone();
                let url = url.clone();
                let ticket = ticket.clone();
                tokio::spawn(async move {
                    debug!("Sending review notification to {}", url);
                    match client.post(&url).json(&ticket).send().await {
                        Ok(resp) if resp.status().is_success() => {}
                        Ok(resp) => warn!("Review webhook {} answered {}", url, resp.status()),
                        Err(e) => warn!("Review webhook {} failed: {}", url, e),
                    }
                });
            }
        }
    }
}

/// In-memory review queue.
///
/// Pending tickets are always kept. Once more than `max_resolved` tickets
/// are resolved, the ones resolved earliest are dropped.
pub struct InMemoryReviewQueue {
    tickets: Arc<Mutex<HashMap<ReviewId, ReviewTicket>>>,
    notifier: ReviewNotifier,
    max_resolved: usize,
}

impl InMemoryReviewQueue {
    /// Create an empty queue notifying through the given channel.
    pub fn new(channel: NotificationChannel) -> Self {
        Self {
            tickets: Arc::new(Mutex::new(HashMap::new())),
            notifier: ReviewNotifier::new(channel),
            max_resolved: DEFAULT_MAX_RESOLVED,
        }
    }

    /// Keep at most `max_resolved` resolved tickets.
    pub fn with_max_resolved(mut self, max_resolved: usize) -> Self {
        self.max_resolved = max_resolved;
        self
    }
}

fn evict_resolved(tickets: &mut HashMap<ReviewId, ReviewTicket>, max_resolved: usize) {
    let mut resolved: Vec<(Option<Time>, ReviewId)> = tickets
        .values()
        .filter(|t| t.state != ReviewState::Pending)
        .map(|t| (t.resolved_at, t.id))
        .collect();

    if resolved.len() <= max_resolved {
        return;
    }

    resolved.sort();
    let excess = resolved.len() - max_resolved;
    for (_, id) in resolved.into_iter().take(excess) {
        tickets.remove(&id);
    }
    debug!("Dropped {} resolved review(s)", excess);
}

impl Default for InMemoryReviewQueue {
    fn default() -> Self {
        Self::new(NotificationChannel::Log)
    }
}

#[async_trait]
impl ReviewQueue for InMemoryReviewQueue {
    async fn submit(&self, profile: Profile, decision: Decision) -> ReviewTicket {
        let ticket = ReviewTicket {
            id: ReviewId::new(),
            profile,
            decision,
            state: ReviewState::Pending,
            created_at: chrono::Utc::now(),
            resolved_at: None,
            reviewer: None,
            comments: String::new(),
        };

        self.tickets.lock().await.insert(ticket.id, ticket.clone());
        self.notifier.notify(&ticket);
        ticket
    }

    async fn get(&self, id: ReviewId) -> Option<ReviewTicket> {
        self.tickets.lock().await.get(&id).cloned()
    }

    async fn list(&self, filter: ReviewFilter) -> Vec<ReviewTicket> {
        let tickets = self.tickets.lock().await;
        let mut results: Vec<_> = tickets
            .values()
            .filter(|t| filter.state.map_or(true, |s| t.state == s))
            .cloned()
            .collect();

        results.sort_by_key(|t| t.created_at);

        if let Some(limit) = filter.limit {
            results.truncate(limit);
        }

        results
    }

    async fn resolve(&self, id: ReviewId, resolution: Resolution) -> Result<ReviewTicket, ReviewError> {
        let mut tickets = self.tickets.lock().await;
        let ticket = tickets.get_mut(&id).ok_or(ReviewError::NotFound(id))?;

        if ticket.state != ReviewState::Pending {
            return Err(ReviewError::AlreadyResolved { id, state: ticket.state });
        }

        ticket.state = if resolution.approved {
            ReviewState::Approved
        } else {
            ReviewState::Rejected
        };
        ticket.resolved_at = Some(chrono::Utc::now());
        ticket.reviewer = Some(resolution.reviewer);
        ticket.comments = resolution.comments;

        info!("Review {} {}", id, ticket.state);
        let resolved = ticket.clone();
        evict_resolved(&mut tickets, self.max_resolved);
        Ok(resolved)
    }
}
