//! Groups incoming alerts by alert name and renders each group into one
//! markdown chat message.
//!
//! Alerts arrive from [webhook_receiver](crate::webhook_receiver) as part of
//! an [AlertBatch](crate::alert::AlertBatch); rendered messages are pushed
//! out by [notifier](crate::notifier).

use indexmap::IndexMap;

use crate::alert::{Alert, AlertStatus};

/// at most this many alerts of a group make it into the message body, the
/// rest is silently truncated
pub const MAX_RENDERED_ALERTS: usize = 5;

/// literal placeholder for an alert whose annotations can't be rendered
const ITEM_ERROR: &str = "failed to format alert item\n---\n";

/// labels that get their own line in the rendered block, in render order
const DETAIL_LABELS: [(&str, &str); 5] = [
    ("job", "Job"),
    ("namespace", "Namespace"),
    ("pod", "Pod"),
    ("service", "Service"),
    ("status", "Status"),
];

/// one outgoing chat message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedMessage {
    /// short title, used by providers with a separate title field
    pub title: String,
    /// markdown body
    pub text: String,
}

/// Group alerts by their `alertname` label, keeping first-seen group order
/// and per-group insertion order. Alerts without the label are dropped with
/// a warning, they never fail the batch.
pub fn group_by_name(alerts: &[Alert]) -> IndexMap<&str, Vec<&Alert>> {
    let mut groups: IndexMap<&str, Vec<&Alert>> = IndexMap::new();

    for alert in alerts {
        match alert.name() {
            Some(name) => groups.entry(name).or_insert_with(Vec::new).push(alert),
            None => {
                tracing::warn!(labels = ?alert.labels, "alert without alertname label, skipping");
            }
        }
    }

    groups
}

/// Render one alert-name group into a markdown message.
///
/// * `link` - target of the trailing "view full details" link, omitted when
///   neither a configured default nor the batch's `externalURL` is known
/// * `banner` - banner image url for providers with rich markdown support
pub fn render_group(
    status: AlertStatus,
    name: &str,
    alerts: &[&Alert],
    link: Option<&str>,
    banner: Option<&str>,
) -> RenderedMessage {
    let count = alerts.len();

    let (title, heading) = match status {
        AlertStatus::Firing => (
            format!("{count} new alerts for {name}"),
            format!("**[{name}]** has **{count}** new alerts"),
        ),
        AlertStatus::Resolved => (
            format!("{count} alerts resolved for {name}"),
            format!("**[{name}]** has **{count}** alerts resolved"),
        ),
    };

    let mut text = heading;
    text.push('\n');

    if let Some(banner) = banner {
        text.push_str(&format!("![banner]({banner})\n"));
    }

    for alert in alerts.iter().take(MAX_RENDERED_ALERTS) {
        text.push_str(&render_item(alert));
    }

    if let Some(link) = link {
        text.push_str(&format!("\n[view full details]({link})"));
    }

    RenderedMessage { title, text }
}

/// Render a single alert into its markdown block. An alert whose summary or
/// description is missing, empty or not coercible to a string renders as a
/// literal error placeholder instead of failing the batch.
fn render_item(alert: &Alert) -> String {
    let summary = alert.annotations.get("summary").and_then(coerce);
    let description = alert.annotations.get("description").and_then(coerce);

    let (summary, description) = match (summary, description) {
        (Some(summary), Some(description))
            if !summary.is_empty() && !description.is_empty() =>
        {
            (summary, description)
        }
        _ => {
            tracing::error!(
                labels = ?alert.labels,
                "alert has no usable summary/description annotations"
            );
            return ITEM_ERROR.to_string();
        }
    };

    let mut item = String::new();

    for (key, caption) in DETAIL_LABELS {
        if let Some(value) = alert.labels.get(key) {
            item.push_str(&format!("\n> {caption}: {value}\n\n"));
        }
    }

    item.push_str(&format!(
        "> Summary: {summary}\n\n> Description: {description}\n---\n"
    ));

    item
}

/// stringify scalar annotation values the way the message expects them
fn coerce(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(value) => Some(value.trim().to_string()),
        serde_json::Value::Number(value) => Some(value.to_string()),
        serde_json::Value::Bool(value) => Some(value.to_string()),
        _ => None,
    }
}
