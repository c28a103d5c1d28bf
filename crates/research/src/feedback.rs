//! Interactive feedback on a finished report.

use delve_core::AppResult;
use std::io::BufRead;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, Mutex};

/// Replies that accept the report as is.
const AFFIRMATIVE: &[&str] = &[
    "y", "yes", "ok", "okay", "fine", "good", "great", "perfect", "done", "accept", "lgtm",
    "looks good", "thanks", "thank you", "none", "no feedback",
];

/// Where feedback on a report comes from.
#[async_trait::async_trait]
pub trait FeedbackSource: Send + Sync {
    /// Present `report` and wait for a reply. `None` means no reply at all.
    async fn request_feedback(&self, report: &str) -> AppResult<Option<String>>;
}

/// Shows the report on stderr and reads replies from stdin.
///
/// Lines are read on a dedicated thread and forwarded over a channel. An
/// abandoned wait does not hold up runtime shutdown, and a line typed late
/// is kept for the next request.
pub struct StdinFeedback {
    lines: Mutex<mpsc::Receiver<String>>,
}

impl StdinFeedback {
    pub fn new() -> Self {
        Self::from_lines(std::io::BufReader::new(std::io::stdin()).lines())
    }

    /// Feedback read from any blocking line source.
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: Iterator<Item = std::io::Result<String>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);
        std::thread::spawn(move || {
            for line in lines {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("Stopped reading feedback: {}", e);
                        break;
                    }
                };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        });
        Self {
            lines: Mutex::new(rx),
        }
    }
}

impl Default for StdinFeedback {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl FeedbackSource for StdinFeedback {
    async fn request_feedback(&self, report: &str) -> AppResult<Option<String>> {
        let mut stderr = tokio::io::stderr();
        stderr
            .write_all(format!("{}\n\nFeedback (press Enter to accept): ", report).as_bytes())
            .await?;
        stderr.flush().await?;

        // None once stdin is closed
        Ok(self.lines.lock().await.recv().await)
    }
}

/// Whether `reply` accepts the report rather than asking for changes.
pub fn is_affirmative(reply: &str) -> bool {
    let normalized = reply
        .trim()
        .trim_end_matches(['.', '!'])
        .to_lowercase();
    AFFIRMATIVE.contains(&normalized.as_str())
}

/// Ask `source` about `report`, waiting at most `timeout`.
///
/// Returns feedback only when it asks for changes. Silence, a timeout, a
/// blank line or an affirmative reply all accept the report.
pub async fn collect_feedback(
    source: &dyn FeedbackSource,
    report: &str,
    timeout: Duration,
) -> AppResult<Option<String>> {
    let reply = match tokio::time::timeout(timeout, source.request_feedback(report)).await {
        Ok(reply) => reply?,
        Err(_) => {
            tracing::info!(timeout_secs = timeout.as_secs_f64(), "No feedback before timeout, accepting report");
            return Ok(None);
        }
    };

    Ok(reply
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty() && !is_affirmative(r)))
}

/// Topic for a re-run: the original topic, the prior report and the feedback.
pub fn reframe_topic(topic: &str, report: &str, feedback: &str) -> String {
    format!(
        "{}\n\nA previous report on this topic:\n{}\n\nThe reader asked for these changes:\n{}",
        topic, report, feedback
    )
}
