use chrono::NaiveDateTime;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::TelegramConfig;

/// Best-effort Telegram notifier. Delivery runs on a spawned task after the
/// ticket is committed; failures are logged and swallowed, never surfaced to
/// the caller. Unconfigured (no token/chat id) it is a silent no-op.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    endpoint: Option<String>,
    chat_id: Option<String>,
}

impl Notifier {
    pub fn from_config(config: &TelegramConfig) -> Self {
        let endpoint = config
            .bot_token
            .as_ref()
            .map(|token| format!("{}/bot{}/sendMessage", config.api_base, token));

        Notifier {
            client: reqwest::Client::new(),
            endpoint,
            chat_id: config.chat_id.clone(),
        }
    }

    pub fn ticket_created_message(
        email: &str,
        show_title: &str,
        row: i32,
        seat: i32,
        show_time: NaiveDateTime,
    ) -> String {
        format!(
            "New ticket created by {email}\n\
             Event: {show_title}\n\
             Row: {row}, Seat: {seat}\n\
             Time: {show_time}"
        )
    }

    /// Fire-and-forget: spawns the delivery and returns immediately.
    pub fn notify(&self, text: String) {
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.send(&text).await;
        });
    }

    /// Synchronous-awaitable delivery; still swallows every failure.
    pub async fn send(&self, text: &str) {
        let (Some(endpoint), Some(chat_id)) = (&self.endpoint, &self.chat_id) else {
            debug!("Notifier unconfigured, dropping message");
            return;
        };

        let payload = json!({ "chat_id": chat_id, "text": text });
        match self.client.post(endpoint).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Notification delivered");
            }
            Ok(response) => {
                warn!(status = %response.status(), "Notification endpoint rejected message");
            }
            Err(err) => {
                warn!(error = %err, "Notification delivery failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(api_base: &str) -> TelegramConfig {
        TelegramConfig {
            bot_token: Some("token".to_string()),
            chat_id: Some("chat".to_string()),
            api_base: api_base.to_string(),
        }
    }

    #[test]
    fn ticket_message_has_the_fixed_shape() {
        let show_time = NaiveDate::from_ymd_opt(2024, 8, 8)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();
        let message =
            Notifier::ticket_created_message("user@tt.com", "Black Holes", 1, 2, show_time);
        assert_eq!(
            message,
            "New ticket created by user@tt.com\n\
             Event: Black Holes\n\
             Row: 1, Seat: 2\n\
             Time: 2024-08-08 15:00:00"
        );
    }

    #[tokio::test]
    async fn delivers_message_to_configured_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bottoken/sendMessage"))
            .and(body_partial_json(json!({ "chat_id": "chat", "text": "hello" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = Notifier::from_config(&config(&server.uri()));
        notifier.send("hello").await;
    }

    #[tokio::test]
    async fn endpoint_failure_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let notifier = Notifier::from_config(&config(&server.uri()));
        // Must complete without error or panic.
        notifier.send("hello").await;
    }

    #[tokio::test]
    async fn unconfigured_notifier_is_a_no_op() {
        let notifier = Notifier::from_config(&TelegramConfig {
            bot_token: None,
            chat_id: None,
            api_base: "https://api.telegram.org".to_string(),
        });
        notifier.send("hello").await;
    }
}
