use serde::Serialize;

/// Outcome of a notification attempt. Callers decide whether a failure is
/// user-visible; nothing in here panics or swallows errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// No transport configured; expected in development setups.
    FailedNonfatal,
    /// Transport configured but the send itself failed.
    FailedFatal,
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered)
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    event: &'a str,
    user_id: &'a str,
    email: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
}

/// Delivers account notifications to an optional webhook endpoint.
pub struct Notifier {
    webhook_url: Option<String>,
    client: reqwest::Client,
}

impl Notifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            webhook_url,
            client: reqwest::Client::new(),
        }
    }

    async fn send(&self, payload: WebhookPayload<'_>) -> Delivery {
        let Some(url) = &self.webhook_url else {
            tracing::warn!("No notification webhook configured, dropping {}", payload.event);
            return Delivery::FailedNonfatal;
        };

        match self.client.post(url).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => Delivery::Delivered,
            Ok(resp) => {
                tracing::warn!("Notification webhook answered {}", resp.status());
                Delivery::FailedFatal
            }
            Err(e) => {
                tracing::warn!("Notification webhook unreachable: {e}");
                Delivery::FailedFatal
            }
        }
    }

    /// Alert the account owner that someone is hammering their login.
    pub async fn unusual_login(&self, user_id: &str, email: &str) -> Delivery {
        self.send(WebhookPayload {
            event: "unusual_login",
            user_id,
            email,
            message: "Several failed sign-in attempts were made on your account.",
            token: None,
        })
        .await
    }

    /// Send the password-change confirmation link token.
    pub async fn password_change(&self, user_id: &str, email: &str, token: &str) -> Delivery {
        self.send(WebhookPayload {
            event: "password_change",
            user_id,
            email,
            message: "Confirm your password change using the link in this message.",
            token: Some(token),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_transport_is_nonfatal() {
        let notifier = Notifier::new(None);
        let outcome = notifier.unusual_login("u1", "user@example.com").await;
        assert_eq!(outcome, Delivery::FailedNonfatal);
        assert!(!outcome.is_delivered());
    }
}
