use schoolgate_core::{Email, EmailClient};

/// Email client for local runs: nothing leaves the process, the message is logged
/// instead so verification links can be picked up from the output.
#[derive(Debug, Clone, Default)]
pub struct MockEmailClient;

impl MockEmailClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl EmailClient for MockEmailClient {
    async fn send_email(
        &self,
        _recipient: &Email,
        subject: &str,
        content: &str,
    ) -> Result<(), String> {
        tracing::info!(subject, content, "Email not sent (mock client)");
        Ok(())
    }
}
