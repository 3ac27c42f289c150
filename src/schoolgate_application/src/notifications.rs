use askama::Template;
use chrono::{DateTime, Utc};
use schoolgate_core::{Account, EmailClient, VerificationToken};

pub const VERIFICATION_SUBJECT: &str = "Verify your email address";
pub const SIGN_IN_SUBJECT: &str = "New sign-in to your account";

#[derive(Template)]
#[template(path = "verification_email.txt")]
struct VerificationEmail<'a> {
    display_name: &'a str,
    link: &'a str,
    lifetime_hours: i64,
}

#[derive(Template)]
#[template(path = "sign_in_email.txt")]
struct SignInEmail<'a> {
    display_name: &'a str,
    signed_in_at: String,
}

/// Renders account emails and hands them to the email client. Every send is best
/// effort: failures are logged and swallowed.
#[derive(Clone)]
pub struct Notifier<E>
where
    E: EmailClient,
{
    email_client: E,
    public_base_url: String,
}

impl<E> Notifier<E>
where
    E: EmailClient,
{
    pub fn new(email_client: E, public_base_url: impl Into<String>) -> Self {
        Self {
            email_client,
            public_base_url: public_base_url.into(),
        }
    }

    pub fn verification_link(&self, token: &VerificationToken) -> String {
        format!(
            "{}/auth/email-verification?token={}",
            self.public_base_url.trim_end_matches('/'),
            token.as_str()
        )
    }

    #[tracing::instrument(name = "Notifier::send_verification", skip_all)]
    pub async fn send_verification(
        &self,
        account: &Account,
        token: &VerificationToken,
        lifetime_hours: i64,
    ) {
        let link = self.verification_link(token);
        let body = VerificationEmail {
            display_name: greeting_name(account),
            link: &link,
            lifetime_hours,
        }
        .render();

        self.deliver(account, VERIFICATION_SUBJECT, body).await;
    }

    #[tracing::instrument(name = "Notifier::send_sign_in", skip_all)]
    pub async fn send_sign_in(&self, account: &Account, signed_in_at: DateTime<Utc>) {
        let body = SignInEmail {
            display_name: greeting_name(account),
            signed_in_at: signed_in_at.format("%Y-%m-%d %H:%M").to_string(),
        }
        .render();

        self.deliver(account, SIGN_IN_SUBJECT, body).await;
    }

    async fn deliver(&self, account: &Account, subject: &str, body: askama::Result<String>) {
        let content = match body {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(error = %e, subject, "Failed to render email");
                return;
            }
        };

        if let Err(e) = self
            .email_client
            .send_email(account.email(), subject, &content)
            .await
        {
            tracing::warn!(error = %e, account_id = %account.id(), subject, "Failed to send email");
        }
    }
}

fn greeting_name(account: &Account) -> &str {
    account
        .display_name()
        .unwrap_or_else(|| account.email().local_part())
}
