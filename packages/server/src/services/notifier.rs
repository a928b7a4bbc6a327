use std::time::Duration;

use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::entity::mail_settings;

const IMPLICIT_TLS_PORT: u16 = 465;
const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Outbound SMTP settings as loaded from the settings row.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub from_email: Option<String>,
}

impl From<mail_settings::Model> for MailSettings {
    fn from(m: mail_settings::Model) -> Self {
        Self {
            host: m.smtp_host,
            port: u16::try_from(m.smtp_port).unwrap_or(IMPLICIT_TLS_PORT),
            user: m.smtp_user,
            password: m.smtp_password,
            from_email: m.from_email,
        }
    }
}

impl MailSettings {
    /// Host, user and password are all required before any connection.
    pub fn is_complete(&self) -> bool {
        !self.host.trim().is_empty()
            && !self.user.trim().is_empty()
            && self.password.as_deref().is_some_and(|p| !p.is_empty())
    }

    fn sender(&self) -> &str {
        self.from_email
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(&self.user)
    }
}

/// The rendered card and what the organizer needs to know about it.
pub struct CardEmail<'a> {
    pub event_title: &'a str,
    pub guest_url: &'a str,
    pub png: Vec<u8>,
}

/// Email the approved card to the organizer. Never fails; the outcome is
/// reported as a boolean and logged.
pub async fn send_card_email(
    settings: Option<&MailSettings>,
    to: &str,
    card: CardEmail<'_>,
) -> bool {
    let Some(settings) = settings.filter(|s| s.is_complete()) else {
        warn!(to, "Mail settings incomplete, card email not sent");
        return false;
    };
    let outcome = match build_card_message(settings, to, card) {
        Ok(message) => deliver(settings, message).await,
        Err(e) => Err(e),
    };
    log_outcome(to, "card", outcome)
}

/// Send a short test message to verify the settings.
pub async fn send_test_email(settings: &MailSettings, to: &str) -> bool {
    if !settings.is_complete() {
        warn!(to, "Mail settings incomplete, test email not sent");
        return false;
    }
    let outcome = match build_test_message(settings, to) {
        Ok(message) => deliver(settings, message).await,
        Err(e) => Err(e),
    };
    log_outcome(to, "test", outcome)
}

fn log_outcome(to: &str, kind: &str, outcome: Result<()>) -> bool {
    match outcome {
        Ok(()) => {
            info!(to, kind, "Email sent");
            true
        }
        Err(e) => {
            warn!(to, kind, error = %format!("{e:#}"), "Email delivery failed");
            false
        }
    }
}

fn mailboxes(settings: &MailSettings, to: &str) -> Result<(Mailbox, Mailbox)> {
    let from: Mailbox = format!("SnapVault <{}>", settings.sender())
        .parse()
        .context("invalid sender address")?;
    let to: Mailbox = to.parse().context("invalid recipient address")?;
    Ok((from, to))
}

pub(crate) fn build_card_message(
    settings: &MailSettings,
    to: &str,
    card: CardEmail<'_>,
) -> Result<Message> {
    let (from, to) = mailboxes(settings, to)?;
    let title = escape_html(card.event_title);
    let url = escape_html(card.guest_url);
    let html = format!(
        "<html><body style=\"font-family: sans-serif;\">\n\
         <h2>Your QR card for {title} is ready</h2>\n\
         <p>Your payment has been approved.</p>\n\
         <p>The printable card is attached to this email.</p>\n\
         <p>Guests can upload at <a href=\"{url}\">{url}</a></p>\n\
         <p>Thank you for using SnapVault!</p>\n\
         </body></html>\n"
    );
    let attachment = Attachment::new(card_filename(card.event_title)).body(
        card.png,
        ContentType::parse("image/png").context("png content type")?,
    );

    Message::builder()
        .from(from)
        .to(to)
        .subject(format!("Your SnapVault QR card for {}", card.event_title))
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::html(html))
                .singlepart(attachment),
        )
        .context("build card email")
}

fn build_test_message(settings: &MailSettings, to: &str) -> Result<Message> {
    let (from, to) = mailboxes(settings, to)?;
    Message::builder()
        .from(from)
        .to(to)
        .subject("SnapVault SMTP test")
        .singlepart(SinglePart::html(
            "<p>Your SnapVault email settings are working.</p>".to_string(),
        ))
        .context("build test email")
}

async fn deliver(settings: &MailSettings, message: Message) -> Result<()> {
    let credentials = Credentials::new(
        settings.user.clone(),
        settings.password.clone().unwrap_or_default(),
    );
    // 465 speaks TLS from the first byte; everything else upgrades via STARTTLS.
    let builder = if settings.port == IMPLICIT_TLS_PORT {
        AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
    }
    .context("configure SMTP transport")?;

    let transport = builder
        .port(settings.port)
        .credentials(credentials)
        .timeout(Some(SMTP_TIMEOUT))
        .build();

    transport.send(message).await.context("SMTP send")?;
    Ok(())
}

fn card_filename(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "snapvault_qr_card.png".to_string()
    } else {
        format!("{stem}_qr_card.png")
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
