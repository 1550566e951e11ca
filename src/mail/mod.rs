//! Outgoing e-mail: the [`Mailer`] seam, its backends and the messages the
//! platform sends.

use std::sync::Arc;

use async_trait::async_trait;

mod console;
pub use console::ConsoleMailer;

mod error;
pub use error::{MailError, MailResult};

pub mod messages;

mod smtp;
pub use smtp::SmtpMailer;

use crate::config::{Mail, MailBackend};

#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl MailAttachment {
    pub fn pdf(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: String::from("application/pdf"),
            content,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<MailAttachment>,
}

impl MailMessage {
    pub fn new(to: Vec<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to,
            cc: Vec::new(),
            subject: subject.into(),
            body: body.into(),
            attachments: Vec::new(),
        }
    }

    /// Adds copies, skipping blanks and addresses already on the message.
    pub fn with_cc<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for address in addresses {
            let address = address.as_ref().trim().to_lowercase();
            if address.is_empty() {
                continue;
            }
            let known = self
                .to
                .iter()
                .chain(self.cc.iter())
                .any(|a| a.eq_ignore_ascii_case(&address));
            if !known {
                self.cc.push(address);
            }
        }
        self
    }

    pub fn with_attachment(mut self, attachment: MailAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    fn check_recipients(&self) -> MailResult<()> {
        if self.to.is_empty() {
            return Err(MailError::NoRecipients);
        }
        Ok(())
    }
}

#[async_trait]
pub trait Mailer: Send + Sync + std::fmt::Debug {
    async fn send(&self, message: MailMessage) -> MailResult<()>;
}

pub fn build_mailer(config: &Mail) -> MailResult<Arc<dyn Mailer>> {
    match config.backend() {
        MailBackend::Console => {
            tracing::warn!("mail backend is console, messages will only be logged");
            Ok(Arc::new(ConsoleMailer::new()))
        }
        MailBackend::Smtp => {
            tracing::info!("mail backend is smtp via {}:{}", config.host(), config.port());
            Ok(Arc::new(SmtpMailer::from_config(config)?))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cc_skips_duplicates_and_blanks() {
        let message = MailMessage::new(vec!["holder@x.com".into()], "s", "b").with_cc([
            "Boss@X.com",
            "",
            "holder@x.com",
            "boss@x.com",
            "safety@x.com",
        ]);
        assert_eq!(message.cc, vec!["boss@x.com", "safety@x.com"]);
    }
}
