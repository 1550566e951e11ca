use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{MailMessage, MailResult, Mailer};

/// Logs messages instead of delivering them and keeps them in an outbox.
#[derive(Debug, Clone, Default)]
pub struct ConsoleMailer {
    outbox: Arc<Mutex<Vec<MailMessage>>>,
}

impl ConsoleMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages "sent" so far, oldest first.
    pub fn sent(&self) -> Vec<MailMessage> {
        match self.outbox.lock() {
            Ok(outbox) => outbox.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, message: MailMessage) -> MailResult<()> {
        message.check_recipients()?;

        let attachments: Vec<&str> = message
            .attachments
            .iter()
            .map(|a| a.filename.as_str())
            .collect();
        tracing::info!(
            to = ?message.to,
            cc = ?message.cc,
            subject = %message.subject,
            ?attachments,
            "console mail:\n{}",
            message.body
        );

        match self.outbox.lock() {
            Ok(mut outbox) => outbox.push(message),
            Err(poisoned) => poisoned.into_inner().push(message),
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn console_mailer_keeps_outbox() {
        let mailer = ConsoleMailer::new();
        let message = MailMessage::new(vec!["a@x.com".into()], "Hola", "Cuerpo");
        mailer.send(message).await.unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Hola");
    }

    #[tokio::test]
    async fn console_mailer_rejects_empty_recipients() {
        let mailer = ConsoleMailer::new();
        let message = MailMessage::new(vec![], "Hola", "Cuerpo");
        assert!(matches!(
            mailer.send(message).await,
            Err(super::super::MailError::NoRecipients)
        ));
    }
}
