use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use super::{MailMessage, MailResult, Mailer};
use crate::config::Mail;

/// Delivers through an SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &Mail) -> MailResult<Self> {
        let builder = if config.starttls() {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(config.host())?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(config.host())?
        };

        let mut builder = builder.port(config.port());
        if !config.username().is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username().to_string(),
                config.password().to_string(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.from().parse()?,
        })
    }

    fn build(&self, message: MailMessage) -> MailResult<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(message.subject);

        for to in &message.to {
            builder = builder.to(to.parse()?);
        }
        for cc in &message.cc {
            builder = builder.cc(cc.parse()?);
        }

        if message.attachments.is_empty() {
            return Ok(builder.body(message.body)?);
        }

        let mut multipart = MultiPart::mixed().singlepart(SinglePart::plain(message.body));
        for attachment in message.attachments {
            let content_type = ContentType::parse(&attachment.content_type)?;
            multipart = multipart.singlepart(
                Attachment::new(attachment.filename).body(attachment.content, content_type),
            );
        }
        Ok(builder.multipart(multipart)?)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: MailMessage) -> MailResult<()> {
        message.check_recipients()?;
        let subject = message.subject.clone();
        let email = self.build(message)?;

        self.transport.send(email).await?;
        tracing::info!(%subject, "mail delivered");
        Ok(())
    }
}
