use chrono::{DateTime, Utc};

use super::{MailAttachment, MailMessage};

/// Smallest PDF that mail clients still recognise as one.
const TEST_PDF: &[u8] = b"%PDF-1.4\n1 0 obj<</Type/Catalog/Pages 2 0 R>>endobj\n\
2 0 obj<</Type/Pages/Kids[]/Count 0>>endobj\n\
xref\n0 3\ntrailer<</Size 3/Root 1 0 R>>\n\
startxref\n9\n%%EOF";

pub struct CertificateMail<'a> {
    pub holder_email: &'a str,
    pub holder_name: &'a str,
    pub module_title: &'a str,
    pub copies: Vec<&'a str>,
    pub filename: &'a str,
    pub pdf: Vec<u8>,
}

fn certificate_subject(module_title: &str) -> String {
    format!("Certificado de Capacitación - {module_title}")
}

pub fn certificate(mail: CertificateMail<'_>) -> MailMessage {
    let greeting = if mail.holder_name.trim().is_empty() {
        String::from("Estimado/a,")
    } else {
        format!("Hola {},", mail.holder_name.trim())
    };

    let body = format!(
        "{greeting}\n\n\
         ¡Felicitaciones! Has completado exitosamente la capacitación \"{}\".\n\n\
         Adjunto encontrarás tu certificado en formato PDF.\n\n\
         Este certificado tiene una validez de 1 (un) año desde la fecha de emisión.\n\
         Conservalo como constancia de tu capacitación.\n\n\
         Saludos cordiales,\n\
         Sistema de Capacitación en Ergonomía",
        mail.module_title
    );

    MailMessage::new(
        vec![mail.holder_email.to_string()],
        certificate_subject(mail.module_title),
        body,
    )
    .with_cc(mail.copies)
    .with_attachment(MailAttachment::pdf(mail.filename, mail.pdf))
}

pub fn certificate_admin_notice(
    admin_email: &str,
    holder_name: &str,
    holder_email: &str,
    module_title: &str,
    filename: &str,
    pdf: Vec<u8>,
) -> MailMessage {
    let body = format!(
        "Nuevo certificado emitido.\n\n\
         Usuario: {holder_name} ({holder_email})\n\
         Módulo: {module_title}\n\n\
         El certificado se adjunta a este email."
    );

    MailMessage::new(
        vec![admin_email.to_string()],
        format!("[ADMIN] {}", certificate_subject(module_title)),
        body,
    )
    .with_attachment(MailAttachment::pdf(filename, pdf))
}

pub fn share_link(
    recipients: Vec<String>,
    professional_name: &str,
    module_title: &str,
    url: &str,
    note: Option<&str>,
) -> MailMessage {
    let mut body = format!(
        "Hola,\n\n\
         {professional_name} te invita a realizar la capacitación \"{module_title}\".\n\n\
         Ingresá desde el siguiente enlace:\n{url}\n"
    );

    if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
        body.push_str(&format!("\nMensaje:\n{note}\n"));
    }
    body.push_str("\nSaludos,\nSistema de Capacitación en Ergonomía");

    MailMessage::new(recipients, format!("Capacitación: {module_title}"), body)
}

pub fn test_message(
    recipient: &str,
    host: &str,
    now: DateTime<Utc>,
    with_attachment: bool,
) -> MailMessage {
    let stamp = now.format("%Y-%m-%d %H:%M:%S");
    let subject = format!("[ErgoSolutions] Email de prueba - {stamp}");

    if !with_attachment {
        let body = format!(
            "Este es un email de prueba enviado desde {host}.\n\n\
             Fecha: {stamp}\n\
             Si recibiste este email, la configuración funciona correctamente.\n"
        );
        return MailMessage::new(vec![recipient.to_string()], subject, body);
    }

    let body = format!(
        "Este es un email de prueba con adjunto enviado desde {host}.\n\n\
         Fecha: {stamp}\n\
         Si recibiste este email con un archivo PDF adjunto, \
         la configuración de email funciona correctamente.\n"
    );
    MailMessage::new(vec![recipient.to_string()], subject, body)
        .with_attachment(MailAttachment::pdf("test_ergosolutions.pdf", TEST_PDF.to_vec()))
}
