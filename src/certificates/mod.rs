//! Certificate issuance after a passed quiz.
//!
//! Only database failures are returned. PDF, storage and mail failures are
//! logged and recorded on the certificate so a passed attempt always stays
//! passed.

use chrono::Utc;

use crate::{
    Config,
    documents::{CertificateDocument, certificate_pdf},
    mail::{Mailer, messages},
    model::{
        CrudRepository, DatabaseResult, ModelManager,
        entity::{Certificate, CertificateCreate, QuizAttempt, TrainingModule, UserEntity},
    },
    utils::media,
    web::AuthenticatedUser,
};

/// Issues (once) the certificate of a passed attempt and delivers it.
#[tracing::instrument(skip_all, fields(attempt = %attempt.id()))]
pub async fn issue_for_attempt(
    mm: &ModelManager,
    mailer: &dyn Mailer,
    config: &Config,
    attempt: &QuizAttempt,
) -> DatabaseResult<Certificate> {
    let now = Utc::now();
    let (mut certificate, created) = Certificate::issue(
        mm,
        &CertificateCreate {
            user_id: attempt.user_id(),
            module_id: attempt.module_id(),
            attempt_id: attempt.id(),
            issued_at: now,
            validity_days: config.certificates().validity_days(),
        },
    )
    .await?;

    if !created {
        tracing::debug!("certificate {} already issued", certificate.id());
        return Ok(certificate);
    }
    tracing::info!("issued certificate {}", certificate.id());

    let system = AuthenticatedUser::admin();
    let user = UserEntity::find_by_id(mm, &system, attempt.user_id()).await?;
    let module = TrainingModule::find_by_id(mm, &system, attempt.module_id()).await?;
    let (Some(user), Some(module)) = (user, module) else {
        tracing::warn!("certificate {} has no holder or module", certificate.id());
        return Ok(certificate);
    };

    let holder_name = user.display_name();
    let pdf = certificate_pdf(&CertificateDocument {
        holder_name: &holder_name,
        cuil: user.cuil(),
        module_title: module.title(),
        issued_on: certificate.issued_at().date_naive(),
        valid_until: certificate.valid_until().date_naive(),
        signer_name: config.certificates().signer_name(),
        signer_titles: config.certificates().signer_titles(),
    });
    let pdf = match pdf {
        Ok(pdf) => pdf,
        Err(e) => {
            tracing::error!("certificate {} pdf failed: {e}", certificate.id());
            certificate
                .record_delivery(mm, false, &format!("pdf: {e}"), now)
                .await?;
            return Ok(certificate);
        }
    };

    let relative = media::certificate_relative_path(certificate.id());
    match media::write_media(config.media().root(), &relative, &pdf).await {
        Ok(_) => certificate.set_pdf_path(mm, &relative).await?,
        Err(e) => tracing::error!("certificate {} could not be stored: {e}", certificate.id()),
    }

    let filename = media::certificate_filename(&holder_name);
    let copies: Vec<&str> = [user.employer_email(), user.safety_responsible_email()]
        .into_iter()
        .flatten()
        .collect();

    let message = messages::certificate(messages::CertificateMail {
        holder_email: user.email(),
        holder_name: &holder_name,
        module_title: module.title(),
        copies,
        filename: &filename,
        pdf: pdf.clone(),
    });

    match mailer.send(message).await {
        Ok(()) => certificate.record_delivery(mm, true, "", Utc::now()).await?,
        Err(e) => {
            tracing::warn!("certificate {} mail to {} failed: {e}", certificate.id(), user.email());
            certificate
                .record_delivery(mm, false, &e.to_string(), Utc::now())
                .await?;
        }
    }

    if let Some(admin) = config.mail().admin_email() {
        if !admin.eq_ignore_ascii_case(user.email()) {
            let notice = messages::certificate_admin_notice(
                admin,
                &holder_name,
                user.email(),
                module.title(),
                &filename,
                pdf,
            );
            if let Err(e) = mailer.send(notice).await {
                tracing::warn!("admin copy of certificate {} failed: {e}", certificate.id());
            }
        }
    }

    Ok(certificate)
}
