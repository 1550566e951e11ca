//! Files stored under the configured media root.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::utils::text::fold_accent;

pub fn certificate_relative_path(certificate_id: Uuid) -> String {
    format!("certificates/{certificate_id}.pdf")
}

/// Writes `bytes` to `root/relative`, creating parent directories.
pub async fn write_media(root: &Path, relative: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

/// `Ok(None)` when the file does not exist.
pub async fn read_media(root: &Path, relative: &str) -> std::io::Result<Option<Vec<u8>>> {
    match tokio::fs::read(root.join(relative)).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// `certificado_<name>.pdf` with the name reduced to ASCII letters, digits,
/// `-` and `_`; spaces become underscores.
pub fn certificate_filename(holder_name: &str) -> String {
    let safe: String = holder_name
        .chars()
        .map(fold_accent)
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    let safe = safe.trim_matches('_');
    let safe = if safe.is_empty() { "usuario" } else { safe };

    format!("certificado_{safe}.pdf")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn filenames_are_ascii() {
        assert_eq!(certificate_filename("Ana Gómez"), "certificado_Ana_Gomez.pdf");
        assert_eq!(certificate_filename(" Peña, José! "), "certificado_Pena_Jose.pdf");
        assert_eq!(certificate_filename("???"), "certificado_usuario.pdf");
    }

    #[tokio::test]
    async fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let relative = certificate_relative_path(Uuid::new_v4());

        let path = write_media(dir.path(), &relative, b"%PDF-1.5").await.unwrap();
        assert!(path.ends_with(&relative));
        assert_eq!(read_media(dir.path(), &relative).await.unwrap().unwrap(), b"%PDF-1.5");
        assert!(read_media(dir.path(), "certificates/missing.pdf").await.unwrap().is_none());
    }
}
