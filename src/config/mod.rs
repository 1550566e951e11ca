use std::path::PathBuf;

use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{find_config_file, read_config};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

use crate::quiz::QuizPolicy;

#[derive(Debug, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
    #[serde(default)]
    mail: Mail,
    #[serde(default)]
    media: Media,
    #[serde(default)]
    quiz: QuizPolicy,
    #[serde(default)]
    certificates: Certificates,
}

#[derive(Debug, Deserialize)]
pub struct Host {
    bindto: String,
}

#[derive(Debug, Deserialize)]
pub struct App {
    jwt: String,
    database_uri: String,
    #[serde(default)]
    docs: bool,
    #[serde(default = "default_site_url")]
    site_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailBackend {
    Console,
    Smtp,
}

#[derive(Debug, Deserialize)]
pub struct Mail {
    backend: MailBackend,
    #[serde(default)]
    host: String,
    #[serde(default = "default_smtp_port")]
    port: u16,
    #[serde(default = "default_true")]
    starttls: bool,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default = "default_from")]
    from: String,
    #[serde(default)]
    admin_email: String,
}

#[derive(Debug, Deserialize)]
pub struct Media {
    root: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct Certificates {
    #[serde(default = "default_validity_days")]
    validity_days: i64,
    #[serde(default)]
    signer_name: String,
    #[serde(default)]
    signer_titles: Vec<String>,
}

fn default_site_url() -> String {
    String::from("http://localhost:5000")
}

fn default_smtp_port() -> u16 {
    587
}

fn default_true() -> bool {
    true
}

fn default_from() -> String {
    String::from("no-reply@ergo.local")
}

fn default_validity_days() -> i64 {
    365
}

impl Default for Mail {
    fn default() -> Self {
        Self {
            backend: MailBackend::Console,
            host: String::new(),
            port: default_smtp_port(),
            starttls: true,
            username: String::new(),
            password: String::new(),
            from: default_from(),
            admin_email: String::new(),
        }
    }
}

impl Default for Media {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./media"),
        }
    }
}

impl Default for Certificates {
    fn default() -> Self {
        Self {
            validity_days: default_validity_days(),
            signer_name: String::new(),
            signer_titles: Vec::new(),
        }
    }
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                let read_cfg = |use_local| -> ConfigResult<Self> {
                    let text = read_config(use_local)?;
                    let config: Self = toml::from_str(&text)?;
                    Ok(config)
                };

                let config = match read_cfg(use_local) {
                    Ok(c) => c,
                    Err(e) => {
                        if !matches!(e, error::ConfigError::ConfigNotFound) {
                            crate::error::log_error(&e);
                        }
                        tracing::error!("Config not found.");
                        std::process::exit(1);
                    }
                };

                config
            })
            .await
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn mail(&self) -> &Mail {
        &self.mail
    }

    #[inline]
    pub fn media(&self) -> &Media {
        &self.media
    }

    #[inline]
    pub fn quiz(&self) -> &QuizPolicy {
        &self.quiz
    }

    #[inline]
    pub fn certificates(&self) -> &Certificates {
        &self.certificates
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }
}

impl App {
    #[inline]
    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }

    /// Public base URL, used in links sent by mail.
    pub fn site_url(&self) -> &str {
        self.site_url.trim_end_matches('/')
    }
}

impl Mail {
    #[inline]
    pub fn backend(&self) -> MailBackend {
        self.backend
    }

    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[inline]
    pub fn starttls(&self) -> bool {
        self.starttls
    }

    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[inline]
    pub fn password(&self) -> &str {
        &self.password
    }

    #[inline]
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Copy recipient for every issued certificate, if configured.
    pub fn admin_email(&self) -> Option<&str> {
        let email = self.admin_email.trim();
        (!email.is_empty()).then_some(email)
    }
}

impl Media {
    #[inline]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl Certificates {
    #[inline]
    pub fn validity_days(&self) -> i64 {
        self.validity_days
    }

    #[inline]
    pub fn signer_name(&self) -> &str {
        &self.signer_name
    }

    #[inline]
    pub fn signer_titles(&self) -> &[String] {
        &self.signer_titles
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn config_test() {
        let config = Config::get_or_init(true).await;
        assert_eq!(config.host().bindto(), "127.0.0.1:5000"); // defaults
        assert_eq!(config.mail().backend(), MailBackend::Console);
        assert_eq!(config.quiz().pass_score(), 8);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [host]
            bindto = "0.0.0.0:8080"

            [app]
            jwt = "secret"
            database_uri = "postgres://localhost/ergo"
            "#,
        )
        .unwrap();

        assert!(!config.app().docs());
        assert_eq!(config.mail().backend(), MailBackend::Console);
        assert_eq!(config.mail().port(), 587);
        assert!(config.mail().admin_email().is_none());
        assert_eq!(config.media().root(), std::path::Path::new("./media"));
        assert_eq!(config.certificates().validity_days(), 365);
        assert_eq!(config.quiz().max_attempts(), 3);
    }

    #[test]
    fn smtp_section_is_parsed() {
        let config: Config = toml::from_str(
            r#"
            [host]
            bindto = "0.0.0.0:8080"

            [app]
            jwt = "secret"
            database_uri = "postgres://localhost/ergo"

            [mail]
            backend = "smtp"
            host = "smtp.example.com"
            port = 2525
            username = "mailer"
            password = "hunter2"
            from = "cursos@example.com"
            admin_email = "  admin@example.com "

            [quiz]
            lock_hours = 12
            "#,
        )
        .unwrap();

        assert_eq!(config.mail().backend(), MailBackend::Smtp);
        assert_eq!(config.mail().port(), 2525);
        assert!(config.mail().starttls());
        assert_eq!(config.mail().admin_email(), Some("admin@example.com"));
        assert_eq!(config.quiz().lock_hours(), 12);
        assert_eq!(config.quiz().total_questions(), 10);
    }
}
