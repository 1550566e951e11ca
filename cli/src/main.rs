use clap::{Parser, Subcommand};
use ergo::Config;
use ergo::auth::{hash_password, normalize_cuil, normalize_email};
use ergo::error::{AppError, AppResult};
use ergo::mail::{self, Mailer, messages};
use ergo::model::entity::{TrainingModule, TrainingModuleCreate, UserEntity, UserEntityCreateUpdate};
use ergo::model::{CrudRepository, DbConnection, ModelManager};
use ergo::training::{content, fixture, quiz_bank, seed};
use ergo::web::AuthenticatedUser;

#[derive(Parser, Debug)]
#[command(about = "CLI tool for operating the training platform", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage training modules
    Module {
        #[command(subcommand)]
        action: ModuleCommands,
    },

    /// Manage quiz questions
    Quiz {
        #[command(subcommand)]
        action: QuizCommands,
    },

    /// Mail diagnostics
    Email {
        #[command(subcommand)]
        action: EmailCommands,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    AddProfessional {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },
    AddTrainee {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        cuil: String,
        #[arg(long)]
        email: String,
    },
    /// Professional account with the staff flag
    AddAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

/// Module management
#[derive(Subcommand, Debug)]
pub enum ModuleCommands {
    Add {
        #[arg(long)]
        slug: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = 0)]
        menu_order: i32,
        #[arg(long, default_value_t = false)]
        active: bool,
    },
    /// Create or refresh the canonical modules
    Seed {
        /// Also reset `is_active` of existing modules to the canonical value
        #[arg(long, default_value_t = false)]
        force_active_defaults: bool,
    },
    /// Load intro, material and transcript of a module from disk
    SeedContent {
        #[arg(long, default_value = "ergonomia")]
        module: String,
        /// Directory holding one sub-directory per module slug
        #[arg(long, default_value = "content")]
        dir: String,
        /// Overwrite text that is already set
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

/// Quiz management
#[derive(Subcommand, Debug)]
pub enum QuizCommands {
    Import {
        /// Slug of the module receiving the questions
        #[arg(long)]
        module: String,
        /// Path to a JSON fixture with quiz.question and quiz.choice rows
        #[arg(long)]
        path: String,
        /// Delete the module's current questions first
        #[arg(long, default_value_t = false)]
        replace: bool,
    },
    /// Load the canonical ergonomía questions into a module without questions
    Seed {
        /// Defaults to the most recently updated active module
        #[arg(long)]
        module: Option<String>,
    },
}

/// Mail diagnostics
#[derive(Subcommand, Debug)]
pub enum EmailCommands {
    Test {
        #[arg(long)]
        to: String,
        #[arg(long, default_value_t = false)]
        with_attachment: bool,
    },
}

async fn create_professional(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    email: &str,
    username: String,
    password: &str,
    first_name: String,
    last_name: String,
) -> AppResult<UserEntity> {
    let email = normalize_email(email);
    if UserEntity::email_taken(mm, &email).await? {
        return Err(AppError::InvalidInput(format!("e-mail {email} already registered")));
    }
    if UserEntity::username_taken(mm, &username).await? {
        return Err(AppError::InvalidInput(format!("username {username} already taken")));
    }

    let hash = hash_password(password)?;
    let data = UserEntityCreateUpdate::professional(first_name, last_name, email, username, hash);
    Ok(UserEntity::create(mm, actor, data).await?)
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let config = Config::get_or_init(cfg!(debug_assertions)).await;
    let database_uri = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| config.app().database_uri().to_string());
    let db_con = DbConnection::connect(&database_uri)?;
    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::admin();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::AddProfessional {
                email,
                username,
                password,
                first_name,
                last_name,
            } => {
                let user = create_professional(
                    &mm, &actor, &email, username, &password, first_name, last_name,
                )
                .await?;
                println!("Professional created: {} <{}>", user.display_name(), user.email());
            }

            UserCommands::AddTrainee {
                full_name,
                cuil,
                email,
            } => {
                let cuil = normalize_cuil(&cuil)
                    .ok_or_else(|| AppError::InvalidInput(format!("invalid CUIL {cuil}")))?;
                let email = normalize_email(&email);
                if UserEntity::cuil_taken(&mm, &cuil).await? {
                    return Err(AppError::InvalidInput(format!("CUIL {cuil} already registered")));
                }
                if UserEntity::email_taken(&mm, &email).await? {
                    return Err(AppError::InvalidInput(format!("e-mail {email} already registered")));
                }

                let data = UserEntityCreateUpdate::trainee(full_name, cuil, email);
                let user = UserEntity::create(&mm, &actor, data).await?;
                println!("Trainee created: {} <{}>", user.display_name(), user.email());
            }

            UserCommands::AddAdmin {
                email,
                username,
                password,
            } => {
                let user = create_professional(
                    &mm,
                    &actor,
                    &email,
                    username,
                    &password,
                    String::new(),
                    String::new(),
                )
                .await?;
                let user = user.set_staff(&mm, true).await?;
                println!("Admin created: {}", user.email());
            }
        },

        Commands::Module { action } => match action {
            ModuleCommands::Add {
                slug,
                title,
                description,
                menu_order,
                active,
            } => {
                let mut data = TrainingModuleCreate::new(slug, title);
                data.description = description;
                data.menu_order = menu_order;
                data.is_active = active;

                let module = TrainingModule::create(&mm, &actor, data).await?;
                println!("Module created: {} ({})", module.title(), module.slug());
            }

            ModuleCommands::Seed {
                force_active_defaults,
            } => {
                let report = seed::seed_modules(&mm, force_active_defaults).await?;
                for title in &report.created {
                    println!("created: {title}");
                }
                for title in &report.updated {
                    println!("updated: {title}");
                }
                for title in &report.unchanged {
                    println!("unchanged: {title}");
                }
                println!("active modules: {}", report.active.join(", "));
            }

            ModuleCommands::SeedContent { module, dir, force } => {
                let dir = content::module_content_dir(std::path::Path::new(&dir), &module);
                let (report, seeded) =
                    content::seed_module_content(&mm, &module, &dir, force).await?;
                let list = |fields: &[&str]| match fields {
                    [] => String::from("none"),
                    fields => fields.join(", "),
                };
                println!("module: {module}");
                println!("updated: {} ({})", report.updated.len(), list(&report.updated));
                println!("omitted: {} ({})", report.omitted.len(), list(&report.omitted));
                println!("lengths (characters):");
                for (field, len) in content::content_lengths(&seeded) {
                    println!("  - {field}: {len}");
                }
            }
        },

        Commands::Quiz { action } => match action {
            QuizCommands::Import {
                module,
                path,
                replace,
            } => {
                let text = std::fs::read_to_string(&path)?;
                let parsed = fixture::parse_fixture(&text)?;
                let report = fixture::import_fixture(&mm, &module, parsed, replace).await?;

                if replace {
                    println!("deleted questions: {}", report.deleted_questions);
                }
                println!(
                    "imported {} questions and {} choices into {module}",
                    report.questions, report.choices
                );
                if report.skipped_choices > 0 {
                    println!("skipped choices: {}", report.skipped_choices);
                }
            }

            QuizCommands::Seed { module } => {
                match quiz_bank::seed_quiz(&mm, module.as_deref()).await? {
                    quiz_bank::QuizSeedOutcome::Seeded { slug, report } => println!(
                        "seeded {slug}: {} questions, {} choices",
                        report.questions, report.choices
                    ),
                    quiz_bank::QuizSeedOutcome::AlreadySeeded { slug } => {
                        println!("{slug} already has questions, nothing to do")
                    }
                }
            }
        },

        Commands::Email { action } => match action {
            EmailCommands::Test {
                to,
                with_attachment,
            } => {
                let mailer = mail::build_mailer(config.mail())?;
                let message = messages::test_message(
                    &to,
                    config.app().site_url(),
                    chrono::Utc::now(),
                    with_attachment,
                );
                mailer.send(message).await?;
                println!("Test e-mail sent to {to}");
            }
        },
    }

    Ok(())
}
