//! PetPals command-line client.
//!
//! Exercises the full client stack against a live backend: identity login,
//! session/profile resolution, role-gated dashboard operations, pet browsing
//! and adoption applications.
//!
//! Environment variables:
//!   PETPALS_API_URL     — backend base URL (default http://127.0.0.1:8000/api)
//!   PETPALS_TOKEN_FILE  — durable token slot (default ~/.petpals/token)
//!   FIREBASE_API_KEY    — Identity Toolkit key (required for auth commands)
//!   FIREBASE_AUTH_URL   — identity endpoint override (auth emulator)
//!   FIREBASE_TOKEN_URL  — secure-token endpoint override

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use petpals::api::ApiClient;
use petpals::config::Config;
use petpals::identity::{AuthUser, FirebaseIdentity};
use petpals::models::application::ApplicationStatus;
use petpals::models::pet::{ImageFile, PetForm, PetSpecies};
use petpals::models::profile::UserRole;
use petpals::session::Session;
use petpals::token::TokenStore;
use petpals::views::apply::{self, ApplicationForm};
use petpals::views::dashboard::ShelterDashboard;
use petpals::views::pets::{PetBrowser, SpeciesFilter};

#[derive(Parser)]
#[command(name = "petpals", about = "PetPals adoption client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and resolve the profile
    Login {
        email: String,
    },
    /// Create an account and its backend profile
    Register {
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = parse_role)]
        role: UserRole,
    },
    /// Sign out and clear the persisted token
    Logout,
    /// Show the profile behind the persisted token
    Whoami,
    /// Browse and manage pets
    #[command(subcommand)]
    Pets(PetsCommand),
    /// Apply to adopt a pet
    Apply {
        pet_id: i64,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        why: String,
        #[arg(long)]
        living_situation: Option<String>,
        #[arg(long)]
        experience: Option<String>,
        #[arg(long)]
        home: Option<String>,
    },
    /// Review adoption applications
    #[command(subcommand)]
    Applications(ApplicationsCommand),
}

#[derive(Subcommand)]
enum PetsCommand {
    /// List pets, optionally filtered by species
    List {
        #[arg(long)]
        species: Option<String>,
    },
    /// Show one pet
    Show { id: i64 },
    /// Add a pet (shelter accounts)
    Add {
        #[command(flatten)]
        form: PetArgs,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Update a pet (shelter accounts)
    Update {
        id: i64,
        #[command(flatten)]
        form: PetArgs,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Delete a pet (shelter accounts)
    Delete { id: i64 },
}

#[derive(clap::Args)]
struct PetArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    age: String,
    #[arg(long)]
    species: String,
    #[arg(long)]
    breed: String,
    #[arg(long)]
    gender: String,
    #[arg(long, default_value = "available")]
    status: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    temperament: Option<String>,
    #[arg(long)]
    medical_needs: Option<String>,
}

#[derive(Subcommand)]
enum ApplicationsCommand {
    /// Applications I submitted
    My,
    /// Applications for my shelter's pets
    Shelter,
    /// Change an application's status (shelter accounts)
    SetStatus {
        id: i64,
        #[arg(value_parser = parse_app_status)]
        status: ApplicationStatus,
    },
}

fn parse_role(s: &str) -> Result<UserRole, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn parse_app_status(s: &str) -> Result<ApplicationStatus, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let tokens = TokenStore::at_path(&config.token_path);
    let api = ApiClient::new(&config.api_base_url, tokens.clone());

    match cli.command {
        Command::Login { email } => {
            let session = start_session(&config, api.clone(), tokens)?;
            let password = read_password()?;
            session
                .login(&email, &password)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e.user_message()))?;
            match session.wait_for_profile(Duration::from_secs(10)).await {
                Some(profile) => {
                    println!("Logged in as {} ({})", profile.full_name, profile.role)
                }
                None => println!("Logged in; profile not available yet"),
            }
        }
        Command::Register { email, name, role } => {
            let session = start_session(&config, api.clone(), tokens)?;
            let password = read_password()?;
            session
                .register(&email, &password, &name, role)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e.user_message()))?;
            println!("Registered {email} as {role}");
        }
        Command::Logout => {
            let session = start_session(&config, api.clone(), tokens)?;
            session.logout().await;
            println!("Logged out");
        }
        Command::Whoami => {
            let profile = api.get_profile().await.context("not logged in?")?;
            println!("{} <{}> role={}", profile.full_name, profile.email, profile.role);
            if let Some(shelter_id) = profile.shelter_id {
                println!("shelter id: {shelter_id}");
            }
        }
        Command::Pets(cmd) => run_pets(cmd, &api).await?,
        Command::Apply { pet_id, phone, address, why, living_situation, experience, home } => {
            let profile = api.get_profile().await.context("log in before applying")?;
            let user = AuthUser { uid: profile.user_id.clone(), email: profile.email.clone() };
            let pet = api.get_pet(pet_id).await?;
            let mut form = ApplicationForm::prefilled(&user, Some(&profile));
            form.phone = phone;
            form.address = address;
            form.why_adopt = why;
            form.living_situation = living_situation.unwrap_or_default();
            form.previous_pet_experience = experience.unwrap_or_default();
            form.home_description = home.unwrap_or_default();
            let submitted = apply::submit(&api, &form, &user, &pet).await?;
            println!(
                "Application #{} for {} submitted ({})",
                submitted.id, pet.name, submitted.status
            );
        }
        Command::Applications(cmd) => run_applications(cmd, &api).await?,
    }

    Ok(())
}

async fn run_pets(cmd: PetsCommand, api: &ApiClient) -> Result<()> {
    match cmd {
        PetsCommand::List { species } => {
            let browser = PetBrowser::new(api.clone());
            // Listing works anonymously; a logged-in adopter's preference
            // becomes the default filter.
            let profile = api.get_profile().await.ok();
            let filter = match species {
                Some(s) => SpeciesFilter::Only(s.parse::<PetSpecies>()?),
                None => SpeciesFilter::All,
            };
            for pet in browser.browse(profile.as_ref(), filter).await? {
                println!(
                    "#{} {} — {} {} ({}), {}",
                    pet.id, pet.name, pet.breed, pet.species, pet.gender, pet.status
                );
            }
        }
        PetsCommand::Show { id } => {
            let pet = PetBrowser::new(api.clone()).detail(id).await?;
            println!("{pet:#?}");
        }
        PetsCommand::Add { form, image } => {
            let dashboard = open_dashboard(api).await?;
            let pet = dashboard
                .add_pet(pet_form(form, dashboard.shelter_id())?, load_image(image)?)
                .await?;
            println!("Added pet #{} {}", pet.id, pet.name);
        }
        PetsCommand::Update { id, form, image } => {
            let dashboard = open_dashboard(api).await?;
            let pet = dashboard
                .update_pet(id, pet_form(form, dashboard.shelter_id())?, load_image(image)?)
                .await?;
            println!("Updated pet #{} {}", pet.id, pet.name);
        }
        PetsCommand::Delete { id } => {
            let dashboard = open_dashboard(api).await?;
            dashboard.delete_pet(id).await?;
            println!("Deleted pet #{id}");
        }
    }
    Ok(())
}

async fn run_applications(cmd: ApplicationsCommand, api: &ApiClient) -> Result<()> {
    match cmd {
        ApplicationsCommand::My => {
            for app in api.my_applications().await? {
                println!("#{} pet={} status={}", app.id, app.pet_id, app.status);
            }
        }
        ApplicationsCommand::Shelter => {
            let dashboard = open_dashboard(api).await?;
            let data = dashboard.load().await?;
            for app in data.applications {
                println!(
                    "#{} pet={} from {} <{}> status={}",
                    app.id, app.pet_id, app.full_name, app.email, app.status
                );
            }
        }
        ApplicationsCommand::SetStatus { id, status } => {
            let dashboard = open_dashboard(api).await?;
            let app = dashboard.set_application_status(id, status).await?;
            println!("Application #{} is now {}", app.id, app.status);
        }
    }
    Ok(())
}

fn start_session(config: &Config, api: ApiClient, tokens: TokenStore) -> Result<Session> {
    let api_key = config
        .identity_api_key
        .as_deref()
        .context("FIREBASE_API_KEY is required for auth commands")?;
    let identity = Arc::new(FirebaseIdentity::new(
        api_key,
        &config.identity_auth_url,
        &config.identity_token_url,
    ));
    Ok(Session::start(identity, api, tokens))
}

async fn open_dashboard(api: &ApiClient) -> Result<ShelterDashboard> {
    let profile = api.get_profile().await.context("log in as a shelter first")?;
    Ok(ShelterDashboard::open(api.clone(), &profile)?)
}

fn pet_form(args: PetArgs, shelter_id: i64) -> Result<PetForm> {
    Ok(PetForm {
        name: args.name,
        age: args.age,
        species: args.species.parse()?,
        breed: args.breed,
        description: args.description,
        temperament: args.temperament,
        medical_needs: args.medical_needs,
        status: args.status.parse()?,
        gender: args.gender.parse()?,
        shelter_id,
    })
}

fn load_image(path: Option<PathBuf>) -> Result<Option<ImageFile>> {
    let Some(path) = path else { return Ok(None) };
    let bytes = std::fs::read(&path)
        .with_context(|| format!("could not read image {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    Ok(Some(ImageFile { file_name, bytes }))
}

fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var("PETPALS_PASSWORD") {
        return Ok(password);
    }
    print!("Password: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("empty password");
    }
    Ok(password)
}
