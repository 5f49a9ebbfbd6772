use crate::auth::{AuthApi, Session};
use crate::config::{self, Config};
use crate::errors::{ApiError, AppError, AuthError};
use crate::models::{ProfileUpdate, RegisterRequest, Role};
use crate::utils;
use clap::{Args, Parser, Subcommand};
use secrecy::{ExposeSecret, SecretString};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Tradepost - command line client for the marketplace API
#[derive(Parser)]
#[command(name = "tradepost")]
#[command(about = "A marketplace client with phone-based authentication", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Logging level (overrides the configured level)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Request an SMS verification code
    SendCode(SendCodeArgs),

    /// Submit a received SMS verification code
    VerifyCode(VerifyCodeArgs),

    /// Register a new account
    Register(RegisterArgs),

    /// Log in and store tokens
    Login(LoginArgs),

    /// Log out and clear stored tokens
    Logout,

    /// Show or update the user profile
    Profile(ProfileArgs),

    /// Show the current authentication status
    Status,
}

#[derive(Args, Clone)]
pub struct SendCodeArgs {
    /// Phone number to send the code to (e.g., "+15550001111")
    #[arg(value_name = "PHONE")]
    pub phone: String,
}

#[derive(Args, Clone)]
pub struct VerifyCodeArgs {
    /// Phone number the code was sent to
    #[arg(value_name = "PHONE")]
    pub phone: String,

    /// The 6-digit verification code
    #[arg(value_name = "CODE")]
    pub code: String,
}

#[derive(Args, Clone)]
pub struct RegisterArgs {
    /// Phone number to register with
    #[arg(value_name = "PHONE")]
    pub phone: String,

    /// Account role: buyer, seller or supplier
    #[arg(short, long, value_name = "ROLE")]
    pub role: String,

    /// First name
    #[arg(long)]
    pub first_name: Option<String>,

    /// Last name
    #[arg(long)]
    pub last_name: Option<String>,
}

#[derive(Args, Clone)]
pub struct LoginArgs {
    /// Identifier (phone number); falls back to the last saved one
    #[arg(value_name = "IDENTIFIER")]
    pub identifier: Option<String>,
}

#[derive(Args, Clone)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommands,
}

#[derive(Subcommand, Clone)]
pub enum ProfileCommands {
    /// Show the profile of the logged-in user
    Show,

    /// Update profile fields
    Update(ProfileUpdateArgs),
}

#[derive(Args, Clone)]
pub struct ProfileUpdateArgs {
    /// New first name
    #[arg(long)]
    pub first_name: Option<String>,

    /// New last name
    #[arg(long)]
    pub last_name: Option<String>,

    /// New email address
    #[arg(long)]
    pub email: Option<String>,
}

pub async fn handle_command(
    command: Commands,
    auth: &AuthApi,
    config: &mut Config,
    config_path: Option<&Path>,
) -> Result<(), AppError> {
    match command {
        Commands::SendCode(args) => handle_send_code_command(args, auth).await?,
        Commands::VerifyCode(args) => handle_verify_code_command(args, auth).await?,
        Commands::Register(args) => handle_register_command(args, auth).await?,
        Commands::Login(args) => handle_login_command(args, auth, config, config_path).await?,
        Commands::Logout => handle_logout_command(auth).await?,
        Commands::Profile(args) => handle_profile_command(args, auth).await?,
        Commands::Status => handle_status_command(auth, config)?,
    }

    Ok(())
}

async fn handle_send_code_command(args: SendCodeArgs, auth: &AuthApi) -> Result<(), AppError> {
    auth.send_verification_code(&args.phone).await?;
    println!("Verification code sent to {}.", args.phone);
    Ok(())
}

async fn handle_verify_code_command(args: VerifyCodeArgs, auth: &AuthApi) -> Result<(), AppError> {
    auth.verify_code(&args.phone, &args.code).await?;
    println!("Phone number verified. You can now register or log in.");
    Ok(())
}

async fn handle_register_command(args: RegisterArgs, auth: &AuthApi) -> Result<(), AppError> {
    let role: Role = args.role.parse().map_err(|reason| AppError::Generic {
        message: reason,
    })?;

    let secret = prompt_secret("Password: ")?;
    let confirmation = prompt_secret("Confirm password: ")?;
    if secret.expose_secret() != confirmation.expose_secret() {
        eprintln!("Passwords do not match.");
        std::process::exit(1);
    }

    let request = RegisterRequest {
        phone: args.phone,
        secret,
        role,
        first_name: args.first_name,
        last_name: args.last_name,
    };
    let (session, response) = auth.register(&request).await?;

    match session {
        Session::Authenticated(profile) => {
            println!("Account created. Logged in as {}.", profile.display_name());
        }
        Session::Anonymous => {
            println!("Account created for {}.", response.profile.display_name());
            println!("Verify your phone number and log in to continue.");
        }
    }
    Ok(())
}

async fn handle_login_command(
    args: LoginArgs,
    auth: &AuthApi,
    config: &mut Config,
    config_path: Option<&Path>,
) -> Result<(), AppError> {
    let identifier = match args
        .identifier
        .or_else(|| config.saved_identifier().map(String::from))
    {
        Some(identifier) => identifier,
        None => {
            eprintln!("Please specify an identifier: tradepost login <IDENTIFIER>");
            std::process::exit(1);
        }
    };

    let secret = prompt_secret("Password: ")?;

    let (session, _response) = auth
        .login(&identifier, secret)
        .await
        .map_err(|e| match e {
            AuthError::Api(ApiError::Status { status: 401, .. }) => AppError::Generic {
                message: "Invalid identifier or password.".to_string(),
            },
            other => AppError::Auth(other),
        })?;

    match session {
        Session::Authenticated(profile) => {
            println!("Logged in as {}.", profile.display_name());

            // Remember the identifier for the next login
            config.auth.identifier = Some(identifier);
            if let Err(e) = config::save_config(config, config_path) {
                tracing::warn!("Could not save identifier to config: {}", e);
            }
        }
        Session::Anonymous => {
            println!("Login accepted but the server returned no tokens.");
        }
    }
    Ok(())
}

async fn handle_logout_command(auth: &AuthApi) -> Result<(), AppError> {
    auth.logout().await?;
    println!("Logged out.");
    Ok(())
}

async fn handle_profile_command(args: ProfileArgs, auth: &AuthApi) -> Result<(), AppError> {
    match args.command {
        ProfileCommands::Show => {
            let profile = auth.profile().await?;

            println!("Profile");
            println!("=======");
            if let Some(id) = profile.id {
                println!("ID: {}", id);
            }
            println!("Name: {}", profile.display_name());
            if let Some(ref phone) = profile.phone {
                println!("Phone: {}", phone);
            }
            if let Some(ref email) = profile.email {
                println!("Email: {}", email);
            }
            if let Some(role) = profile.role {
                println!("Role: {}", role);
            }
            if let Some(ref date_joined) = profile.date_joined {
                println!(
                    "Joined: {} ({})",
                    date_joined.format("%Y-%m-%d"),
                    utils::format_time_ago(date_joined)
                );
            }
        }
        ProfileCommands::Update(update_args) => {
            let update = ProfileUpdate {
                first_name: update_args.first_name,
                last_name: update_args.last_name,
                email: update_args.email,
            };
            if update.is_empty() {
                eprintln!(
                    "Nothing to update. Use --first-name, --last-name or --email."
                );
                std::process::exit(1);
            }

            let profile = auth.update_profile(&update).await?;
            println!("Profile updated for {}.", profile.display_name());
        }
    }
    Ok(())
}

fn handle_status_command(auth: &AuthApi, config: &Config) -> Result<(), AppError> {
    if auth.is_authenticated() {
        println!("Authenticated: yes");
        let refresh = match auth.store().refresh_token() {
            Ok(Some(_)) => "present",
            _ => "absent",
        };
        println!("Refresh token: {}", refresh);
        if let Some(identifier) = config.saved_identifier() {
            println!("Identifier: {}", identifier);
        }
    } else {
        println!("Authenticated: no");
        println!("Run 'tradepost login' to authenticate.");
    }
    Ok(())
}

// Prompt without echoing the secret to the terminal
fn prompt_secret(prompt: &str) -> Result<SecretString, AppError> {
    print!("{}", prompt);
    io::stdout().flush().map_err(|e| AppError::Generic {
        message: format!("Failed to flush stdout: {}", e),
    })?;

    let secret = rpassword::read_password().map_err(|e| AppError::Generic {
        message: format!("Failed to read password: {}", e),
    })?;

    if secret.trim().is_empty() {
        return Err(AppError::Generic {
            message: "Password cannot be empty".to_string(),
        });
    }

    Ok(SecretString::new(secret.trim().to_string()))
}
