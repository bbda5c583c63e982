//! CLI administration tool for linkcut.
//!
//! Provides commands for managing API tokens, viewing statistics,
//! and performing database operations without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Create a new API token for owner 42
//! cargo run --bin admin -- token create --name "Mobile App" --owner 42
//!
//! # List all tokens
//! cargo run --bin admin -- token list
//!
//! # Revoke a token
//! cargo run --bin admin -- token revoke "Mobile App"
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `TOKEN_SIGNING_SECRET` (required for `token create`): must match the server's

use linkcut::application::services::auth_service::hash_token;
use linkcut::domain::entities::OwnerId;
use linkcut::domain::repositories::{ApiToken, TokenRepository};
use linkcut::infrastructure::persistence::PgTokenRepository;
use linkcut::utils::api_token::generate_api_token;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing linkcut.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show statistics
    Stats {
        /// Number of most-clicked links to show
        #[arg(short, long, default_value_t = 10)]
        top: i64,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token
    Create {
        /// Token name (e.g., "Production API", "Mobile App")
        #[arg(short, long)]
        name: Option<String>,

        /// Owner the token authenticates as; links it creates belong to this owner
        #[arg(short, long)]
        owner: Option<OwnerId>,

        /// Custom token value (optional, auto-generated if not provided)
        #[arg(short, long)]
        token: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        name_or_id: String,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[derive(sqlx::FromRow)]
struct TopLink {
    short_code: String,
    original_url: String,
    clicks: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Token { action } => handle_token_action(action, &pool).await?,
        Commands::Stats { top } => handle_stats(&pool, top).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches token management commands.
async fn handle_token_action(action: TokenAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgTokenRepository::new(Arc::new(pool.clone())));

    match action {
        TokenAction::Create {
            name,
            owner,
            token,
            yes,
        } => create_token(repo, name, owner, token, yes).await,
        TokenAction::List => list_tokens(repo).await,
        TokenAction::Revoke { name_or_id } => revoke_token(repo, name_or_id).await,
    }
}

/// Creates a new API token with interactive prompts.
///
/// Only the HMAC-SHA256 of the token (keyed by `TOKEN_SIGNING_SECRET`) is
/// stored. The raw token is displayed once and cannot be retrieved later.
async fn create_token(
    repo: Arc<PgTokenRepository>,
    name: Option<String>,
    owner: Option<OwnerId>,
    token: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    let signing_secret = std::env::var("TOKEN_SIGNING_SECRET")
        .context("TOKEN_SIGNING_SECRET must be set to create tokens")?;
    if signing_secret.is_empty() {
        anyhow::bail!("TOKEN_SIGNING_SECRET must not be empty");
    }

    println!("{}", "Create API Token".bright_blue().bold());
    println!();

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("Production API")
            .interact_text()?,
    };

    let owner_id: OwnerId = match owner {
        Some(id) => id,
        None => Input::new().with_prompt("Owner ID").interact_text()?,
    };

    let token_value = match token {
        Some(t) => {
            println!("{}", "Using provided token value".yellow());
            t
        }
        None => {
            let generated = generate_api_token()
                .map_err(|e| anyhow::anyhow!("Failed to generate token: {}", e))?;
            println!("{}", "Generated new token".green());
            generated
        }
    };

    println!();
    println!("{}", "Token details:".bright_white().bold());
    println!("  Name:  {}", token_name.cyan());
    println!("  Owner: {}", owner_id.to_string().cyan());
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let token_hash = hash_token(&signing_secret, &token_value);

    repo.create_token(&token_name, &token_hash, owner_id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!();
    println!("{}", "Token created successfully!".green().bold());
    println!();
    println!("{}", "Add this to your requests:".bright_white());
    println!(
        "  {}: Bearer {}",
        "Authorization".bright_cyan(),
        token_value.bright_yellow()
    );
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:8080/api/my-urls",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

/// Lists all API tokens with status indicators.
///
/// # Output Format
///
/// ```text
/// API Tokens
///
///   ID  Name                           Owner    Created              Status
///   ---------------------------------------------------------------------------
///   1   Production API                 42       2026-01-15 10:30     ACTIVE
///   2   Mobile App                     7        2026-01-16 14:20     REVOKED
/// ```
async fn list_tokens(repo: Arc<PgTokenRepository>) -> Result<()> {
    println!("{}", "API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        println!();
        println!(
            "  Create one with: {} admin token create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<3} {:<30} {:<8} {:<20} {:<10}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Owner".bright_white().bold(),
        "Created".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "-".repeat(75).bright_black());

    for token in &tokens {
        let status = if token.is_revoked() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };

        println!(
            "  {:<3} {:<30} {:<8} {:<20} {}",
            token.id.to_string().bright_black(),
            token.name.cyan(),
            token.owner_id.to_string(),
            token
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            status
        );
    }

    println!();
    println!(
        "  Total: {}",
        tokens.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Finds a token by numeric ID or exact name.
async fn find_token(repo: &PgTokenRepository, name_or_id: &str) -> Result<Option<ApiToken>> {
    if let Ok(id) = name_or_id.parse::<i64>() {
        let tokens = repo
            .list_tokens()
            .await
            .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;
        if let Some(token) = tokens.into_iter().find(|t| t.id == id) {
            return Ok(Some(token));
        }
    }

    repo.find_by_name(name_or_id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))
}

/// Revokes a token by name or ID with confirmation prompt.
///
/// Numeric input is tried as an ID first, then as a name.
async fn revoke_token(repo: Arc<PgTokenRepository>, name_or_id: String) -> Result<()> {
    println!("{}", "Revoke API Token".bright_blue().bold());
    println!();

    let token = find_token(&repo, &name_or_id)
        .await?
        .context("Token not found")?;

    if token.is_revoked() {
        println!("{}", "This token is already revoked".yellow());
        return Ok(());
    }

    println!("  Token: {}", token.name.cyan());
    println!("  ID:    {}", token.id.to_string().bright_black());
    println!("  Owner: {}", token.owner_id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke this token?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "Cancelled".red());
        return Ok(());
    }

    let revoked = repo
        .revoke_token(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    println!();
    if revoked {
        println!("{}", "Token revoked successfully!".green().bold());
    } else {
        println!("{}", "Token was revoked concurrently".yellow());
    }
    println!();

    Ok(())
}

/// Displays link, click and token counts plus the most-clicked links.
async fn handle_stats(pool: &PgPool, top: i64) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
        .fetch_one(pool)
        .await?;

    let active_links: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM urls WHERE expires_at IS NULL OR expires_at > NOW()",
    )
    .fetch_one(pool)
    .await?;

    let clicks_count: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(clicks), 0)::BIGINT FROM urls")
        .fetch_one(pool)
        .await?;

    let tokens_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL")
            .fetch_one(pool)
            .await?;

    println!(
        "  Links:         {} ({} active)",
        links_count.to_string().bright_green().bold(),
        active_links.to_string().bright_green()
    );
    println!(
        "  Clicks:        {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!(
        "  Active tokens: {}",
        tokens_count.to_string().bright_green().bold()
    );
    println!();

    let top_links = sqlx::query_as::<_, TopLink>(
        r#"
        SELECT short_code, original_url, clicks
        FROM urls
        ORDER BY clicks DESC, created_at DESC
        LIMIT $1
        "#,
    )
    .bind(top.max(1))
    .fetch_all(pool)
    .await?;

    if !top_links.is_empty() {
        println!("{}", "  Top links:".bright_white().bold());
        for link in &top_links {
            println!(
                "  {:>8}  {:<20} {}",
                link.clicks.to_string().bright_green(),
                link.short_code.cyan(),
                link.original_url.bright_black()
            );
        }
        println!();
    }

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM _sqlx_migrations WHERE success",
            )
            .fetch_one(pool)
            .await
            .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations applied: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
