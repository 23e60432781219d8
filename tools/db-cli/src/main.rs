use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use suzstar_common::DatabaseConfig;
use suzstar_database::{create_pool, MigrationRunner};

#[derive(Parser)]
#[command(name = "db-cli")]
#[command(about = "Suzstar Counseling database CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Connection {
    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate(Connection),
    /// Check migration status
    Status(Connection),
    /// Create the site settings row and default FAQs
    Seed {
        #[command(flatten)]
        connection: Connection,
        /// Public contact address stored in site settings
        #[arg(long, env = "CONTACT_EMAIL", default_value = "info@suzstarcounseling.co.ke")]
        contact_email: String,
    },
    /// Create a staff account for the admin API and dashboard
    CreateStaff {
        #[command(flatten)]
        connection: Connection,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        full_name: String,
        #[arg(long)]
        password: String,
    },
    /// Reset database (drop and recreate)
    Reset {
        #[command(flatten)]
        connection: Connection,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

impl Connection {
    fn config(&self) -> Result<DatabaseConfig> {
        match &self.database_url {
            Some(url) => DatabaseConfig::from_url(url)
                .with_context(|| format!("Not a postgres URL: {}", url)),
            None => Ok(DatabaseConfig::from_env()),
        }
    }

    async fn runner(&self) -> Result<MigrationRunner> {
        let pool = create_pool(&self.config()?).await?;
        Ok(MigrationRunner::new(pool))
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate(connection) => {
            connection.runner().await?.run_all_migrations().await?;
            println!("✅ Migrations completed successfully");
        }
        Commands::Status(connection) => {
            let status = connection.runner().await?.check_migration_status().await?;
            println!("📊 {}", status);

            if status.is_up_to_date {
                println!("✅ Database is up to date");
            } else {
                println!("⚠️  Database needs migration");
            }
        }
        Commands::Seed {
            connection,
            contact_email,
        } => {
            connection.runner().await?.seed_initial_data(&contact_email).await?;
            println!("✅ Initial data seeded successfully");
        }
        Commands::CreateStaff {
            connection,
            username,
            email,
            full_name,
            password,
        } => {
            let staff = connection
                .runner()
                .await?
                .create_staff_user(&username, &email, &full_name, &password)
                .await?;
            println!("✅ Staff user {} created ({})", staff.username, staff.user_id);
        }
        Commands::Reset { connection, force } => {
            if !force {
                println!("⚠️  This will delete ALL data in the database!");
                println!("Type 'yes' to continue:");

                let mut input = String::new();
                std::io::stdin().read_line(&mut input)?;

                if input.trim() != "yes" {
                    println!("❌ Operation cancelled");
                    return Ok(());
                }
            }

            let config = connection.config()?;
            if config.database == "postgres" {
                bail!("Refusing to drop the maintenance database");
            }

            let admin_config = DatabaseConfig {
                database: "postgres".to_string(),
                ..config.clone()
            };
            let admin_pool = create_pool(&admin_config).await?;

            // Terminate existing connections
            sqlx::query(
                "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
                 WHERE datname = $1 AND pid <> pg_backend_pid()",
            )
            .bind(&config.database)
            .execute(&admin_pool)
            .await?;

            let database = quote_ident(&config.database);
            sqlx::query(&format!("DROP DATABASE IF EXISTS {}", database))
                .execute(&admin_pool)
                .await?;
            sqlx::query(&format!("CREATE DATABASE {}", database))
                .execute(&admin_pool)
                .await?;
            tracing::info!(database = %config.database, "Database recreated");

            let pool = create_pool(&config).await?;
            MigrationRunner::new(pool).run_all_migrations().await?;

            println!("✅ Database reset completed");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("suzstar"), "\"suzstar\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn cli_parses_create_staff() {
        let cli = Cli::try_parse_from([
            "db-cli",
            "create-staff",
            "--username",
            "njeri",
            "--email",
            "njeri@suzstar.test",
            "--password",
            "counsel2024",
        ])
        .unwrap();
        match cli.command {
            Commands::CreateStaff { username, full_name, connection, .. } => {
                assert_eq!(username, "njeri");
                assert_eq!(full_name, "");
                assert!(connection.database_url.is_none());
            }
            _ => panic!("expected create-staff"),
        }
    }
}
