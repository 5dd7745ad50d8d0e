use clap::{Args, Parser, Subcommand};
use soulmate_api::{
    cli::{
        auth,
        db::{db_generate, db_list, db_migrate, db_revert},
        seed::seed_demo_profiles,
    },
    core::db::init_pool,
    settings::get_config,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database related command
    Db(DbArgs),
    /// Authentication related command
    Auth(AuthArgs),
    /// Demo data related command
    Seed(SeedArgs),
}

#[derive(Debug, Args)]
struct AuthArgs {
    #[command(subcommand)]
    command: AuthCommands,
}

#[derive(Debug, Subcommand)]
enum AuthCommands {
    /// Create new user
    CreateUser {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Debug, Args)]
struct DbArgs {
    #[command(subcommand)]
    command: DbCommands,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Generate new migration file
    Generate { migration_name: String },
    /// List all migration
    List,
    /// Run all pending migration
    Migrate,
    /// Revert latest migration
    Revert,
}

#[derive(Debug, Args)]
struct SeedArgs {
    #[command(subcommand)]
    command: SeedCommands,
}

#[derive(Debug, Subcommand)]
enum SeedCommands {
    /// Create demo users with profiles
    DemoProfile {
        #[arg(short, long, default_value_t = 10)]
        count: u32,
        #[arg(short, long, default_value = "password")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Db(db_args) => match &db_args.command {
            DbCommands::Generate { migration_name } => {
                println!("generate migration: {migration_name:?}");
                db_generate(migration_name).await?;
            }
            DbCommands::List => {
                println!("list migration");
                let config = get_config()?;
                db_list(&config).await?;
            }
            DbCommands::Migrate => {
                println!("run all pending migration");
                let config = get_config()?;
                let pool = init_pool(&config).await?;
                db_migrate(&pool).await?;
            }
            DbCommands::Revert => {
                println!("revert latest migration");
                let config = get_config()?;
                db_revert(&config).await?;
            }
        },
        Commands::Auth(auth_args) => match &auth_args.command {
            AuthCommands::CreateUser { email, password } => {
                println!("create user: {email:?}");
                let config = get_config()?;
                let pool = init_pool(&config).await?;
                let user = auth::create_user(&pool, email, password).await?;
                println!("created user {}", user.id);
            }
        },
        Commands::Seed(seed_args) => match &seed_args.command {
            SeedCommands::DemoProfile { count, password } => {
                println!("seed {count} demo profiles");
                let config = get_config()?;
                let pool = init_pool(&config).await?;
                let seeded = seed_demo_profiles(&pool, *count, password).await?;
                for (user, profile) in seeded.iter() {
                    println!("{} {} ({})", user.email, profile.name, profile.gender);
                }
            }
        },
    }
    Ok(())
}
