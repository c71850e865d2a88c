use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tripletex::auth::FileTokenStore;
use tripletex::client::{ClientOptions, TripletexClient};
use tripletex::config::loader::load_config;
use tripletex::observability::metrics::encode_text;
use tripletex::resilience::retry::RetrySettings;
use tripletex::utils::logging::{self, LogLevel};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "TRIPLETEX_CONFIG", default_value = "tripletex.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Print prometheus metrics to stdout when done
    #[arg(long)]
    print_metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Make sure a valid session token exists and print its expiry
    Token {
        /// Create a new token even if the stored one is still valid
        #[arg(long)]
        force: bool,
        /// Print the token value too
        #[arg(long)]
        show: bool,
    },
    /// Print the identity behind the session token
    Whoami,
    /// Delete the stored session token
    Forget,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = load_config(&args.config).await?;
    let settings = &service_config.settings;
    logging::run(settings, args.log_level);

    let store = settings.token_file.as_ref().map(FileTokenStore::new);
    if let Command::Forget = args.command {
        match &store {
            Some(store) => {
                store.remove().await?;
                info!("stored session token removed");
            }
            None => info!("no token_file configured, nothing to forget"),
        }
        return Ok(());
    }

    // -------------------------------
    // 2. Build client, warm start from the stored token
    // -------------------------------

    let credentials = service_config.credentials.resolve()?;
    let mut options = ClientOptions::from_settings(settings);
    if let Some(store) = &store {
        options.token = store.load().await?;
    }
    let stored = options.token.clone();
    let client = TripletexClient::new(credentials, options)?;
    let retry = RetrySettings::from(settings.retry.as_ref());

    // -------------------------------
    // 3. Run command
    // -------------------------------

    match args.command {
        Command::Token { force, show } => {
            if force {
                retry.run_with_retry(|| client.auth().refresh()).await?;
            } else {
                retry.run_with_retry(|| client.auth().ensure_valid()).await?;
            }
            let token = client.auth().get_token().context("no session token after refresh")?;
            println!("expires_at: {}", token.expires_at().to_rfc3339());
            if show {
                println!("token: {}", token.value());
            }
        }
        Command::Whoami => {
            let who = retry.run_with_retry(|| client.who_am_i()).await?;
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "employeeId": who.employee_id,
                "actualEmployeeId": who.actual_employee_id,
                "companyId": who.company_id,
                "language": who.language,
            }))?);
        }
        Command::Forget => unreachable!("handled before the client is built"),
    }

    // -------------------------------
    // 4. Persist a new token
    // -------------------------------

    if let (Some(store), Some(token)) = (&store, client.auth().get_token()) {
        if stored.as_ref() != Some(&token) {
            store.save(&token).await?;
        }
    }

    if args.print_metrics {
        print!("{}", encode_text().await?);
    }

    Ok(())
}
