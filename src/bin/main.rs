use anyhow::{Context, Error};
use std::path::PathBuf;
use structopt::StructOpt;

use eduadmin::{
    config, endpoints, Credentials, FileStore, HttpApi, Notice, Notifier,
    RoleChange, SessionManager,
};

#[derive(Debug, StructOpt)]
#[structopt(about = "Administer the eduadmin platform from the command line")]
struct Args {
    /// Base URL of the eduadmin API. Falls back to $EDUADMIN_API_URL,
    /// then the local development server.
    #[structopt(short = "H", long)]
    host: Option<String>,
    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Log in and store the session.
    Login {
        username: String,
        /// Password; prompted for when not given.
        #[structopt(short, long)]
        password: Option<String>,
    },
    /// Create a new student account and log into it.
    Register {
        username: String,
        /// Password; prompted for when not given.
        #[structopt(short, long)]
        password: Option<String>,
    },
    /// Grant a role to a user (admin only).
    AssignRole { username: String, role: String },
    /// Drop the stored session.
    Logout,
    /// Show the stored session.
    Whoami,
    /// List every registered user (admin only).
    Users,
    /// Check whether the backend is up.
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();

    log::debug!("Starting with {:#?}", args);

    let base = config::base_url(args.host.as_deref())?;
    let api = HttpApi::new(base)?;
    let store = FileStore::open(session_file()?);
    let mut manager = SessionManager::new(
        Box::new(api.clone()),
        Box::new(store),
        Box::new(ConsoleNotifier),
    );

    match args.cmd {
        Command::Login { username, password } => {
            let password = password_or_prompt(password)?;
            let session =
                manager.login(&Credentials { username, password }).await?;
            println!(
                "Logged in as {} (roles: {})",
                session.user.username,
                session.user.roles.join(", ")
            );
        },
        Command::Register { username, password } => {
            let password = password_or_prompt(password)?;
            let session = manager
                .register(&Credentials { username, password })
                .await?;
            println!("Registered {}", session.user.username);
        },
        Command::AssignRole { username, role } => {
            let ack =
                manager.assign_role(&RoleChange { username, role }).await?;
            log::debug!("Ack: {}", ack);
        },
        Command::Logout => manager.logout(),
        Command::Whoami => match manager.current() {
            Some(session) => {
                println!("{}", session.user.username);
                println!("  roles:  {}", session.user.roles.join(", "));
                if !session.user.awarded_badges.is_empty() {
                    println!(
                        "  badges: {}",
                        session.user.awarded_badges.join(", ")
                    );
                }
                println!("  since:  {}", session.user.created_at.to_rfc3339());
            },
            None => println!("Not logged in"),
        },
        Command::Users => {
            let users =
                endpoints::list_users(api.client(), api.base(), manager.token())
                    .await;
            match users {
                Ok(users) => {
                    for user in users {
                        println!(
                            "{:<24} {}",
                            user.username,
                            user.roles.join(", ")
                        );
                    }
                },
                Err(err) => {
                    manager.handle_api_error(&err);
                    return Err(err.into());
                },
            }
        },
        Command::Health => {
            let health = endpoints::health(api.client(), api.base()).await?;
            println!("{}", health.status);
        },
    }

    Ok(())
}

/// Prints notices the way the web console toasts them.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        eprintln!("{}", notice);
    }
}

fn session_file() -> Result<PathBuf, Error> {
    let dirs = directories::ProjectDirs::from("", "", "eduadmin").context(
        "Unable to determine a data directory for the session file",
    )?;

    Ok(dirs.data_dir().join("session.json"))
}

fn password_or_prompt(password: Option<String>) -> Result<String, Error> {
    match password {
        Some(password) => Ok(password),
        None => Ok(rpassword::prompt_password("Password: ")?),
    }
}
