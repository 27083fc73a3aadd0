use clap::{Arg, ArgAction, ArgMatches, Command};
use itertools::Itertools;
use log::{debug, error};

use neonfolio_auth::admin::seed_admin_if_needed;
use neonfolio_auth::auth::user_interface::{collect_login_form, collect_registration_form};
use neonfolio_auth::auth::{handle_login, handle_logout, handle_registration};
use neonfolio_auth::utils::logging::initialize_logging;
use neonfolio_auth::utils::time::{format_timestamp, utc_to_local};
use neonfolio_auth::{AuthConfig, CredentialStore, FileStorage, SessionRecord, SessionTracker};

fn build_cli() -> Command {
    Command::new("neonfolio-auth")
        .about("Neonfolio demo accounts: register, log in and track the current session")
        .subcommand_required(true)
        .arg(
            Arg::new("store")
                .long("store")
                .global(true)
                .help("Path of the JSON file holding the storage slots")
                .value_name("PATH"),
        )
        .arg(
            Arg::new("obscurer")
                .long("obscurer")
                .global(true)
                .help("Password obscuring strategy: base64 or sha256")
                .value_name("KIND"),
        )
        .arg(
            Arg::new("no-seed")
                .long("no-seed")
                .global(true)
                .help("Do not seed the admin account into an empty store")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .global(true)
                .help("Append log output to this file instead of stderr")
                .value_name("PATH"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("register")
                .about("Register a new account and log in")
                .arg(Arg::new("name").long("name").help("Display name"))
                .arg(Arg::new("email").long("email").help("Email address"))
                .arg(
                    Arg::new("password")
                        .long("password")
                        .help("Password (prompted for when omitted)"),
                ),
        )
        .subcommand(
            Command::new("login")
                .about("Log in with email and password")
                .arg(
                    Arg::new("email")
                        .long("email")
                        .help("Email address (defaults to the remembered one)"),
                )
                .arg(
                    Arg::new("password")
                        .long("password")
                        .help("Password (prompted for when omitted)"),
                )
                .arg(
                    Arg::new("remember")
                        .long("remember")
                        .help("Remember the email for the next login")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("logout").about("End the current session"))
        .subcommand(Command::new("whoami").about("Show the logged-in user"))
        .subcommand(Command::new("users").about("List registered users"))
        .subcommand(Command::new("seed-admin").about("Seed the admin account if no users exist"))
}

fn main() {
    let matches = build_cli().get_matches();

    let config = match AuthConfig::from_matches(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = initialize_logging(config.log_level, config.log_file.as_deref()) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    if let Err(e) = run(&config, &matches) {
        error!("Command failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &AuthConfig, matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let storage = FileStorage::new(&config.store_path);
    debug!(
        "Using store {} with {} obscuring",
        storage.path().display(),
        config.obscurer
    );
    let store = CredentialStore::new(&storage, config.obscurer.build());
    let session = SessionTracker::new(&storage);

    match matches.subcommand() {
        Some(("register", sub_matches)) => {
            if config.seed_admin {
                seed_admin_if_needed(&store)?;
            }
            let form = collect_registration_form(
                sub_matches.get_one::<String>("name").map(String::as_str),
                sub_matches.get_one::<String>("email").map(String::as_str),
                sub_matches.get_one::<String>("password").map(String::as_str),
            )?;
            let user = handle_registration(&store, &session, &form)?;
            println!("Registration successful! Welcome, {}.", user.name);
        }
        Some(("login", sub_matches)) => {
            if config.seed_admin {
                seed_admin_if_needed(&store)?;
            }
            let form = collect_login_form(
                &storage,
                sub_matches.get_one::<String>("email").map(String::as_str),
                sub_matches.get_one::<String>("password").map(String::as_str),
                sub_matches.get_flag("remember"),
            )?;
            let user = handle_login(&store, &session, &storage, &form)?;
            println!("Login successful. Welcome back, {}!", user.name);
        }
        Some(("logout", _)) => match handle_logout(&session)? {
            Some(_) => println!("Successfully logged out."),
            None => println!("No active session."),
        },
        Some(("whoami", _)) => match session.get_current() {
            None => println!("Not logged in."),
            Some(record) => match session.resolve(&store) {
                Some(user) => println!("{} <{}> (id {})", user.name, user.email, user.id),
                None => println!(
                    "Session refers to unknown user {}; run logout to clear it.",
                    record.user_id()
                ),
            },
        },
        Some(("users", _)) => {
            let users = store.list_users();
            if users.is_empty() {
                println!("No users registered.");
                return Ok(());
            }

            let current = session.get_current();
            let current_id = current.as_ref().map(SessionRecord::user_id);
            for user in users.iter().sorted_by(|a, b| a.created_at.cmp(&b.created_at)) {
                let marker = if current_id == Some(user.id.as_str()) { "*" } else { " " };
                println!(
                    "{} {:<24} {:<32} {} (UTC {})",
                    marker,
                    user.name,
                    user.email,
                    utc_to_local(&user.created_at),
                    format_timestamp(&user.created_at)
                );
            }
        }
        Some(("seed-admin", _)) => match seed_admin_if_needed(&store)? {
            Some(admin) => println!("Seeded admin account {}.", admin.email),
            None => println!("Users already exist; nothing seeded."),
        },
        _ => unreachable!("subcommand_required prevents this"),
    }

    Ok(())
}
