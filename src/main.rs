//! BichoRP betting terminal.
//!
//! Every invocation loads the snapshot, runs one operation through the
//! ledger store, and persists the result, so the session (including the
//! logged-in user) carries across invocations the way it does across page
//! reloads in a browser.

use bichorp::animals;
use bichorp::auth::NewUser;
use bichorp::bets::BetStatus;
use bichorp::draws::FixedNumberSource;
use bichorp::ledger::UserRole;
use bichorp::storage::FileSnapshotStore;
use bichorp::{BichoConfig, LedgerStore};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// BichoRP betting terminal
#[derive(Parser)]
#[command(name = "bichorp")]
#[command(about = "Animal lottery ledger for roleplay communities")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Snapshot file holding the whole ledger
    #[arg(short, long, default_value = "./bichorp_state.json")]
    data_file: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login { username: String, password: String },

    /// Clear the session
    Logout,

    /// Place a bet on an animal for the logged-in user
    Bet {
        /// Animal id, 1..=25
        #[arg(short, long)]
        animal: u32,

        /// Amount of credits to wager
        #[arg(short = 'm', long)]
        amount: i64,
    },

    /// Run a draw and settle every pending bet
    Draw {
        /// Force the winning number instead of drawing randomly
        #[arg(short, long)]
        number: Option<u32>,
    },

    /// Show the logged-in user's bets, or all draws for an admin
    History,

    /// List the animal board
    Animals,

    /// Manage players
    Users {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Print the ledger as a portable sync blob
    Export,

    /// Replace users, bets and draws from a sync blob
    Import { blob: String },

    /// Ledger statistics
    Stats,
}

#[derive(Subcommand)]
enum UserAction {
    List,
    Create {
        username: String,
        password: String,
        /// Display name used inside the roleplay
        rp_name: String,
        /// Create the account with admin powers
        #[arg(long)]
        admin: bool,
        /// Starting credits (default: seeded initial credits)
        #[arg(long)]
        balance: Option<i64>,
    },
    Delete {
        id: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> bichorp::BichoResult<()> {
    let mut config = BichoConfig::default();
    config.storage.data_file = cli.data_file.display().to_string();
    config.validate()?;

    let storage = FileSnapshotStore::new(&config.storage.data_file);
    let mut store = LedgerStore::open(Box::new(storage), &config.seed)?;

    match cli.command {
        Commands::Login { username, password } => {
            let user = store.login(&username, &password)?;
            println!("Bem-vindo, {}! Saldo: RP$ {}", user.rp_name, user.balance);
        }

        Commands::Logout => {
            store.logout();
            println!("Sessão encerrada.");
        }

        Commands::Bet { animal, amount } => {
            let bet = store.place_bet(animal, amount)?;
            let name = animals::animal_by_id(bet.animal_id)
                .map(|a| a.name.as_str())
                .unwrap_or("?");
            println!(
                "Aposta confirmada no {}! RP$ {} (prêmio possível: RP$ {})",
                name, bet.amount, bet.potential_win
            );
            if let Some(user) = store.current_user() {
                println!("Saldo: RP$ {}", user.balance);
            }
        }

        Commands::Draw { number } => {
            let draw = match number {
                Some(n) => store.execute_draw_with(&mut FixedNumberSource(n))?,
                None => store.execute_draw()?,
            };
            let winner = draw
                .winning_animal_id
                .and_then(animals::animal_by_id)
                .expect("completed draw always has a winning animal");
            println!(
                "🎲 SORTEIO REALIZADO: {} {} (número {})",
                winner.icon,
                winner.name.to_uppercase(),
                draw.winning_number.unwrap_or_default()
            );
        }

        Commands::History => match store.current_user() {
            Some(user) if user.role == UserRole::Admin => {
                if store.draws().is_empty() {
                    println!("Nenhum sorteio registrado.");
                }
                for draw in store.draws() {
                    let name = draw
                        .winning_animal_id
                        .and_then(animals::animal_by_id)
                        .map(|a| a.name.as_str())
                        .unwrap_or("?");
                    println!(
                        "{}  nº {:>3}  {}",
                        format_time(draw.draw_time),
                        draw.winning_number.unwrap_or_default(),
                        name
                    );
                }
            }
            Some(user) => {
                let bets = store.bets_for(&user.id);
                if bets.is_empty() {
                    println!("Você ainda não realizou apostas.");
                }
                for bet in bets.iter().rev() {
                    let name = animals::animal_by_id(bet.animal_id)
                        .map(|a| a.name.as_str())
                        .unwrap_or("?");
                    let outcome = match bet.status {
                        BetStatus::Pending => "aguardando".to_string(),
                        BetStatus::Won => format!("+ RP$ {}", bet.potential_win),
                        BetStatus::Lost => format!("- RP$ {}", bet.amount),
                    };
                    println!("{:<12} RP$ {:>8}  {}", name, bet.amount, outcome);
                }
            }
            None => return Err(bichorp::BichoError::NotLoggedIn),
        },

        Commands::Animals => {
            for animal in animals::registry() {
                let numbers: Vec<String> =
                    animal.numbers.iter().map(|n| format!("{:02}", n)).collect();
                println!(
                    "{:>2}  {:<12} [{}]  x{}",
                    animal.id,
                    animal.name,
                    numbers.join(" "),
                    animal.multiplier
                );
            }
        }

        Commands::Users { action } => match action {
            UserAction::List => {
                for user in store.users() {
                    println!(
                        "{:<10} {:<16} {:<20} RP$ {:>10}  {:?}",
                        user.id, user.username, user.rp_name, user.balance, user.role
                    );
                }
            }
            UserAction::Create {
                username,
                password,
                rp_name,
                admin,
                balance,
            } => {
                let user = store.create_user(NewUser {
                    username,
                    password,
                    rp_name,
                    role: if admin { UserRole::Admin } else { UserRole::User },
                    balance: balance.unwrap_or(config.seed.initial_credits),
                })?;
                println!("Usuário {} criado com sucesso! (id {})", user.rp_name, user.id);
            }
            UserAction::Delete { id } => {
                if store.delete_user(&id) {
                    println!("Usuário removido.");
                } else {
                    println!("Usuário protegido ou inexistente, nada removido.");
                }
            }
        },

        Commands::Export => {
            println!("{}", store.export_sync());
        }

        Commands::Import { blob } => {
            store.import_sync(&blob)?;
            println!("Estado importado com sucesso.");
        }

        Commands::Stats => {
            let stats = store.stats();
            println!("Jogadores:               {}", stats.users);
            println!("Apostas:                 {}", stats.bets);
            println!("Apostas pendentes:       {}", stats.pending_bets);
            println!("Sorteios:                {}", stats.draws);
            println!("Créditos em circulação:  RP$ {}", stats.credits_in_circulation);
            println!("Total apostado:          RP$ {}", stats.total_wagered);
            println!("Total pago:              RP$ {}", stats.total_paid_out);
        }
    }

    Ok(())
}

fn format_time(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| millis.to_string())
}
