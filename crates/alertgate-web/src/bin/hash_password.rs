//! Prints an argon2id hash for a password read from stdin.
//!
//! With `--db <path>` and `--user <name>`, stores the hash in the SQLite
//! `administrator` table instead of printing it.

use std::io::{self, Write};
use std::path::PathBuf;

use alertgate_core::auth::password::hash_password;
use alertgate_web::store::SqliteCredentialStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut db_path: Option<PathBuf> = None;
    let mut username: Option<String> = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => db_path = args.next().map(PathBuf::from),
            "--user" => username = args.next(),
            other => anyhow::bail!("Unknown argument: {other}\nUsage: hash-password [--db <path> --user <name>]"),
        }
    }

    eprint!("Enter password: ");
    io::stderr().flush()?;

    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    let password = password.trim();

    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }

    let hash = hash_password(password)?;

    match (db_path, username) {
        (Some(path), Some(user)) => {
            let store = SqliteCredentialStore::open(&path).await?;
            store.upsert_admin(&user, &hash).await?;
            eprintln!("Stored administrator '{user}' in {}", path.display());
        }
        (None, None) => println!("{hash}"),
        _ => anyhow::bail!("--db and --user must be given together"),
    }

    Ok(())
}
