//! Schema maintenance for a ninco database.
//!
//! `ninco-migrate [up|down|fresh|status] [database-url]`. Without an explicit
//! URL, `NINCO_DATABASE_URL` is used, then the local `ninco.db` file.

use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./ninco.db?mode=rwc";
const USAGE: &str = "usage: ninco-migrate [up|down|fresh|status] [database-url]";

#[derive(Debug, PartialEq, Eq)]
enum Action {
    Up,
    Down,
    Fresh,
    Status,
}

fn parse_args(
    mut args: impl Iterator<Item = String>,
    env_url: Option<String>,
) -> Option<(Action, String)> {
    let action = match args.next().as_deref() {
        None | Some("up") => Action::Up,
        Some("down") => Action::Down,
        Some("fresh") => Action::Fresh,
        Some("status") => Action::Status,
        Some(_) => return None,
    };
    let url = args
        .next()
        .or(env_url)
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
    Some((action, url))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let Some((action, url)) = parse_args(
        std::env::args().skip(1),
        std::env::var("NINCO_DATABASE_URL").ok(),
    ) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let db = Database::connect(&url).await?;
    match action {
        Action::Up => migration::Migrator::up(&db, None).await?,
        // One step at a time.
        Action::Down => migration::Migrator::down(&db, Some(1)).await?,
        Action::Fresh => migration::Migrator::fresh(&db).await?,
        Action::Status => migration::Migrator::status(&db).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> impl Iterator<Item = String> {
        values
            .iter()
            .map(|v| ToString::to_string(v))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn defaults_to_up_on_the_local_file() {
        assert_eq!(
            parse_args(args(&[]), None),
            Some((Action::Up, DEFAULT_DATABASE_URL.to_string()))
        );
    }

    #[test]
    fn explicit_url_beats_environment() {
        let env = Some("postgres://env/ninco".to_string());
        assert_eq!(
            parse_args(args(&["status"]), env.clone()),
            Some((Action::Status, "postgres://env/ninco".to_string()))
        );
        assert_eq!(
            parse_args(args(&["down", "sqlite::memory:"]), env),
            Some((Action::Down, "sqlite::memory:".to_string()))
        );
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert_eq!(parse_args(args(&["sideways"]), None), None);
    }
}
