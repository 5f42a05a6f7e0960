use crate::account::Account;
use crate::config::GatewayConfig;
use crate::storage::{AccountStore, StoreError};

pub fn handle_accounts_command(config: &str, db_path: Option<String>) -> Result<(), StoreError> {
    let config = GatewayConfig::load_or_default(config);
    let store = AccountStore::open(db_path.unwrap_or(config.server.db_path))?;

    let accounts = store.all()?;
    println!("Local accounts ({}):", accounts.len());
    for account in &accounts {
        println!("{}", format_row(account));
    }
    Ok(())
}

fn format_row(account: &Account) -> String {
    let remote = account
        .remote_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let state = if account.verified { "verified" } else { "pending" };
    format!(
        " - #{} {} <{}> remote={} {}",
        account.id.unwrap_or_default(),
        account.username,
        account.email,
        remote,
        state
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::SignUp;

    #[test]
    fn test_format_row() {
        let form = SignUp {
            username: "alice".to_string(),
            secret: "pw1".to_string(),
            email: "a@x.com".to_string(),
            first_name: "A".to_string(),
            last_name: "L".to_string(),
        };
        let mut account = Account::pending(&form, "hash".to_string(), "tok".to_string(), Some(42));
        account.id = Some(3);

        assert_eq!(format_row(&account), " - #3 alice <a@x.com> remote=42 pending");
        account.mark_verified();
        assert!(format_row(&account).ends_with("verified"));
    }
}
