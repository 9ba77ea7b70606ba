//! Account commands.

use std::path::Path;

use trade_manual::credentials::{
    BootstrapAdmin, CredentialError, CredentialStore, PasswordStorage, UserSummary,
};

use crate::cli::DataArgs;
use crate::output::{OutputFormat, print_json, print_table};

/// Accounts stored in the credential file at `path`.
///
/// Returns `None` when the file does not exist. The file is only read: it is
/// never seeded, and a malformed file is an error rather than a listing of
/// the in-memory fallback.
async fn read_users(path: &Path) -> trade_manual::Result<Option<Vec<UserSummary>>> {
    let exists = tokio::fs::try_exists(path)
        .await
        .map_err(|source| CredentialError::FileIo {
            path: path.display().to_string(),
            source,
        })?;
    if !exists {
        return Ok(None);
    }

    // The bootstrap admin only matters for seeding, which cannot happen here
    let store =
        CredentialStore::open(path, BootstrapAdmin::default(), PasswordStorage::default()).await?;
    if let Some(reason) = store.load_warning() {
        return Err(CredentialError::FileNeedsRepair {
            reason: reason.to_string(),
        }
        .into());
    }
    Ok(Some(store.users()))
}

/// Run the `users list` command
pub async fn list(args: &DataArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let path = super::portal_config(args).credential_path();

    let Some(users) = read_users(&path).await? else {
        match format {
            OutputFormat::Human => println!("No credential file at {}", path.display()),
            OutputFormat::Json => print_json(&Vec::<UserSummary>::new())?,
        }
        return Ok(());
    };

    match format {
        OutputFormat::Human => {
            let rows: Vec<Vec<String>> = users
                .iter()
                .map(|user| vec![user.username.clone(), user.level.to_string()])
                .collect();
            print_table(&["USERNAME", "LEVEL"], &rows);
        }
        OutputFormat::Json => print_json(&users)?,
    }

    Ok(())
}
