pub mod docs;
pub mod health;
pub mod serve;
pub mod users;

use trade_manual::PortalConfig;

use crate::cli::DataArgs;

/// Portal layout for the given data arguments, with default admin and
/// password settings.
pub fn portal_config(data: &DataArgs) -> PortalConfig {
    PortalConfig {
        data_dir: data.data_dir.clone(),
        credential_file: data.credential_file.clone(),
        documents_dir: data.documents_dir.clone(),
        ..PortalConfig::default()
    }
}
