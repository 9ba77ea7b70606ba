//! Document commands.

use trade_manual::documents::scan_directory;

use crate::cli::DataArgs;
use crate::output::{OutputFormat, print_json, print_table};

/// Run the `docs list` command
pub async fn list(args: &DataArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let dir = super::portal_config(args).documents_path();
    let documents = if tokio::fs::try_exists(&dir).await? {
        scan_directory(&dir).await?
    } else {
        Vec::new()
    };

    match format {
        OutputFormat::Human => {
            if documents.is_empty() {
                println!("No documents found in {}.", dir.display());
                return Ok(());
            }

            let rows: Vec<Vec<String>> = documents
                .iter()
                .map(|doc| {
                    vec![
                        doc.display_name.clone(),
                        doc.file_name.clone(),
                        doc.size_bytes.to_string(),
                        doc.modified
                            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_default(),
                    ]
                })
                .collect();
            print_table(&["NAME", "FILE", "BYTES", "MODIFIED"], &rows);
        }
        OutputFormat::Json => print_json(&documents)?,
    }

    Ok(())
}
