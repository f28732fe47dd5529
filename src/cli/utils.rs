use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::services::QueryData;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let (Some(obj), Some(extra)) = (response.as_object_mut(), data) {
                if let Some(extra) = extra.as_object() {
                    obj.extend(extra.clone());
                }
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a collection of rows: pretty JSON, or one rendered line per row.
pub fn output_rows<T: Serialize>(
    output_format: &OutputFormat,
    collection_name: &str,
    rows: &[T],
    render: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ collection_name: rows }))?
            );
        }
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("No {} found", collection_name);
            }
            for row in rows {
                println!("{}", render(row));
            }
        }
    }
    Ok(())
}

/// Output a single record as pretty JSON in either format.
pub fn output_record<T: Serialize>(
    output_format: &OutputFormat,
    record: &T,
) -> anyhow::Result<()> {
    let _ = output_format;
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}

/// Unwrap an account-scoped read, turning the no-account case into a
/// uniform CLI error.
pub fn require_enabled<T>(data: QueryData<T>) -> anyhow::Result<T> {
    data.into_option().ok_or_else(|| {
        anyhow::anyhow!("No account available. Sign in with `watchdesk auth login` first")
    })
}
