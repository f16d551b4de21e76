//! The polling loop behind the `safefeed` command.

use std::io::Write;

use opoint::{DocFormat, FeedBackend, SafefeedClient, SafefeedError, SafefeedResult};

use crate::error::CliError;

/// Whether polling may continue after this error.
///
/// Transient transport failures and undecodable bodies are skipped; the next
/// batch is requested from the same cursor.
fn is_recoverable(err: &SafefeedError) -> bool {
    err.is_transient() || matches!(err, SafefeedError::JsonParse(_))
}

async fn next_line<B: FeedBackend>(
    client: &mut SafefeedClient<B>,
    format: DocFormat,
) -> SafefeedResult<String> {
    match format {
        DocFormat::Json => {
            let response = client.get_articles(None, None).await?;
            tracing::info!(
                documents = response.searchresult.documents,
                lastid = %client.lastid(),
                behind = client.is_behind(),
                "Received batch"
            );
            Ok(serde_json::to_string(&response)?)
        }
        DocFormat::Xml => client.get_articles_xml(None, None).await,
    }
}

/// Poll the feed and write one line per batch to `out`.
///
/// Runs until `batches` batches have been attempted, or forever when no
/// limit is given. XML batches carry no cursor, so XML mode fetches at most
/// one batch. Returns the number of batches written.
pub async fn poll<B, W>(
    client: &mut SafefeedClient<B>,
    format: DocFormat,
    batches: Option<usize>,
    out: &mut W,
) -> Result<usize, CliError>
where
    B: FeedBackend,
    W: Write,
{
    let batches = match format {
        DocFormat::Json => batches,
        DocFormat::Xml => {
            if batches.is_none_or(|max| max > 1) {
                tracing::warn!("XML responses cannot advance the cursor, fetching a single batch");
            }
            Some(batches.map_or(1, |max| max.min(1)))
        }
    };

    let mut attempted = 0usize;
    let mut written = 0usize;

    while batches.is_none_or(|max| attempted < max) {
        attempted += 1;
        match next_line(client, format).await {
            Ok(line) => {
                writeln!(out, "{line}")?;
                out.flush()?;
                written += 1;
            }
            Err(e) if is_recoverable(&e) => {
                tracing::warn!(error = %e, lastid = %client.lastid(), "Batch failed, continuing");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(written)
}
