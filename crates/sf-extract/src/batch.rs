//! Retrieval of records by id in limited batches.

use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result};
use crate::record::Record;
use crate::transport::QueryService;

/// Retrieve `ids` in chunks of at most `batch_limit`, one call per chunk.
///
/// The result has one entry per id in input order, `None` where the service
/// returned nothing for an id. Empty input makes no call. The first failing
/// chunk aborts the whole fetch.
#[instrument(skip(service, fields, ids), fields(ids = ids.len()))]
pub async fn fetch_by_ids<Q: QueryService>(
    service: &Q,
    object: &str,
    fields: &[String],
    ids: &[String],
    batch_limit: usize,
) -> Result<Vec<Option<Record>>> {
    if batch_limit == 0 {
        return Err(Error::config("batch limit must be at least 1"));
    }

    let mut records = Vec::with_capacity(ids.len());
    for (n, chunk) in ids.chunks(batch_limit).enumerate() {
        debug!(batch = n, size = chunk.len(), "Retrieving batch");
        let batch = service
            .retrieve(object, fields, chunk)
            .await
            .map_err(|fault| Error::query(format_args!("retrieve {object} batch {n}"), fault))?;
        if batch.len() != chunk.len() {
            return Err(Error::new(ErrorKind::Query(format!(
                "retrieve {object} batch {n} returned {} records for {} ids",
                batch.len(),
                chunk.len()
            ))));
        }
        records.extend(batch);
    }
    Ok(records)
}
