//! Folding of raw task output records into domain models.

use super::record_stream::RawRecord;
use crate::{DirectorResult, core::domain::model::ToModel};
use serde::de::DeserializeOwned;
use tracing::warn;

/// What to do when a record in a batch cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// Fail the whole batch on the first bad record.
    #[default]
    AbortOnError,
    /// Log and drop bad records, keep the rest.
    SkipInvalid,
}

/// Decodes every record as `W` and projects it to `W::Model`, in input order.
///
/// Aborts on the first malformed record.
///
/// # Errors
/// Returns `DirectorError::Decode` naming the line of the first bad record.
pub fn decode_result_batch<'a, W>(
    records: impl IntoIterator<Item = RawRecord<'a>>,
) -> DirectorResult<Vec<W::Model>>
where
    W: ToModel + DeserializeOwned,
{
    decode_result_batch_with::<W>(records, BatchPolicy::AbortOnError)
}

/// Same as [`decode_result_batch`] with an explicit [`BatchPolicy`].
pub fn decode_result_batch_with<'a, W>(
    records: impl IntoIterator<Item = RawRecord<'a>>,
    policy: BatchPolicy,
) -> DirectorResult<Vec<W::Model>>
where
    W: ToModel + DeserializeOwned,
{
    let mut models = Vec::new();
    for record in records {
        match record.decode::<W>() {
            Ok(wire) => models.push(wire.to_model()),
            Err(error) if policy == BatchPolicy::SkipInvalid => {
                warn!(line = record.line(), %error, "skipping undecodable result record");
            }
            Err(error) => return Err(error),
        }
    }
    Ok(models)
}
