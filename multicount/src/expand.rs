//! Fans each token record out into its dimension-tagged group keys.

use crate::schema::{GroupKey, TokenRecord};

/// Emits exactly four group keys per token record, one per dimension, in a
/// fixed order.  Pure and stateless; `doc_id` is forwarded uninterpreted.
pub fn expand(record: &TokenRecord) -> [GroupKey; 4] {
    [
        GroupKey::All,
        GroupKey::PerToken(record.token.clone()),
        GroupKey::PerDoc(record.doc_id.clone()),
        GroupKey::PerTokenAndDoc(record.token.clone(), record.doc_id.clone()),
    ]
}
