//! OData query URL construction
//!
//! Observations live at `{base}/{dataset}/Observations`. Measure filters
//! become a single `$filter` parameter holding the OR of
//! `Measure eq '<code>'` terms, percent-encoded.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left bare in the encoded filter expression: unreserved
/// (RFC 3986) plus `/`.
const FILTER_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Build the Observations URL for a dataset, filtered to `measures`.
///
/// An empty `measures` slice yields the bare collection URL with no
/// query string.
pub fn observations_url(base: &str, dataset_id: &str, measures: &[String]) -> String {
    let mut url = format!("{}/{dataset_id}/Observations", base.trim_end_matches('/'));
    if !measures.is_empty() {
        let expr = measures
            .iter()
            .map(|code| format!("Measure eq '{code}'"))
            .collect::<Vec<_>>()
            .join(" or ");
        url.push_str("?$filter=");
        url.push_str(&utf8_percent_encode(&expr, FILTER_SET).to_string());
    }
    url
}
