// crates/tabflow-core/src/fetch.rs

use crate::error::{EtlError, Result};

/// Fetch a remote document body. Blocking, no retries, no auth;
/// default redirect handling only. Any network or HTTP-status failure
/// is fatal to the run.
pub fn fetch_document(url: &str) -> Result<String> {
    let response = reqwest::blocking::get(url).map_err(|err| EtlError::Fetch {
        url: url.to_string(),
        detail: err.to_string(),
    })?;
    let response = response.error_for_status().map_err(|err| EtlError::Fetch {
        url: url.to_string(),
        detail: err.to_string(),
    })?;
    response.text().map_err(|err| EtlError::Fetch {
        url: url.to_string(),
        detail: err.to_string(),
    })
}
