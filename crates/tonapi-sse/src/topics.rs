//! URL templates for the `/v2/sse/*` endpoints.

/// Traces of `accounts`, or of every account when empty.
pub fn traces_url(endpoint: &str, accounts: &[String]) -> String {
    format!(
        "{}/v2/sse/accounts/traces?accounts={}",
        base(endpoint),
        accounts_or_all(accounts)
    )
}

/// Mempool messages, optionally only those involving `accounts`.
pub fn mempool_url(endpoint: &str, accounts: &[String]) -> String {
    let mut url = format!("{}/v2/sse/mempool", base(endpoint));
    if !accounts.is_empty() {
        url.push_str("?accounts=");
        url.push_str(&accounts.join(","));
    }
    url
}

/// Transactions of `accounts` (all when empty), optionally filtered by
/// message `operations`.
pub fn transactions_url(endpoint: &str, accounts: &[String], operations: &[String]) -> String {
    let mut url = format!(
        "{}/v2/sse/accounts/transactions?accounts={}",
        base(endpoint),
        accounts_or_all(accounts)
    );
    if !operations.is_empty() {
        url.push_str("&operations=");
        url.push_str(&operations.join(","));
    }
    url
}

/// Blocks of `workchain`, or of every workchain when `None`.
pub fn blocks_url(endpoint: &str, workchain: Option<i32>) -> String {
    match workchain {
        Some(wc) => format!("{}/v2/sse/blocks?workchain={wc}", base(endpoint)),
        None => format!("{}/v2/sse/blocks", base(endpoint)),
    }
}

fn base(endpoint: &str) -> &str {
    endpoint.trim_end_matches('/')
}

fn accounts_or_all(accounts: &[String]) -> String {
    if accounts.is_empty() {
        "ALL".to_string()
    } else {
        accounts.join(",")
    }
}
