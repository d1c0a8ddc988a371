use crate::error::{CrackError, Result};

/// Character set searched by brute-force jobs.
pub const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Splits `alphabet` into contiguous portions for `workers` workers.
///
/// Every portion holds `ceil(len / workers)` characters except possibly the
/// last one. When there are more workers than characters, each portion is a
/// single character and the surplus workers receive nothing.
pub fn partition_alphabet(alphabet: &str, workers: usize) -> Result<Vec<String>> {
    if workers == 0 {
        return Err(CrackError::NoWorkersAvailable);
    }

    let chars: Vec<char> = alphabet.chars().collect();
    if chars.is_empty() {
        return Err(CrackError::Validation("alphabet must not be empty".into()));
    }

    let portion_size = chars.len().div_ceil(workers);
    let portions: Vec<String> = chars
        .chunks(portion_size)
        .map(|portion| portion.iter().collect())
        .collect();

    tracing::debug!(
        "Split {} characters into {} portions of up to {} characters",
        chars.len(),
        portions.len(),
        portion_size
    );

    Ok(portions)
}
