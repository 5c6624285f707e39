//! Token scanning shared by the per-type matchers.

/// Splits the next whitespace-delimited token off `input`.
///
/// Returns the token and the total number of bytes to consume for it,
/// which includes any run of trailing whitespace so the next node starts
/// on a non-space character.
pub(crate) fn scan_token(input: &str) -> (&str, usize) {
    let end = input
        .find(|c: char| c.is_whitespace())
        .unwrap_or(input.len());
    let token = &input[..end];
    (token, end + whitespace_run(&input[end..]))
}

/// Length of the leading whitespace run in `input`.
pub(crate) fn whitespace_run(input: &str) -> usize {
    input.len() - input.trim_start().len()
}
