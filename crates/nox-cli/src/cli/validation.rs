/// Parse the `--jobs` worker count.
///
/// # Errors
///
/// Returns an error message for non-numbers and for zero.
pub fn parse_jobs(s: &str) -> Result<usize, String> {
    let jobs: usize = s
        .parse()
        .map_err(|_| format!("Job count must be a positive integer: '{}'", s))?;
    if jobs == 0 {
        return Err("Job count must be at least 1".to_string());
    }
    Ok(jobs)
}
