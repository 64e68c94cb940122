//! Elapsed-time label formatting

/// Formats elapsed seconds as `MM:SS`, or `H:MM:SS` once an hour has passed.
///
/// Hours carry no leading zero and are not capped.
pub fn format_elapsed(seconds: u64) -> String {
    let total_minutes = seconds / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
