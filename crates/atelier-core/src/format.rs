/// Render a second count as `m:ss` for the transport clocks.
///
/// Media elements report `NaN` durations until metadata arrives, so any
/// non-finite or negative input renders as the idle `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
