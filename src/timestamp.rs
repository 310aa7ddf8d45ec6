/// Formats a stream position in seconds as `HH:MM:SS.mmm`.
pub fn time_str(sec: f64) -> String {
    let ms = (sec.max(0.0) * 1000f64).round() as u64;
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let milliseconds = ms % 1000;

    format!(
        "{hours:0width$}:{minutes:02}:{seconds:02}.{milliseconds:03}",
        width = if hours >= 100 { 0 } else { 2 }
    )
}

/// `sample` as a position at `sample_rate`, e.g. `00:00:01.500`.
pub fn sample_time_str(sample: usize, sample_rate: u32) -> String {
    time_str(sample as f64 / sample_rate as f64)
}

#[test]
fn formats_positions() {
    assert_eq!(time_str(0.0), "00:00:00.000");
    assert_eq!(time_str(3723.25), "01:02:03.250");
    assert_eq!(sample_time_str(72_000, 48000), "00:00:01.500");
}
