const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

/// Binary-prefixed size with two decimals, e.g. `1.50 GiB`. Bytes below
/// 1 KiB are printed as a plain count.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }

    format!("{value:.2} {}", UNITS[unit])
}
