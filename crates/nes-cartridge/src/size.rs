const PREFIXES: [char; 4] = ['k', 'M', 'G', 'T'];

/// Human-readable byte count: `512B`, `32kB`, `1.5kB`, `1MB`.
///
/// Values are scaled by 1024 until they fit in 64KiB of the current unit,
/// then printed with up to four significant digits.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: usize) -> String {
    if bytes < 0x400 {
        return format!("{bytes}B");
    }

    let mut scaled = bytes;
    let mut prefix = 0;
    while scaled > 0x10000 && prefix < PREFIXES.len() - 1 {
        scaled /= 0x400;
        prefix += 1;
    }

    let value = scaled as f64 / 1024.0;
    format!("{}{}B", significant(value, 4), PREFIXES[prefix])
}

/// `value` rounded to `digits` significant digits, trailing zeros dropped.
fn significant(value: f64, digits: i32) -> String {
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (digits - 1 - magnitude).max(0) as usize;
    let text = format!("{value:.decimals$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}
