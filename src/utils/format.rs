const UNITS: [&str; 9] = ["B", "kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Renders a byte count with decimal (1000-based) units and three
/// significant digits, dropping trailing zeros: 5497 -> "5.5 kB".
pub fn pretty_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut exponent = 0;
    let mut scale: u64 = 1;
    while exponent < UNITS.len() - 1 && bytes / scale >= 1000 {
        scale *= 1000;
        exponent += 1;
    }

    let value = bytes as f64 / scale as f64;
    let decimals = match value {
        v if v >= 100.0 => 0,
        v if v >= 10.0 => 1,
        _ => 2,
    };
    let mut rendered = format!("{:.*}", decimals, value);
    if rendered.contains('.') {
        rendered = rendered
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string();
    }

    format!("{} {}", rendered, UNITS[exponent])
}
