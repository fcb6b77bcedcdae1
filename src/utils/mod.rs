//! Common utilities and helpers

pub mod time;

/// Prefix family used when scaling a byte count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeBase {
    /// Powers of 1000: k, M, G, ...
    #[default]
    Decimal,
    /// Powers of 1024: ki, Mi, Gi, ...
    Binary,
}

impl SizeBase {
    fn divisor(self) -> f64 {
        match self {
            SizeBase::Decimal => 1000.0,
            SizeBase::Binary => 1024.0,
        }
    }
}

const PREFIXES: [&str; 8] = ["", "k", "M", "G", "T", "P", "E", "Z"];

/// Format a data size with one decimal and a metric or binary prefix
///
/// The mantissa is scaled into `[1, divisor)` (or left as-is below 1) and
/// anything past zetta is reported in yotta. `suffix` is appended after the
/// prefix, e.g. `"B"` gives `"1.2 GB"`.
pub fn format_datasize(bytes: f64, suffix: &str, base: SizeBase) -> String {
    let divisor = base.divisor();
    let binary = base == SizeBase::Binary;
    let mut num = bytes;

    for unit in PREFIXES {
        if num.abs() < divisor {
            if !unit.is_empty() && binary {
                return format!("{:.1} {}i{}", num, unit, suffix);
            }
            return format!("{:.1} {}{}", num, unit, suffix);
        }
        num /= divisor;
    }

    if binary {
        format!("{:.1} Yi{}", num, suffix)
    } else {
        format!("{:.1} Y{}", num, suffix)
    }
}
