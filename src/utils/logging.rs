/// True when `MIPHY_VERBOSE` is set to anything but empty or `0`.
pub fn verbose_from_env() -> bool {
    std::env::var("MIPHY_VERBOSE")
        .ok()
        .filter(|v| !v.is_empty() && v != "0")
        .is_some()
}

/// Prints a `[miphy]` checkpoint line to stderr when the flag is set.
#[macro_export]
macro_rules! verbose {
    ($enabled:expr, $($arg:tt)*) => {
        if $enabled {
            eprintln!("[miphy] {}", format!($($arg)*));
        }
    };
}

/// Prints a `Warning:` line to stderr.
pub fn warn(message: impl std::fmt::Display) {
    eprintln!("Warning: {}", message);
}
