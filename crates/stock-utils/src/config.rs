//! Environment lookup helpers used when building configuration

/// Read an environment variable, treating unset and blank values alike
///
/// Surrounding whitespace is trimmed, so a key exported as `" abc "` yields `"abc"`.
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read an environment variable or fall back to `default`
pub fn env_var_or(name: &str, default: &str) -> String {
    env_var(name).unwrap_or_else(|| default.to_string())
}
