use std::env;
use std::str::FromStr;
use tracing::warn;

/// Retrieves an environment variable, ignoring it when it is unset or blank.
///
/// # Arguments
/// - `var`: The name of the environment variable.
///
/// # Returns
/// - `Option<String>` with the trimmed value.
pub fn get_env_var(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Retrieves an environment variable and parses it.
///
/// # Arguments
/// - `var`: The name of the environment variable.
///
/// # Returns
/// - `Option<T>`; values that fail to parse are logged and ignored.
pub fn get_env_var_as<T: FromStr>(var: &str) -> Option<T> {
    let value = get_env_var(var)?;
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value", var, value);
            None
        }
    }
}
