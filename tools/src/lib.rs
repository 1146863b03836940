//! Flag parsing shared by the `generate-data` and `analyze-funnel` runners.
//!
//! Flags are optional `--name value` pairs; anything absent or unparsable
//! falls back to the built-in default.

pub fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    let Some(raw) = arg_value(args, flag) else {
        return default;
    };
    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            log::warn!("ignoring unparsable {flag} value {raw:?}; using default");
            default
        }
    }
}

pub fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
