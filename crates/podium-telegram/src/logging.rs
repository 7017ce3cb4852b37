//! Log filter selection for the bot binary.

/// Filter directives for a `-v` count. A non-blank `RUST_LOG` wins.
pub fn log_directives(verbose: u8, rust_log: Option<&str>) -> String {
    if let Some(directives) = rust_log.map(str::trim).filter(|d| !d.is_empty()) {
        return directives.to_string();
    }

    match verbose {
        0 => "podium_telegram=info,podium_runtime=info,teloxide=warn",
        1 => "podium_telegram=debug,podium_runtime=debug,podium_intent=debug,teloxide=info",
        2 => "podium_telegram=trace,podium_runtime=trace,podium_intent=trace,podium_keynote=debug,teloxide=debug",
        _ => "trace",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert!(log_directives(0, None).contains("teloxide=warn"));
        assert!(log_directives(1, None).contains("podium_runtime=debug"));
        assert_eq!(log_directives(5, None), "trace");
    }

    #[test]
    fn test_rust_log_overrides_verbosity() {
        assert_eq!(log_directives(0, Some("podium_keynote=trace")), "podium_keynote=trace");
        assert_eq!(log_directives(2, Some("warn")), "warn");
        assert!(log_directives(0, Some("  ")).contains("teloxide=warn"));
    }
}
