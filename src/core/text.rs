/// Trim and lowercase a raw attribute before any comparison.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Drop a leading `www.` so `www.facebook.com` looks up as `facebook.com`.
pub fn strip_www(source: &str) -> &str {
    source.strip_prefix("www.").unwrap_or(source)
}
