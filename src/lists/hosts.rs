//! Hosts-file rule parsing.

/// IP prefixes of the rules we treat as blocks.
const BLOCK_PREFIXES: &[&str] = &["127.0.0.1 ", "0.0.0.0 "];

/// Domains that must never be blocked.
///
/// Several of these show up in upstream lists and in the default hosts
/// preamble that is prepended to every response.
pub const EXCLUDED_DOMAINS: &[&str] = &["localhost", "localhost.localdomain", "local", "0.0.0.0"];

/// Extract the domain from a single hosts-file line.
///
/// Returns `None` unless the line starts with one of the null-route
/// prefixes. The domain runs from the first space up to an optional `#`
/// comment and is returned trimmed but otherwise untouched.
pub fn parse_line(line: &str) -> Option<&str> {
    if !BLOCK_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
        return None;
    }

    let start = line.find(' ')? + 1;
    let end = line.find('#').unwrap_or(line.len());
    if end < start {
        return None;
    }

    Some(line[start..end].trim())
}
