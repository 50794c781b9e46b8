//! Resolution of raw monitoring targets into dialable addresses.
//!
//! Targets arrive either as URLs (`https://example.com:8443/health`) or as bare
//! `host[:port]` strings. Both forms are reduced to a host and an optional
//! explicit port.

use url::Url;

use crate::error::TargetError;

/// Port used for certificate checks when the target names none
pub const DEFAULT_TLS_PORT: u16 = 443;

/// Build a `host:port` address for `raw_target`, always using `port`.
///
/// Any port carried by the target itself is ignored.
pub fn address_for_port(raw_target: &str, port: i64) -> Result<String, TargetError> {
    let (host, _) = extract_host_port(raw_target)?;
    if port <= 0 {
        return Err(TargetError::InvalidPort(port));
    }
    Ok(join_host_port(&host, &port.to_string()))
}

/// Resolve the TLS dial address and the server name to verify.
///
/// An explicit port on the target is kept, otherwise 443 is used.
pub fn address_and_server_name(raw_target: &str) -> Result<(String, String), TargetError> {
    let (host, port) = extract_host_port(raw_target)?;
    let port = port.unwrap_or_else(|| DEFAULT_TLS_PORT.to_string());
    Ok((join_host_port(&host, &port), host))
}

fn extract_host_port(raw_target: &str) -> Result<(String, Option<String>), TargetError> {
    let target = raw_target.trim();
    if target.is_empty() {
        return Err(TargetError::Empty);
    }

    let remainder = match target.split_once("://") {
        Some((_, rest)) => {
            // Reject anything the URL parser refuses before picking it apart
            Url::parse(target)?;
            rest
        }
        None => target,
    };

    let authority = authority_of(remainder).trim();
    if authority.is_empty() {
        return Err(TargetError::EmptyHost);
    }

    let (host, port) = split_host_port(authority);
    if host.is_empty() {
        return Err(TargetError::EmptyHost);
    }
    Ok((host.to_string(), port.map(str::to_string)))
}

/// Everything before the path, query or fragment, without user info.
fn authority_of(rest: &str) -> &str {
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    match authority.rfind('@') {
        Some(at) => &authority[at + 1..],
        None => authority,
    }
}

fn split_host_port(authority: &str) -> (&str, Option<&str>) {
    if let Some(bracketed) = authority.strip_prefix('[') {
        if let Some((host, rest)) = bracketed.split_once(']') {
            return match rest.strip_prefix(':') {
                Some(port) if !port.is_empty() => (host, Some(port)),
                Some(_) => (host, None),
                None if rest.is_empty() => (host, None),
                None => (authority, None),
            };
        }
        return (authority, None);
    }

    // Unbracketed IPv6 literals carry several colons and no port
    match authority.split_once(':') {
        Some((host, port)) if !port.contains(':') => {
            if port.is_empty() {
                (host, None)
            } else {
                (host, Some(port))
            }
        }
        _ => (authority, None),
    }
}

fn join_host_port(host: &str, port: &str) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}
