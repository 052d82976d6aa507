use log::warn;

/// Characters allowed in a path besides ASCII letters and digits.
const PATH_PUNCTUATION: &[u8] = b"%&+-./:=?_";

/// A normalized announce URL together with the domain it is grouped by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnnounceUrl {
    pub url: String,
    /// Domain with its top level domain (`example.com` for
    /// `udp://tracker.example.com:80`), or the full address of IP literals.
    pub domain: String,
}

impl AnnounceUrl {
    /// Canonicalize `url`, or return `None` if it is not acceptable as an
    /// announce URL.
    ///
    /// * protocol and domain are lowercased, a trailing dot on the domain is
    ///   removed
    /// * `udp` URLs lose their path and get port 80 unless they have one
    /// * `http` and `https` URLs lose their default ports and get `/` as path
    ///   unless they have one
    /// * ports out of range are dropped
    /// * `dht://` URLs are always rejected
    pub fn normalize(url: &str) -> Option<Self> {
        if url.starts_with("dht://") {
            return None;
        }

        let (protocol, rest) = url.split_once("://")?;
        let protocol = protocol.to_ascii_lowercase();
        if protocol.is_empty() || !protocol.bytes().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }

        let (authority, mut path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
        let (domain, port) = split_port(authority);

        let mut domain = domain.to_ascii_lowercase();
        if domain.ends_with('.') {
            domain.pop();
        }

        let mut port = match parse_port(port)? {
            Some(port) if port >= 65536 => {
                warn!("dropping out of range port in '{}'", url);
                0
            },
            Some(port) => port,
            None => 0,
        };

        match protocol.as_str() {
            "udp" => {
                path = "";
                if port == 0 {
                    port = 80;
                }
            },
            "http" | "https" => {
                let default_port = if protocol == "http" { 80 } else { 443 };
                if port == default_port {
                    port = 0;
                }
                if path.is_empty() {
                    path = "/";
                }
            },
            _ => {},
        }

        while path.len() > 1 && path.as_bytes()[1] == b'/' {
            path = &path[1..];
        }
        if !path
            .bytes()
            .all(|c| c.is_ascii_alphanumeric() || PATH_PUNCTUATION.contains(&c))
        {
            return None;
        }

        let group = group_domain(&domain)?.to_owned();

        let mut url = format!("{}://{}", protocol, domain);
        if port != 0 {
            url.push(':');
            url.push_str(&port.to_string());
        }
        url.push_str(path);

        Some(AnnounceUrl { url, domain: group })
    }
}

/// Split `host[:port]` at the port colon. The colons inside a bracketed IPv6
/// literal do not count.
fn split_port(authority: &str) -> (&str, &str) {
    let search_from = authority.rfind(']').unwrap_or(0);
    match authority[search_from..].rfind(':') {
        Some(colon) => authority.split_at(search_from + colon),
        None => (authority, ""),
    }
}

/// Parse `""` or `":<digits>"`. `Ok(None)` means no port was given, `None`
/// means the URL has to be rejected.
fn parse_port(port: &str) -> Option<Option<u32>> {
    let digits = match port.strip_prefix(':') {
        None | Some("") => return Some(None),
        Some(digits) => digits,
    };
    // ":65536" is the longest accepted form
    if digits.len() > 5 || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(Some)
}

/// Validate a lowercased domain and return the part that URLs are grouped by.
fn group_domain(domain: &str) -> Option<&str> {
    if domain.is_empty() || domain.ends_with('.') {
        return None;
    }

    if let Some(inner) = domain.strip_prefix('[') {
        // IPv6, shortest is "[::]"
        let inner = inner.strip_suffix(']')?;
        if domain.len() < 4 || !inner.bytes().all(|c| c == b':' || c.is_ascii_hexdigit()) {
            return None;
        }
        return Some(domain);
    }

    let last_dot = domain.rfind('.');
    if let Some(dot) = last_dot {
        if domain.as_bytes().get(dot + 1).is_some_and(u8::is_ascii_digit) {
            return valid_ipv4(domain).then_some(domain);
        }
    }

    let valid_label = |label: &str| match label.as_bytes().split_first() {
        None => false,
        Some((first, rest)) => {
            (first.is_ascii_alphanumeric() || *first == b'_')
                && rest
                    .iter()
                    .all(|&c| c.is_ascii_alphanumeric() || c == b'-' || c == b'_')
        },
    };
    if !domain.split('.').all(valid_label) {
        return None;
    }

    // the last two labels, "example.com" for "tracker.example.com"
    let start = match last_dot {
        None => 0,
        Some(dot) => domain[..dot].rfind('.').map_or(0, |second| second + 1),
    };
    Some(&domain[start..])
}

fn valid_ipv4(domain: &str) -> bool {
    let octets = domain.split('.').collect::<Vec<_>>();
    octets.len() == 4
        && octets.iter().all(|octet| {
            (1..=3).contains(&octet.len())
                && octet.bytes().all(|c| c.is_ascii_digit())
                && !(octet.len() > 1 && octet.starts_with('0'))
                && octet.parse::<u8>().is_ok()
        })
}
