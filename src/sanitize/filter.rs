use std::{fs, path::Path};

use log::debug;
use regex::Captures;

use crate::sanitize::{AnnounceUrl, ConfigError, Matcher, Pattern};

/// Replaces URLs matching a pattern with one or more rewritten URLs.
///
/// Templates reference capture groups as `\0` to `\9`; any other escaped
/// character stands for itself.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pattern: Pattern,
    templates: Vec<String>,
}

impl RewriteRule {
    pub fn new(pattern: &str, templates: Vec<String>) -> Result<Self, ConfigError> {
        if templates.is_empty() {
            return Err(ConfigError::MissingRewrite(pattern.to_owned()));
        }
        Ok(RewriteRule {
            pattern: Pattern::new(pattern)?,
            templates,
        })
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The rewritten URLs, or `None` if `url` does not match.
    pub fn rewrite(&self, url: &str) -> Option<Vec<String>> {
        let captures = self.pattern.captures(url)?;
        Some(
            self.templates
                .iter()
                .map(|template| expand(template, &captures))
                .collect(),
        )
    }
}

fn expand(template: &str, captures: &Captures) -> String {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            // a lone trailing backslash ends the template
            None => break,
            Some(group @ '0'..='9') => {
                let index = group as usize - '0' as usize;
                if let Some(capture) = captures.get(index) {
                    result.push_str(capture.as_str());
                }
            },
            Some(escaped) => result.push(escaped),
        }
    }
    result
}

enum Verdict {
    Whitelisted,
    Blacklisted,
    Pending,
}

/// Whitelist, blacklist and rewrite rules for announce URLs.
///
/// The configuration format is line based, `#` starts a comment:
///
/// ```text
/// # always add these URLs
/// + udp://tracker.example.com:6969
/// # keep matching URLs untouched
/// * udp://tracker\.example\.com:\d+
/// # drop matching URLs
/// - http://.*/announce\.php\?passkey=.*
/// # drop URLs on these domains and all their subdomains
/// -- spam\.example evil\.example
/// # rewrite: pattern followed by one or more templates
/// http://old\.example/(.*) http://new.example/\1 udp://new.example:6969
/// ```
///
/// All patterns have to match the complete (normalized) URL.
#[derive(Debug, Clone, Default)]
pub struct UrlFilter {
    whitelist: Matcher,
    blacklist: Matcher,
    rewrites: Vec<RewriteRule>,
    forced: Vec<String>,
}

impl UrlFilter {
    /// A filter that passes every valid URL unchanged.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Parse a filter configuration.
    pub fn parse(config: &str) -> Result<Self, ConfigError> {
        let mut whitelist = Vec::new();
        let mut blacklist = Vec::new();
        let mut blacklist_domains = Vec::new();
        let mut rewrites = Vec::new();
        let mut forced = Vec::new();

        for (number, line) in config.lines().enumerate() {
            let tokens = split_line(line);
            let Some((&first, rest)) = tokens.split_first() else {
                continue;
            };
            match first {
                "+" => forced.extend(rest.iter().map(|url| url.to_string())),
                "-" => blacklist.extend_from_slice(rest),
                "--" => blacklist_domains.extend_from_slice(rest),
                "*" => whitelist.extend_from_slice(rest),
                pattern => {
                    let templates = rest.iter().map(|t| t.to_string()).collect();
                    let rule = RewriteRule::new(pattern, templates).map_err(|e| e.at_line(number + 1))?;
                    rewrites.push(rule);
                },
            }
        }

        let mut blacklist = blacklist.into_iter().map(str::to_owned).collect::<Vec<_>>();
        if !blacklist_domains.is_empty() {
            blacklist.push(format!(
                r"[^:]+://(?:[0-9a-z_\-.]*\.)?(?:{})(?:[:/].*)?",
                blacklist_domains.join("|")
            ));
        }

        Ok(UrlFilter {
            whitelist: Matcher::any_of(&whitelist)?,
            blacklist: Matcher::any_of(&blacklist)?,
            rewrites,
            forced,
        })
    }

    /// Read and parse a filter configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&config)
    }

    /// URLs that are added to every announce list.
    pub fn forced_urls(&self) -> &[String] {
        &self.forced
    }

    fn triage(
        &self,
        candidate: AnnounceUrl,
        accepted: &mut Vec<AnnounceUrl>,
        pending: &mut Vec<AnnounceUrl>,
    ) -> Verdict {
        if self.whitelist.is_match(&candidate.url) {
            debug!("whitelisted entry: {}", candidate.url);
            accepted.push(candidate);
            Verdict::Whitelisted
        } else if self.blacklist.is_match(&candidate.url) {
            debug!("blacklisted entry: {}", candidate.url);
            Verdict::Blacklisted
        } else {
            debug!("processing entry: {}", candidate.url);
            pending.push(candidate);
            Verdict::Pending
        }
    }

    /// Run a single URL through normalization and the filter rules.
    ///
    /// A whitelisted URL is returned on its own. Otherwise every rewrite
    /// rule, in order, replaces the pending URLs it matches with its
    /// rewritten ones; those are normalized and triaged again and only face
    /// the rules after the one that produced them. Pending URLs that no rule
    /// matched pass unchanged.
    pub fn filter(&self, url: &str) -> Vec<AnnounceUrl> {
        let mut accepted = Vec::new();
        let mut pending = Vec::new();

        let Some(candidate) = AnnounceUrl::normalize(url) else {
            debug!("invalid entry: {}", url);
            return accepted;
        };
        match self.triage(candidate, &mut accepted, &mut pending) {
            Verdict::Pending => {},
            Verdict::Whitelisted | Verdict::Blacklisted => return accepted,
        }

        for rule in &self.rewrites {
            if pending.is_empty() {
                break;
            }

            let mut index = 0;
            let mut remaining = pending.len();
            while index < remaining {
                let Some(rewritten) = rule.rewrite(&pending[index].url) else {
                    index += 1;
                    continue;
                };
                let matched = pending.remove(index);
                remaining -= 1;
                debug!("rewriting entry: {} (pattern '{}')", matched.url, rule.pattern().as_str());

                for url in rewritten {
                    match AnnounceUrl::normalize(&url) {
                        Some(candidate) => {
                            self.triage(candidate, &mut accepted, &mut pending);
                        },
                        None => debug!("invalid rewritten entry: {}", url),
                    }
                }
            }
        }

        for candidate in &pending {
            debug!("passed entry: {}", candidate.url);
        }
        accepted.append(&mut pending);
        accepted
    }
}

/// Split a configuration line into tokens. The markers `+`, `*`, `-` and `--`
/// may be glued to the first token.
fn split_line(line: &str) -> Vec<&str> {
    let line = line.trim_start();
    let mut tokens = Vec::new();

    let marker = ["--", "-", "+", "*"]
        .into_iter()
        .find(|marker| line.starts_with(marker));
    let rest = match marker {
        Some(marker) => {
            tokens.push(marker);
            &line[marker.len()..]
        },
        None => line,
    };

    for token in rest.split_whitespace() {
        if token.starts_with('#') {
            break;
        }
        tokens.push(token);
    }
    tokens
}

#[cfg(test)]
mod test {
    use super::*;

    fn urls(filter: &UrlFilter, url: &str) -> Vec<String> {
        filter.filter(url).into_iter().map(|u| u.url).collect()
    }

    #[test]
    fn lines_are_split_into_tokens() {
        assert_eq!(split_line("  +udp://a.example  udp://b.example # c"), ["+", "udp://a.example", "udp://b.example"]);
        assert_eq!(split_line("--evil\\.example"), ["--", "evil\\.example"]);
        assert_eq!(split_line("- x"), ["-", "x"]);
        assert_eq!(split_line("*\tx\ty"), ["*", "x", "y"]);
        assert_eq!(split_line("a b#c #d"), ["a", "b#c"]);
        assert!(split_line("   # only a comment").is_empty());
        assert!(split_line("").is_empty());
    }

    #[test]
    fn rewrite_templates_expand_groups() {
        let rule = RewriteRule::new(
            r"http://(\w+)\.example/(.*)",
            vec![r"udp://\1.example:\\\2".to_owned(), r"http://x/\0\3\".to_owned()],
        )
        .unwrap();
        assert_eq!(
            rule.rewrite("http://old.example/path").unwrap(),
            [r"udp://old.example:\path", "http://x/http://old.example/path"]
        );
        assert!(rule.rewrite("http://old.example.org/path").is_none());
    }

    #[test]
    fn rewrite_lines_need_templates() {
        let err = UrlFilter::parse("+ udp://a.example\nhttp://lonely/pattern\n").unwrap_err();
        assert!(matches!(err, ConfigError::Line { line: 2, .. }));
        let source = std::error::Error::source(&err).unwrap().to_string();
        assert!(source.contains("has no replacement"), "{}", source);
    }

    #[test]
    fn bad_regexes_are_config_errors() {
        assert!(matches!(UrlFilter::parse("- (broken"), Err(ConfigError::Regex { .. })));
        assert!(matches!(
            UrlFilter::parse("(broken x"),
            Err(ConfigError::Line { line: 1, .. })
        ));
    }

    #[test]
    fn empty_filter_passes_normalized_urls() {
        let filter = UrlFilter::new();
        assert_eq!(urls(&filter, "udp://Tracker.Example.com/announce"), ["udp://tracker.example.com:80"]);
        assert!(urls(&filter, "not a url").is_empty());
        assert!(filter.forced_urls().is_empty());
    }

    #[test]
    fn blacklist_and_whitelist() {
        let filter = UrlFilter::parse(
            "- http://.*/announce\\.php\\?passkey=.*\n\
             -- spam\\.example\n\
             * http://good\\.example/announce\\.php\\?passkey=.*\n",
        )
        .unwrap();

        assert!(urls(&filter, "http://tracker.example.com/announce.php?passkey=123").is_empty());
        assert!(urls(&filter, "udp://spam.example:6969").is_empty());
        assert!(urls(&filter, "http://a.b.spam.example/announce").is_empty());
        // the domain blacklist does not catch lookalikes
        assert_eq!(urls(&filter, "http://notspam.example/"), ["http://notspam.example/"]);
        // whitelist wins over blacklist
        assert_eq!(
            urls(&filter, "http://good.example/announce.php?passkey=1"),
            ["http://good.example/announce.php?passkey=1"]
        );
    }

    #[test]
    fn rewritten_urls_are_triaged_again() {
        let filter = UrlFilter::parse(
            "http://old\\.example/(.*) http://new.example/\\1\n\
             * http://new\\.example/keep\n\
             - http://new\\.example/drop\n",
        )
        .unwrap();

        assert_eq!(urls(&filter, "http://old.example/path"), ["http://new.example/path"]);
        assert_eq!(urls(&filter, "http://old.example/keep"), ["http://new.example/keep"]);
        assert!(urls(&filter, "http://old.example/drop").is_empty());
        assert_eq!(urls(&filter, "http://other.example/path"), ["http://other.example/path"]);
    }

    #[test]
    fn rewrites_only_face_later_rules() {
        let filter = UrlFilter::parse(
            "http://a\\.example/(.*) http://b.example/\\1\n\
             http://b\\.example/(.*) http://c.example/\\1 udp://c.example\n\
             http://a\\.example/(.*) http://never.example/\n",
        )
        .unwrap();

        assert_eq!(
            urls(&filter, "http://a.example/x"),
            ["http://c.example/x", "udp://c.example:80"]
        );
        // a rule does not see its own output again
        let filter = UrlFilter::parse("http://(.*)\\.example/ http://\\1.\\1.example/\n").unwrap();
        assert_eq!(urls(&filter, "http://a.example/"), ["http://a.a.example/"]);
    }

    #[test]
    fn whitelisted_rewrites_come_first() {
        let filter = UrlFilter::parse(
            "http://a\\.example/ http://pending.example/ http://listed.example/\n\
             * http://listed\\.example/\n",
        )
        .unwrap();
        assert_eq!(
            urls(&filter, "http://a.example/"),
            ["http://listed.example/", "http://pending.example/"]
        );
    }

    #[test]
    fn forced_urls_are_collected() {
        let filter = UrlFilter::parse("+udp://a.example:1 udp://b.example:2\n  + udp://c.example:3 # x\n").unwrap();
        assert_eq!(
            filter.forced_urls(),
            ["udp://a.example:1", "udp://b.example:2", "udp://c.example:3"]
        );
    }

    #[test]
    fn missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = UrlFilter::load(dir.path().join("nope.conf")).unwrap_err();
        assert!(err.to_string().contains("couldn't read url filter"));
    }
}
