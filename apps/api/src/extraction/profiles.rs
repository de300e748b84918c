use url::Url;

/// Icon token for a social network; unknown or empty networks get `globe`.
pub fn resolve_profile_icon(network: &str) -> &'static str {
    let key: String = network
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    match key.as_str() {
        "linkedin" => "linkedin",
        "github" => "github",
        "twitter" | "x" => "twitter",
        "facebook" => "facebook",
        "instagram" => "instagram",
        "gitlab" => "gitlab",
        "stackoverflow" => "stackoverflow",
        "medium" => "medium",
        "behance" => "behance",
        "dribbble" => "dribbble",
        _ => "globe",
    }
}

/// Parses a profile link, accepting the scheme-less `github.com/ada` form.
fn parse_profile_url(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() || raw.contains(char::is_whitespace) {
        return None;
    }
    let url = if raw.contains("://") {
        Url::parse(raw).ok()?
    } else {
        Url::parse(&format!("https://{raw}")).ok()?
    };
    url.host_str().is_some().then_some(url)
}

/// Guesses a network name from a profile URL's host.
pub fn network_from_url(url: &str) -> Option<&'static str> {
    let url = parse_profile_url(url)?;
    let host = url.host_str()?.to_lowercase();

    [
        ("linkedin.com", "LinkedIn"),
        ("github.com", "GitHub"),
        ("gitlab.com", "GitLab"),
        ("twitter.com", "Twitter"),
        ("x.com", "Twitter"),
        ("stackoverflow.com", "Stack Overflow"),
        ("medium.com", "Medium"),
        ("behance.net", "Behance"),
        ("dribbble.com", "Dribbble"),
        ("instagram.com", "Instagram"),
        ("facebook.com", "Facebook"),
    ]
    .into_iter()
    .find(|(domain, _)| host == *domain || host.ends_with(&format!(".{domain}")))
    .map(|(_, network)| network)
}

/// Last path segment of a profile URL, without a leading `@`.
pub fn username_from_url(url: &str) -> Option<String> {
    let url = parse_profile_url(url)?;
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(|segment| segment.trim_start_matches('@'))
        .filter(|segment| !segment.is_empty())
        .map(String::from)
}
