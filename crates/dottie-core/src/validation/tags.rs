//! Value checks for individual validation tags.

use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    path::Path,
    str::FromStr,
};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationErrorKind;

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: Lazy<Regex> =
            Lazy::new(|| Regex::new($re).expect("validation pattern is a valid regex"));
    };
}

pattern!(NUMERIC, r"^[-+]?[0-9]+(?:\.[0-9]+)?$");
pattern!(ALPHA, r"^[a-zA-Z]+$");
pattern!(ALPHANUM, r"^[a-zA-Z0-9]+$");
pattern!(
    EMAIL,
    r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
);
pattern!(HOSTNAME_RFC952, r"^[a-zA-Z]([a-zA-Z0-9\-]+[\.]?)*[a-zA-Z0-9]$");
pattern!(
    HOSTNAME_RFC1123,
    r"^([a-zA-Z0-9][a-zA-Z0-9-]{0,62})(\.[a-zA-Z0-9][a-zA-Z0-9-]{0,62})*$"
);
pattern!(
    FQDN,
    r"^([a-zA-Z0-9][a-zA-Z0-9-]{0,62})(\.[a-zA-Z0-9][a-zA-Z0-9-]{0,62})*(\.[a-zA-Z][a-zA-Z0-9]{0,62})\.?$"
);
pattern!(
    MAC,
    r"^(?:[0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$|^(?:[0-9A-Fa-f]{2}[:-]){7}[0-9A-Fa-f]{2}$|^(?:[0-9A-Fa-f]{4}\.){2}[0-9A-Fa-f]{4}$"
);
pattern!(ULID, r"^[0-7][0-9A-HJKMNP-TV-Za-hjkmnp-tv-z]{25}$");
pattern!(
    SEMVER,
    r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(?:-((?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$"
);
pattern!(
    CRON_FIELD,
    r"^(?:\*|\?|[0-9A-Za-z]+(?:-[0-9A-Za-z]+)?)(?:/[0-9]+)?(?:,(?:\*|\?|[0-9A-Za-z]+(?:-[0-9A-Za-z]+)?)(?:/[0-9]+)?)*$"
);
pattern!(CRON_EVERY, r"^@every (?:[0-9]+(?:ns|us|µs|ms|s|m|h))+$");
pattern!(JWT, r"^[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]*$");
pattern!(
    HEXCOLOR,
    r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$"
);

/// Tags understood by [`check`]. The conditional tags are evaluated by the
/// validator because they need the rest of the document.
pub(super) const CONDITIONAL_TAGS: &[&str] = &[
    "required_if",
    "required_unless",
    "required_with",
    "required_without",
    "excluded_if",
];

type CheckResult = Result<bool, ValidationErrorKind>;

/// Run a single tag against a value.
pub(super) fn check(name: &str, param: &str, value: &str) -> CheckResult {
    let passed = match name {
        "required" => !value.is_empty(),
        "omitempty" => true,
        "len" => value.chars().count() == parse_count(param)?,
        "min" => compare(value, param, |ord| ord.is_ge())?,
        "max" => compare(value, param, |ord| ord.is_le())?,
        "gt" => compare(value, param, |ord| ord.is_gt())?,
        "gte" => compare(value, param, |ord| ord.is_ge())?,
        "lt" => compare(value, param, |ord| ord.is_lt())?,
        "lte" => compare(value, param, |ord| ord.is_le())?,
        "eq" => value == param,
        "ne" => value != param,
        "oneof" => param.split_whitespace().any(|option| option == value),
        "oneofci" => param
            .split_whitespace()
            .any(|option| option.to_lowercase() == value.to_lowercase()),
        "number" => !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()),
        "numeric" => NUMERIC.is_match(value),
        "boolean" => matches!(
            value,
            "1" | "t" | "T" | "TRUE" | "true" | "True" | "0" | "f" | "F" | "FALSE" | "false" | "False"
        ),
        "alpha" => ALPHA.is_match(value),
        "alphanum" => ALPHANUM.is_match(value),
        "ascii" => value.is_ascii(),
        "lowercase" => !value.is_empty() && value == value.to_lowercase(),
        "uppercase" => !value.is_empty() && value == value.to_uppercase(),
        "contains" => value.contains(param),
        "excludes" => !value.contains(param),
        "startswith" => value.starts_with(param),
        "endswith" => value.ends_with(param),
        "email" => EMAIL.is_match(value),
        "url" => url::Url::parse(value).is_ok(),
        "uri" => url::Url::parse(value).is_ok() || value.starts_with('/'),
        "http_url" => is_http_url(value, &["http", "https"]),
        "https_url" => is_http_url(value, &["https"]),
        "hostname" => HOSTNAME_RFC952.is_match(value),
        "hostname_rfc1123" => HOSTNAME_RFC1123.is_match(value),
        "fqdn" => FQDN.is_match(value),
        "hostname_port" => is_hostname_port(value),
        "ip" => IpAddr::from_str(value).is_ok(),
        "ipv4" => Ipv4Addr::from_str(value).is_ok(),
        "ipv6" => Ipv6Addr::from_str(value).is_ok(),
        "cidr" => is_cidr(value),
        "mac" => MAC.is_match(value),
        "dir" => Path::new(value).is_dir(),
        "dirpath" => is_path(value) && (value.ends_with(['/', '\\']) || Path::new(value).is_dir()),
        "file" => Path::new(value).is_file(),
        "filepath" => is_path(value) && !value.ends_with(['/', '\\']) && !Path::new(value).is_dir(),
        "uuid" => value.len() == 36 && uuid::Uuid::try_parse(value).is_ok(),
        "ulid" => ULID.is_match(value),
        "semver" => SEMVER.is_match(value),
        "cron" => is_cron(value),
        "json" => serde_json::from_str::<serde_json::Value>(value).is_ok(),
        "jwt" => JWT.is_match(value),
        "hexcolor" => HEXCOLOR.is_match(value),
        "rgb" => is_rgb(value, false),
        "rgba" => is_rgb(value, true),
        "base64" => !value.is_empty() && STANDARD.decode(value).is_ok(),
        "timezone" => {
            !value.is_empty() && (value == "Local" || value.parse::<chrono_tz::Tz>().is_ok())
        }
        _ => return Err(ValidationErrorKind::UnknownTag),
    };
    Ok(passed)
}

fn parse_count(param: &str) -> Result<usize, ValidationErrorKind> {
    param
        .trim()
        .parse()
        .map_err(|_| ValidationErrorKind::InvalidParameter)
}

/// Numeric comparison when the value is a number, otherwise a comparison of
/// the value's length in characters.
fn compare(value: &str, param: &str, accept: impl Fn(std::cmp::Ordering) -> bool) -> CheckResult {
    let limit: f64 = param
        .trim()
        .parse()
        .map_err(|_| ValidationErrorKind::InvalidParameter)?;
    let actual = if NUMERIC.is_match(value) {
        value
            .parse::<f64>()
            .map_err(|_| ValidationErrorKind::InvalidParameter)?
    } else {
        value.chars().count() as f64
    };
    Ok(actual.partial_cmp(&limit).is_some_and(accept))
}

fn is_http_url(value: &str, schemes: &[&str]) -> bool {
    url::Url::parse(value)
        .is_ok_and(|url| schemes.contains(&url.scheme()) && url.host_str().is_some_and(|h| !h.is_empty()))
}

fn is_hostname_port(value: &str) -> bool {
    let Some((host, port)) = value.rsplit_once(':') else {
        return false;
    };
    let port_ok = port.parse::<u16>().is_ok_and(|port| port > 0);
    let host_ok = match host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
        Some(ipv6) => Ipv6Addr::from_str(ipv6).is_ok(),
        None => host.is_empty() || HOSTNAME_RFC1123.is_match(host),
    };
    port_ok && host_ok
}

fn is_cidr(value: &str) -> bool {
    let Some((address, prefix)) = value.split_once('/') else {
        return false;
    };
    let Ok(prefix) = prefix.parse::<u8>() else {
        return false;
    };
    match IpAddr::from_str(address) {
        Ok(IpAddr::V4(_)) => prefix <= 32,
        Ok(IpAddr::V6(_)) => prefix <= 128,
        Err(_) => false,
    }
}

fn is_path(value: &str) -> bool {
    !value.is_empty() && !value.contains('\0')
}

fn is_cron(value: &str) -> bool {
    let value = value.trim();
    if value.starts_with('@') {
        return matches!(
            value,
            "@annually" | "@yearly" | "@monthly" | "@weekly" | "@daily" | "@midnight" | "@hourly" | "@reboot"
        ) || CRON_EVERY.is_match(value);
    }
    let fields: Vec<&str> = value.split_whitespace().collect();
    (5..=7).contains(&fields.len()) && fields.iter().all(|field| CRON_FIELD.is_match(field))
}

/// `rgb(r, g, b)` or `rgba(r, g, b, a)` with integer or percentage channels.
fn is_rgb(value: &str, alpha: bool) -> bool {
    let prefix = if alpha { "rgba(" } else { "rgb(" };
    let Some(body) = value
        .trim()
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(')'))
    else {
        return false;
    };
    let channels: Vec<&str> = body.split(',').map(str::trim).collect();
    let expected = if alpha { 4 } else { 3 };
    if channels.len() != expected {
        return false;
    }

    let colour_ok = channels[..3].iter().all(|channel| match channel.strip_suffix('%') {
        Some(percent) => percent.parse::<u8>().is_ok_and(|p| p <= 100),
        None => channel.parse::<u8>().is_ok(),
    });
    let alpha_ok = !alpha
        || channels[3]
            .parse::<f64>()
            .is_ok_and(|a| (0.0..=1.0).contains(&a));
    colour_ok && alpha_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passes(name: &str, param: &str, value: &str) -> bool {
        check(name, param, value).unwrap()
    }

    #[test]
    fn test_presence_and_length() {
        assert!(passes("required", "", "x"));
        assert!(!passes("required", "", ""));
        assert!(passes("len", "3", "äbc"));
        assert!(!passes("len", "3", "ab"));
        assert_eq!(check("len", "three", "abc"), Err(ValidationErrorKind::InvalidParameter));
    }

    #[test]
    fn test_numeric_and_length_bounds() {
        assert!(passes("min", "1", "8080"));
        assert!(passes("max", "65535", "8080"));
        assert!(!passes("max", "65535", "70000"));
        assert!(passes("gt", "0", "0.5"));
        assert!(!passes("lt", "0", "5"));
        // Non-numeric values compare by length.
        assert!(passes("min", "3", "abc"));
        assert!(!passes("max", "2", "abc"));
    }

    #[test]
    fn test_choices() {
        assert!(passes("oneof", "debug info warn", "info"));
        assert!(!passes("oneof", "debug info warn", "INFO"));
        assert!(passes("oneofci", "debug info warn", "INFO"));
        assert!(passes("eq", "yes", "yes"));
        assert!(passes("ne", "yes", "no"));
    }

    #[test]
    fn test_character_classes() {
        assert!(passes("number", "", "42"));
        assert!(!passes("number", "", "-42"));
        assert!(passes("numeric", "", "-4.2"));
        assert!(passes("boolean", "", "True"));
        assert!(!passes("boolean", "", "yes"));
        assert!(passes("alpha", "", "abc"));
        assert!(!passes("alphanum", "", "ab-1"));
        assert!(passes("lowercase", "", "abc"));
        assert!(passes("uppercase", "", "ABC"));
        assert!(!passes("ascii", "", "ü"));
    }

    #[test]
    fn test_substrings() {
        assert!(passes("contains", "@", "a@b"));
        assert!(passes("excludes", " ", "nospace"));
        assert!(passes("startswith", "sk_", "sk_live"));
        assert!(passes("endswith", ".pem", "key.pem"));
    }

    #[test]
    fn test_network_formats() {
        assert!(passes("email", "", "dev@example.com"));
        assert!(!passes("email", "", "not-an-email"));
        assert!(passes("url", "", "redis://localhost:6379/0"));
        assert!(passes("uri", "", "/relative/path"));
        assert!(passes("http_url", "", "http://example.com"));
        assert!(!passes("https_url", "", "http://example.com"));
        assert!(passes("hostname", "", "db-primary"));
        assert!(passes("hostname_rfc1123", "", "1db.internal"));
        assert!(passes("fqdn", "", "api.example.com"));
        assert!(!passes("fqdn", "", "localhost"));
        assert!(passes("hostname_port", "", "localhost:5432"));
        assert!(passes("hostname_port", "", "[::1]:8080"));
        assert!(!passes("hostname_port", "", "localhost"));
        assert!(passes("ip", "", "::1"));
        assert!(passes("ipv4", "", "10.0.0.1"));
        assert!(!passes("ipv6", "", "10.0.0.1"));
        assert!(passes("cidr", "", "10.0.0.0/8"));
        assert!(!passes("cidr", "", "10.0.0.0/33"));
        assert!(passes("mac", "", "00:1a:2b:3c:4d:5e"));
    }

    #[test]
    fn test_identifiers_and_encodings() {
        assert!(passes("uuid", "", "67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert!(!passes("uuid", "", "67e5504410b1426f9247bb680e5fe0c8"));
        assert!(passes("ulid", "", "01ARZ3NDEKTSV4RRFFQ69G5FAV"));
        assert!(passes("semver", "", "1.2.3-rc.1+build.5"));
        assert!(!passes("semver", "", "1.2"));
        assert!(passes("json", "", r#"{"a": [1, 2]}"#));
        assert!(!passes("json", "", "{nope"));
        assert!(passes("jwt", "", "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxIn0.sig"));
        assert!(passes("base64", "", "aGVsbG8="));
        assert!(!passes("base64", "", "not base64!"));
    }

    #[test]
    fn test_colours() {
        assert!(passes("hexcolor", "", "#1e90ff"));
        assert!(!passes("hexcolor", "", "1e90ff"));
        assert!(passes("rgb", "", "rgb(30, 144, 255)"));
        assert!(passes("rgba", "", "rgba(30, 144, 255, 0.5)"));
        assert!(!passes("rgb", "", "rgb(300, 0, 0)"));
    }

    #[test]
    fn test_schedules_and_zones() {
        assert!(passes("cron", "", "*/5 * * * *"));
        assert!(passes("cron", "", "0 9-17 * * MON-FRI"));
        assert!(passes("cron", "", "@daily"));
        assert!(passes("cron", "", "@every 1h30m"));
        assert!(!passes("cron", "", "every day"));
        assert!(passes("timezone", "", "Europe/Berlin"));
        assert!(passes("timezone", "", "UTC"));
        assert!(!passes("timezone", "", "Mars/Olympus"));
    }

    #[test]
    fn test_paths() {
        let dir = std::env::temp_dir();
        let dir = dir.to_string_lossy();
        assert!(passes("dir", "", &dir));
        assert!(!passes("file", "", &dir));
        assert!(passes("dirpath", "", "/var/lib/app/"));
        assert!(passes("filepath", "", "/var/lib/app/data.db"));
        assert!(!passes("filepath", "", ""));
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(check("bogus", "", "x"), Err(ValidationErrorKind::UnknownTag));
    }
}
