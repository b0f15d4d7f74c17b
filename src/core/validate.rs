//! Form validation for file, user and firewall-rule input.
//!
//! Every check returns the first rule that fails so forms can show a single
//! message under the offending field.

use thiserror::Error;

use super::records::{Protocol, Role, RuleAction, RuleDirection};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("Invalid characters in name")]
    BadFileName,
    #[error("Invalid permissions format (e.g., 755 or 0755)")]
    BadPermissions,
    #[error("Username must start with a lowercase letter or underscore and contain only lowercase letters, numbers, underscores, and hyphens")]
    BadUsername,
    #[error("{0} already exists")]
    Duplicate(&'static str),
    #[error("Invalid hostname format")]
    BadHostname,
    #[error("Invalid email address")]
    BadEmail,
    #[error("Password must contain at least one {0}")]
    WeakPassword(&'static str),
    #[error("Passwords don't match")]
    PasswordMismatch,
    #[error("Invalid port format (e.g., 80, 8080:8090, or any)")]
    BadPort,
    #[error("{field} must be one of: {allowed}")]
    NotOneOf {
        field: &'static str,
        allowed: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ValidationError>;

const FORBIDDEN_NAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// File or directory name: 1–255 characters, none of `/ \ : * ? " < > |`.
pub fn file_name(name: &str) -> Result<&str> {
    if name.is_empty() {
        return Err(ValidationError::Required("Name"));
    }
    if name.chars().count() > 255 {
        return Err(ValidationError::TooLong { field: "Name", max: 255 });
    }
    if name.contains(FORBIDDEN_NAME_CHARS) {
        return Err(ValidationError::BadFileName);
    }
    Ok(name)
}

/// Octal mode of three or four digits, returned zero-padded to four.
pub fn permissions(mode: &str) -> Result<String> {
    let mode = mode.trim();
    let ok = (3..=4).contains(&mode.len()) && mode.bytes().all(|b| (b'0'..=b'7').contains(&b));
    if !ok {
        return Err(ValidationError::BadPermissions);
    }
    Ok(format!("{mode:0>4}"))
}

pub fn username(name: &str) -> Result<&str> {
    let len = name.chars().count();
    if len < 3 {
        return Err(ValidationError::TooShort { field: "Username", min: 3 });
    }
    if len > 32 {
        return Err(ValidationError::TooLong { field: "Username", max: 32 });
    }
    let mut chars = name.chars();
    let head_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
    let tail_ok = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if !(head_ok && tail_ok) {
        return Err(ValidationError::BadUsername);
    }
    Ok(name)
}

/// RFC 1123 label: alphanumerics and inner hyphens, at most 63 characters.
pub fn hostname(name: &str) -> Result<&str> {
    if name.is_empty() {
        return Err(ValidationError::Required("Hostname"));
    }
    if name.len() > 63 {
        return Err(ValidationError::TooLong { field: "Hostname", max: 63 });
    }
    let alnum = |b: u8| b.is_ascii_alphanumeric();
    let bytes = name.as_bytes();
    let edges_ok = alnum(bytes[0]) && alnum(bytes[bytes.len() - 1]);
    if !edges_ok || !bytes.iter().all(|&b| alnum(b) || b == b'-') {
        return Err(ValidationError::BadHostname);
    }
    Ok(name)
}

/// `local@domain.tld` with no whitespace and a dotted domain.
pub fn email(addr: &str) -> Result<&str> {
    let bad = || ValidationError::BadEmail;
    if addr.chars().any(char::is_whitespace) {
        return Err(bad());
    }
    let (local, domain) = addr.split_once('@').ok_or_else(bad)?;
    if local.is_empty() || domain.contains('@') {
        return Err(bad());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(bad());
    }
    Ok(addr)
}

pub fn password(pw: &str) -> Result<&str> {
    if pw.chars().count() < 8 {
        return Err(ValidationError::TooShort { field: "Password", min: 8 });
    }
    if !pw.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::WeakPassword("uppercase letter"));
    }
    if !pw.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::WeakPassword("lowercase letter"));
    }
    if !pw.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::WeakPassword("number"));
    }
    Ok(pw)
}

pub fn password_pair<'a>(pw: &'a str, confirm: &str) -> Result<&'a str> {
    password(pw)?;
    if pw != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(pw)
}

/// A single port, a `lo:hi` range, or `any`.
pub fn port(spec: &str) -> Result<&str> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(ValidationError::Required("Port"));
    }
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let ok = spec == "any"
        || digits(spec)
        || spec.split_once(':').is_some_and(|(lo, hi)| digits(lo) && digits(hi));
    if !ok {
        return Err(ValidationError::BadPort);
    }
    Ok(spec)
}

pub fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(value)
}

pub fn description(text: &str) -> Result<&str> {
    if text.chars().count() > 100 {
        return Err(ValidationError::TooLong { field: "Description", max: 100 });
    }
    Ok(text)
}

pub fn role(s: &str) -> Result<Role> {
    s.parse::<Role>().map_err(|_| ValidationError::NotOneOf {
        field: "Role",
        allowed: "admin, user, viewer",
    })
}

pub fn action(s: &str) -> Result<RuleAction> {
    s.parse::<RuleAction>().map_err(|_| ValidationError::NotOneOf {
        field: "Action",
        allowed: "allow, deny",
    })
}

pub fn direction(s: &str) -> Result<RuleDirection> {
    s.parse::<RuleDirection>().map_err(|_| ValidationError::NotOneOf {
        field: "Direction",
        allowed: "in, out",
    })
}

pub fn protocol(s: &str) -> Result<Protocol> {
    s.parse::<Protocol>().map_err(|_| ValidationError::NotOneOf {
        field: "Protocol",
        allowed: "tcp, udp, any",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert!(file_name("notes.txt").is_ok());
        assert!(file_name(".env").is_ok());
        assert_eq!(file_name(""), Err(ValidationError::Required("Name")));
        assert_eq!(file_name("a/b"), Err(ValidationError::BadFileName));
        assert_eq!(file_name("what?"), Err(ValidationError::BadFileName));
        assert!(file_name(&"x".repeat(255)).is_ok());
        assert!(file_name(&"x".repeat(256)).is_err());
    }

    #[test]
    fn permissions_are_padded() {
        assert_eq!(permissions("755").as_deref(), Ok("0755"));
        assert_eq!(permissions("0644").as_deref(), Ok("0644"));
        assert_eq!(permissions("888"), Err(ValidationError::BadPermissions));
        assert_eq!(permissions("75"), Err(ValidationError::BadPermissions));
        assert_eq!(permissions("07555"), Err(ValidationError::BadPermissions));
    }

    #[test]
    fn usernames() {
        assert!(username("deploy").is_ok());
        assert!(username("_svc-01").is_ok());
        assert!(username("ab").is_err());
        assert_eq!(username("1abc"), Err(ValidationError::BadUsername));
        assert_eq!(username("Admin"), Err(ValidationError::BadUsername));
        assert!(username(&"a".repeat(33)).is_err());
    }

    #[test]
    fn hostnames() {
        assert!(hostname("web-01").is_ok());
        assert!(hostname("a").is_ok());
        assert_eq!(hostname("-web"), Err(ValidationError::BadHostname));
        assert_eq!(hostname("web-"), Err(ValidationError::BadHostname));
        assert_eq!(hostname("web.local"), Err(ValidationError::BadHostname));
        assert!(hostname(&"h".repeat(64)).is_err());
    }

    #[test]
    fn emails() {
        assert!(email("ops@example.com").is_ok());
        assert!(email("ops@example").is_err());
        assert!(email("@example.com").is_err());
        assert!(email("a b@example.com").is_err());
        assert!(email("a@b@c.com").is_err());
        assert!(email("a@example..com").is_err());
    }

    #[test]
    fn passwords() {
        assert!(password("Secret123").is_ok());
        assert!(matches!(password("Sec1"), Err(ValidationError::TooShort { .. })));
        assert_eq!(password("secret123"), Err(ValidationError::WeakPassword("uppercase letter")));
        assert_eq!(password("SECRET123"), Err(ValidationError::WeakPassword("lowercase letter")));
        assert_eq!(password("SecretPass"), Err(ValidationError::WeakPassword("number")));
        assert_eq!(password_pair("Secret123", "Secret124"), Err(ValidationError::PasswordMismatch));
        assert!(password_pair("Secret123", "Secret123").is_ok());
    }

    #[test]
    fn ports() {
        for ok in ["22", "8080:8090", "any", " 443 "] {
            assert!(port(ok).is_ok(), "{ok}");
        }
        for bad in ["http", "80-90", ":80", "80:", "ANY"] {
            assert_eq!(port(bad), Err(ValidationError::BadPort), "{bad}");
        }
        assert_eq!(port(""), Err(ValidationError::Required("Port")));
    }

    #[test]
    fn enum_fields() {
        assert_eq!(role(" Viewer "), Ok(Role::Viewer));
        assert!(role("root").is_err());
        assert_eq!(action("deny"), Ok(RuleAction::Deny));
        assert_eq!(direction("out"), Ok(RuleDirection::Out));
        assert_eq!(protocol("udp"), Ok(Protocol::Udp));
        assert!(description(&"d".repeat(101)).is_err());
        assert_eq!(required("Source", "  "), Err(ValidationError::Required("Source")));
    }
}
