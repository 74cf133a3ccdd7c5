//! Format predicates shared by request validators

use std::sync::LazyLock;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;

pub const NAME_PATTERN: &str = r"^[a-z][a-z0-9\-]*[a-z0-9]$";

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(NAME_PATTERN).expect("name regex"));

static ENV_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-._a-zA-Z][-._a-zA-Z0-9]*$").expect("env name regex"));

static SCHEDULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((((\*(/\d+)?)|(\d+((-\d+)|(/\d+))?)),?)+\s?){5}$").expect("schedule regex")
});

static DNS_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_]([a-zA-Z0-9\-_]{0,61}[a-zA-Z0-9])?$").expect("dns label regex")
});

pub fn valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

pub fn valid_env_name(name: &str) -> bool {
    ENV_NAME_RE.is_match(name)
}

/// Five-field cron expression
pub fn valid_schedule(schedule: &str) -> bool {
    SCHEDULE_RE.is_match(schedule) && schedule.split_whitespace().count() == 5
}

pub fn valid_image(image: &str) -> bool {
    !image.is_empty() && !image.chars().any(char::is_whitespace) && !image.ends_with('@')
}

pub fn valid_dns_name(name: &str) -> bool {
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty() || name.len() > 253 {
        return false;
    }
    name.split('.').all(|label| DNS_LABEL_RE.is_match(label))
}

pub fn valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !local.chars().any(|c| c.is_whitespace() || c == '@')
        && domain.contains('.')
        && valid_dns_name(domain)
}

/// Absolute http(s) URL with a host
pub fn valid_url(value: &str) -> bool {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return false;
    }
    url::Url::parse(value)
        .map(|u| u.host_str().is_some_and(|h| !h.is_empty()))
        .unwrap_or(false)
}

/// Registry server, with or without scheme
pub fn valid_registry(value: &str) -> bool {
    if value.contains("://") {
        return valid_url(value);
    }
    valid_url(&format!("https://{}", value))
}

pub fn valid_base64(value: &str) -> bool {
    !value.is_empty() && STANDARD.decode(value).is_ok()
}

pub fn is_absolute_path(path: &str) -> bool {
    path.starts_with('/')
}
