//! Record validation and normalization.
//!
//! Turns raw field strings (typed into the form or read from an import file)
//! into canonical [`Record`] values. There is exactly one IPv4 validator and
//! one hostname validator; how strict the hostname check is comes from
//! [`DomainRule`], never from which code path calls it.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::types::{Record, DEFAULT_TTL};

/// Suffix appended to reversed octets
pub const REVERSE_SUFFIX: &str = "in-addr.arpa";

/// Octet values allowed in a contiguous subnet mask
const MASK_OCTETS: [u8; 9] = [0, 128, 192, 224, 240, 248, 252, 254, 255];

/// Characters removed from every field before validation
const STRIPPED_CHARS: [char; 2] = ['<', '>'];

fn ipv4_re() -> &'static Regex {
    static IPV4_RE: OnceLock<Regex> = OnceLock::new();
    IPV4_RE.get_or_init(|| {
        Regex::new(
            r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$",
        )
        .expect("valid ipv4 regex")
    })
}

fn strict_hostname_re() -> &'static Regex {
    static STRICT_HOSTNAME_RE: OnceLock<Regex> = OnceLock::new();
    STRICT_HOSTNAME_RE.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*$",
        )
        .expect("valid strict hostname regex")
    })
}

fn strict_domain_re() -> &'static Regex {
    static STRICT_DOMAIN_RE: OnceLock<Regex> = OnceLock::new();
    STRICT_DOMAIN_RE.get_or_init(|| {
        Regex::new(r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$")
            .expect("valid strict domain regex")
    })
}

// =============================================================================
// RULES
// =============================================================================

/// How strictly hostnames and canonical names are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainRule {
    /// No whitespace; canonical names must contain a dot
    #[default]
    Loose,
    /// Loose, plus letter/digit label boundaries and a 2+ letter final label
    Strict,
}

/// Settings that shape validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRules {
    pub domain_rule: DomainRule,
    /// TTL for alias records submitted without one
    pub default_ttl: u32,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            domain_rule: DomainRule::Loose,
            default_ttl: DEFAULT_TTL,
        }
    }
}

/// Form field names, used to report which one was left empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Hostname,
    IpAddress,
    Ttl,
    Alias,
    Canonical,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Hostname => "hostname",
            Field::IpAddress => "IP address",
            Field::Ttl => "TTL",
            Field::Alias => "alias",
            Field::Canonical => "canonical name",
        };
        f.write_str(name)
    }
}

impl ValidationRules {
    pub fn with_domain_rule(mut self, rule: DomainRule) -> Self {
        self.domain_rule = rule;
        self
    }

    pub fn with_default_ttl(mut self, ttl: u32) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Validate an address (A) record from raw form fields
    pub fn validate_address_record(
        &self,
        hostname: &str,
        ip_address: &str,
        ttl: &str,
    ) -> Result<Record, ValidationError> {
        let hostname = required(hostname, Field::Hostname)?;
        let ip_address = required(ip_address, Field::IpAddress)?;
        let ttl = required(ttl, Field::Ttl)?;

        if !is_valid_ipv4(&ip_address) {
            return Err(ValidationError::InvalidAddress(ip_address));
        }
        self.check_hostname(&hostname)?;
        let ttl = parse_ttl(&ttl)?;

        Ok(Record::A {
            hostname,
            target: ip_address,
            ttl,
        })
    }

    /// Validate an alias (CNAME) record from raw form fields.
    ///
    /// An absent or blank `ttl` falls back to the configured default.
    pub fn validate_alias_record(
        &self,
        alias: &str,
        canonical: &str,
        ttl: Option<&str>,
    ) -> Result<Record, ValidationError> {
        let alias = required(alias, Field::Alias)?;
        let canonical = required(canonical, Field::Canonical)?;

        self.check_hostname(&alias)?;
        self.check_canonical(&canonical)?;

        let ttl = match ttl.map(sanitize_input) {
            Some(raw) if !raw.is_empty() => parse_ttl(&raw)?,
            _ => self.default_ttl,
        };

        Ok(Record::Cname {
            hostname: alias,
            target: canonical,
            ttl,
        })
    }

    /// Hostname rule, applied to A hostnames and CNAME aliases
    pub fn is_valid_hostname(&self, value: &str) -> bool {
        if value.is_empty() || value.chars().any(char::is_whitespace) {
            return false;
        }
        match self.domain_rule {
            DomainRule::Loose => true,
            DomainRule::Strict => strict_hostname_re().is_match(value),
        }
    }

    /// Canonical-name rule: the hostname rule plus at least one label separator
    pub fn is_valid_canonical(&self, value: &str) -> bool {
        if value.is_empty() || value.chars().any(char::is_whitespace) || !value.contains('.') {
            return false;
        }
        match self.domain_rule {
            DomainRule::Loose => true,
            DomainRule::Strict => strict_domain_re().is_match(value),
        }
    }

    fn check_hostname(&self, value: &str) -> Result<(), ValidationError> {
        if self.is_valid_hostname(value) {
            Ok(())
        } else {
            Err(ValidationError::InvalidDomainFormat(value.to_string()))
        }
    }

    fn check_canonical(&self, value: &str) -> Result<(), ValidationError> {
        if self.is_valid_canonical(value) {
            Ok(())
        } else {
            Err(ValidationError::InvalidDomainFormat(value.to_string()))
        }
    }
}

// =============================================================================
// FREE FUNCTIONS
// =============================================================================

/// Validate an address record with the default (loose) rules
#[allow(dead_code)]
pub fn validate_address_record(
    hostname: &str,
    ip_address: &str,
    ttl: &str,
) -> Result<Record, ValidationError> {
    ValidationRules::default().validate_address_record(hostname, ip_address, ttl)
}

/// Validate an alias record with the default (loose) rules and default TTL
#[allow(dead_code)]
pub fn validate_alias_record(alias: &str, canonical: &str) -> Result<Record, ValidationError> {
    ValidationRules::default().validate_alias_record(alias, canonical, None)
}

/// Trim and strip markup characters from a raw field
pub fn sanitize_input(input: &str) -> String {
    input.trim().replace(STRIPPED_CHARS, "").trim().to_string()
}

/// Four dot-joined octets, each matching `25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?`.
///
/// Leading zeros such as `01` or `00` are accepted.
pub fn is_valid_ipv4(value: &str) -> bool {
    ipv4_re().is_match(value)
}

/// Parse a TTL as a non-negative integer
pub fn parse_ttl(value: &str) -> Result<u32, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidTtl(value.to_string()));
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidTtl(value.to_string()))
}

/// Reverse lookup name for an IPv4 address (`1.2.3.4` -> `4.3.2.1.in-addr.arpa`).
///
/// Returns `None` when `ipv4` is not a valid address.
pub fn reverse_name(ipv4: &str) -> Option<String> {
    if !is_valid_ipv4(ipv4) {
        return None;
    }
    let mut octets: Vec<&str> = ipv4.split('.').collect();
    octets.reverse();
    octets.push(REVERSE_SUFFIX);
    Some(octets.join("."))
}

/// Class A/B/C subnet mask forms: `255.x.0.0`, `255.255.x.0`, `255.255.255.x`
/// where `x` is a contiguous mask octet.
pub fn is_valid_subnet_mask(value: &str) -> bool {
    let parts: Vec<&str> = value.trim().split('.').collect();
    if parts.len() != 4 {
        return false;
    }

    let mut octets = [0u8; 4];
    for (slot, part) in octets.iter_mut().zip(&parts) {
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        match part.parse::<u8>() {
            Ok(octet) if MASK_OCTETS.contains(&octet) => *slot = octet,
            _ => return false,
        }
    }

    matches!(
        octets,
        [255, _, 0, 0] | [255, 255, _, 0] | [255, 255, 255, _]
    )
}

fn required(value: &str, field: Field) -> Result<String, ValidationError> {
    let value = sanitize_input(value);
    if value.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(value)
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in the {0} field")]
    MissingField(Field),

    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),

    #[error("Invalid TTL value: {0}")]
    InvalidTtl(String),

    #[error("Invalid domain format: {0}")]
    InvalidDomainFormat(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_address_record_success() {
        let record = validate_address_record("host1", "192.168.1.10", "3600").unwrap();
        assert_eq!(
            record,
            Record::A {
                hostname: "host1".to_string(),
                target: "192.168.1.10".to_string(),
                ttl: 3600,
            }
        );
    }

    #[test]
    fn test_address_record_missing_fields() {
        assert_eq!(
            validate_address_record("host1", "10.0.0.1", ""),
            Err(ValidationError::MissingField(Field::Ttl))
        );
        assert_eq!(
            validate_address_record("   ", "10.0.0.1", "60"),
            Err(ValidationError::MissingField(Field::Hostname))
        );
        assert_eq!(
            validate_address_record("host1", "", "60"),
            Err(ValidationError::MissingField(Field::IpAddress))
        );
    }

    #[test]
    fn test_address_record_invalid_ttl() {
        assert!(matches!(
            validate_address_record("host1", "10.0.0.1", "-1"),
            Err(ValidationError::InvalidTtl(_))
        ));
        assert!(matches!(
            validate_address_record("host1", "10.0.0.1", "abc"),
            Err(ValidationError::InvalidTtl(_))
        ));
        assert!(matches!(
            validate_address_record("host1", "10.0.0.1", "99999999999"),
            Err(ValidationError::InvalidTtl(_))
        ));
        assert!(validate_address_record("host1", "10.0.0.1", "0").is_ok());
    }

    #[test]
    fn test_address_record_invalid_address() {
        for bad in ["256.1.1.1", "1.2.3", "1.2.3.4.5", "a.b.c.d", "1..2.3", "1.2.3.-4"] {
            assert!(
                matches!(
                    validate_address_record("host1", bad, "60"),
                    Err(ValidationError::InvalidAddress(_))
                ),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_permissive_octets_are_kept() {
        assert!(is_valid_ipv4("0.0.0.0"));
        assert!(is_valid_ipv4("00.01.1.001"));
        assert!(!is_valid_ipv4("0001.1.1.1"));

        let record = validate_address_record("host1", "10.00.01.1", "60").unwrap();
        assert_eq!(record.target(), "10.00.01.1");
    }

    #[test]
    fn test_sanitize_strips_markup() {
        assert_eq!(sanitize_input("  <host1>  "), "host1");
        let record = validate_address_record("<b>host1</b>", "10.0.0.1", " 60 ").unwrap();
        assert_eq!(record.name(), "bhost1/b");
        assert_eq!(record.ttl(), 60);
    }

    #[test]
    fn test_hostname_with_whitespace_rejected() {
        assert!(matches!(
            validate_address_record("my host", "10.0.0.1", "60"),
            Err(ValidationError::InvalidDomainFormat(_))
        ));
    }

    #[test]
    fn test_alias_record() {
        let record = validate_alias_record("www", "example.com").unwrap();
        assert_eq!(record.name(), "www");
        assert_eq!(record.target(), "example.com");
        assert_eq!(record.ttl(), DEFAULT_TTL);

        assert!(matches!(
            validate_alias_record("www", "example"),
            Err(ValidationError::InvalidDomainFormat(_))
        ));
        assert!(matches!(
            validate_alias_record("w w", "example.com"),
            Err(ValidationError::InvalidDomainFormat(_))
        ));
        assert_eq!(
            validate_alias_record("", "example.com"),
            Err(ValidationError::MissingField(Field::Alias))
        );
        assert_eq!(
            validate_alias_record("www", " "),
            Err(ValidationError::MissingField(Field::Canonical))
        );
    }

    #[test]
    fn test_alias_record_ttl() {
        let rules = ValidationRules::default().with_default_ttl(600);

        let record = rules.validate_alias_record("www", "example.com", None).unwrap();
        assert_eq!(record.ttl(), 600);

        let record = rules.validate_alias_record("www", "example.com", Some("")).unwrap();
        assert_eq!(record.ttl(), 600);

        let record = rules.validate_alias_record("www", "example.com", Some("120")).unwrap();
        assert_eq!(record.ttl(), 120);

        assert!(matches!(
            rules.validate_alias_record("www", "example.com", Some("-5")),
            Err(ValidationError::InvalidTtl(_))
        ));
    }

    #[test]
    fn test_strict_domain_rule() {
        let strict = ValidationRules::default().with_domain_rule(DomainRule::Strict);

        assert!(strict.validate_alias_record("www", "example.com", None).is_ok());
        assert!(strict.validate_alias_record("api-v2", "lb.example.org", None).is_ok());

        // final label must be 2+ letters
        assert!(strict.validate_alias_record("www", "example.c", None).is_err());
        assert!(strict.validate_alias_record("www", "example.123", None).is_err());
        // labels must not start or end with a hyphen
        assert!(strict.validate_alias_record("-www", "example.com", None).is_err());
        assert!(strict.validate_alias_record("www", "bad-.example.com", None).is_err());

        // the loose rule accepts all of the above
        let loose = ValidationRules::default();
        assert!(loose.validate_alias_record("-www", "example.123", None).is_ok());
    }

    #[test]
    fn test_reverse_name() {
        assert_eq!(reverse_name("1.2.3.4").unwrap(), "4.3.2.1.in-addr.arpa");
        assert_eq!(
            reverse_name("192.168.1.10").unwrap(),
            "10.1.168.192.in-addr.arpa"
        );
        assert!(reverse_name("example.com").is_none());

        // Derived, not stored: repeated calls agree
        assert_eq!(reverse_name("1.2.3.4"), reverse_name("1.2.3.4"));
    }

    #[test]
    fn test_subnet_masks() {
        for mask in [
            "255.0.0.0",
            "255.128.0.0",
            "255.255.0.0",
            "255.255.240.0",
            "255.255.255.0",
            "255.255.255.252",
            "255.255.255.255",
        ] {
            assert!(is_valid_subnet_mask(mask), "{} should be valid", mask);
        }

        for mask in [
            "0.0.0.0",
            "255.0.255.0",
            "255.255.13.0",
            "255.255.255.1",
            "254.0.0.0",
            "255.255.255",
            "255.255.255.0.0",
            "255.+0.0.0",
            "",
        ] {
            assert!(!is_valid_subnet_mask(mask), "{} should be invalid", mask);
        }
    }

    proptest! {
        #[test]
        fn prop_every_dotted_quad_validates(a in any::<u8>(), b in any::<u8>(), c in any::<u8>(), d in any::<u8>()) {
            let ip = format!("{}.{}.{}.{}", a, b, c, d);
            let record = validate_address_record("host", &ip, "3600");
            prop_assert!(record.is_ok());
            prop_assert_eq!(
                reverse_name(&ip).unwrap(),
                format!("{}.{}.{}.{}.in-addr.arpa", d, c, b, a)
            );
        }

        #[test]
        fn prop_out_of_range_octet_rejected(
            octets in prop::array::uniform4(any::<u8>()),
            position in 0usize..4,
            big in 256u32..100_000,
        ) {
            let mut parts: Vec<String> = octets.iter().map(|o| o.to_string()).collect();
            parts[position] = big.to_string();
            let ip = parts.join(".");
            prop_assert!(matches!(
                validate_address_record("host", &ip, "3600"),
                Err(ValidationError::InvalidAddress(_))
            ));
        }

        #[test]
        fn prop_wrong_octet_count_rejected(octets in prop::collection::vec(any::<u8>(), 1..8)) {
            prop_assume!(octets.len() != 4);
            let ip = octets.iter().map(|o| o.to_string()).collect::<Vec<_>>().join(".");
            prop_assert!(matches!(
                validate_address_record("host", &ip, "3600"),
                Err(ValidationError::InvalidAddress(_))
            ));
        }
    }
}
