//! Built-in NCSI profiles.
//!
//! Exactly two profiles can be applied: the alternative profile, which
//! points every probe away from the vendor's telemetry endpoints, and the
//! vendor default, which restores the stock values.

use crate::profile::types::{DnsTarget, Profile, WebProbe};

const ALT_WEB_HOST: &str = "raw.githubusercontent.com";
const ALT_WEB_PATH: &str = "crazy-max/WindowsSpyBlocker/master/data/ncsi/ncsi.txt";
const ALT_WEB_CONTENT: &str = "WindowsSpyBlocker";
const ALT_DNS_HOST: &str = "ns1.p16.dynect.net";
const ALT_DNS_V4: &str = "208.78.70.16";
const ALT_DNS_V6: &str = "2001:500:90:1::16";

const MS_WEB_HOST_V4: &str = "www.msftncsi.com";
const MS_WEB_HOST_V6: &str = "ipv6.msftncsi.com";
const MS_WEB_PATH: &str = "ncsi.txt";
const MS_WEB_CONTENT: &str = "Microsoft NCSI";
const MS_DNS_HOST: &str = "dns.msftncsi.com";
const MS_DNS_V4: &str = "131.107.255.255";
const MS_DNS_V6: &str = "fd3e:4f5a:5b81::1";

/// The privacy-preserving alternative profile.
#[must_use]
pub fn alternative_profile() -> Profile {
    Profile {
        web_v4: WebProbe::new(ALT_WEB_HOST, ALT_WEB_PATH, ALT_WEB_CONTENT),
        web_v6: WebProbe::new(ALT_WEB_HOST, ALT_WEB_PATH, ALT_WEB_CONTENT),
        dns_v4: DnsTarget::new(ALT_DNS_HOST, ALT_DNS_V4),
        dns_v6: DnsTarget::new(ALT_DNS_HOST, ALT_DNS_V6),
    }
}

/// The vendor's stock profile.
#[must_use]
pub fn vendor_default_profile() -> Profile {
    Profile {
        web_v4: WebProbe::new(MS_WEB_HOST_V4, MS_WEB_PATH, MS_WEB_CONTENT),
        web_v6: WebProbe::new(MS_WEB_HOST_V6, MS_WEB_PATH, MS_WEB_CONTENT),
        dns_v4: DnsTarget::new(MS_DNS_HOST, MS_DNS_V4),
        dns_v6: DnsTarget::new(MS_DNS_HOST, MS_DNS_V6),
    }
}

/// Names of the profiles that may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinProfile {
    /// See [`alternative_profile`]
    Alternative,
    /// See [`vendor_default_profile`]
    VendorDefault,
}

impl BuiltinProfile {
    /// Every built-in profile.
    pub const ALL: [Self; 2] = [Self::Alternative, Self::VendorDefault];

    /// Build the profile values.
    #[must_use]
    pub fn profile(self) -> Profile {
        match self {
            Self::Alternative => alternative_profile(),
            Self::VendorDefault => vendor_default_profile(),
        }
    }

    /// Canonical name, as accepted on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Alternative => "alternative",
            Self::VendorDefault => "vendor-default",
        }
    }

    /// Get all accepted profile names.
    #[must_use]
    pub fn names() -> &'static [&'static str] {
        &["alternative", "wsb", "vendor-default", "microsoft"]
    }
}

impl std::str::FromStr for BuiltinProfile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "alternative" | "wsb" => Ok(Self::Alternative),
            "vendor-default" | "microsoft" => Ok(Self::VendorDefault),
            _ => Err(format!(
                "Unknown profile: {}. Valid options are: {:?}",
                s,
                Self::names()
            )),
        }
    }
}

impl std::fmt::Display for BuiltinProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternative_constants() {
        let p = alternative_profile();
        assert_eq!(p.web_v4.host, "raw.githubusercontent.com");
        assert_eq!(
            p.web_v4.path,
            "crazy-max/WindowsSpyBlocker/master/data/ncsi/ncsi.txt"
        );
        assert_eq!(p.web_v4.content, "WindowsSpyBlocker");
        assert_eq!(p.web_v6, p.web_v4);
        assert_eq!(p.dns_v4.host, "ns1.p16.dynect.net");
        assert_eq!(p.dns_v4.content, "208.78.70.16");
        assert_eq!(p.dns_v6.host, "ns1.p16.dynect.net");
        assert_eq!(p.dns_v6.content, "2001:500:90:1::16");
        assert!(p.is_complete());
    }

    #[test]
    fn test_vendor_default_constants() {
        let p = vendor_default_profile();
        assert_eq!(p.web_v4.host, "www.msftncsi.com");
        assert_eq!(p.web_v4.path, "ncsi.txt");
        assert_eq!(p.web_v4.content, "Microsoft NCSI");
        assert_eq!(p.web_v6.host, "ipv6.msftncsi.com");
        assert_eq!(p.web_v6.path, "ncsi.txt");
        assert_eq!(p.web_v6.content, "Microsoft NCSI");
        assert_eq!(p.dns_v4.host, "dns.msftncsi.com");
        assert_eq!(p.dns_v4.content, "131.107.255.255");
        assert_eq!(p.dns_v6.host, "dns.msftncsi.com");
        assert_eq!(p.dns_v6.content, "fd3e:4f5a:5b81::1");
        assert!(p.is_complete());
    }

    #[test]
    fn test_builtin_parse() {
        assert_eq!(
            "alternative".parse::<BuiltinProfile>(),
            Ok(BuiltinProfile::Alternative)
        );
        assert_eq!("WSB".parse::<BuiltinProfile>(), Ok(BuiltinProfile::Alternative));
        assert_eq!(
            "vendor-default".parse::<BuiltinProfile>(),
            Ok(BuiltinProfile::VendorDefault)
        );
        assert_eq!(
            "microsoft".parse::<BuiltinProfile>(),
            Ok(BuiltinProfile::VendorDefault)
        );
        assert!("custom".parse::<BuiltinProfile>().is_err());
    }

    #[test]
    fn test_builtin_display_roundtrips_name() {
        for builtin in BuiltinProfile::ALL {
            assert_eq!(builtin.to_string().parse::<BuiltinProfile>(), Ok(builtin));
        }
    }
}
