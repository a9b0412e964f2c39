//! NCSI profile types and data structures.
//!
//! A profile is the complete set of ten probe values the connectivity
//! indicator reads: a web probe and a DNS probe, each for IPv4 and IPv6.

use serde::{Deserialize, Serialize};

/// Address family a probe targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpFamily {
    /// IPv4 (A records)
    V4,
    /// IPv6 (AAAA records)
    V6,
}

impl IpFamily {
    /// Human-readable family name, as printed in reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::V4 => "IPv4",
            Self::V6 => "IPv6",
        }
    }
}

/// HTTP content probe descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebProbe {
    /// Host name the GET request is sent to
    pub host: String,
    /// Path below the host, without the leading slash
    pub path: String,
    /// Exact expected response body
    pub content: String,
}

impl WebProbe {
    /// Create a new web probe descriptor.
    pub fn new(
        host: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            content: content.into(),
        }
    }

    /// Plain HTTP URL for this probe.
    ///
    /// ```ignore
    /// let probe = WebProbe::new("www.msftncsi.com", "ncsi.txt", "Microsoft NCSI");
    /// assert_eq!(probe.url(), "http://www.msftncsi.com/ncsi.txt");
    /// ```
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/{}", self.host, self.path)
    }
}

/// DNS record probe descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsTarget {
    /// Name to resolve. Also used as the server the query is sent to.
    pub host: String,
    /// Expected address text of the first answer record
    pub content: String,
}

impl DnsTarget {
    /// Create a new DNS probe descriptor.
    pub fn new(host: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            content: content.into(),
        }
    }
}

/// A complete NCSI profile.
///
/// Profiles loaded from a store may have empty fields; the built-in
/// profiles are always complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Web probe, IPv4
    pub web_v4: WebProbe,
    /// Web probe, IPv6
    pub web_v6: WebProbe,
    /// DNS probe, A record
    pub dns_v4: DnsTarget,
    /// DNS probe, AAAA record
    pub dns_v6: DnsTarget,
}

impl Profile {
    /// Web probe for an address family.
    #[must_use]
    pub fn web(&self, family: IpFamily) -> &WebProbe {
        match family {
            IpFamily::V4 => &self.web_v4,
            IpFamily::V6 => &self.web_v6,
        }
    }

    /// DNS probe for an address family.
    #[must_use]
    pub fn dns(&self, family: IpFamily) -> &DnsTarget {
        match family {
            IpFamily::V4 => &self.dns_v4,
            IpFamily::V6 => &self.dns_v6,
        }
    }

    /// URL of the web probe for an address family.
    #[must_use]
    pub fn web_url(&self, family: IpFamily) -> String {
        self.web(family).url()
    }

    /// Check that every one of the ten values is set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        ProfileField::ALL.iter().all(|f| !f.get(self).is_empty())
    }

    /// Iterate over `(field, value)` pairs in persistence order.
    pub fn entries(&self) -> impl Iterator<Item = (ProfileField, &str)> + '_ {
        ProfileField::ALL.iter().map(move |&f| (f, f.get(self)))
    }
}

/// One of the ten persisted profile values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    WebHostV4,
    WebPathV4,
    WebContentV4,
    WebHostV6,
    WebPathV6,
    WebContentV6,
    DnsHostV4,
    DnsContentV4,
    DnsHostV6,
    DnsContentV6,
}

impl ProfileField {
    /// All fields, in the order they are written to the store.
    pub const ALL: [Self; 10] = [
        Self::WebHostV4,
        Self::WebPathV4,
        Self::WebContentV4,
        Self::WebHostV6,
        Self::WebPathV6,
        Self::WebContentV6,
        Self::DnsHostV4,
        Self::DnsContentV4,
        Self::DnsHostV6,
        Self::DnsContentV6,
    ];

    /// Value name used in the persistent store.
    ///
    /// These names are read by the operating system and must not change.
    #[must_use]
    pub fn key_name(self) -> &'static str {
        match self {
            Self::WebHostV4 => "ActiveWebProbeHost",
            Self::WebPathV4 => "ActiveWebProbePath",
            Self::WebContentV4 => "ActiveWebProbeContent",
            Self::WebHostV6 => "ActiveWebProbeHostV6",
            Self::WebPathV6 => "ActiveWebProbePathV6",
            Self::WebContentV6 => "ActiveWebProbeContentV6",
            Self::DnsHostV4 => "ActiveDnsProbeHost",
            Self::DnsContentV4 => "ActiveDnsProbeContent",
            Self::DnsHostV6 => "ActiveDnsProbeHostV6",
            Self::DnsContentV6 => "ActiveDnsProbeContentV6",
        }
    }

    /// Read this field from a profile.
    #[must_use]
    pub fn get(self, profile: &Profile) -> &str {
        match self {
            Self::WebHostV4 => &profile.web_v4.host,
            Self::WebPathV4 => &profile.web_v4.path,
            Self::WebContentV4 => &profile.web_v4.content,
            Self::WebHostV6 => &profile.web_v6.host,
            Self::WebPathV6 => &profile.web_v6.path,
            Self::WebContentV6 => &profile.web_v6.content,
            Self::DnsHostV4 => &profile.dns_v4.host,
            Self::DnsContentV4 => &profile.dns_v4.content,
            Self::DnsHostV6 => &profile.dns_v6.host,
            Self::DnsContentV6 => &profile.dns_v6.content,
        }
    }

    /// Overwrite this field in a profile.
    pub fn set(self, profile: &mut Profile, value: String) {
        let slot = match self {
            Self::WebHostV4 => &mut profile.web_v4.host,
            Self::WebPathV4 => &mut profile.web_v4.path,
            Self::WebContentV4 => &mut profile.web_v4.content,
            Self::WebHostV6 => &mut profile.web_v6.host,
            Self::WebPathV6 => &mut profile.web_v6.path,
            Self::WebContentV6 => &mut profile.web_v6.content,
            Self::DnsHostV4 => &mut profile.dns_v4.host,
            Self::DnsContentV4 => &mut profile.dns_v4.content,
            Self::DnsHostV6 => &mut profile.dns_v6.host,
            Self::DnsContentV6 => &mut profile.dns_v6.content,
        };
        *slot = value;
    }
}

impl std::fmt::Display for ProfileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key_name())
    }
}
