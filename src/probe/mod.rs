//! Connectivity verification.
//!
//! This module checks that a profile's endpoints behave as declared:
//! - HTTP content probes for the IPv4 and IPv6 web hosts
//! - DNS record probes for the IPv4 and IPv6 DNS hosts
//!
//! The four probes run one after another and are independent: a failing
//! probe never prevents the next one from running. Nothing is retried.

pub mod dns;
pub mod http;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::profile::{IpFamily, Profile};

pub use dns::{DnsProbe, RecordKind};
pub use http::HttpProbe;

/// One of the four probes of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeKind {
    WebV4,
    WebV6,
    DnsV4,
    DnsV6,
}

impl ProbeKind {
    /// All probes, in execution order.
    pub const ALL: [Self; 4] = [Self::WebV4, Self::WebV6, Self::DnsV4, Self::DnsV6];

    /// Address family the probe covers.
    #[must_use]
    pub fn family(self) -> IpFamily {
        match self {
            Self::WebV4 | Self::DnsV4 => IpFamily::V4,
            Self::WebV6 | Self::DnsV6 => IpFamily::V6,
        }
    }

    /// Progress line shown while the probe runs.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::WebV4 => "Testing web request IPv4",
            Self::WebV6 => "Testing web request IPv6",
            Self::DnsV4 => "Testing DNS resolution IPv4",
            Self::DnsV6 => "Testing DNS resolution IPv6",
        }
    }

    /// Target the probe contacts and the value it expects back.
    #[must_use]
    pub fn target(self, profile: &Profile) -> (String, String) {
        let family = self.family();
        match self {
            Self::WebV4 | Self::WebV6 => {
                (profile.web_url(family), profile.web(family).content.clone())
            }
            Self::DnsV4 | Self::DnsV6 => {
                let dns = profile.dns(family);
                (dns.host.clone(), dns.content.clone())
            }
        }
    }
}

/// Outcome of one probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Which probe ran
    pub probe: ProbeKind,
    /// URL or host that was contacted
    pub target: String,
    /// Expected content
    pub expected: String,
    /// Whether the probe passed
    pub passed: bool,
    /// Machine-readable error kind if the probe failed
    pub error_kind: Option<String>,
    /// Error message if the probe failed
    pub error: Option<String>,
}

impl ProbeResult {
    fn from_outcome(probe: ProbeKind, target: String, expected: String, outcome: Result<()>) -> Self {
        let (error_kind, error) = match &outcome {
            Ok(()) => (None, None),
            Err(e) => (Some(e.kind().to_string()), Some(e.to_string())),
        };
        Self {
            probe,
            target,
            expected,
            passed: outcome.is_ok(),
            error_kind,
            error,
        }
    }
}

/// Results of one connectivity test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    /// When the run started
    pub checked_at: DateTime<Utc>,
    /// One result per probe, in execution order
    pub results: Vec<ProbeResult>,
}

impl TestReport {
    /// Check whether every probe passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Number of probes that passed.
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Number of probes that failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.len() - self.passed_count()
    }
}

/// Progress event of [`Verifier::verify_with_progress`].
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    /// The probe is about to run
    Started(ProbeKind),
    /// The probe has finished
    Finished(&'a ProbeResult),
}

/// Runs the four probes of a profile.
///
/// # Example
///
/// ```ignore
/// let verifier = Verifier::new(Duration::from_secs(10), DnsProbe::new())?;
/// let report = verifier.verify(&profile).await;
/// println!("{}/{} probes passed", report.passed_count(), report.results.len());
/// ```
pub struct Verifier {
    http: HttpProbe,
    dns: DnsProbe,
}

impl Verifier {
    /// Create a verifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(http_timeout: Duration, dns: DnsProbe) -> Result<Self> {
        Ok(Self {
            http: HttpProbe::new(http_timeout)?,
            dns,
        })
    }

    /// Create a verifier from prebuilt probes.
    #[must_use]
    pub fn from_probes(http: HttpProbe, dns: DnsProbe) -> Self {
        Self { http, dns }
    }

    /// Run a single probe.
    ///
    /// # Errors
    ///
    /// Returns the probe's failure.
    pub async fn run(&self, probe: ProbeKind, profile: &Profile) -> Result<()> {
        let (target, expected) = probe.target(profile);
        match probe {
            ProbeKind::WebV4 | ProbeKind::WebV6 => self.http.test(&target, &expected).await,
            ProbeKind::DnsV4 | ProbeKind::DnsV6 => {
                let kind = RecordKind::for_family(probe.family());
                self.dns.test(&target, kind, &expected).await
            }
        }
    }

    /// Run all four probes.
    pub async fn verify(&self, profile: &Profile) -> TestReport {
        self.verify_with_progress(profile, |_| {}).await
    }

    /// Run all four probes, reporting each start and finish to `on_event`.
    pub async fn verify_with_progress(
        &self,
        profile: &Profile,
        mut on_event: impl FnMut(Progress<'_>),
    ) -> TestReport {
        let checked_at = Utc::now();
        let mut results = Vec::with_capacity(ProbeKind::ALL.len());

        for probe in ProbeKind::ALL {
            on_event(Progress::Started(probe));
            let outcome = self.run(probe, profile).await;
            if let Err(e) = &outcome {
                tracing::debug!("{} failed: {e}", probe.description());
            }

            let (target, expected) = probe.target(profile);
            let result = ProbeResult::from_outcome(probe, target, expected, outcome);
            on_event(Progress::Finished(&result));
            results.push(result);
        }

        TestReport {
            checked_at,
            results,
        }
    }
}
