//! Operator actions and the interactive menu.
//!
//! Every operator-facing action is listed in [`Action::ALL`]; the one-shot
//! subcommands and the interactive menu both dispatch through
//! [`Console::run`].

#![allow(clippy::missing_errors_doc)]

use std::io::{BufRead, Write};

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use crate::probe::{Progress, TestReport, Verifier};
use crate::profile::{BuiltinProfile, IpFamily, Profile, ProfileField};
use crate::store::{ProfileStore, SaveReport};

/// Prompt of the interactive menu.
const MENU_PROMPT: &str = "'menu' for help [ncsi]> ";

/// An operator action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Show,
    ApplyAlternative,
    ApplyVendorDefault,
    Test,
}

impl Action {
    /// The action table, in menu order.
    pub const ALL: [Self; 4] = [
        Self::Show,
        Self::ApplyAlternative,
        Self::ApplyVendorDefault,
        Self::Test,
    ];

    /// Name accepted by the menu.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::ApplyAlternative => "apply-alternative",
            Self::ApplyVendorDefault => "apply-vendor-default",
            Self::Test => "test",
        }
    }

    /// One-line description shown in the menu.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Show => "Display your current NCSI values",
            Self::ApplyAlternative => "Apply the alternative NCSI profile",
            Self::ApplyVendorDefault => "Apply the vendor-default NCSI profile",
            Self::Test => "Test the internet connection",
        }
    }
}

impl std::str::FromStr for Action {
    type Err = Error;

    /// Parse a menu number (starting at 1) or an action name.
    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim().to_lowercase();
        if let Ok(number) = input.parse::<usize>() {
            return number
                .checked_sub(1)
                .and_then(|idx| Self::ALL.get(idx).copied())
                .ok_or_else(|| Error::parse(format!("No action number {number}")));
        }
        Self::ALL
            .iter()
            .copied()
            .find(|action| action.name() == input)
            .ok_or_else(|| Error::parse(format!("Unknown command: {}", s.trim())))
    }
}

/// Runs actions against a store and a verifier, writing to any output.
pub struct Console {
    store: ProfileStore,
    verifier: Verifier,
    format: OutputFormat,
    strict: bool,
}

impl Console {
    /// Create a console.
    #[must_use]
    pub fn new(store: ProfileStore, verifier: Verifier, format: OutputFormat) -> Self {
        Self {
            store,
            verifier,
            format,
            strict: false,
        }
    }

    /// Treat partially written profiles as errors.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Run one action.
    pub async fn run<W: Write>(&self, action: Action, out: &mut W) -> Result<()> {
        tracing::debug!("Running action {}", action.name());
        match action {
            Action::Show => self.show(out),
            Action::ApplyAlternative => self.apply(BuiltinProfile::Alternative, out).map(drop),
            Action::ApplyVendorDefault => {
                self.apply(BuiltinProfile::VendorDefault, out).map(drop)
            }
            Action::Test => self.test(out).await.map(drop),
        }
    }

    /// Print the profile currently stored.
    pub fn show<W: Write>(&self, out: &mut W) -> Result<()> {
        let profile = self.store.load()?;
        if self.format == OutputFormat::Table {
            writeln!(
                out,
                "Current values from {} [{}]",
                self.store.describe(),
                self.store.path()
            )?;
        }
        write_profile(&profile, self.format, out)
    }

    /// Write a built-in profile to the store.
    pub fn apply<W: Write>(&self, builtin: BuiltinProfile, out: &mut W) -> Result<SaveReport> {
        let report = self.store.apply(builtin)?;

        match self.format {
            OutputFormat::Table => {
                if report.is_complete() {
                    writeln!(out, "Applying {builtin} profile... OK")?;
                } else if let Some(failure) = &report.failure {
                    writeln!(
                        out,
                        "Applying {builtin} profile... WARNING: {} of {} values written, {} failed: {}",
                        report.written.len(),
                        ProfileField::ALL.len(),
                        failure.field,
                        failure.reason
                    )?;
                    let skipped = report.skipped();
                    if !skipped.is_empty() {
                        let names: Vec<_> = skipped.iter().map(|f| f.key_name()).collect();
                        writeln!(out, "Not written: {}", names.join(", "))?;
                    }
                }
            }
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "profile": builtin.name(),
                    "complete": report.is_complete(),
                    "written": report.written.iter().map(|f| f.key_name()).collect::<Vec<_>>(),
                    "failed": report.failure.as_ref().map(|f| f.field.key_name()),
                    "skipped": report.skipped().iter().map(|f| f.key_name()).collect::<Vec<_>>(),
                    "error": report.failure.as_ref().map(|f| f.reason.clone()),
                });
                writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
            }
        }

        if self.strict {
            report.clone().into_result()?;
        }
        Ok(report)
    }

    /// Load the stored profile and run its four probes.
    pub async fn test<W: Write>(&self, out: &mut W) -> Result<TestReport> {
        let profile = self.store.load()?;
        let table = self.format == OutputFormat::Table;

        let mut write_error: Option<std::io::Error> = None;
        let report = self
            .verifier
            .verify_with_progress(&profile, |event| {
                if !table || write_error.is_some() {
                    return;
                }
                if let Err(e) = write_progress(&mut *out, event) {
                    write_error = Some(e);
                }
            })
            .await;
        if let Some(e) = write_error {
            return Err(Error::Io(e));
        }

        match self.format {
            OutputFormat::Table => {
                writeln!(
                    out,
                    "\n{}/{} probes passed",
                    report.passed_count(),
                    report.results.len()
                )?;
            }
            OutputFormat::Json => {
                writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
            }
        }

        Ok(report)
    }

    /// Read commands from `input` until it ends or the operator exits.
    ///
    /// A failing action is reported and the menu keeps running.
    pub async fn menu<R: BufRead, W: Write>(&self, input: R, out: &mut W) -> Result<()> {
        write_menu(out)?;
        write!(out, "{MENU_PROMPT}")?;
        out.flush()?;

        for line in input.lines() {
            let line = line?;
            let command = line.trim();

            match command {
                "" => {}
                "menu" | "help" | "?" => write_menu(out)?,
                "exit" | "quit" | "q" => break,
                _ => match command.parse::<Action>() {
                    Ok(action) => {
                        writeln!(out)?;
                        if let Err(e) = self.run(action, out).await {
                            tracing::debug!("Action {} failed: {e}", action.name());
                            writeln!(out, "ERROR: {e}")?;
                        }
                        writeln!(out)?;
                    }
                    Err(e) => writeln!(out, "{e}")?,
                },
            }

            write!(out, "{MENU_PROMPT}")?;
            out.flush()?;
        }

        writeln!(out)?;
        Ok(())
    }
}

/// Print a profile grouped by probe.
pub fn write_profile<W: Write>(profile: &Profile, format: OutputFormat, out: &mut W) -> Result<()> {
    if format == OutputFormat::Json {
        writeln!(out, "{}", serde_json::to_string_pretty(profile)?)?;
        return Ok(());
    }

    for family in [IpFamily::V4, IpFamily::V6] {
        writeln!(out, "\n# Web Probe {}", family.label())?;
        let fields = match family {
            IpFamily::V4 => [
                ProfileField::WebHostV4,
                ProfileField::WebPathV4,
                ProfileField::WebContentV4,
            ],
            IpFamily::V6 => [
                ProfileField::WebHostV6,
                ProfileField::WebPathV6,
                ProfileField::WebContentV6,
            ],
        };
        for field in fields {
            writeln!(out, "{}: {}", field, field.get(profile))?;
        }
    }

    for family in [IpFamily::V4, IpFamily::V6] {
        writeln!(out, "\n# DNS Probe {}", family.label())?;
        let fields = match family {
            IpFamily::V4 => [ProfileField::DnsHostV4, ProfileField::DnsContentV4],
            IpFamily::V6 => [ProfileField::DnsHostV6, ProfileField::DnsContentV6],
        };
        for field in fields {
            writeln!(out, "{}: {}", field, field.get(profile))?;
        }
    }

    Ok(())
}

fn write_progress<W: Write>(out: &mut W, event: Progress<'_>) -> std::io::Result<()> {
    match event {
        Progress::Started(probe) => {
            write!(out, "{}... ", probe.description())?;
            out.flush()
        }
        Progress::Finished(result) => match &result.error {
            None => writeln!(out, "OK"),
            Some(error) => writeln!(out, "ERROR: {error}"),
        },
    }
}

fn write_menu<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "\nNCSI")?;
    for (idx, action) in Action::ALL.iter().enumerate() {
        writeln!(out, "  {}. {:<22} {}", idx + 1, action.name(), action.description())?;
    }
    writeln!(out, "  {:<25} {}", "menu", "Show this menu")?;
    writeln!(out, "  {:<25} {}", "exit", "Leave")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{DnsProbe, HttpProbe};
    use crate::profile::{alternative_profile, vendor_default_profile};
    use crate::store::{MemoryStore, DEFAULT_KEY_PATH};
    use std::time::Duration;

    fn console(backend: &MemoryStore, format: OutputFormat) -> Console {
        let store = ProfileStore::new(Box::new(backend.clone()), DEFAULT_KEY_PATH);
        // Nothing listens on port 1 of the loopback address.
        let verifier = Verifier::from_probes(
            HttpProbe::new(Duration::from_secs(2)).unwrap(),
            DnsProbe::with_settings(1, Duration::from_millis(200)),
        );
        Console::new(store, verifier, format)
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("1".parse::<Action>().unwrap(), Action::Show);
        assert_eq!("4".parse::<Action>().unwrap(), Action::Test);
        assert_eq!(" TEST ".parse::<Action>().unwrap(), Action::Test);
        assert_eq!(
            "apply-vendor-default".parse::<Action>().unwrap(),
            Action::ApplyVendorDefault
        );
        assert!(matches!("0".parse::<Action>(), Err(Error::Parse(_))));
        assert!("5".parse::<Action>().is_err());
        assert!("reboot".parse::<Action>().is_err());
    }

    #[tokio::test]
    async fn test_apply_then_show() {
        let backend = MemoryStore::new();
        let console = console(&backend, OutputFormat::Table);
        let mut out = Vec::new();

        console.run(Action::ApplyVendorDefault, &mut out).await.unwrap();
        console.run(Action::Show, &mut out).await.unwrap();

        let text = output(out);
        assert!(text.contains("Applying vendor-default profile... OK"));
        assert!(text.contains("# Web Probe IPv6"));
        assert!(text.contains("ActiveWebProbeHostV6: ipv6.msftncsi.com"));
        assert!(text.contains("ActiveDnsProbeHostV6: dns.msftncsi.com"));
        assert!(text.contains("ActiveDnsProbeContentV6: fd3e:4f5a:5b81::1"));
    }

    #[tokio::test]
    async fn test_show_json() {
        let backend = MemoryStore::new();
        let console = console(&backend, OutputFormat::Json);
        console
            .apply(BuiltinProfile::Alternative, &mut std::io::sink())
            .unwrap();

        let mut out = Vec::new();
        console.show(&mut out).unwrap();
        let profile: Profile = serde_json::from_slice(&out).unwrap();
        assert_eq!(profile, alternative_profile());
    }

    #[test]
    fn test_show_without_profile_fails() {
        let backend = MemoryStore::new();
        let console = console(&backend, OutputFormat::Table);
        let err = console.show(&mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), "store_unavailable");
    }

    #[test]
    fn test_strict_apply_reports_partial_write() {
        let backend = MemoryStore::new();
        backend.fail_writes_to("ActiveWebProbeContentV6");

        let lenient = console(&backend, OutputFormat::Table);
        let mut out = Vec::new();
        let report = lenient.apply(BuiltinProfile::Alternative, &mut out).unwrap();
        assert_eq!(report.written.len(), 5);
        let text = output(out);
        assert!(text.contains("WARNING: 5 of 10 values written"));
        assert!(text.contains(
            "Not written: ActiveDnsProbeHost, ActiveDnsProbeContent, \
             ActiveDnsProbeHostV6, ActiveDnsProbeContentV6"
        ));

        let strict = console(&backend, OutputFormat::Table).strict(true);
        let err = strict
            .apply(BuiltinProfile::Alternative, &mut std::io::sink())
            .unwrap_err();
        assert!(matches!(err, Error::PartialWrite { written: 5, .. }));
    }

    #[tokio::test]
    async fn test_test_reports_every_probe() {
        let backend = MemoryStore::new();
        let console = console(&backend, OutputFormat::Table);
        console
            .apply(BuiltinProfile::VendorDefault, &mut std::io::sink())
            .unwrap();

        // Point every probe at the loopback address so nothing leaves the host.
        for (name, value) in [
            ("ActiveWebProbeHost", "127.0.0.1:1"),
            ("ActiveWebProbeHostV6", "127.0.0.1:1"),
            ("ActiveDnsProbeHost", "127.0.0.1"),
            ("ActiveDnsProbeHostV6", "127.0.0.1"),
        ] {
            backend.insert(DEFAULT_KEY_PATH, name, value);
        }

        let mut out = Vec::new();
        let report = console.test(&mut out).await.unwrap();
        assert_eq!(report.results.len(), 4);
        assert!(!report.all_passed());

        let text = output(out);
        assert!(text.contains("Testing web request IPv4... ERROR"));
        assert!(text.contains("Testing web request IPv6... ERROR"));
        assert!(text.contains("Testing DNS resolution IPv4... ERROR"));
        assert!(text.contains("Testing DNS resolution IPv6... ERROR"));
        assert!(text.contains("0/4 probes passed"));
    }

    #[tokio::test]
    async fn test_menu_recovers_from_failures() {
        let backend = MemoryStore::new();
        let console = console(&backend, OutputFormat::Table);
        let input = "show\nbogus\n3\n1\nexit\nshow\n".as_bytes();

        let mut out = Vec::new();
        console.menu(input, &mut out).await.unwrap();

        let text = output(out);
        assert!(text.contains("ERROR: Unable to open"));
        assert!(text.contains("Unknown command: bogus"));
        assert!(text.contains("Applying vendor-default profile... OK"));
        assert!(text.contains("ActiveWebProbeHost: www.msftncsi.com"));
        assert_eq!(text.matches("Current values from").count(), 1);

        let loaded = ProfileStore::new(Box::new(backend), DEFAULT_KEY_PATH)
            .load()
            .unwrap();
        assert_eq!(loaded, vendor_default_profile());
    }
}
