//! DNS record probe.
//!
//! Sends a single recursive A or AAAA query for the probe host over UDP and
//! checks the first answer. The query goes to port 53 of the probe host
//! itself: the host being tested doubles as the resolver asked about it.

#![allow(clippy::missing_errors_doc)]

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::timeout;
use trust_dns_resolver::proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use trust_dns_resolver::proto::rr::{Name, RData, RecordType};

use crate::error::{Error, Result};
use crate::profile::IpFamily;

/// Default DNS port.
pub const DEFAULT_DNS_PORT: u16 = 53;

/// Default read timeout for the DNS exchange in seconds.
pub const DEFAULT_DNS_TIMEOUT_SECS: u64 = 5;

/// Largest UDP response we accept.
const MAX_RESPONSE_SIZE: usize = 4096;

/// Record type a DNS probe asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// IPv4 address record
    A,
    /// IPv6 address record
    Aaaa,
}

impl RecordKind {
    /// Record kind matching an address family.
    #[must_use]
    pub fn for_family(family: IpFamily) -> Self {
        match family {
            IpFamily::V4 => Self::A,
            IpFamily::V6 => Self::Aaaa,
        }
    }

    /// Record type mnemonic.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
        }
    }

    fn family(self) -> IpFamily {
        match self {
            Self::A => IpFamily::V4,
            Self::Aaaa => IpFamily::V6,
        }
    }

    fn record_type(self) -> RecordType {
        match self {
            Self::A => RecordType::A,
            Self::Aaaa => RecordType::AAAA,
        }
    }
}

/// DNS record prober.
///
/// # Example
///
/// ```ignore
/// let probe = DnsProbe::new();
/// probe.test("dns.msftncsi.com", RecordKind::A, "131.107.255.255").await?;
/// ```
#[derive(Debug, Clone)]
pub struct DnsProbe {
    port: u16,
    timeout: Duration,
}

impl DnsProbe {
    /// Create a prober using port 53 and a 5 second read timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_DNS_PORT, Duration::from_secs(DEFAULT_DNS_TIMEOUT_SECS))
    }

    /// Create a prober with a custom port and read timeout.
    #[must_use]
    pub fn with_settings(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    /// Query `host` for a `kind` record and compare the first answer with
    /// `expected`.
    ///
    /// # Errors
    ///
    /// - `ResolutionFailure` if no response is received
    /// - `QueryRejected` if the response code is not `NoError`
    /// - `EmptyAnswer` if the response has no answer records
    /// - `ContentMismatch` if the first answer differs from `expected`
    pub async fn test(&self, host: &str, kind: RecordKind, expected: &str) -> Result<()> {
        let failure = |reason: String| Error::ResolutionFailure {
            host: host.to_string(),
            family: kind.family().label(),
            reason,
        };

        let query = build_query(host, kind).map_err(&failure)?;
        let response = timeout(self.timeout, self.exchange(host, &query))
            .await
            .map_err(|_| {
                failure(format!(
                    "no response within {}s",
                    self.timeout.as_secs_f32()
                ))
            })?
            .map_err(&failure)?;

        let rcode = response.response_code();
        if rcode != ResponseCode::NoError {
            return Err(Error::QueryRejected {
                host: host.to_string(),
                record: kind.as_str(),
                rcode: rcode.to_string(),
            });
        }

        let first = response.answers().first().ok_or_else(|| Error::EmptyAnswer {
            host: host.to_string(),
            record: kind.as_str(),
        })?;

        let actual = match first.data() {
            Some(RData::A(ip)) => ip.to_string(),
            Some(RData::AAAA(ip)) => ip.to_string(),
            _ => format!("<{} record>", first.record_type()),
        };

        if actual != expected {
            return Err(Error::mismatch(actual, expected));
        }

        tracing::debug!("{host} {} answered {actual}", kind.as_str());
        Ok(())
    }

    /// Send `query` to the probe host and wait for the matching reply.
    async fn exchange(&self, host: &str, query: &Message) -> std::result::Result<Message, String> {
        let server = self.server_addr(host).await?;
        let bind = if server.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };

        let socket = UdpSocket::bind(bind).await.map_err(|e| e.to_string())?;
        socket.connect(server).await.map_err(|e| e.to_string())?;

        let bytes = query.to_vec().map_err(|e| e.to_string())?;
        socket.send(&bytes).await.map_err(|e| e.to_string())?;
        tracing::debug!("Sent query {} to {server}", query.id());

        receive_reply(&socket, query.id()).await
    }

    async fn server_addr(&self, host: &str) -> std::result::Result<SocketAddr, String> {
        tokio::net::lookup_host((host, self.port))
            .await
            .map_err(|e| e.to_string())?
            .next()
            .ok_or_else(|| format!("no address for {host}"))
    }
}

impl Default for DnsProbe {
    fn default() -> Self {
        Self::new()
    }
}

/// Read datagrams until one parses as a reply to query `id`.
async fn receive_reply(socket: &UdpSocket, id: u16) -> std::result::Result<Message, String> {
    let mut buf = vec![0u8; MAX_RESPONSE_SIZE];
    loop {
        let len = socket.recv(&mut buf).await.map_err(|e| e.to_string())?;
        match Message::from_vec(&buf[..len]) {
            Ok(message) if message.id() == id => return Ok(message),
            Ok(message) => tracing::debug!("Ignoring reply with id {}", message.id()),
            Err(e) => tracing::debug!("Ignoring malformed reply: {e}"),
        }
    }
}

/// Build a recursive query for `host`, made fully qualified.
fn build_query(host: &str, kind: RecordKind) -> std::result::Result<Message, String> {
    let fqdn = if host.ends_with('.') {
        host.to_string()
    } else {
        format!("{host}.")
    };
    let name = Name::from_ascii(&fqdn).map_err(|e| format!("invalid name {fqdn}: {e}"))?;

    let mut message = Message::new();
    message
        .set_id(query_id())
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .add_query(Query::query(name, kind.record_type()));
    Ok(message)
}

/// Generate a query identifier.
fn query_id() -> u16 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.subsec_nanos());
    (nanos % 65536) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use trust_dns_resolver::proto::rr::Record;

    /// Answer one query on a local UDP socket and return the port.
    async fn responder(rcode: ResponseCode, answers: Vec<RData>) -> u16 {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = socket.local_addr().unwrap().port();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];
            let (len, peer) = socket.recv_from(&mut buf).await.unwrap();
            let request = Message::from_vec(&buf[..len]).unwrap();
            assert!(request.recursion_desired());
            let question = request.queries()[0].clone();

            let mut response = Message::new();
            response
                .set_id(request.id())
                .set_message_type(MessageType::Response)
                .set_op_code(OpCode::Query)
                .set_response_code(rcode);
            for rdata in answers {
                response.add_answer(Record::from_rdata(question.name().clone(), 60, rdata));
            }
            response.add_query(question);
            socket
                .send_to(&response.to_vec().unwrap(), peer)
                .await
                .unwrap();
        });

        port
    }

    fn probe(port: u16) -> DnsProbe {
        DnsProbe::with_settings(port, Duration::from_secs(2))
    }

    fn a(ip: &str) -> RData {
        RData::A(ip.parse::<Ipv4Addr>().unwrap())
    }

    #[tokio::test]
    async fn test_matching_a_record_passes() {
        let port = responder(ResponseCode::NoError, vec![a("208.78.70.16")]).await;
        probe(port)
            .test("127.0.0.1", RecordKind::A, "208.78.70.16")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_matching_aaaa_record_passes() {
        let ip: Ipv6Addr = "2001:500:90:1::16".parse().unwrap();
        let port = responder(ResponseCode::NoError, vec![RData::AAAA(ip)]).await;
        probe(port)
            .test("127.0.0.1", RecordKind::Aaaa, "2001:500:90:1::16")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_only_first_answer_counts() {
        let port = responder(
            ResponseCode::NoError,
            vec![a("10.0.0.1"), a("208.78.70.16")],
        )
        .await;
        let err = probe(port)
            .test("127.0.0.1", RecordKind::A, "208.78.70.16")
            .await
            .unwrap_err();
        match err {
            Error::ContentMismatch { actual, expected } => {
                assert_eq!(actual, "10.0.0.1");
                assert_eq!(expected, "208.78.70.16");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_answer() {
        let port = responder(ResponseCode::NoError, vec![]).await;
        let err = probe(port)
            .test("127.0.0.1", RecordKind::A, "208.78.70.16")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyAnswer { record: "A", .. }));
    }

    #[tokio::test]
    async fn test_nxdomain_is_rejected() {
        let port = responder(ResponseCode::NXDomain, vec![]).await;
        let err = probe(port)
            .test("127.0.0.1", RecordKind::A, "208.78.70.16")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "query_rejected");
    }

    #[tokio::test]
    async fn test_silent_server_is_resolution_failure() {
        // Bound but never answers.
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = socket.local_addr().unwrap().port();

        let probe = DnsProbe::with_settings(port, Duration::from_millis(200));
        let err = probe
            .test("127.0.0.1", RecordKind::A, "208.78.70.16")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ResolutionFailure { family: "IPv4", .. }
        ));
        drop(socket);
    }

    #[tokio::test]
    async fn test_stray_replies_stay_within_timeout() {
        // Answers every datagram, always with the wrong id.
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = socket.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];
            while let Ok((len, peer)) = socket.recv_from(&mut buf).await {
                let request = Message::from_vec(&buf[..len]).unwrap();
                for _ in 0..50 {
                    let mut reply = Message::new();
                    reply
                        .set_id(request.id().wrapping_add(1))
                        .set_message_type(MessageType::Response);
                    let _ = socket.send_to(&reply.to_vec().unwrap(), peer).await;
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
            }
        });

        let probe = DnsProbe::with_settings(port, Duration::from_millis(300));
        let started = std::time::Instant::now();
        let err = probe
            .test("127.0.0.1", RecordKind::A, "208.78.70.16")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "resolution_failure");
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_build_query() {
        let message = build_query("dns.msftncsi.com", RecordKind::Aaaa).unwrap();
        assert!(message.recursion_desired());
        assert_eq!(message.queries().len(), 1);
        assert_eq!(message.queries()[0].query_type(), RecordType::AAAA);
        assert_eq!(message.queries()[0].name().to_ascii(), "dns.msftncsi.com.");
    }
}
