// src/core/scanner/ssl_scanner.rs
//
// SECURITY CAVEAT: the inspector skips certificate chain and hostname
// verification and accepts every protocol version and cipher the local
// OpenSSL still knows. It exists to look at whatever a host presents
// (self-signed, expired, TLSv1, RC4), so the connection it opens must never
// be used to carry anything trusted.

use tracing::{debug, error, info};

use crate::config::ScanConfig;
use crate::core::engine::ScanContext;
use crate::core::error::{Result, ScanError};
use crate::core::models::{ModuleKind, ScanEvent, StatusLevel, TlsReport, TlsVulnerability};
use crate::core::scanner::common::extract_host;
use chrono::{DateTime, Utc};
use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tokio::task::spawn_blocking;
use x509_parser::prelude::*;

const MODULE: ModuleKind = ModuleKind::SslAnalyzer;

// Security level 0 re-enables SHA-1 signatures, small keys and the legacy
// suites, so old servers still complete a handshake.
const PERMISSIVE_CIPHERS: &str = "ALL:@SECLEVEL=0";

fn permissive_connector() -> Result<SslConnector> {
    let mut builder = SslConnector::builder(SslMethod::tls_client()).map_err(|e| {
        error!(error = %e, "Failed to create SslConnector");
        ScanError::Tls(format!("SslConnector Error: {}", e))
    })?;
    builder.set_verify(SslVerifyMode::NONE);
    builder.set_min_proto_version(None).map_err(|e| ScanError::Tls(format!("Protocol range Error: {}", e)))?;
    builder.set_cipher_list(PERMISSIVE_CIPHERS).map_err(|e| ScanError::Tls(format!("Cipher list Error: {}", e)))?;
    Ok(builder.build())
}

/// Connects to `host:port`, completes one handshake and reads the peer
/// certificate. Blocking; call it from `spawn_blocking`.
pub fn inspect_tls(host: &str, port: u16, timeout: Duration) -> Result<TlsReport> {
    debug!(host, port, "Performing TLS connection and handshake.");
    let addr = (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| ScanError::Tls(format!("No address found for {}", host)))?;
    let sock = TcpStream::connect_timeout(&addr, timeout).map_err(|e| {
        error!(error = %e, "TCP connection failed");
        ScanError::Tls(format!("TCP Connection Error: {}", e))
    })?;
    sock.set_read_timeout(Some(timeout))?;
    sock.set_write_timeout(Some(timeout))?;

    let mut handshake = permissive_connector()?
        .configure()
        .map_err(|e| ScanError::Tls(format!("SslConnector Error: {}", e)))?;
    handshake.set_verify_hostname(false);
    let stream = handshake.connect(host, sock).map_err(|e| {
        error!(error = %e, "TLS handshake failed");
        ScanError::Tls(format!("TLS Handshake Error: {}", e))
    })?;
    let ssl = stream.ssl();

    let protocol = ssl.version_str().to_string();
    let (cipher, cipher_bits) = ssl
        .current_cipher()
        .map(|c| (c.name().to_string(), u16::try_from(c.bits().secret).unwrap_or(0)))
        .unwrap_or_else(|| ("Unknown".to_string(), 0));
    debug!(protocol = %protocol, cipher = %cipher, bits = cipher_bits, "Handshake negotiated.");

    let cert_der = ssl
        .peer_certificate()
        .ok_or_else(|| ScanError::Tls("Server did not provide a certificate.".to_string()))?
        .to_der()
        .map_err(|e| {
            error!(error = %e, "Failed to convert certificate to DER format");
            ScanError::Tls(format!("DER Conversion Error: {}", e))
        })?;
    let (_, x509) = parse_x509_certificate(&cert_der)
        .map_err(|e| ScanError::Tls(format!("X.509 Parse Error: {}", e)))?;
    info!(subject = %x509.subject(), issuer = %x509.issuer(), "Successfully parsed certificate.");

    let issuer = x509
        .issuer()
        .iter_organization()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .unwrap_or("Unknown")
        .to_string();
    let subject = x509
        .subject()
        .iter_common_name()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .unwrap_or("Unknown")
        .to_string();
    let not_after = asn1_time_to_chrono_utc(&x509.validity().not_after);
    let days_until_expiry = days_between(Utc::now(), not_after);

    Ok(TlsReport {
        host: host.to_string(),
        issuer,
        subject,
        not_after,
        days_until_expiry,
        vulnerabilities: assess_vulnerabilities(&protocol, &cipher, days_until_expiry),
        cipher_bits,
        protocol,
        cipher,
    })
}

fn asn1_time_to_chrono_utc(time: &ASN1Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or_default()
}

/// Whole days from `now` until `expiry`, rounded toward negative infinity so an
/// already-expired certificate reports at least -1.
pub fn days_between(now: DateTime<Utc>, expiry: DateTime<Utc>) -> i64 {
    expiry.signed_duration_since(now).num_seconds().div_euclid(86_400)
}

fn is_legacy_protocol(protocol: &str) -> bool {
    matches!(protocol, "SSLv2" | "SSLv3" | "TLSv1" | "TLSv1.0" | "TLSv1.1")
}

/// Substring and threshold heuristics. Not a real vulnerability scanner.
pub fn assess_vulnerabilities(protocol: &str, cipher: &str, days_until_expiry: i64) -> Vec<TlsVulnerability> {
    let mut findings = Vec::new();
    if is_legacy_protocol(protocol) {
        findings.push(TlsVulnerability::LegacyProtocol(protocol.to_string()));
    }
    if cipher.to_uppercase().contains("RC4") {
        findings.push(TlsVulnerability::WeakCipher(cipher.to_string()));
    }
    if days_until_expiry < 30 {
        findings.push(TlsVulnerability::ExpiringSoon(days_until_expiry));
    }
    findings
}

/// Runs the TLS module. Any failure is reported on the event channel and
/// yields `None`; it never aborts the overall scan.
pub async fn run_ssl_scan(config: &ScanConfig, ctx: &ScanContext) -> Option<TlsReport> {
    ctx.events.emit(ScanEvent::ModuleStarted { module: MODULE, total: None });
    ctx.events.status(MODULE, StatusLevel::Info, "Analyzing SSL/TLS configuration");

    let host = match extract_host(&config.target) {
        Ok(host) => host,
        Err(e) => {
            ctx.events.status(MODULE, StatusLevel::Error, format!("SSL analysis failed: {}", e));
            ctx.events.emit(ScanEvent::ModuleFinished { module: MODULE, found: 0 });
            return None;
        }
    };
    info!(host = %host, port = config.tls_port, "Starting SSL/TLS scan.");

    let port = config.tls_port;
    let timeout = config.http_timeout;
    let task_host = host.clone();
    let outcome = spawn_blocking(move || inspect_tls(&task_host, port, timeout))
        .await
        .unwrap_or_else(|e| {
            error!(panic = %e, "Blocking SSL scan task panicked!");
            Err(ScanError::Tls(format!("Task panicked: {}", e)))
        });

    let report = match outcome {
        Ok(report) => {
            info!(protocol = %report.protocol, findings = report.vulnerabilities.len(), "SSL/TLS scan finished.");
            for vulnerability in &report.vulnerabilities {
                ctx.events.status(MODULE, StatusLevel::Warning, vulnerability.to_string());
            }
            Some(report)
        }
        Err(e) => {
            error!(host = %host, error = %e, "SSL/TLS scan failed.");
            ctx.events.status(MODULE, StatusLevel::Error, format!("SSL analysis failed: {}", e));
            None
        }
    };
    ctx.events.emit(ScanEvent::ModuleFinished { module: MODULE, found: usize::from(report.is_some()) });
    report
}
