//! TLS certificate inspection for the SSL phase.
//!
//! The handshake accepts any certificate so that expired, self-signed or
//! mismatched certificates can still be read. Validity is then decided from
//! the leaf certificate alone.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::debug;
use x509_parser::prelude::{FromDer, X509Certificate};

use crate::monitor::{Monitoring, SslResultPayload};
use crate::target::address_and_server_name;

/// Upper bound for the TCP dial and TLS handshake together
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Certificate facts reported for a valid certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDetails {
    pub expires_at: DateTime<Utc>,
    pub issued_at: DateTime<Utc>,
    pub issuer: Option<String>,
}

/// Accepts every server certificate but still checks handshake signatures.
#[derive(Debug)]
struct InspectOnlyVerifier {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for InspectOnlyVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider.signature_verification_algorithms.supported_schemes()
    }
}

/// SSL validator - connects to a target and judges its leaf certificate
#[derive(Clone)]
pub struct SslValidator {
    connector: TlsConnector,
    handshake_timeout: Duration,
}

impl SslValidator {
    pub fn new() -> Result<Self, rustls::Error> {
        Self::with_timeout(HANDSHAKE_TIMEOUT)
    }

    pub fn with_timeout(handshake_timeout: Duration) -> Result<Self, rustls::Error> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let verifier = InspectOnlyVerifier { provider: provider.clone() };

        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(verifier))
            .with_no_client_auth();

        Ok(Self { connector: TlsConnector::from(Arc::new(config)), handshake_timeout })
    }

    /// Validate the certificate served by `job`'s target.
    ///
    /// Any failure along the way yields an invalid result.
    pub async fn validate(&self, job: &Monitoring) -> SslResultPayload {
        let (address, host) = match address_and_server_name(&job.target) {
            Ok(resolved) => resolved,
            Err(e) => {
                debug!(monitoring_id = %job.id, "Invalid SSL target: {}", e);
                return SslResultPayload::invalid(&job.id);
            }
        };

        let server_name = match ServerName::try_from(host.as_str()) {
            Ok(name) => name.to_owned(),
            Err(e) => {
                debug!(monitoring_id = %job.id, %host, "Invalid TLS server name: {}", e);
                return SslResultPayload::invalid(&job.id);
            }
        };

        let leaf = match self.fetch_leaf_certificate(&address, server_name.clone()).await {
            Ok(Some(leaf)) => leaf,
            Ok(None) => {
                debug!(monitoring_id = %job.id, %address, "No peer certificate presented");
                return SslResultPayload::invalid(&job.id);
            }
            Err(e) => {
                debug!(monitoring_id = %job.id, %address, "TLS connection failed: {}", e);
                return SslResultPayload::invalid(&job.id);
            }
        };

        match evaluate_certificate(&leaf, &server_name, Utc::now()) {
            Some(details) => SslResultPayload::valid(
                &job.id,
                details.expires_at,
                details.issued_at,
                details.issuer,
            ),
            None => SslResultPayload::invalid(&job.id),
        }
    }

    async fn fetch_leaf_certificate(
        &self,
        address: &str,
        server_name: ServerName<'static>,
    ) -> io::Result<Option<CertificateDer<'static>>> {
        let handshake = async {
            let tcp = TcpStream::connect(address).await?;
            self.connector.connect(server_name, tcp).await
        };

        let stream = timeout(self.handshake_timeout, handshake)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "TLS handshake timeout"))??;

        let (_, connection) = stream.get_ref();
        let leaf = connection
            .peer_certificates()
            .and_then(|certificates| certificates.first())
            .map(|leaf| leaf.clone().into_owned());

        Ok(leaf)
    }
}

/// Judge a leaf certificate at `now` for `server_name`.
///
/// Returns `None` when the certificate cannot be parsed, is outside its
/// validity window, or does not cover the server name.
pub fn evaluate_certificate(
    leaf: &CertificateDer<'_>,
    server_name: &ServerName<'_>,
    now: DateTime<Utc>,
) -> Option<CertificateDetails> {
    let (_, certificate) = X509Certificate::from_der(leaf.as_ref()).ok()?;

    let validity = certificate.validity();
    let issued_at = DateTime::from_timestamp(validity.not_before.timestamp(), 0)?;
    let expires_at = DateTime::from_timestamp(validity.not_after.timestamp(), 0)?;
    if now < issued_at || now > expires_at {
        return None;
    }

    let end_entity = webpki::EndEntityCert::try_from(leaf).ok()?;
    end_entity.verify_is_valid_for_subject_name(server_name).ok()?;

    Some(CertificateDetails { expires_at, issued_at, issuer: issuer_name(&certificate) })
}

fn issuer_name(certificate: &X509Certificate<'_>) -> Option<String> {
    let issuer = certificate.issuer();
    let common_name = issuer
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(str::trim)
        .unwrap_or_default();

    if !common_name.is_empty() {
        return Some(common_name.to_string());
    }

    let distinguished = issuer.to_string();
    (!distinguished.is_empty()).then_some(distinguished)
}
