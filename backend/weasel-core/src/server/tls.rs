//! Loading the pre-provisioned certificate chain and private key.
//!
//! Both files are PEM. Provisioning them is somebody else's job: if either is
//! missing or unusable, the server refuses to start.

use crate::error::credential::CredentialError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::Path;
use std::sync::Arc;

use log::info;
use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::ServerConfig as RustlsServerConfig;
use tokio_rustls::rustls::crypto::ring::default_provider;
use tokio_rustls::rustls::pki_types::pem::PemObject;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};

/// Read every certificate in a PEM file, leaf first.
///
/// # Errors
///
/// Returns [`CredentialError::Certificate`] if the file cannot be read, contains
/// a malformed PEM section, or contains no certificates at all.
pub fn load_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>, CredentialError> {
    let certificates = CertificateDer::pem_file_iter(path)
        .map_err(|e| CredentialError::Certificate {
            path: path.to_path_buf(),
            message: format!("Failed to open certificate file: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CredentialError::Certificate {
            path: path.to_path_buf(),
            message: format!("Failed to parse certificate: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    if certificates.is_empty() {
        return Err(CredentialError::Certificate {
            path: path.to_path_buf(),
            message: String::from("No certificates found"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(certificates)
}

/// Read the first private key (PKCS#1, PKCS#8 or SEC1) in a PEM file.
pub fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, CredentialError> {
    PrivateKeyDer::from_pem_file(path).map_err(|e| CredentialError::PrivateKey {
        path: path.to_path_buf(),
        message: format!("Failed to load private key: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Build the TLS acceptor used for every inbound connection.
///
/// # Errors
///
/// Returns [`CredentialError`] if either file cannot be loaded or the key does
/// not match the certificate.
pub fn load_acceptor(cert_path: &Path, key_path: &Path) -> Result<TlsAcceptor, CredentialError> {
    let certificates = load_certificates(cert_path)?;
    let key = load_private_key(key_path)?;

    let config = RustlsServerConfig::builder_with_provider(Arc::new(default_provider()))
        .with_safe_default_protocol_versions()
        .map_err(|e| CredentialError::Tls {
            message: format!("Failed to select protocol versions: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?
        .with_no_client_auth()
        .with_single_cert(certificates, key)
        .map_err(|e| CredentialError::Tls {
            message: format!("Certificate and key rejected: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!(
        "Loaded TLS credentials from {} and {}",
        cert_path.display(),
        key_path.display()
    );

    Ok(TlsAcceptor::from(Arc::new(config)))
}
