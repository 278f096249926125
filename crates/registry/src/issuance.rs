//! Certificate issuance.
//!
//! [`Issuer::issue`] turns a submitted form into a stored certificate:
//!
//! 1. Validate the form. A rejected form consumes no number.
//! 2. Generate a number with the configured strategy. The sequential strategy
//!    allocates its counter from the store.
//! 3. Build the verification URL `<base>/search?id=<number>`.
//! 4. Encode the URL as a QR image. [`Issuer::from_config`] installs
//!    [`SvgQrEncoder`]; [`Issuer::new`] starts without one.
//! 5. Insert the record into the configured collection.
//!
//! A number that collides with an existing record is discarded and a fresh
//! one generated, up to [`MAX_ISSUE_ATTEMPTS`] times.

use rand::{RngCore, rngs::StdRng};
use rigcert_types::{
    Certificate, CertificateForm, CertificateNumber, CertificateNumberGenerator, Clock, Strategy,
    StrategyKind, SystemClock,
    config::{IssuanceConfig, VERIFICATION_PATH},
    validation::validate_certificate_form,
};
use snafu::{ResultExt, ensure};
use tracing::{info, warn};
use url::Url;

use crate::{
    error::{
        BoxError, ConfigSnafu, DuplicateSnafu, InvalidBaseUrlSnafu, InvalidFormSnafu,
        QrEncodingSnafu, RegistryError, SequenceExhaustedSnafu, StorageSnafu, StoreError,
    },
    qr::SvgQrEncoder,
    store::CertificateStore,
};

/// Number of numbers tried before a collision is reported.
pub const MAX_ISSUE_ATTEMPTS: u32 = 3;

/// Highest counter that fits the four-digit sequential field.
pub const MAX_SEQUENCE: u32 = 9999;

/// Prefix every QR data URI must carry.
const DATA_IMAGE_PREFIX: &str = "data:image/";

/// Renders a URL as a QR image.
pub trait QrEncoder: Send + Sync {
    /// Encodes `url` and returns the image as a `data:image/...` URI.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be encoded.
    fn encode(&self, url: &str) -> Result<String, BoxError>;
}

impl<F> QrEncoder for F
where
    F: Fn(&str) -> Result<String, BoxError> + Send + Sync,
{
    fn encode(&self, url: &str) -> Result<String, BoxError> {
        self(url)
    }
}

/// Issues certificates into a [`CertificateStore`].
pub struct Issuer<S, C = SystemClock, R = StdRng> {
    store: S,
    generator: CertificateNumberGenerator<C, R>,
    config: IssuanceConfig,
    base_url: Url,
    qr_encoder: Option<Box<dyn QrEncoder>>,
}

impl<S: CertificateStore> Issuer<S> {
    /// Creates an issuer using the system clock, an OS-seeded RNG, and the
    /// default [`SvgQrEncoder`], so every certificate carries a QR image.
    ///
    /// # Errors
    ///
    /// See [`Issuer::new`].
    pub fn from_config(store: S, config: IssuanceConfig) -> Result<Self, RegistryError> {
        let generator = config.generator.system_generator();
        Ok(Self::new(store, generator, config)?.with_qr_encoder(SvgQrEncoder::default()))
    }
}

impl<S: CertificateStore, C: Clock, R: RngCore> Issuer<S, C, R> {
    /// Creates an issuer from an explicit generator.
    ///
    /// The generator's wall clock is used as given; `config.generator` only
    /// selects the strategy.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Config`] if the configuration fails
    /// validation, or [`RegistryError::InvalidBaseUrl`] if the public host
    /// does not form a URL.
    pub fn new(
        store: S,
        generator: CertificateNumberGenerator<C, R>,
        config: IssuanceConfig,
    ) -> Result<Self, RegistryError> {
        config.validate().context(ConfigSnafu)?;
        let base = config.verification_base_url();
        let base_url = Url::parse(&base).context(InvalidBaseUrlSnafu { base: base.clone() })?;
        Ok(Self { store, generator, config, base_url, qr_encoder: None })
    }

    /// Attaches a QR encoder. Without one, certificates carry no QR image.
    #[must_use]
    pub fn with_qr_encoder(mut self, encoder: impl QrEncoder + 'static) -> Self {
        self.qr_encoder = Some(Box::new(encoder));
        self
    }

    /// Returns the issuance configuration.
    pub fn config(&self) -> &IssuanceConfig {
        &self.config
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Builds the public URL that looks up `number`.
    pub fn verification_url(&self, number: &CertificateNumber) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(VERIFICATION_PATH);
        url.query_pairs_mut().clear().append_pair("id", number.as_str());
        url
    }

    /// Issues a certificate for `form` and stores it.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidForm`] if the form fails validation
    /// - [`RegistryError::SequenceExhausted`] if the year's sequential
    ///   counter passed 9999
    /// - [`RegistryError::QrEncoding`] if the QR encoder fails or returns
    ///   something other than a `data:image/` URI
    /// - [`RegistryError::Duplicate`] if every attempt collided
    /// - [`RegistryError::Storage`] if the store fails
    pub fn issue(&self, form: CertificateForm) -> Result<Certificate, RegistryError> {
        validate_certificate_form(&form).context(InvalidFormSnafu)?;

        let collection = self.config.collection;
        let mut attempts = 0;
        loop {
            attempts += 1;
            let number = self.next_number(&form)?;
            let verification_url = self.verification_url(&number);
            let qr_code_data_uri = self.encode_qr(&verification_url)?;
            let certificate = Certificate {
                id: number.clone(),
                certificate_number: number.clone(),
                details: form.clone(),
                verification_url: verification_url.into(),
                qr_code_data_uri,
            };

            match self.store.insert(collection, certificate.clone()) {
                Ok(()) => {
                    info!(
                        certificate_number = %number,
                        collection = %collection,
                        strategy = ?self.config.generator.strategy,
                        "Issued certificate"
                    );
                    return Ok(certificate);
                },
                Err(StoreError::AlreadyExists { .. }) if attempts < MAX_ISSUE_ATTEMPTS => {
                    warn!(
                        certificate_number = %number,
                        attempt = attempts,
                        "Generated number already issued, retrying"
                    );
                },
                Err(StoreError::AlreadyExists { .. }) => {
                    return DuplicateSnafu { number: number.into_inner(), attempts }.fail();
                },
                Err(source) => return Err(source).context(StorageSnafu),
            }
        }
    }

    fn next_number(&self, form: &CertificateForm) -> Result<CertificateNumber, RegistryError> {
        let strategy = match self.config.generator.strategy {
            StrategyKind::Timestamp => Strategy::Timestamp,
            StrategyKind::Sequential => {
                let year = self.generator.current_year();
                let counter = self.store.next_sequence(year).context(StorageSnafu)?;
                ensure!(counter <= MAX_SEQUENCE, SequenceExhaustedSnafu { year, counter });
                Strategy::Sequential { counter, year: Some(year) }
            },
            StrategyKind::HashBased => {
                Strategy::HashBased { data: Some(form.id_number.clone()) }
            },
        };
        Ok(self.generator.generate(&strategy))
    }

    fn encode_qr(&self, url: &Url) -> Result<Option<String>, RegistryError> {
        let Some(encoder) = &self.qr_encoder else {
            return Ok(None);
        };
        let data_uri = match encoder.encode(url.as_str()) {
            Ok(data_uri) => data_uri,
            Err(e) => return QrEncodingSnafu { message: e.to_string() }.fail(),
        };
        ensure!(
            data_uri.starts_with(DATA_IMAGE_PREFIX),
            QrEncodingSnafu {
                message: format!(
                    "encoder returned a non-image URI starting {:?}",
                    prefix(&data_uri)
                )
            }
        );
        Ok(Some(data_uri))
    }
}

impl<S, C, R> std::fmt::Debug for Issuer<S, C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Issuer")
            .field("config", &self.config)
            .field("base_url", &self.base_url.as_str())
            .field("qr_encoder", &self.qr_encoder.is_some())
            .finish_non_exhaustive()
    }
}

/// First few characters of `value`, for error messages.
fn prefix(value: &str) -> &str {
    value.char_indices().nth(16).map_or(value, |(end, _)| &value[..end])
}
