//! Helpers to construct the provider the permission contracts are bound on.

use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::{DynProvider, Provider, ProviderBuilder as AlloyProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use eyre::{Result, WrapErr};
use url::Url;

/// Constructs a provider for `url` without a signer.
pub fn try_get_http_provider(url: impl AsRef<str>) -> Result<DynProvider> {
    ProviderBuilder::new(url.as_ref()).build()
}

/// Helper type to construct a [`DynProvider`].
#[derive(Debug)]
pub struct ProviderBuilder {
    // Note: this is a result, so we can easily chain builder calls
    url: Result<Url>,
    signer: Option<PrivateKeySigner>,
}

impl ProviderBuilder {
    /// Creates a new builder instance
    pub fn new(url_str: &str) -> Self {
        // non-prefixed URL scheme is not allowed, so we prepend the default http prefix
        let url_str = if url_str.starts_with("localhost:") {
            format!("http://{url_str}")
        } else {
            url_str.to_string()
        };

        let url = Url::parse(&url_str).wrap_err_with(|| format!("invalid provider URL: {url_str:?}"));
        Self { url, signer: None }
    }

    /// Signs transactions with `signer`.
    pub fn signer(mut self, signer: PrivateKeySigner) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn maybe_signer(mut self, signer: Option<PrivateKeySigner>) -> Self {
        self.signer = signer.or(self.signer);
        self
    }

    /// Address transactions are sent from, if a signer is set.
    pub fn sender(&self) -> Option<Address> {
        self.signer.as_ref().map(|signer| signer.address())
    }

    /// Constructs the provider taking all configs into account.
    pub fn build(self) -> Result<DynProvider> {
        let Self { url, signer } = self;
        let url = url?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => eyre::bail!("unsupported provider URL scheme {scheme:?}, expected http(s)"),
        }

        trace!(%url, signer = ?signer.as_ref().map(|s| s.address()), "building provider");
        let provider = match signer {
            Some(signer) => AlloyProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect_http(url)
                .erased(),
            None => AlloyProviderBuilder::new().connect_http(url).erased(),
        };
        Ok(provider)
    }
}

/// Parses a hex private key, with or without `0x` prefix.
pub fn parse_private_key(key: &str) -> Result<PrivateKeySigner> {
    key.trim().parse().wrap_err("invalid private key")
}
