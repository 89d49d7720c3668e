use url::Url;

use crate::{split_scheme, UriError, NWC_SCHEME};

/// Parsed `nostr+walletconnect://<wallet-pubkey>?relay=...&secret=...[&lud16=...]`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NwcConnectionUri {
    /// Hex x-only pubkey of the wallet service.
    pub wallet_pubkey: String,
    pub relays: Vec<String>,
    /// Hex secret the client signs its requests with.
    pub secret: String,
    pub lud16: Option<String>,
}

impl NwcConnectionUri {
    pub fn new(
        wallet_pubkey: impl Into<String>,
        relay: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            wallet_pubkey: wallet_pubkey.into(),
            relays: vec![relay.into()],
            secret: secret.into(),
            lud16: None,
        }
    }

    pub fn parse(uri: &str) -> Result<Self, UriError> {
        let (scheme, _) = split_scheme(uri)?;
        if !scheme.eq_ignore_ascii_case(NWC_SCHEME) {
            return Err(UriError::UnexpectedScheme {
                expected: NWC_SCHEME.to_string(),
                found: scheme.to_string(),
            });
        }
        let url = Url::parse(uri).map_err(|e| UriError::Malformed(e.to_string()))?;

        let wallet_pubkey = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or(UriError::MissingField("wallet pubkey"))?
            .to_string();
        check_hex32(&wallet_pubkey, "wallet pubkey")?;

        let mut relays = Vec::new();
        let mut secret = None;
        let mut lud16 = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "relay" => relays.push(value.into_owned()),
                "secret" => secret = Some(value.into_owned()),
                "lud16" => lud16 = Some(value.into_owned()),
                _ => {}
            }
        }
        if relays.is_empty() {
            return Err(UriError::MissingField("relay"));
        }
        let secret = secret.ok_or(UriError::MissingField("secret"))?;
        check_hex32(&secret, "secret")?;

        Ok(Self {
            wallet_pubkey,
            relays,
            secret,
            lud16,
        })
    }

    pub fn to_uri_string(&self) -> Result<String, UriError> {
        let mut url = Url::parse(&format!("{NWC_SCHEME}://{}", self.wallet_pubkey))
            .map_err(|e| UriError::Malformed(e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            for relay in &self.relays {
                query.append_pair("relay", relay);
            }
            query.append_pair("secret", &self.secret);
            if let Some(lud16) = &self.lud16 {
                query.append_pair("lud16", lud16);
            }
        }
        Ok(url.to_string())
    }

    pub fn primary_relay(&self) -> Option<&str> {
        self.relays.first().map(String::as_str)
    }
}

fn check_hex32(value: &str, field: &'static str) -> Result<(), UriError> {
    match hex::decode(value) {
        Ok(bytes) if bytes.len() == 32 => Ok(()),
        _ => Err(UriError::Malformed(format!("{field} is not 32 bytes of hex"))),
    }
}
