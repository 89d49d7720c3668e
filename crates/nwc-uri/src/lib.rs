mod connection;

pub use connection::NwcConnectionUri;

/// Scheme every canonical Nostr Wallet Connect URI starts with.
pub const NWC_SCHEME: &str = "nostr+walletconnect";
pub const SCHEME_SEPARATOR: &str = "://";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UriError {
    #[error("uri has no scheme")]
    MissingScheme,
    #[error("invalid uri scheme: {0:?}")]
    InvalidScheme(String),
    #[error("unexpected uri scheme: expected {expected}, got {found}")]
    UnexpectedScheme { expected: String, found: String },
    #[error("malformed connection uri: {0}")]
    Malformed(String),
    #[error("connection uri is missing {0}")]
    MissingField(&'static str),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClientTargetId {
    Generic,
    Primal,
}

/// An application a connection URI can be handed to.
///
/// `scheme: None` means the app registers for the canonical NWC scheme and receives the URI
/// untouched.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClientTarget {
    pub id: ClientTargetId,
    pub name: &'static str,
    pub scheme: Option<&'static str>,
}

impl ClientTarget {
    pub fn external_uri(self, uri: &str) -> Result<String, UriError> {
        match self.scheme {
            None => Ok(uri.to_string()),
            Some(scheme) => rewrite_scheme(uri, NWC_SCHEME, scheme),
        }
    }
}

pub const GENERIC_NOSTR_CLIENT: ClientTarget = ClientTarget {
    id: ClientTargetId::Generic,
    name: "nostr-client",
    scheme: None,
};

pub const PRIMAL: ClientTarget = ClientTarget {
    id: ClientTargetId::Primal,
    name: "primal",
    scheme: Some("primal"),
};

pub fn client_target(id: ClientTargetId) -> ClientTarget {
    match id {
        ClientTargetId::Generic => GENERIC_NOSTR_CLIENT,
        ClientTargetId::Primal => PRIMAL,
    }
}

/// RFC 3986: `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
pub fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Split `scheme://remainder` at the first separator. The remainder is returned verbatim.
pub fn split_scheme(uri: &str) -> Result<(&str, &str), UriError> {
    let Some((scheme, remainder)) = uri.split_once(SCHEME_SEPARATOR) else {
        return Err(UriError::MissingScheme);
    };
    if !is_valid_scheme(scheme) {
        return Err(UriError::InvalidScheme(scheme.to_string()));
    }
    Ok((scheme, remainder))
}

/// Replace the leading `from` scheme of `uri` with `to`. Only the scheme token changes; an
/// occurrence of `from` further along the URI (e.g. inside a query value) is left alone.
pub fn rewrite_scheme(uri: &str, from: &str, to: &str) -> Result<String, UriError> {
    if !is_valid_scheme(to) {
        return Err(UriError::InvalidScheme(to.to_string()));
    }
    let (scheme, remainder) = split_scheme(uri)?;
    if !scheme.eq_ignore_ascii_case(from) {
        return Err(UriError::UnexpectedScheme {
            expected: from.to_string(),
            found: scheme.to_string(),
        });
    }
    Ok(format!("{to}{SCHEME_SEPARATOR}{remainder}"))
}

/// Callers sometimes pass `myapp:` or `myapp://` instead of the bare scheme.
pub fn normalize_callback_scheme(raw: &str) -> Result<String, UriError> {
    let trimmed = raw.trim();
    let bare = trimmed
        .strip_suffix(SCHEME_SEPARATOR)
        .or_else(|| trimmed.strip_suffix(':'))
        .unwrap_or(trimmed);
    if !is_valid_scheme(bare) {
        return Err(UriError::InvalidScheme(raw.to_string()));
    }
    Ok(bare.to_string())
}

/// Redirect URI handed back to the app that asked for a connection: the canonical NWC URI with
/// its scheme swapped for the app's callback scheme.
pub fn callback_redirect(nwc_uri: &str, callback_scheme: &str) -> Result<String, UriError> {
    let scheme = normalize_callback_scheme(callback_scheme)?;
    rewrite_scheme(nwc_uri, NWC_SCHEME, &scheme)
}
