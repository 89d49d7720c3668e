// User-visible strings produced by the core itself. Everything else is translated by the shell.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    /// Accepts BCP 47-ish tags (`es`, `es-MX`, `es_AR`); anything unknown falls back to English.
    pub fn from_tag(tag: &str) -> Locale {
        let lang = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match lang.as_str() {
            "es" => Locale::Es,
            _ => Locale::En,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Message {
    ConnectionNameRequired,
    ConnectionCreateFailed,
    WalletUnavailable,
    WalletStorageFailed,
    InvalidCallbackScheme,
    ConnectionNotFound,
    UnsupportedConnectionUri,
    NoUriHandler,
    ConfigReloaded,
}

pub fn t(locale: Locale, msg: Message) -> &'static str {
    match locale {
        Locale::En => en(msg),
        Locale::Es => es(msg),
    }
}

fn en(msg: Message) -> &'static str {
    match msg {
        Message::ConnectionNameRequired => "Name cannot be empty",
        Message::ConnectionCreateFailed => "Failed to create Wallet Connection",
        Message::WalletUnavailable => "Wallet is not ready yet",
        Message::WalletStorageFailed => "Wallet storage error",
        Message::InvalidCallbackScheme => "The requesting app sent an invalid callback",
        Message::ConnectionNotFound => "Connection not found",
        Message::UnsupportedConnectionUri => "This connection can't be opened in that app",
        Message::NoUriHandler => "No app available to open this link",
        Message::ConfigReloaded => "Config reloaded",
    }
}

fn es(msg: Message) -> &'static str {
    match msg {
        Message::ConnectionNameRequired => "El nombre no puede estar vacío",
        Message::ConnectionCreateFailed => "No se pudo crear la conexión de billetera",
        Message::WalletUnavailable => "La billetera aún no está lista",
        Message::WalletStorageFailed => "Error de almacenamiento de la billetera",
        Message::InvalidCallbackScheme => "La app solicitante envió un callback inválido",
        Message::ConnectionNotFound => "Conexión no encontrada",
        Message::UnsupportedConnectionUri => "Esta conexión no se puede abrir en esa app",
        Message::NoUriHandler => "No hay ninguna app para abrir este enlace",
        Message::ConfigReloaded => "Configuración recargada",
    }
}
