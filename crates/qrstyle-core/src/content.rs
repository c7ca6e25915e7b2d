//! Модуль формирования полезной нагрузки QR-кода
//!
//! Каждый режим контента превращается в строку по своей мини-грамматике:
//! - URL и текст передаются как есть (после trim)
//! - `mailto:`, `tel:`, `SMSTO:`, `WIFI:`
//! - ссылки WhatsApp, Google Maps и профили соцсетей
//!
//! Пустые обязательные поля дают `None`: это сигнал «рисовать пока нечего», а не ошибка.

use serde::{Deserialize, Serialize};

/// Тип защиты Wi-Fi сети
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum WifiSecurity {
    #[default]
    #[serde(rename = "WPA", alias = "wpa")]
    Wpa,
    #[serde(rename = "WEP", alias = "wep")]
    Wep,
    #[serde(rename = "nopass", alias = "none")]
    NoPass,
}

impl WifiSecurity {
    pub fn token(&self) -> &'static str {
        match self {
            WifiSecurity::Wpa => "WPA",
            WifiSecurity::Wep => "WEP",
            WifiSecurity::NoPass => "nopass",
        }
    }
}

/// Социальная сеть для режима «профиль»
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SocialNetwork {
    Instagram,
    Facebook,
    Tiktok,
    X,
    Linkedin,
}

impl SocialNetwork {
    /// Домен, по которому распознаётся частично введённый URL
    fn domain(&self) -> &'static str {
        match self {
            SocialNetwork::Instagram => "instagram.com",
            SocialNetwork::Facebook => "facebook.com",
            SocialNetwork::Tiktok => "tiktok.com",
            SocialNetwork::X => "x.com",
            SocialNetwork::Linkedin => "linkedin.com",
        }
    }

    /// Префикс профиля для «голого» хэндла
    fn profile_base(&self) -> &'static str {
        match self {
            SocialNetwork::Instagram => "https://instagram.com/",
            SocialNetwork::Facebook => "https://facebook.com/",
            SocialNetwork::Tiktok => "https://www.tiktok.com/@",
            SocialNetwork::X => "https://x.com/",
            SocialNetwork::Linkedin => "https://www.linkedin.com/in/",
        }
    }
}

/// Контент, который пользователь хочет закодировать
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum EncodableContent {
    Url {
        url: String,
    },
    Text {
        text: String,
    },
    Email {
        address: String,
        #[serde(default)]
        subject: String,
        #[serde(default)]
        body: String,
    },
    Phone {
        number: String,
    },
    Sms {
        number: String,
        #[serde(default)]
        message: String,
    },
    Wifi {
        ssid: String,
        #[serde(default)]
        password: String,
        #[serde(default)]
        security: WifiSecurity,
    },
    Location {
        query: String,
    },
    Whatsapp {
        number: String,
        #[serde(default)]
        message: String,
    },
    Social {
        network: SocialNetwork,
        handle: String,
    },
}

impl Default for EncodableContent {
    fn default() -> Self {
        EncodableContent::Url { url: String::new() }
    }
}

impl EncodableContent {
    /// Заполнены ли обязательные поля
    pub fn is_complete(&self) -> bool {
        self.encode().is_some()
    }

    /// Построение строки для матричного кодировщика
    pub fn encode(&self) -> Option<String> {
        match self {
            EncodableContent::Url { url } => non_empty(url).map(str::to_string),
            EncodableContent::Text { text } => non_empty(text).map(str::to_string),
            EncodableContent::Email { address, subject, body } => {
                let address = non_empty(address)?;
                let mut params = Vec::new();
                if let Some(subject) = non_empty(subject) {
                    params.push(format!("subject={}", urlencoding::encode(subject)));
                }
                if let Some(body) = non_empty(body) {
                    params.push(format!("body={}", urlencoding::encode(body)));
                }
                if params.is_empty() {
                    Some(format!("mailto:{}", address))
                } else {
                    Some(format!("mailto:{}?{}", address, params.join("&")))
                }
            }
            EncodableContent::Phone { number } => non_empty(number).map(|n| format!("tel:{}", n)),
            EncodableContent::Sms { number, message } => {
                let number = non_empty(number)?;
                Some(match non_empty(message) {
                    Some(message) => format!("SMSTO:{}:{}", number, message),
                    None => format!("SMSTO:{}", number),
                })
            }
            EncodableContent::Wifi { ssid, password, security } => {
                let ssid = non_empty(ssid)?;
                let mut payload = format!("WIFI:T:{};S:{};", security.token(), escape_wifi_field(ssid));
                if *security != WifiSecurity::NoPass {
                    if let Some(password) = non_empty(password) {
                        payload.push_str(&format!("P:{};", escape_wifi_field(password)));
                    }
                }
                payload.push(';');
                Some(payload)
            }
            EncodableContent::Location { query } => non_empty(query).map(|q| {
                format!(
                    "https://www.google.com/maps/search/?api=1&query={}",
                    urlencoding::encode(q)
                )
            }),
            EncodableContent::Whatsapp { number, message } => {
                let number = non_empty(number)?;
                let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
                let base = format!("https://wa.me/{}", digits);
                Some(match non_empty(message) {
                    Some(message) => format!("{}?text={}", base, urlencoding::encode(message)),
                    None => base,
                })
            }
            EncodableContent::Social { network, handle } => {
                non_empty(handle).map(|h| normalize_profile(*network, h))
            }
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Хэндл или частичный URL -> полный `https://` URL профиля
fn normalize_profile(network: SocialNetwork, value: &str) -> String {
    let lower = value.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return value.to_string();
    }

    let domain = network.domain();
    let bare = value.trim_start_matches('/');
    let bare_lower = bare.to_lowercase();
    if bare_lower.starts_with(domain) || bare_lower.starts_with(&format!("www.{}", domain)) {
        return format!("https://{}", bare);
    }

    let handle = bare.trim_start_matches('@');
    format!("{}{}", network.profile_base(), handle)
}

/// Экранирование зарезервированных символов формата WIFI: (`\`, `;`, `,`, `"`, `:`)
fn escape_wifi_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if matches!(c, '\\' | ';' | ',' | '"' | ':') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wifi(ssid: &str, password: &str, security: WifiSecurity) -> EncodableContent {
        EncodableContent::Wifi {
            ssid: ssid.to_string(),
            password: password.to_string(),
            security,
        }
    }

    #[test]
    fn test_wifi_grammar() {
        assert_eq!(
            wifi("Home", "secret", WifiSecurity::Wpa).encode().as_deref(),
            Some("WIFI:T:WPA;S:Home;P:secret;;")
        );
        assert_eq!(
            wifi("Guest", "", WifiSecurity::NoPass).encode().as_deref(),
            Some("WIFI:T:nopass;S:Guest;;")
        );
        // nopass ignores a stale password left in the form
        assert_eq!(
            wifi("Guest", "old", WifiSecurity::NoPass).encode().as_deref(),
            Some("WIFI:T:nopass;S:Guest;;")
        );
        assert_eq!(wifi("  ", "secret", WifiSecurity::Wpa).encode(), None);
    }

    #[test]
    fn test_wifi_escaping() {
        assert_eq!(
            wifi("Cafe;Bar", "a\\b", WifiSecurity::Wep).encode().as_deref(),
            Some("WIFI:T:WEP;S:Cafe\\;Bar;P:a\\\\b;;")
        );
    }

    #[test]
    fn test_email_grammar() {
        let plain = EncodableContent::Email {
            address: " hi@example.com ".into(),
            subject: String::new(),
            body: "  ".into(),
        };
        assert_eq!(plain.encode().as_deref(), Some("mailto:hi@example.com"));

        let full = EncodableContent::Email {
            address: "hi@example.com".into(),
            subject: "Hello there".into(),
            body: "a&b".into(),
        };
        assert_eq!(
            full.encode().as_deref(),
            Some("mailto:hi@example.com?subject=Hello%20there&body=a%26b")
        );

        let body_only = EncodableContent::Email {
            address: "hi@example.com".into(),
            subject: String::new(),
            body: "x".into(),
        };
        assert_eq!(body_only.encode().as_deref(), Some("mailto:hi@example.com?body=x"));
    }

    #[test]
    fn test_phone_and_sms() {
        let phone = EncodableContent::Phone { number: " +44 7000 ".into() };
        assert_eq!(phone.encode().as_deref(), Some("tel:+44 7000"));

        let sms = EncodableContent::Sms { number: "123".into(), message: String::new() };
        assert_eq!(sms.encode().as_deref(), Some("SMSTO:123"));

        let sms = EncodableContent::Sms { number: "123".into(), message: " hi ".into() };
        assert_eq!(sms.encode().as_deref(), Some("SMSTO:123:hi"));
    }

    #[test]
    fn test_whatsapp_and_location() {
        let wa = EncodableContent::Whatsapp {
            number: "+44 (706) 123-45".into(),
            message: "Hi there!".into(),
        };
        assert_eq!(wa.encode().as_deref(), Some("https://wa.me/4470612345?text=Hi%20there%21"));

        let loc = EncodableContent::Location { query: "Big Ben, London".into() };
        assert_eq!(
            loc.encode().as_deref(),
            Some("https://www.google.com/maps/search/?api=1&query=Big%20Ben%2C%20London")
        );
    }

    #[test]
    fn test_social_normalization() {
        let social = |network, handle: &str| EncodableContent::Social {
            network,
            handle: handle.to_string(),
        };

        assert_eq!(
            social(SocialNetwork::Instagram, "@kompi").encode().as_deref(),
            Some("https://instagram.com/kompi")
        );
        assert_eq!(
            social(SocialNetwork::Facebook, "facebook.com/kompi").encode().as_deref(),
            Some("https://facebook.com/kompi")
        );
        assert_eq!(
            social(SocialNetwork::Facebook, "http://fb.me/x").encode().as_deref(),
            Some("http://fb.me/x")
        );
        assert_eq!(
            social(SocialNetwork::Tiktok, "kompi").encode().as_deref(),
            Some("https://www.tiktok.com/@kompi")
        );
        assert_eq!(social(SocialNetwork::X, " ").encode(), None);
    }

    #[test]
    fn test_url_and_text_trim() {
        let url = EncodableContent::Url { url: "  https://example.com  ".into() };
        assert_eq!(url.encode().as_deref(), Some("https://example.com"));
        assert!(!EncodableContent::Text { text: "\n\t".into() }.is_complete());
        assert!(!EncodableContent::default().is_complete());
    }

    #[test]
    fn test_deserialize_tagged() {
        let json = r#"{"mode":"wifi","ssid":"Home","password":"secret","security":"WPA"}"#;
        let content: EncodableContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.encode().as_deref(), Some("WIFI:T:WPA;S:Home;P:secret;;"));

        let json = r#"{"mode":"social","network":"instagram","handle":"kompi"}"#;
        let content: EncodableContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.encode().as_deref(), Some("https://instagram.com/kompi"));
    }
}
