// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

const SUPPORTED: &[&str] = &["en", "pt"];

// Idioma do cliente, vindo do Accept-Language
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Locale {
    /// Primeiro idioma suportado do cabeçalho ("pt-BR" -> "pt"); senão inglês.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let lang = headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| {
                accept_language::intersection(raw, SUPPORTED)
                    .into_iter()
                    .next()
                    .or_else(|| {
                        // intersection exige a tag exata; tenta só o idioma base
                        accept_language::parse(raw)
                            .into_iter()
                            .map(|tag| tag.split('-').next().unwrap_or_default().to_lowercase())
                            .find(|base| SUPPORTED.contains(&base.as_str()))
                    })
            })
            .unwrap_or_else(|| "en".to_string());

        Locale(lang)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale("en".to_string())
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Locale::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn locale_for(value: &str) -> String {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_str(value).unwrap());
        Locale::from_headers(&headers).0
    }

    #[test]
    fn picks_base_language() {
        assert_eq!(locale_for("pt-BR,pt;q=0.9,en;q=0.8"), "pt");
        assert_eq!(locale_for("en-US"), "en");
    }

    #[test]
    fn unsupported_or_missing_falls_back_to_english() {
        assert_eq!(locale_for("fr-FR,de;q=0.5"), "en");
        assert_eq!(Locale::from_headers(&HeaderMap::new()).0, "en");
    }
}
