// src/common/redirect.rs

pub const DEFAULT_REDIRECT: &str = "/home/";

/// Aceita apenas caminhos relativos da própria aplicação.
/// Qualquer outra coisa (URL absoluta, `//host`, barras invertidas,
/// caracteres de controle) cai no destino padrão.
pub fn safe_redirect(target: Option<&str>) -> String {
    let Some(target) = target.map(str::trim).filter(|t| !t.is_empty()) else {
        return DEFAULT_REDIRECT.to_string();
    };

    let same_origin = target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains('\\')
        && !target.chars().any(char::is_control);

    if same_origin {
        target.to_string()
    } else {
        DEFAULT_REDIRECT.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_relative_paths() {
        assert_eq!(safe_redirect(Some("/home/")), "/home/");
        assert_eq!(safe_redirect(Some("/cadastro?q=maria")), "/cadastro?q=maria");
    }

    #[test]
    fn rejects_other_origins() {
        assert_eq!(safe_redirect(Some("https://evil.example/")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("//evil.example/")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("/\\evil.example")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("javascript:alert(1)")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("/home\r\nSet-Cookie: x")), DEFAULT_REDIRECT);
    }

    #[test]
    fn missing_or_blank_uses_default() {
        assert_eq!(safe_redirect(None), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("  ")), DEFAULT_REDIRECT);
    }
}
