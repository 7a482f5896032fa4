// src/common/validation.rs

use std::borrow::Cow;

use chrono::{Datelike, NaiveDate};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use validator::{ValidationError, ValidationErrors};

pub const MSG_OBRIGATORIO: &str = "Este campo é obrigatório.";
pub const MSG_CPF_INVALIDO: &str = "Informe o CPF no formato 000.000.000-00.";
pub const MSG_DATA_INVALIDA: &str = "Informe a data no formato AAAA-MM-DD.";
pub const MSG_CADASTRO_INEXISTENTE: &str = "Cadastro não encontrado.";

// Faixa de anos que o Postgres e o cálculo de fuso aceitam sem estourar.
const ANO_MINIMO: i32 = 1;
const ANO_MAXIMO: i32 = 9999;

/// Cria um erro de campo com código e mensagem para o usuário.
pub fn field_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Começa a coleta a partir do resultado do `#[derive(Validate)]`,
/// sem interromper nas primeiras falhas.
pub fn collect(result: Result<(), ValidationErrors>) -> ValidationErrors {
    match result {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    }
}

pub fn finish(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Erro de um único campo, para regras checadas fora do formulário
/// (ex.: conflito de unicidade detectado no INSERT).
pub fn single(field: &'static str, code: &'static str, message: &'static str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(field, field_error(code, message));
    errors
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

// Usado pelo validator: `#[validate(custom(function = "not_blank"))]`
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if is_blank(value) {
        return Err(field_error("required", MSG_OBRIGATORIO));
    }
    Ok(())
}

/// Normaliza o CPF para `000.000.000-00`.
/// Vazio continua vazio; qualquer coisa que não tenha 11 dígitos é rejeitada.
pub fn normalize_cpf(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 11 {
        return Err(field_error("cpf", MSG_CPF_INVALIDO));
    }

    Ok(format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    ))
}

/// Monta o padrão de busca "contém" para ILIKE, escapando os curingas do usuário.
pub fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Campos de texto opcionais chegam como `Option<String>`; vazio vira `None`.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn data_aceita(date: NaiveDate) -> bool {
    (ANO_MINIMO..=ANO_MAXIMO).contains(&date.year())
}

/// Data opcional vinda da query string (AAAA-MM-DD). Formato errado ou
/// ano fora de 1..=9999 vira erro no campo; vazio é `None`.
pub fn parse_date_field(errors: &mut ValidationErrors, field: &'static str, raw: Option<&str>) -> Option<NaiveDate> {
    let raw = non_empty(raw)?;
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) if data_aceita(date) => Some(date),
        _ => {
            errors.add(field, field_error("date", MSG_DATA_INVALIDA));
            None
        }
    }
}

/// Campo de escolha (ou data) vindo no corpo JSON. Um valor fora da lista
/// não derruba a desserialização do formulário inteiro: fica guardado como
/// `Invalido` e vira erro no próprio campo durante a validação.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Campo<T> {
    Vazio,
    Valor(T),
    Invalido(String),
}

impl<T> Default for Campo<T> {
    fn default() -> Self {
        Campo::Vazio
    }
}

impl<T: Copy> Campo<T> {
    pub fn valor(&self) -> Option<T> {
        match self {
            Campo::Valor(v) => Some(*v),
            Campo::Vazio | Campo::Invalido(_) => None,
        }
    }
}

impl<T> From<Option<T>> for Campo<T> {
    fn from(valor: Option<T>) -> Self {
        valor.map_or(Campo::Vazio, Campo::Valor)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Campo<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // null e "" contam como não preenchido, como num <select> vazio
        let valor = match Value::deserialize(deserializer)? {
            Value::Null => return Ok(Campo::Vazio),
            Value::String(s) if s.trim().is_empty() => return Ok(Campo::Vazio),
            Value::String(s) => Value::String(s.trim().to_string()),
            outro => outro,
        };
        Ok(match serde_json::from_value::<T>(valor.clone()) {
            Ok(v) => Campo::Valor(v),
            Err(_) => Campo::Invalido(match valor {
                Value::String(s) => s,
                outro => outro.to_string(),
            }),
        })
    }
}

impl<T: Serialize> Serialize for Campo<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Campo::Vazio => serializer.serialize_none(),
            Campo::Valor(v) => v.serialize(serializer),
            Campo::Invalido(bruto) => serializer.serialize_str(bruto),
        }
    }
}

fn msg_escolha_invalida(bruto: &str) -> String {
    format!("Faça uma escolha válida. {bruto} não é uma das escolhas disponíveis.")
}

/// Registra o erro de um campo de escolha preenchido com valor desconhecido.
pub fn check_choice<T>(errors: &mut ValidationErrors, field: &'static str, campo: &Campo<T>) {
    if let Campo::Invalido(bruto) = campo {
        errors.add(field, field_error("choice", msg_escolha_invalida(bruto)));
    }
}

/// Data no corpo JSON: formato errado ou ano fora da faixa viram erro no campo.
pub fn check_date(errors: &mut ValidationErrors, field: &'static str, campo: &Campo<NaiveDate>) {
    let valida = match campo {
        Campo::Vazio => true,
        Campo::Valor(date) => data_aceita(*date),
        Campo::Invalido(_) => false,
    };
    if !valida {
        errors.add(field, field_error("date", MSG_DATA_INVALIDA));
    }
}

/// Lista de escolhas (checklist): cada valor desconhecido vira uma mensagem
/// no campo. Devolve só os valores válidos.
pub fn check_choices<T: Copy>(errors: &mut ValidationErrors, field: &'static str, campos: &[Campo<T>]) -> Vec<T> {
    let mut validos = Vec::with_capacity(campos.len());
    for campo in campos {
        match campo {
            Campo::Valor(v) => validos.push(*v),
            Campo::Vazio => {}
            Campo::Invalido(bruto) => errors.add(field, field_error("choice", msg_escolha_invalida(bruto))),
        }
    }
    validos
}

/// Valores válidos de uma lista já conferida, prontos para gravar.
pub fn valores<T: Copy>(campos: &[Campo<T>]) -> Vec<T> {
    campos.iter().filter_map(Campo::valor).collect()
}

/// Troca as chaves dos erros pelos nomes que o cliente envia no JSON
/// (`cpf_numero` -> `cpfNumero`), para formulários em camelCase.
pub fn em_camel_case(errors: ValidationErrors) -> ValidationErrors {
    ValidationErrors(
        errors
            .0
            .into_iter()
            .map(|(campo, erros)| (Cow::Owned(camel_case(&campo)), erros))
            .collect(),
    )
}

fn camel_case(campo: &str) -> String {
    let mut saida = String::with_capacity(campo.len());
    let mut maiuscula = false;
    for c in campo.chars() {
        if c == '_' {
            maiuscula = true;
        } else if maiuscula {
            saida.extend(c.to_uppercase());
            maiuscula = false;
        } else {
            saida.push(c);
        }
    }
    saida
}

/// `finish` para formulários JSON em camelCase.
pub fn finish_camel_case(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    finish(errors).map_err(em_camel_case)
}

/// Junta a checagem do vínculo explícito (`cadastro_id` existe?) aos
/// demais erros do formulário.
pub fn with_link_check<T>(result: Result<T, ValidationErrors>, link_ok: bool) -> Result<T, ValidationErrors> {
    if link_ok {
        return result;
    }
    let mut errors = result.err().unwrap_or_default();
    // os formulários com vínculo são camelCase
    errors.add("cadastroId", field_error("exists", MSG_CADASTRO_INEXISTENTE));
    Err(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpf_is_reformatted_from_any_punctuation() {
        assert_eq!(normalize_cpf("12345678901").unwrap(), "123.456.789-01");
        assert_eq!(normalize_cpf(" 123.456.789-01 ").unwrap(), "123.456.789-01");
        assert_eq!(normalize_cpf("123 456 789 01").unwrap(), "123.456.789-01");
    }

    #[test]
    fn cpf_blank_is_kept_blank() {
        assert_eq!(normalize_cpf("").unwrap(), "");
        assert_eq!(normalize_cpf("   ").unwrap(), "");
    }

    #[test]
    fn cpf_with_wrong_digit_count_is_rejected() {
        let err = normalize_cpf("123.456.789-0").unwrap_err();
        assert_eq!(err.message.as_deref(), Some(MSG_CPF_INVALIDO));
        assert!(normalize_cpf("123456789012").is_err());
        assert!(normalize_cpf("abc").is_err());
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("maria"), "%maria%");
        assert_eq!(like_pattern("50%_a"), "%50\\%\\_a%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn collect_and_finish() {
        let mut errors = collect(Ok(()));
        assert!(finish(errors.clone()).is_ok());
        errors.add("nome", field_error("required", MSG_OBRIGATORIO));
        assert!(finish(errors).is_err());
    }

    #[test]
    fn non_empty_trims() {
        assert_eq!(non_empty(Some("  x ")), Some("x"));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn dates_are_parsed_or_flagged() {
        let mut errors = ValidationErrors::new();
        assert_eq!(
            parse_date_field(&mut errors, "data", Some("2024-05-10")),
            NaiveDate::from_ymd_opt(2024, 5, 10)
        );
        assert_eq!(parse_date_field(&mut errors, "data", Some("")), None);
        assert!(errors.is_empty());

        assert_eq!(parse_date_field(&mut errors, "data", Some("10/05/2024")), None);
        assert!(errors.field_errors().contains_key("data"));
    }

    #[test]
    fn missing_link_joins_the_other_errors() {
        assert_eq!(with_link_check(Ok(1), true).unwrap(), 1);
        assert!(with_link_check(Ok(1), false).unwrap_err().field_errors().contains_key("cadastroId"));

        let errors = with_link_check::<()>(Err(single("nome", "required", MSG_OBRIGATORIO)), false).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("nome"));
        assert!(fields.contains_key("cadastroId"));
    }

    #[test]
    fn dates_outside_years_1_to_9999_are_flagged() {
        let mut errors = ValidationErrors::new();
        assert_eq!(parse_date_field(&mut errors, "data_inicio", Some("-262143-01-01")), None);
        assert_eq!(parse_date_field(&mut errors, "data_fim", Some("+10000-01-01")), None);
        let fields = errors.field_errors();
        assert!(fields.contains_key("data_inicio"));
        assert!(fields.contains_key("data_fim"));

        let mut errors = ValidationErrors::new();
        assert!(parse_date_field(&mut errors, "data", Some("9999-12-31")).is_some());
        assert!(parse_date_field(&mut errors, "data", Some("0001-01-01")).is_some());
        assert!(errors.is_empty());
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum Cor {
        Azul,
        Verde,
    }

    #[test]
    fn campo_keeps_unknown_values_instead_of_failing() {
        let campos: Vec<Campo<Cor>> = serde_json::from_str(r#"["azul", " verde ", "roxo", "", null, 7]"#).unwrap();
        assert_eq!(
            campos,
            vec![
                Campo::Valor(Cor::Azul),
                Campo::Valor(Cor::Verde),
                Campo::Invalido("roxo".into()),
                Campo::Vazio,
                Campo::Vazio,
                Campo::Invalido("7".into()),
            ]
        );

        let mut errors = ValidationErrors::new();
        let validos = check_choices(&mut errors, "cores", &campos);
        assert_eq!(validos, vec![Cor::Azul, Cor::Verde]);
        assert_eq!(errors.field_errors()["cores"].len(), 2);
    }

    #[test]
    fn body_dates_are_checked_per_field() {
        let mut errors = ValidationErrors::new();
        let ok: Campo<NaiveDate> = serde_json::from_str(r#""2024-05-10""#).unwrap();
        let ruim: Campo<NaiveDate> = serde_json::from_str(r#""10/05/2024""#).unwrap();
        let longe = Campo::Valor(NaiveDate::from_ymd_opt(12000, 1, 1).unwrap());
        check_date(&mut errors, "data_nascimento", &ok);
        assert!(errors.is_empty());
        check_date(&mut errors, "data_nascimento", &ruim);
        check_date(&mut errors, "data_cadastro", &longe);
        assert!(errors.field_errors().contains_key("data_nascimento"));
        assert!(errors.field_errors().contains_key("data_cadastro"));
    }

    #[test]
    fn camel_case_keys_follow_the_wire_names() {
        let mut errors = ValidationErrors::new();
        errors.add("perfil_referencia_pre_egresso", field_error("perfil", "x"));
        errors.add("nome", field_error("required", MSG_OBRIGATORIO));
        let errors = em_camel_case(errors);
        let fields = errors.field_errors();
        assert!(fields.contains_key("perfilReferenciaPreEgresso"));
        assert!(fields.contains_key("nome"));
        assert_eq!(fields.len(), 2);
    }
}
