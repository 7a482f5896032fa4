// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::common::validation::{
    check_choice, collect, field_error, finish, is_blank, not_blank, single, Campo, MSG_OBRIGATORIO,
};

pub const MSG_SENHAS_DIFERENTES: &str = "As senhas não conferem.";
pub const MSG_USERNAME_EXISTE: &str = "Nome de usuário já existe.";
pub const MSG_USERNAME_EM_USO: &str = "Nome de usuário já está em uso.";

// Conta de acesso de um técnico (tabela usuarios)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: Uuid,
    #[schema(example = "maria.souza")]
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,

    #[serde(skip_serializing)] // nunca sai na API
    #[schema(ignore)]
    pub password_hash: String,

    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Usuario {
    pub fn nome_completo(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "cargo_es", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Cargo {
    ApoioAdmEstagiario,
    AssistenteTecnicoDireito,
    AssistenteTecnicoPedagogo,
    AssistenteTecnicoAssistenteSocial,
    AssistenteTecnicoPsicologo,
    TjApoioAdmEstagiario,
    TjAssistenteTecnicoAssistenteSocial,
    TjAssistenteTecnicoPsicologo,
    GerenciaAdministracao,
}

impl Cargo {
    /// Só a gerência recebe acesso à área administrativa.
    pub fn eleva_staff(&self) -> bool {
        matches!(self, Cargo::GerenciaAdministracao)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Cargo::ApoioAdmEstagiario => "Apoio Administrativo/Estagiário",
            Cargo::AssistenteTecnicoDireito => "Assistente Técnico – Bacharel em Direito",
            Cargo::AssistenteTecnicoPedagogo => "Assistente Técnico – Pedagogo(a)",
            Cargo::AssistenteTecnicoAssistenteSocial => "Assistente Técnico – Assistente Social",
            Cargo::AssistenteTecnicoPsicologo => "Assistente Técnico – Psicólogo(a)",
            Cargo::TjApoioAdmEstagiario => "TJ - Apoio Administrativo/Estagiário",
            Cargo::TjAssistenteTecnicoAssistenteSocial => "TJ - Assistente Técnico – Assistente Social",
            Cargo::TjAssistenteTecnicoPsicologo => "TJ - Assistente Técnico – Psicólogo(a)",
            Cargo::GerenciaAdministracao => "Gerência/Administração",
        }
    }
}

// Perfil 1:1 com a conta (tabela perfis_usuario)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PerfilUsuario {
    pub id: Uuid,
    pub user_id: Uuid,
    pub cargo_es: Option<Cargo>,
}

// Conta + cargo, usado nas telas de administração e de perfil.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioComPerfil {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub usuario: Usuario,
    pub cargo_es: Option<Cargo>,
}

// Estrutura de dados ("claims") dentro do token de sessão
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // ID do usuário
    pub exp: usize, // expiração
    pub iat: usize, // emissão
}

// --- LOGIN ---

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginForm {
    #[schema(example = "maria.souza")]
    pub username: String,
    pub password: String,
    #[schema(example = "/home/")]
    pub redirect: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoginQuery {
    /// Caminho interno para onde voltar após o login
    pub redirect: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginPage {
    #[schema(example = "/home/")]
    pub redirect: String,
}

// --- ADMINISTRAÇÃO ---

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct NovoUsuarioPayload {
    #[validate(
        length(max = 150, message = "Máximo de 150 caracteres."),
        custom(function = "not_blank")
    )]
    #[schema(example = "Maria Souza")]
    pub nome_completo: String,
    #[validate(
        length(max = 150, message = "Máximo de 150 caracteres."),
        custom(function = "not_blank")
    )]
    #[schema(example = "maria.souza")]
    pub username: String,
    #[validate(custom(function = "not_blank"))]
    pub senha: String,
    #[validate(custom(function = "not_blank"))]
    pub senha_confirmacao: String,
    #[validate(email(message = "Informe um endereço de email válido."))]
    pub email: String,
    #[schema(value_type = Option<Cargo>)]
    pub cargo_es: Campo<Cargo>,
}

impl NovoUsuarioPayload {
    /// Valida o formulário (username sem espaços nas pontas) e devolve o cargo.
    /// A unicidade do username é checada depois, no banco.
    pub fn validate_all(&mut self) -> Result<Cargo, ValidationErrors> {
        self.username = self.username.trim().to_string();
        let mut errors = collect(self.validate());

        if !self.senha.is_empty() && !self.senha_confirmacao.is_empty() && self.senha != self.senha_confirmacao {
            errors.add("senha_confirmacao", field_error("senha", MSG_SENHAS_DIFERENTES));
        }

        let cargo = self.cargo_es.valor();
        if self.cargo_es == Campo::Vazio {
            errors.add("cargo_es", field_error("required", MSG_OBRIGATORIO));
        }
        check_choice(&mut errors, "cargo_es", &self.cargo_es);

        finish(errors)?;
        cargo.ok_or_else(|| single("cargo_es", "required", MSG_OBRIGATORIO))
    }
}

/// "Maria da Silva Souza" -> ("Maria", "da Silva Souza"). Vazio limpa os dois.
pub fn split_full_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

// --- PERFIL DO PRÓPRIO USUÁRIO ---

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct PerfilUpdatePayload {
    pub username: String,
    #[schema(example = "Maria Souza")]
    pub full_name: String,
}

impl PerfilUpdatePayload {
    pub fn validate_all(&mut self) -> Result<(), ValidationErrors> {
        self.username = self.username.trim().to_string();
        self.full_name = self.full_name.trim().to_string();

        let mut errors = ValidationErrors::new();
        if is_blank(&self.username) {
            errors.add("username", field_error("required", "Informe o nome de usuário."));
        } else if self.username.chars().count() > 150 {
            errors.add("username", field_error("length", "Máximo de 150 caracteres."));
        }
        finish(errors)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct TrocarSenhaPayload {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl TrocarSenhaPayload {
    /// Regras que não dependem da senha atual (essa é checada no serviço).
    pub fn validate_new(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.new_password.is_empty() {
            errors.add("new_password", field_error("required", "Informe a nova senha."));
        } else if self.new_password != self.confirm_password {
            errors.add("confirm_password", field_error("senha", MSG_SENHAS_DIFERENTES));
        }
        finish(errors)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MensagemResponse {
    #[schema(example = "Senha alterada com sucesso.")]
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn novo(cargo: Option<Cargo>) -> NovoUsuarioPayload {
        NovoUsuarioPayload {
            nome_completo: "Maria da Silva".into(),
            username: "  maria.silva ".into(),
            senha: "segredo123".into(),
            senha_confirmacao: "segredo123".into(),
            email: "maria@example.com".into(),
            cargo_es: cargo.into(),
        }
    }

    #[test]
    fn only_management_is_elevated() {
        assert!(Cargo::GerenciaAdministracao.eleva_staff());
        assert!(!Cargo::AssistenteTecnicoPsicologo.eleva_staff());
        assert!(!Cargo::TjApoioAdmEstagiario.eleva_staff());
    }

    #[test]
    fn new_user_form_trims_username() {
        let mut p = novo(Some(Cargo::GerenciaAdministracao));
        assert_eq!(p.validate_all().unwrap(), Cargo::GerenciaAdministracao);
        assert_eq!(p.username, "maria.silva");
    }

    #[test]
    fn password_confirmation_must_match() {
        let mut p = novo(Some(Cargo::ApoioAdmEstagiario));
        p.senha_confirmacao = "outra".into();
        let errors = p.validate_all().unwrap_err();
        let fields = errors.field_errors();
        let msgs = fields.get("senha_confirmacao").unwrap();
        assert_eq!(msgs[0].message.as_deref(), Some(MSG_SENHAS_DIFERENTES));
    }

    #[test]
    fn new_user_errors_are_collected() {
        let mut p = NovoUsuarioPayload { email: "nope".into(), ..Default::default() };
        let errors = p.validate_all().unwrap_err();
        let fields = errors.field_errors();
        for field in ["nome_completo", "username", "senha", "senha_confirmacao", "email", "cargo_es"] {
            assert!(fields.contains_key(field), "faltou erro em {field}");
        }
    }

    #[test]
    fn unknown_role_is_a_field_error() {
        let mut p: NovoUsuarioPayload =
            serde_json::from_str(r#"{"nome_completo":"","username":"ana","cargo_es":"diretor"}"#).unwrap();
        let errors = p.validate_all().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("nome_completo"));
        assert_eq!(fields["cargo_es"].len(), 1);
        assert_eq!(fields["cargo_es"][0].code, "choice");
    }

    #[test]
    fn full_name_split() {
        assert_eq!(split_full_name("Maria da Silva"), ("Maria".into(), "da Silva".into()));
        assert_eq!(split_full_name("  Ana  "), ("Ana".into(), String::new()));
        assert_eq!(split_full_name(""), (String::new(), String::new()));
    }

    #[test]
    fn password_change_rules() {
        let p = TrocarSenhaPayload { current_password: "a".into(), ..Default::default() };
        assert!(p.validate_new().unwrap_err().field_errors().contains_key("new_password"));

        let p = TrocarSenhaPayload {
            current_password: "a".into(),
            new_password: "nova".into(),
            confirm_password: "outra".into(),
        };
        assert!(p.validate_new().unwrap_err().field_errors().contains_key("confirm_password"));
    }

    #[test]
    fn profile_update_requires_username() {
        let mut p = PerfilUpdatePayload { username: "  ".into(), full_name: "X".into() };
        assert!(p.validate_all().is_err());
    }
}
