// src/models/cadastro.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationErrors};

use crate::common::validation::{
    check_choice, check_choices, check_date, collect, field_error, finish_camel_case, is_blank, not_blank, valores,
    Campo,
};
use crate::models::documento::{normalize_set, Documento, DocumentoAusente};
use crate::models::familiar::Familiar;

// --- ENUMS (mapeiam os CREATE TYPE da migration) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "cadastro_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CadastroStatus {
    #[default]
    Ativo,
    Arquivado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sexo_biologico", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SexoBiologico {
    Masculino,
    Feminino,
    Intersexo,
    NaoInformado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "identidade_genero", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IdentidadeGenero {
    MulherCis,
    HomemCis,
    MulherTrans,
    HomemTrans,
    NaoBinario,
    Outro,
    NaoInformado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "identidade_sexual", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IdentidadeSexual {
    Heterossexual,
    Homossexual,
    Bissexual,
    Assexual,
    Outro,
    NaoInformado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "religiao", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Religiao {
    Cristao,
    Catolica,
    Evangelica,
    Espirita,
    Umbanda,
    Candomble,
    Outra,
    NaoPossui,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "etnia", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Etnia {
    Branca,
    Preta,
    Parda,
    Amarela,
    Indigena,
    NaoInformado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "estado_civil", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EstadoCivil {
    Solteiro,
    Casado,
    UniaoEstavel,
    Divorciado,
    Viuvo,
    NaoInformado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_ocupacional", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatusOcupacional {
    Desempregado,
    SemInformacao,
    TrabalhandoNmEs,
    TrabalhandoOcupado,
    ImpedidoIndisponivel,
    JaTrabalhouNmEs,
    Outro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "grau_instrucao", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GrauInstrucao {
    NaoInformado,
    FundamentalIncompleto,
    FundamentalCompleto,
    MedioIncompleto,
    MedioCompleto,
    SuperiorIncompleto,
    SuperiorCompleto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sim_nao", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SimNao {
    Sim,
    Nao,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "cnh_categoria", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CnhCategoria {
    Acc,
    A,
    B,
    C,
    D,
    E,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "procedencia", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Procedencia {
    UnidadePrisional,
    Encaminhamento,
    BuscaEspontanea,
    Outro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "encaminhamento", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Encaminhamento {
    PoliticaPublica,
    MercadoTrabalho,
    CursosCapacitacoes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "zona_cidade", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ZonaCidade {
    Norte,
    Sul,
    Leste,
    Oeste,
    Rural,
}

// --- CADASTRO (tabela cadastros) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cadastro {
    pub id: Uuid,

    // Dados pessoais
    #[schema(example = "Maria Silva")]
    pub nome: String,
    pub nome_social: String,
    pub sexo_biologico: Option<SexoBiologico>,
    pub identidade_genero: Option<IdentidadeGenero>,
    pub identidade_sexual: Option<IdentidadeSexual>,
    pub pessoa_transexual: bool,

    // Dados complementares
    pub data_nascimento: Option<NaiveDate>,
    pub naturalidade: String,
    pub data_cadastro: NaiveDate,
    pub religiao: Option<Religiao>,
    pub religiao_desde_quando: String,
    pub identidade_etnico_racial: Option<Etnia>,
    pub estado_civil: Option<EstadoCivil>,
    pub nome_mae: String,
    pub nome_pai: String,
    pub status_ocupacional: Option<StatusOcupacional>,
    pub grau_instrucao: Option<GrauInstrucao>,
    pub serie_concluida: String,
    pub fez_ensino_superior: Option<SimNao>,
    pub curso_superior: String,
    pub experiencia_escolar: String,
    pub estuda_atualmente: Option<SimNao>,
    pub horario_turno_estudo: String,

    // Documentação
    pub documentos_apresentados: Vec<Documento>,
    pub documentos_ausentes: Vec<DocumentoAusente>,
    pub cpf_numero: String,
    pub rg_numero: String,
    pub titulo_eleitor_numero: String,
    pub numero_processo_pep: String,
    pub cnh_categoria: Option<CnhCategoria>,

    // Informações de atendimento
    pub procedencia: Option<Procedencia>,
    pub procedencia_outro: String,
    pub motivo_procura: String,
    pub orientado_escritorio_social: bool,
    pub encaminhamento: Option<Encaminhamento>,
    pub encaminhamento_detalhe: String,

    // Endereço e contatos
    pub endereco: String,
    pub bairro: String,
    pub cidade: String,
    pub estado_uf: String,
    pub ponto_referencia: String,
    pub zona_cidade: Option<ZonaCidade>,
    pub telefone_numero: String,
    pub telefone_contato: String,
    pub email_contato: String,

    pub status: CadastroStatus,
    // URL pública (MEDIA_URL + pasta + arquivo)
    pub foto: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Versão curta usada em autocomplete, vínculos e no painel.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CadastroResumo {
    pub id: Uuid,
    pub nome: String,
    pub status: CadastroStatus,
    pub data_cadastro: NaiveDate,
}

/// Cadastro a que um atendimento/agendamento se refere: o vínculo
/// explícito quando existe, senão o primeiro cadastro com o mesmo nome
/// (sem diferenciar maiúsculas). `vinculo_ambiguo` indica que mais de um
/// cadastro tem esse nome.
#[derive(Debug, Clone, Default, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VinculoCadastro {
    pub vinculo_id: Option<Uuid>,
    pub vinculo_nome: Option<String>,
    pub vinculo_ambiguo: bool,
}

// --- PAYLOAD (criação e edição usam o mesmo formulário) ---

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CadastroPayload {
    #[validate(
        length(max = 255, message = "Máximo de 255 caracteres."),
        custom(function = "not_blank")
    )]
    #[schema(example = "Maria Silva")]
    pub nome: String,
    #[validate(length(max = 255, message = "Máximo de 255 caracteres."))]
    pub nome_social: String,
    #[schema(value_type = Option<SexoBiologico>)]
    pub sexo_biologico: Campo<SexoBiologico>,
    #[schema(value_type = Option<IdentidadeGenero>)]
    pub identidade_genero: Campo<IdentidadeGenero>,
    #[schema(value_type = Option<IdentidadeSexual>)]
    pub identidade_sexual: Campo<IdentidadeSexual>,
    pub pessoa_transexual: bool,

    #[schema(value_type = Option<NaiveDate>)]
    pub data_nascimento: Campo<NaiveDate>,
    // Sem valor: data local de hoje.
    #[schema(value_type = Option<NaiveDate>)]
    pub data_cadastro: Campo<NaiveDate>,
    #[validate(length(max = 120, message = "Máximo de 120 caracteres."))]
    pub naturalidade: String,
    #[schema(value_type = Option<Religiao>)]
    pub religiao: Campo<Religiao>,
    #[validate(length(max = 120, message = "Máximo de 120 caracteres."))]
    pub religiao_desde_quando: String,
    #[schema(value_type = Option<Etnia>)]
    pub identidade_etnico_racial: Campo<Etnia>,
    #[schema(value_type = Option<EstadoCivil>)]
    pub estado_civil: Campo<EstadoCivil>,
    #[validate(length(max = 255, message = "Máximo de 255 caracteres."))]
    pub nome_mae: String,
    #[validate(length(max = 255, message = "Máximo de 255 caracteres."))]
    pub nome_pai: String,
    #[schema(value_type = Option<StatusOcupacional>)]
    pub status_ocupacional: Campo<StatusOcupacional>,
    #[schema(value_type = Option<GrauInstrucao>)]
    pub grau_instrucao: Campo<GrauInstrucao>,
    #[validate(length(max = 120, message = "Máximo de 120 caracteres."))]
    pub serie_concluida: String,
    #[schema(value_type = Option<SimNao>)]
    pub fez_ensino_superior: Campo<SimNao>,
    #[validate(length(max = 255, message = "Máximo de 255 caracteres."))]
    pub curso_superior: String,
    pub experiencia_escolar: String,
    #[schema(value_type = Option<SimNao>)]
    pub estuda_atualmente: Campo<SimNao>,
    #[validate(length(max = 120, message = "Máximo de 120 caracteres."))]
    pub horario_turno_estudo: String,

    #[schema(value_type = Vec<Documento>)]
    pub documentos_apresentados: Vec<Campo<Documento>>,
    #[schema(value_type = Vec<DocumentoAusente>)]
    pub documentos_ausentes: Vec<Campo<DocumentoAusente>>,
    #[validate(length(max = 20, message = "Máximo de 20 caracteres."))]
    pub cpf_numero: String,
    #[validate(length(max = 20, message = "Máximo de 20 caracteres."))]
    pub rg_numero: String,
    #[validate(length(max = 30, message = "Máximo de 30 caracteres."))]
    pub titulo_eleitor_numero: String,
    #[validate(length(max = 30, message = "Máximo de 30 caracteres."))]
    pub numero_processo_pep: String,
    #[schema(value_type = Option<CnhCategoria>)]
    pub cnh_categoria: Campo<CnhCategoria>,

    #[schema(value_type = Option<Procedencia>)]
    pub procedencia: Campo<Procedencia>,
    #[validate(length(max = 120, message = "Máximo de 120 caracteres."))]
    pub procedencia_outro: String,
    pub motivo_procura: String,
    pub orientado_escritorio_social: bool,
    #[schema(value_type = Option<Encaminhamento>)]
    pub encaminhamento: Campo<Encaminhamento>,
    pub encaminhamento_detalhe: String,

    #[validate(length(max = 255, message = "Máximo de 255 caracteres."))]
    pub endereco: String,
    #[validate(length(max = 120, message = "Máximo de 120 caracteres."))]
    pub bairro: String,
    #[validate(length(max = 120, message = "Máximo de 120 caracteres."))]
    pub cidade: String,
    #[validate(length(max = 2, message = "Use a sigla da UF (2 letras)."))]
    pub estado_uf: String,
    #[validate(length(max = 255, message = "Máximo de 255 caracteres."))]
    pub ponto_referencia: String,
    #[schema(value_type = Option<ZonaCidade>)]
    pub zona_cidade: Campo<ZonaCidade>,
    #[validate(length(max = 20, message = "Máximo de 20 caracteres."))]
    pub telefone_numero: String,
    #[validate(length(max = 120, message = "Máximo de 120 caracteres."))]
    pub telefone_contato: String,
    pub email_contato: String,
}

impl CadastroPayload {
    /// Regras de campo + regras condicionais, todas coletadas de uma vez.
    /// Erros com as chaves do JSON (`procedenciaOutro`, `emailContato`...).
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        let mut errors = collect(self.validate());

        if self.procedencia.valor() == Some(Procedencia::Outro) && is_blank(&self.procedencia_outro) {
            errors.add("procedencia_outro", field_error("required", "Informe a procedência."));
        }

        if !email_ok(&self.email_contato) {
            errors.add("email_contato", field_error("email", MSG_EMAIL_INVALIDO));
        }

        check_date(&mut errors, "data_nascimento", &self.data_nascimento);
        check_date(&mut errors, "data_cadastro", &self.data_cadastro);

        check_choice(&mut errors, "sexo_biologico", &self.sexo_biologico);
        check_choice(&mut errors, "identidade_genero", &self.identidade_genero);
        check_choice(&mut errors, "identidade_sexual", &self.identidade_sexual);
        check_choice(&mut errors, "religiao", &self.religiao);
        check_choice(&mut errors, "identidade_etnico_racial", &self.identidade_etnico_racial);
        check_choice(&mut errors, "estado_civil", &self.estado_civil);
        check_choice(&mut errors, "status_ocupacional", &self.status_ocupacional);
        check_choice(&mut errors, "grau_instrucao", &self.grau_instrucao);
        check_choice(&mut errors, "fez_ensino_superior", &self.fez_ensino_superior);
        check_choice(&mut errors, "estuda_atualmente", &self.estuda_atualmente);
        check_choice(&mut errors, "cnh_categoria", &self.cnh_categoria);
        check_choice(&mut errors, "procedencia", &self.procedencia);
        check_choice(&mut errors, "encaminhamento", &self.encaminhamento);
        check_choice(&mut errors, "zona_cidade", &self.zona_cidade);
        check_choices(&mut errors, "documentos_apresentados", &self.documentos_apresentados);
        check_choices(&mut errors, "documentos_ausentes", &self.documentos_ausentes);

        finish_camel_case(errors)
    }

    /// Tira espaços das pontas, remove documentos repetidos e valida.
    pub fn clean(mut self) -> Result<Self, ValidationErrors> {
        for campo in [
            &mut self.nome,
            &mut self.nome_social,
            &mut self.procedencia_outro,
            &mut self.cpf_numero,
            &mut self.rg_numero,
            &mut self.estado_uf,
            &mut self.email_contato,
        ] {
            *campo = campo.trim().to_string();
        }
        self.estado_uf = self.estado_uf.to_uppercase();

        self.validate_all()?;

        self.documentos_apresentados =
            normalize_set(valores(&self.documentos_apresentados)).into_iter().map(Campo::Valor).collect();
        self.documentos_ausentes =
            normalize_set(valores(&self.documentos_ausentes)).into_iter().map(Campo::Valor).collect();
        Ok(self)
    }
}

pub const MSG_EMAIL_INVALIDO: &str = "Informe um endereço de email válido.";

// E-mail é opcional nos formulários: vazio é aceito.
pub fn email_ok(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.to_string().validate_email()
}

// --- LISTAGENS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadastroFiltro {
    Todos,
    Ativos,
    Arquivados,
    Familiares,
}

impl CadastroFiltro {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "todos" => Some(Self::Todos),
            "ativos" => Some(Self::Ativos),
            "arquivados" => Some(Self::Arquivados),
            "familiares" => Some(Self::Familiares),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Todos => "Todos",
            Self::Ativos => "Ativos",
            Self::Arquivados => "Arquivados",
            Self::Familiares => "Familiares",
        }
    }

    pub fn status(&self) -> Option<CadastroStatus> {
        match self {
            Self::Ativos => Some(CadastroStatus::Ativo),
            Self::Arquivados => Some(CadastroStatus::Arquivado),
            Self::Todos | Self::Familiares => None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CadastroListaResponse {
    #[schema(example = "Ativos")]
    pub filtro: &'static str,
    pub cadastros: Vec<Cadastro>,
    // Preenchido apenas no filtro "familiares".
    pub familiares: Vec<Familiar>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BuscaQuery {
    /// Trecho do nome (sem diferenciar maiúsculas)
    pub q: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CadastroDashboard {
    pub query: String,
    pub ativos: Vec<Cadastro>,
    pub arquivados: Vec<Cadastro>,
    pub total: usize,
}

// Resposta do autocomplete: {"results": [{"id", "text"}]}
#[derive(Debug, Serialize, ToSchema)]
pub struct AutocompleteResponse {
    pub results: Vec<AutocompleteItem>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct AutocompleteItem {
    pub id: Uuid,
    #[schema(example = "Maria Silva")]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(nome: &str) -> CadastroPayload {
        CadastroPayload { nome: nome.to_string(), ..Default::default() }
    }

    #[test]
    fn procedencia_outro_requires_detail() {
        let mut p = payload("Maria Silva");
        p.procedencia = Campo::Valor(Procedencia::Outro);
        let errors = p.validate_all().unwrap_err();
        assert!(errors.field_errors().contains_key("procedenciaOutro"));

        p.procedencia_outro = "Indicação da igreja".into();
        assert!(p.validate_all().is_ok());
    }

    #[test]
    fn other_procedencias_do_not_require_detail() {
        let mut p = payload("Maria Silva");
        p.procedencia = Campo::Valor(Procedencia::BuscaEspontanea);
        assert!(p.validate_all().is_ok());
    }

    #[test]
    fn all_violations_are_collected() {
        let mut p = payload("   ");
        p.procedencia = Campo::Valor(Procedencia::Outro);
        p.estado_uf = "SPX".into();
        p.email_contato = "nao-e-email".into();

        let errors = p.validate_all().unwrap_err();
        let fields = errors.field_errors();
        for field in ["nome", "procedenciaOutro", "estadoUf", "emailContato"] {
            assert!(fields.contains_key(field), "faltou erro em {field}");
        }
    }

    #[test]
    fn clean_trims_and_dedups_documents() {
        let mut p = payload("  Maria Silva ");
        p.estado_uf = " ms".into();
        p.documentos_apresentados = vec![
            Campo::Valor(Documento::Rg),
            Campo::Valor(Documento::CertidaoNascimento),
            Campo::Valor(Documento::Rg),
        ];

        let p = p.clean().unwrap();
        assert_eq!(p.nome, "Maria Silva");
        assert_eq!(p.estado_uf, "MS");
        assert_eq!(
            valores(&p.documentos_apresentados),
            vec![Documento::CertidaoNascimento, Documento::Rg]
        );
    }

    #[test]
    fn blank_email_is_accepted() {
        assert!(email_ok(""));
        assert!(email_ok("maria@example.com"));
        assert!(!email_ok("maria@"));
    }

    #[test]
    fn unknown_choice_becomes_a_field_error() {
        let p: CadastroPayload = serde_json::from_str(
            r#"{"nome":"","religiao":"pastafari","zonaCidade":"norte","documentosAusentes":["rg_3via"],"dataNascimento":"1990-02-30"}"#,
        )
        .unwrap();
        assert_eq!(p.zona_cidade.valor(), Some(ZonaCidade::Norte));

        let errors = p.validate_all().unwrap_err();
        let fields = errors.field_errors();
        for field in ["nome", "religiao", "documentosAusentes", "dataNascimento"] {
            assert!(fields.contains_key(field), "faltou erro em {field}");
        }
        assert!(!fields.contains_key("zonaCidade"));
        let msg = fields["religiao"][0].message.as_deref().unwrap_or_default();
        assert!(msg.contains("pastafari"));
    }

    #[test]
    fn filters_parse() {
        assert_eq!(CadastroFiltro::parse("ativos"), Some(CadastroFiltro::Ativos));
        assert_eq!(CadastroFiltro::parse("familiares").unwrap().status(), None);
        assert_eq!(CadastroFiltro::parse("outros"), None);
    }
}
