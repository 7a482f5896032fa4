// src/models/atividade.rs

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::ValidationErrors;

use crate::common::validation::{field_error, finish, parse_date_field};

pub const MSG_TIPO_INVALIDO: &str = "Tipo de atividade inválido.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipoAtividade {
    Todos,
    Cadastros,
    Agendamentos,
    Atendimentos,
    Anotacoes,
}

impl TipoAtividade {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "" | "todos" => Some(Self::Todos),
            "cadastros" => Some(Self::Cadastros),
            "agendamentos" => Some(Self::Agendamentos),
            "atendimentos" => Some(Self::Atendimentos),
            "anotacoes" => Some(Self::Anotacoes),
            _ => None,
        }
    }

    pub fn inclui(&self, tipo: TipoAtividade) -> bool {
        *self == TipoAtividade::Todos || *self == tipo
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct AtividadeQuery {
    /// todos | cadastros | agendamentos | atendimentos | anotacoes
    pub tipo_atividade: Option<String>,
    /// AAAA-MM-DD
    pub data_inicio: Option<String>,
    /// AAAA-MM-DD
    pub data_fim: Option<String>,
}

/// Filtro já validado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtividadeFiltro {
    pub tipo: TipoAtividade,
    pub inicio: Option<NaiveDate>,
    pub fim: Option<NaiveDate>,
}

impl AtividadeQuery {
    pub fn parse(&self) -> Result<AtividadeFiltro, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let tipo_raw = self.tipo_atividade.as_deref().map(str::trim).unwrap_or_default();
        let tipo = TipoAtividade::parse(tipo_raw);
        if tipo.is_none() {
            errors.add("tipo_atividade", field_error("choice", MSG_TIPO_INVALIDO));
        }

        let inicio = parse_date_field(&mut errors, "data_inicio", self.data_inicio.as_deref());
        let fim = parse_date_field(&mut errors, "data_fim", self.data_fim.as_deref());

        finish(errors)?;
        Ok(AtividadeFiltro { tipo: tipo.unwrap_or(TipoAtividade::Todos), inicio, fim })
    }
}

// --- LINHAS LIDAS DO BANCO ---

#[derive(Debug, Clone, FromRow)]
pub struct CadastroAtividade {
    pub id: Uuid,
    pub nome: String,
    pub data_cadastro: NaiveDate,
}

#[derive(Debug, Clone, FromRow)]
pub struct AgendamentoAtividade {
    pub id: Uuid,
    pub nome_atendido: String,
    pub data_agendamento: NaiveDate,
}

#[derive(Debug, Clone, FromRow)]
pub struct AtendimentoAtividade {
    pub id: Uuid,
    pub nome_pessoa_atendida: String,
    pub data_atendimento: NaiveDate,
    pub profissional_responsavel: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct AnotacaoAtividade {
    pub id: Uuid,
    pub cadastro_id: Option<Uuid>,
    pub cadastro_nome: Option<String>,
    pub data_criacao: DateTime<Utc>,
    // username de quem criou; None se a conta foi excluída
    pub autor: Option<String>,
}

#[derive(Debug, Default)]
pub struct FontesAtividade {
    pub cadastros: Vec<CadastroAtividade>,
    pub agendamentos: Vec<AgendamentoAtividade>,
    pub atendimentos: Vec<AtendimentoAtividade>,
    pub anotacoes: Vec<AnotacaoAtividade>,
}

// --- RESPOSTA ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Acoes {
    pub ver: Option<String>,
    pub editar: Option<String>,
    pub excluir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Atividade {
    pub data: NaiveDate,
    #[schema(value_type = String, example = "2024-05-10T00:00:00-03:00")]
    pub data_ordem: DateTime<FixedOffset>,
    #[schema(example = "Novo Cadastro")]
    pub atividade: &'static str,
    #[schema(example = "cadastros")]
    pub tipo: &'static str,
    pub tecnico: String,
    pub reeducando: Option<String>,
    pub acoes: Acoes,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AtividadesResponse {
    pub atividades: Vec<Atividade>,
    pub total_atividades: usize,
    pub filtro_tipo: String,
    pub data_inicio: String,
    pub data_fim: String,
}

const SISTEMA: &str = "Sistema";

/// Meia-noite local da data, no fuso configurado.
pub fn meia_noite_local(data: NaiveDate, offset: FixedOffset) -> DateTime<FixedOffset> {
    let local = data.and_time(NaiveTime::MIN);
    // nas pontas do calendário o deslocamento pode sair da faixa do chrono
    let utc = local
        .checked_sub_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())))
        .unwrap_or(local);
    DateTime::from_naive_utc_and_offset(utc, offset)
}

/// Limites em UTC para filtrar anotações pela data local de criação:
/// `[inicio 00:00, (fim + 1 dia) 00:00)`.
pub fn limites_utc(
    filtro: &AtividadeFiltro,
    offset: FixedOffset,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let desde = filtro.inicio.map(|d| meia_noite_local(d, offset).with_timezone(&Utc));
    let ate = filtro
        .fim
        .and_then(|d| d.checked_add_days(Days::new(1)))
        .map(|d| meia_noite_local(d, offset).with_timezone(&Utc));
    (desde, ate)
}

/// Junta as quatro fontes num só feed, do mais recente para o mais antigo.
/// A ordenação é estável: empates mantêm a ordem cadastros, agendamentos,
/// atendimentos, anotações.
pub fn montar_feed(fontes: FontesAtividade, offset: FixedOffset) -> Vec<Atividade> {
    let mut feed = Vec::with_capacity(
        fontes.cadastros.len() + fontes.agendamentos.len() + fontes.atendimentos.len() + fontes.anotacoes.len(),
    );

    feed.extend(fontes.cadastros.into_iter().map(|c| Atividade {
        data: c.data_cadastro,
        data_ordem: meia_noite_local(c.data_cadastro, offset),
        atividade: "Novo Cadastro",
        tipo: "cadastros",
        tecnico: SISTEMA.to_string(),
        reeducando: Some(c.nome),
        acoes: acoes_padrao(&format!("/home/cadastros/{}", c.id)),
    }));

    feed.extend(fontes.agendamentos.into_iter().map(|a| Atividade {
        data: a.data_agendamento,
        data_ordem: meia_noite_local(a.data_agendamento, offset),
        atividade: "Novo Agendamento",
        tipo: "agendamentos",
        tecnico: SISTEMA.to_string(),
        reeducando: Some(a.nome_atendido),
        acoes: acoes_padrao(&format!("/agendamentos/{}", a.id)),
    }));

    feed.extend(fontes.atendimentos.into_iter().map(|a| {
        let tecnico = if a.profissional_responsavel.trim().is_empty() {
            SISTEMA.to_string()
        } else {
            a.profissional_responsavel
        };
        Atividade {
            data: a.data_atendimento,
            data_ordem: meia_noite_local(a.data_atendimento, offset),
            atividade: "Novo Atendimento",
            tipo: "atendimentos",
            tecnico,
            reeducando: Some(a.nome_pessoa_atendida),
            acoes: acoes_padrao(&format!("/atendimentos/{}", a.id)),
        }
    }));

    feed.extend(fontes.anotacoes.into_iter().map(|n| {
        let local = n.data_criacao.with_timezone(&offset);
        let acoes = match n.cadastro_id {
            Some(cadastro_id) => Acoes {
                ver: Some(format!("/cadastro/perfil/{cadastro_id}")),
                editar: Some(format!("/anotacoes/editar/?cadastro_id={cadastro_id}")),
                excluir: None,
            },
            None => Acoes { ver: None, editar: None, excluir: None },
        };
        Atividade {
            data: local.date_naive(),
            data_ordem: local,
            atividade: "Anotação",
            tipo: "anotacoes",
            tecnico: n.autor.unwrap_or_else(|| SISTEMA.to_string()),
            reeducando: n.cadastro_nome,
            acoes,
        }
    }));

    // sort_by é estável
    feed.sort_by(|a, b| b.data_ordem.cmp(&a.data_ordem));
    feed
}

fn acoes_padrao(base: &str) -> Acoes {
    Acoes {
        ver: Some(format!("{base}/ver")),
        editar: Some(format!("{base}/editar")),
        excluir: Some(format!("{base}/excluir")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sao_paulo() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn dia(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn query_parsing_accepts_blank_and_known_kinds() {
        let q = AtividadeQuery::default();
        assert_eq!(q.parse().unwrap(), AtividadeFiltro { tipo: TipoAtividade::Todos, inicio: None, fim: None });

        let q = AtividadeQuery {
            tipo_atividade: Some("anotacoes".into()),
            data_inicio: Some("2024-01-01".into()),
            data_fim: Some(" ".into()),
        };
        let f = q.parse().unwrap();
        assert_eq!(f.tipo, TipoAtividade::Anotacoes);
        assert_eq!(f.inicio, Some(dia(2024, 1, 1)));
        assert_eq!(f.fim, None);
    }

    #[test]
    fn malformed_query_is_a_field_error() {
        let q = AtividadeQuery {
            tipo_atividade: Some("financeiro".into()),
            data_inicio: Some("01/02/2024".into()),
            data_fim: Some("2024-13-01".into()),
        };
        let errors = q.parse().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("tipo_atividade"));
        assert!(fields.contains_key("data_inicio"));
        assert!(fields.contains_key("data_fim"));
    }

    #[test]
    fn date_only_entries_sit_at_local_midnight() {
        let ts = meia_noite_local(dia(2024, 5, 10), sao_paulo());
        assert_eq!(ts.to_rfc3339(), "2024-05-10T00:00:00-03:00");
        assert_eq!(ts.with_timezone(&Utc), Utc.with_ymd_and_hms(2024, 5, 10, 3, 0, 0).unwrap());
    }

    #[test]
    fn extreme_years_in_the_query_are_rejected() {
        let q = AtividadeQuery {
            tipo_atividade: None,
            data_inicio: Some("-262143-01-01".into()),
            data_fim: Some("+262142-12-31".into()),
        };
        let errors = q.parse().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("data_inicio"));
        assert!(fields.contains_key("data_fim"));
    }

    #[test]
    fn midnight_at_the_calendar_edges_does_not_panic() {
        let leste = FixedOffset::east_opt(3600).unwrap();
        let filtro = AtividadeFiltro { tipo: TipoAtividade::Todos, inicio: Some(NaiveDate::MIN), fim: Some(NaiveDate::MAX) };
        let (desde, ate) = limites_utc(&filtro, leste);
        assert!(desde.is_some());
        assert!(ate.is_none());

        let ts = meia_noite_local(NaiveDate::MAX, sao_paulo());
        assert_eq!(ts.date_naive(), NaiveDate::MAX);
    }

    #[test]
    fn note_bounds_follow_local_dates() {
        let filtro = AtividadeFiltro {
            tipo: TipoAtividade::Anotacoes,
            inicio: Some(dia(2024, 5, 10)),
            fim: Some(dia(2024, 5, 10)),
        };
        let (desde, ate) = limites_utc(&filtro, sao_paulo());
        assert_eq!(desde, Some(Utc.with_ymd_and_hms(2024, 5, 10, 3, 0, 0).unwrap()));
        assert_eq!(ate, Some(Utc.with_ymd_and_hms(2024, 5, 11, 3, 0, 0).unwrap()));
    }

    #[test]
    fn feed_is_merged_newest_first_with_stable_ties() {
        let same_day = dia(2024, 5, 10);
        let fontes = FontesAtividade {
            cadastros: vec![CadastroAtividade { id: Uuid::nil(), nome: "Maria".into(), data_cadastro: same_day }],
            agendamentos: vec![AgendamentoAtividade {
                id: Uuid::nil(),
                nome_atendido: "Maria".into(),
                data_agendamento: same_day,
            }],
            atendimentos: vec![AtendimentoAtividade {
                id: Uuid::nil(),
                nome_pessoa_atendida: "João".into(),
                data_atendimento: dia(2024, 5, 9),
                profissional_responsavel: "".into(),
            }],
            anotacoes: vec![AnotacaoAtividade {
                id: Uuid::nil(),
                cadastro_id: None,
                cadastro_nome: None,
                // 10/05 às 14h em São Paulo
                data_criacao: Utc.with_ymd_and_hms(2024, 5, 10, 17, 0, 0).unwrap(),
                autor: None,
            }],
        };

        let feed = montar_feed(fontes, sao_paulo());
        let kinds: Vec<&str> = feed.iter().map(|a| a.tipo).collect();
        assert_eq!(kinds, vec!["anotacoes", "cadastros", "agendamentos", "atendimentos"]);

        assert!(feed.windows(2).all(|w| w[0].data_ordem >= w[1].data_ordem));
        assert_eq!(feed[0].data, same_day);
        assert_eq!(feed[0].tecnico, "Sistema");
        assert_eq!(feed[0].reeducando, None);
        assert_eq!(feed[3].tecnico, "Sistema");
    }

    #[test]
    fn links_point_to_each_record() {
        let id = Uuid::new_v4();
        let fontes = FontesAtividade {
            atendimentos: vec![AtendimentoAtividade {
                id,
                nome_pessoa_atendida: "João".into(),
                data_atendimento: dia(2024, 5, 9),
                profissional_responsavel: "maria.souza".into(),
            }],
            anotacoes: vec![AnotacaoAtividade {
                id: Uuid::new_v4(),
                cadastro_id: Some(id),
                cadastro_nome: Some("João".into()),
                data_criacao: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
                autor: Some("ana".into()),
            }],
            ..Default::default()
        };
        let feed = montar_feed(fontes, sao_paulo());

        assert_eq!(feed[0].tecnico, "maria.souza");
        assert_eq!(feed[0].acoes.excluir, Some(format!("/atendimentos/{id}/excluir")));
        assert_eq!(feed[1].acoes.editar, Some(format!("/anotacoes/editar/?cadastro_id={id}")));
        assert_eq!(feed[1].acoes.excluir, None);
        assert_eq!(feed[1].tecnico, "ana");
    }
}
