// src/models/dashboard.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::{agendamento::AgendamentoLinha, cadastro::CadastroResumo};

// 1. Contadores dos cards do topo
#[derive(Debug, Clone, Copy, Default, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Totais {
    pub total_cadastros: i64,
    pub cadastros_ativos: i64,
    pub cadastros_arquivados: i64,
    pub total_agendamentos: i64,
    pub total_atendimentos: i64,
}

// 2. Tela inicial (/home/)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomeResumo {
    pub user_name: String,
    #[serde(flatten)]
    pub totais: Totais,
    pub ultimo_cadastro: Option<CadastroResumo>,
    // 10 agendamentos mais recentes, com o cadastro vinculado
    pub agendamentos_recentes: Vec<AgendamentoLinha>,
}
