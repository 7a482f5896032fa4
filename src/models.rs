pub mod agendamento;
pub mod atendimento;
pub mod atividade;
pub mod auth;
pub mod cadastro;
pub mod dashboard;
pub mod documento;
pub mod familiar;
pub mod foto;
pub mod lembrete;
