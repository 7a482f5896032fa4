pub mod user_repo;
pub use user_repo::UserRepository;
pub mod cadastro_repo;
pub use cadastro_repo::CadastroRepository;
pub mod familiar_repo;
pub use familiar_repo::FamiliarRepository;
pub mod atendimento_repo;
pub use atendimento_repo::AtendimentoRepository;
pub mod agendamento_repo;
pub use agendamento_repo::AgendamentoRepository;
pub mod lembrete_repo;
pub use lembrete_repo::LembreteRepository;
pub mod atividade_repo;
pub use atividade_repo::AtividadeRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
