pub mod agendamento_service;
pub mod anotacao_service;
pub mod atendimento_service;
pub mod atividade_service;
pub mod auth;
pub mod cadastro_service;
pub mod dashboard_service;
pub mod familiar_service;
pub mod media;
pub mod usuario_service;
