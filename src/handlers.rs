use axum::{extract::Form, Json};
use axum_extra::extract::WithRejection;

use crate::common::error::AppError;

pub mod admin;
pub mod agendamento;
pub mod anotacao;
pub mod atendimento;
pub mod atividade;
pub mod auth;
pub mod cadastro;
pub mod familiar;
pub mod foto;
pub mod home;
pub mod usuario;

// Corpo JSON/form com rejeição no formato de erro da aplicação
pub type JsonBody<T> = WithRejection<Json<T>, AppError>;
pub type FormBody<T> = WithRejection<Form<T>, AppError>;
