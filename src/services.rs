pub mod auth;
pub mod document_service;
pub mod relatorio_service;
