use serde::{Deserialize, Deserializer};
use sqlx::error::ErrorKind;

use crate::common::error::AppError;

// ---
// Helper de escrita: traduz as violações de restrição do Postgres
// ---
/// Converte o erro de um INSERT/UPDATE no erro de domínio correspondente.
/// Restrições de check, chave estrangeira e not-null viram erro de validação (400);
/// o e-mail duplicado de usuário vira conflito (409).
pub(crate) fn mapear_erro_escrita(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        let restricao = db_err.constraint().unwrap_or("desconhecida").to_string();
        match db_err.kind() {
            ErrorKind::UniqueViolation if restricao == "usuarios_email_key" => {
                return AppError::EmailJaCadastrado;
            }
            ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation => {
                tracing::warn!("Restrição violada ({}): {}", restricao, db_err.message());
                return AppError::RestricaoViolada(restricao);
            }
            _ => {}
        }
    }
    e.into()
}

// ---
// Campos anuláveis nos PATCH
// ---
/// Distingue "campo ausente" (`None`) de "campo enviado como null" (`Some(None)`).
/// Usar junto com `#[serde(default)]`.
pub fn campo_anulavel<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
