//! Digest das credenciais dos usuários.
//!
//! SHA-256 simples, sem sal, em hexadecimal minúsculo. O mesmo digest é usado
//! para gravar e para comparar, por isso precisa ser determinístico: a
//! autenticação busca o usuário pela igualdade do digest.

use sha2::{Digest, Sha256};

/// Tamanho do digest em caracteres hexadecimais.
pub const TAMANHO_DIGEST: usize = 64;

pub fn digest_senha(senha: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(senha.as_bytes());
    hex::encode(hasher.finalize())
}
