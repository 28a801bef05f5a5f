// src/services/auth.rs

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    config::AdminInicial,
    db::UsuarioRepository,
    models::{
        auth::{AuthResponse, Claims, SessaoUsuario},
        usuario::{NivelAcesso, NovoUsuario, Usuario, UsuarioDetalhado},
    },
};

#[derive(Clone)]
pub struct AuthService {
    usuario_repo: UsuarioRepository,
    jwt_secret: String,
    expiracao_horas: i64,
}

impl AuthService {
    pub fn new(usuario_repo: UsuarioRepository, jwt_secret: String, expiracao_horas: i64) -> Self {
        Self { usuario_repo, jwt_secret, expiracao_horas }
    }

    pub async fn login(&self, email: &str, senha: &str) -> Result<AuthResponse, AppError> {
        let usuario = self.usuario_repo.autenticar(email, senha).await?;
        let token = criar_token(&self.jwt_secret, &usuario.usuario, self.expiracao_horas)?;

        tracing::info!("🔑 Login de '{}'", usuario.usuario.email);

        Ok(AuthResponse { token, usuario: SessaoUsuario::from(&usuario) })
    }

    /// Valida o token e recarrega o usuário; usuário removido ou inativo invalida o token.
    pub async fn validar_token(&self, token: &str) -> Result<UsuarioDetalhado, AppError> {
        let claims = decodificar_token(&self.jwt_secret, token)?;

        let usuario = match self.usuario_repo.get_by_id(claims.sub).await {
            Err(AppError::NaoEncontrado(_)) => return Err(AppError::InvalidToken),
            resultado => resultado?,
        };

        if !usuario.usuario.ativo {
            return Err(AppError::InvalidToken);
        }

        Ok(usuario)
    }

    /// Cria o primeiro administrador quando a tabela de usuários está vazia.
    pub async fn garantir_admin_inicial(&self, admin: &AdminInicial) -> Result<(), AppError> {
        if self.usuario_repo.contar().await? > 0 {
            return Ok(());
        }

        let novo = NovoUsuario {
            nome: admin.nome.clone(),
            email: admin.email.clone(),
            senha: admin.senha.clone(),
            nivel_acesso: NivelAcesso::Admin,
            orgao_id: None,
            ativo: Some(true),
        };
        self.usuario_repo.create(&novo).await?;

        tracing::info!("🛡️ Administrador inicial '{}' criado", admin.email);
        Ok(())
    }
}

pub(crate) fn criar_token(secret: &str, usuario: &Usuario, expiracao_horas: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(expiracao_horas);

    let claims = Claims {
        sub: usuario.id,
        nivel: usuario.nivel_acesso,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_ref()))?)
}

pub(crate) fn decodificar_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn usuario(nivel: NivelAcesso) -> Usuario {
        Usuario {
            id: Uuid::new_v4(),
            nome: "Gestora".into(),
            email: "gestora@municipio.gov".into(),
            senha_hash: String::new(),
            nivel_acesso: nivel,
            orgao_id: None,
            ativo: true,
            data_criacao: Utc::now(),
            ultimo_acesso: None,
        }
    }

    #[test]
    fn token_carrega_id_e_nivel() {
        let u = usuario(NivelAcesso::Gestor);
        let token = criar_token("segredo", &u, 8).unwrap();
        let claims = decodificar_token("segredo", &token).unwrap();
        assert_eq!(claims.sub, u.id);
        assert_eq!(claims.nivel, NivelAcesso::Gestor);
        assert_eq!(claims.exp - claims.iat, 8 * 3600);
    }

    #[test]
    fn token_assinado_com_outro_segredo_e_rejeitado() {
        let token = criar_token("segredo", &usuario(NivelAcesso::Admin), 8).unwrap();
        assert!(matches!(decodificar_token("outro", &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn token_expirado_e_rejeitado() {
        let token = criar_token("segredo", &usuario(NivelAcesso::Operador), -1).unwrap();
        assert!(matches!(decodificar_token("segredo", &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn lixo_nao_e_token() {
        assert!(matches!(decodificar_token("segredo", "abc.def"), Err(AppError::InvalidToken)));
    }
}
