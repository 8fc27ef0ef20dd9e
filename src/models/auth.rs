// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Root,
    Admin,
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub role: UserRole,

    // Flags de permissão armazenadas. NUNCA leia estas direto em um
    // handler: use `EffectivePermissions::resolve`, que aplica a regra
    // do root em um único lugar.
    pub can_edit: bool,
    pub can_upload: bool,
    pub can_download: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O conjunto de permissões efetivas de um usuário: papel ∪ flags.
// Root tem tudo, independente do que estiver gravado nas colunas.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EffectivePermissions {
    pub can_edit: bool,
    pub can_upload: bool,
    pub can_download: bool,
}

impl EffectivePermissions {
    pub fn resolve(user: &User) -> Self {
        let is_root = user.role == UserRole::Root;
        Self {
            can_edit: is_root || user.can_edit,
            can_upload: is_root || user.can_upload,
            can_download: is_root || user.can_download,
        }
    }
}

// Dados para registro de um novo usuário (somente root registra)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    pub role: Option<UserRole>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// Atualização das flags de permissão de um usuário (somente root)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionsPayload {
    pub can_edit: bool,
    pub can_upload: bool,
    pub can_download: bool,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(role: UserRole, flags: bool) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Teste".into(),
            email: "teste@exemplo.com".into(),
            password_hash: "hash".into(),
            role,
            can_edit: flags,
            can_upload: flags,
            can_download: flags,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn root_tem_todas_as_permissoes_mesmo_sem_flags() {
        let perms = EffectivePermissions::resolve(&user_with(UserRole::Root, false));
        assert!(perms.can_edit);
        assert!(perms.can_upload);
        assert!(perms.can_download);
    }

    #[test]
    fn admin_espelha_as_flags_armazenadas() {
        let sem = EffectivePermissions::resolve(&user_with(UserRole::Admin, false));
        assert!(!sem.can_edit && !sem.can_upload && !sem.can_download);

        let com = EffectivePermissions::resolve(&user_with(UserRole::Admin, true));
        assert!(com.can_edit && com.can_upload && com.can_download);
    }
}
