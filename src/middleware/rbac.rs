// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{EffectivePermissions, User, UserRole},
};

/// 1. O Trait que define o que é uma Capacidade
pub trait CapabilityDef: Send + Sync + 'static {
    fn slug() -> &'static str;
    fn granted(user: &User) -> bool;
}

/// 2. O Extractor (Guardião)
pub struct RequireCapability<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
//
// A checagem acontece toda sobre o conjunto efetivo resolvido
// (papel ∪ flags), nunca sobre as flags cruas: a regra "root pode tudo"
// vive em EffectivePermissions::resolve e em nenhum outro lugar.
impl<T, S> FromRequestParts<S> for RequireCapability<T>
where
    T: CapabilityDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<User>().ok_or(AppError::InvalidToken)?;

        if !T::granted(user) {
            return Err(AppError::Forbidden(format!(
                "Você precisa da permissão '{}' para realizar esta ação.",
                T::slug()
            )));
        }

        Ok(RequireCapability(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS CAPACIDADES (TIPOS)
// ---

pub struct CanEdit;
impl CapabilityDef for CanEdit {
    fn slug() -> &'static str {
        "edit"
    }
    fn granted(user: &User) -> bool {
        EffectivePermissions::resolve(user).can_edit
    }
}

pub struct CanUpload;
impl CapabilityDef for CanUpload {
    fn slug() -> &'static str {
        "upload"
    }
    fn granted(user: &User) -> bool {
        EffectivePermissions::resolve(user).can_upload
    }
}

pub struct CanDownload;
impl CapabilityDef for CanDownload {
    fn slug() -> &'static str {
        "download"
    }
    fn granted(user: &User) -> bool {
        EffectivePermissions::resolve(user).can_download
    }
}

pub struct RootOnly;
impl CapabilityDef for RootOnly {
    fn slug() -> &'static str {
        "root"
    }
    fn granted(user: &User) -> bool {
        user.role == UserRole::Root
    }
}
