//! Caller identity resolution
//!
//! The `AuthenticatedUser` extractor resolves the `X-Session-Token`
//! header against the ambient session store (refreshing its idle
//! window), loads the identity from the database, and enforces the CSRF
//! echo on every state-changing method.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::Method, web};
use futures::future::LocalBoxFuture;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use diamond_common::{DiamondError, UserIdentity};
use diamond_persistence::entity::{user_group, users};

use crate::error::AppError;
use crate::model::AppState;

pub const SESSION_TOKEN_HEADER: &str = "X-Session-Token";
pub const CSRF_TOKEN_HEADER: &str = "X-CSRF-Token";

/// Load a full identity (user row + group memberships) by id.
pub async fn load_identity<C: ConnectionTrait>(
    conn: &C,
    id_user: i64,
) -> Result<UserIdentity, DiamondError> {
    let user = users::Entity::find_by_id(id_user)
        .one(conn)
        .await
        .map_err(DiamondError::internal)?
        .ok_or(DiamondError::Unauthenticated)?;
    if !user.active {
        return Err(DiamondError::Unauthenticated);
    }

    let groups = user_group::Entity::find()
        .filter(user_group::Column::IdUser.eq(id_user))
        .all(conn)
        .await
        .map_err(DiamondError::internal)?
        .into_iter()
        .map(|g| g.group_name)
        .collect();

    Ok(UserIdentity {
        id: user.id,
        username: user.username,
        nama_lengkap: user.nama_lengkap,
        groups,
        is_superuser: user.is_superuser,
    })
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name)?.to_str().ok()
}

/// The authenticated caller, resolved per request.
pub struct AuthenticatedUser(pub UserIdentity);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .ok_or_else(|| AppError::from(DiamondError::Internal("missing app state".into())))?;

            let token = header(&req, SESSION_TOKEN_HEADER)
                .ok_or_else(|| AppError::from(DiamondError::Unauthenticated))?;
            let session = state
                .sessions
                .touch(token)
                .ok_or_else(|| AppError::from(DiamondError::Unauthenticated))?;

            // Mutating methods must echo the session's CSRF token
            let mutating = matches!(
                *req.method(),
                Method::POST | Method::PUT | Method::PATCH | Method::DELETE
            );
            if mutating {
                let echoed = header(&req, CSRF_TOKEN_HEADER).unwrap_or_default();
                if echoed != session.csrf_token {
                    return Err(AppError::from(DiamondError::Forbidden(
                        "CSRF token missing or invalid".to_string(),
                    )));
                }
            }

            let identity = load_identity(&state.db, session.user_id).await?;
            Ok(AuthenticatedUser(identity))
        })
    }
}
