//! Read-side shapes returned by the workflow operations. Each mirrors a
//! `populate` the original API performed: the entity plus the public
//! fields of whoever it references.

use std::collections::{HashMap, HashSet};

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use uuid::Uuid;

use models::{rating, request, service, user};

use crate::errors::WorkflowError;

/// Batch-load users by id for the manual joins the views perform.
pub(crate) async fn load_users<C, I>(db: &C, ids: I) -> Result<HashMap<Uuid, user::Model>, WorkflowError>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = Uuid>,
{
    let ids: Vec<Uuid> = ids.into_iter().collect::<HashSet<_>>().into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|u| (u.id, u)).collect())
}

/// A referenced row every foreign key guarantees; missing means the
/// store itself is inconsistent.
pub(crate) fn required_row<'a, T>(
    rows: &'a HashMap<Uuid, T>,
    id: Uuid,
    what: &str,
) -> Result<&'a T, WorkflowError> {
    rows.get(&id)
        .ok_or_else(|| WorkflowError::Db(format!("{what} {id} referenced but missing")))
}

/// The fields of a user anyone may see.
#[derive(Debug, Clone, Serialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub username: String,
    pub profile_picture: Option<String>,
}

impl UserPublic {
    pub fn from_user(u: &user::Model) -> Self {
        Self { id: u.id, username: u.username.clone(), profile_picture: u.profile_picture.clone() }
    }
}

/// Owner of a service as shown on the detail page. Contact fields are
/// filled only for the owner themselves and for actors holding an
/// authorized request.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerView {
    pub id: Uuid,
    pub username: String,
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl OwnerView {
    pub fn public(u: &user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            profile_picture: u.profile_picture.clone(),
            phone_number: None,
            email: None,
        }
    }

    pub fn with_contact(u: &user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            profile_picture: u.profile_picture.clone(),
            phone_number: u.phone_number.clone(),
            email: Some(u.email.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceWithOwner {
    #[serde(flatten)]
    pub service: service::Model,
    pub owner: UserPublic,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingWithAuthor {
    #[serde(flatten)]
    pub rating: rating::Model,
    pub author: UserPublic,
}

/// Full detail page payload: the service, its owner (contact gated), its
/// ratings newest first, and the actor's own request against it, if any.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceDetail {
    pub service: service::Model,
    pub owner: OwnerView,
    pub ratings: Vec<RatingWithAuthor>,
    pub request: Option<request::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestWithRequester {
    #[serde(flatten)]
    pub request: request::Model,
    pub requester: UserPublic,
}

/// A request joined with both sides: who asked, and which service (with
/// its owner) they asked for.
#[derive(Debug, Clone, Serialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: request::Model,
    pub requester: UserPublic,
    pub service: ServiceWithOwner,
}

/// A request as listed on the requester's own dashboard: the request
/// plus the service it targets and that service's owner.
#[derive(Debug, Clone, Serialize)]
pub struct RequestWithService {
    #[serde(flatten)]
    pub request: request::Model,
    pub service: ServiceWithOwner,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingWithService {
    #[serde(flatten)]
    pub rating: rating::Model,
    pub service: service::Model,
}
