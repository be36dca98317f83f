use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, service, user};

pub const COMMENT_MAX: usize = 500;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rating")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub service_id: Uuid,
    pub score: i16,
    pub comment: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Author,
    Service,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Author => Entity::belongs_to(user::Entity)
                .from(Column::AuthorId)
                .to(user::Column::Id)
                .into(),
            Relation::Service => Entity::belongs_to(service::Entity)
                .from(Column::ServiceId)
                .to(service::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_score(score: i16) -> Result<(), errors::ModelError> {
    if score < 1 {
        return Err(errors::ModelError::Validation(
            "Please provide a minimum rating of 1.".into(),
        ));
    }
    if score > 5 {
        return Err(errors::ModelError::Validation(
            "Please provide a maximum rating of 5.".into(),
        ));
    }
    Ok(())
}

pub fn validate_comment(comment: &str) -> Result<(), errors::ModelError> {
    if comment.len() > COMMENT_MAX {
        return Err(errors::ModelError::Validation(format!(
            "Your comment needs to be less than {} characters.",
            COMMENT_MAX
        )));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    author_id: Uuid,
    service_id: Uuid,
    score: i16,
    comment: Option<String>,
) -> Result<Model, errors::ModelError> {
    validate_score(score)?;
    if let Some(text) = comment.as_deref() {
        validate_comment(text)?;
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        author_id: Set(author_id),
        service_id: Set(service_id),
        score: Set(score),
        comment: Set(comment),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
