use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, user};

pub const TITLE_MAX: usize = 120;
pub const DESCRIPTION_MAX: usize = 2000;
pub const SERVICE_TYPE_MAX: usize = 64;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub service_type: String,
    pub price_per_day: f64,
    pub image_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Owner }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Owner => Entity::belongs_to(user::Entity)
                .from(Column::OwnerId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_title(title: &str) -> Result<(), errors::ModelError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(errors::ModelError::Validation("Please provide a title.".into()));
    }
    if trimmed.len() > TITLE_MAX {
        return Err(errors::ModelError::Validation(format!(
            "Title must be less than {} characters.",
            TITLE_MAX
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), errors::ModelError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(errors::ModelError::Validation("Please provide a description.".into()));
    }
    if trimmed.len() > DESCRIPTION_MAX {
        return Err(errors::ModelError::Validation(format!(
            "Description must be less than {} characters.",
            DESCRIPTION_MAX
        )));
    }
    Ok(())
}

pub fn validate_service_type(service_type: &str) -> Result<(), errors::ModelError> {
    let trimmed = service_type.trim();
    if trimmed.is_empty() || trimmed.len() > SERVICE_TYPE_MAX {
        return Err(errors::ModelError::Validation("Please provide a service type.".into()));
    }
    Ok(())
}

pub fn validate_price_per_day(price: f64) -> Result<(), errors::ModelError> {
    if !price.is_finite() || price < 0.0 {
        return Err(errors::ModelError::Validation(
            "Price per day must be a non-negative number.".into(),
        ));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    title: &str,
    description: &str,
    service_type: &str,
    price_per_day: f64,
    image_url: Option<String>,
) -> Result<Model, errors::ModelError> {
    validate_title(title)?;
    validate_description(description)?;
    validate_service_type(service_type)?;
    validate_price_per_day(price_per_day)?;

    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner_id),
        title: Set(title.trim().to_string()),
        description: Set(description.trim().to_string()),
        service_type: Set(service_type.trim().to_string()),
        price_per_day: Set(price_per_day),
        image_url: Set(image_url),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
