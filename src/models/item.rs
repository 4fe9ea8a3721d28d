use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    #[sea_orm(string_value = "TEXTBOOK")]
    Textbook,
    #[sea_orm(string_value = "ELECTRONICS")]
    Electronics,
    #[sea_orm(string_value = "FURNITURE")]
    Furniture,
    #[sea_orm(string_value = "APPAREL")]
    Apparel,
    #[sea_orm(string_value = "SPORTS")]
    Sports,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    #[sea_orm(string_value = "NEW")]
    New,
    #[sea_orm(string_value = "LIKE_NEW")]
    LikeNew,
    #[sea_orm(string_value = "GOOD")]
    Good,
    #[sea_orm(string_value = "FAIR")]
    Fair,
    #[sea_orm(string_value = "POOR")]
    Poor,
}

/// Listing status. DELETED is the soft-delete sentinel: rows are kept but
/// hidden from listings, and the state is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    #[sea_orm(string_value = "AVAILABLE")]
    Available,
    #[sea_orm(string_value = "RESERVED")]
    Reserved,
    #[sea_orm(string_value = "SOLD")]
    Sold,
    #[sea_orm(string_value = "DELETED")]
    Deleted,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub seller_id: String,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub category: Category,
    pub price: f64,
    pub condition: Condition,
    pub status: ItemStatus,
    pub view_count: i32,
    /// Serialized JSON array of image URLs; parsed by the field adapter.
    #[sea_orm(column_type = "Text", nullable)]
    pub images: Option<String>,
    // Textbook
    pub isbn: Option<String>,
    pub course_code: Option<String>,
    pub module_name: Option<String>,
    pub edition: Option<String>,
    pub author: Option<String>,
    // Electronics
    pub brand: Option<String>,
    pub model_number: Option<String>,
    pub warranty_status: Option<String>,
    pub original_purchase_date: Option<String>,
    pub accessories_included: Option<String>,
    // Furniture
    pub item_type: Option<String>,
    pub dimensions: Option<String>,
    pub material: Option<String>,
    pub assembly_required: Option<bool>,
    pub condition_details: Option<String>,
    // Apparel
    pub size: Option<String>,
    pub clothing_brand: Option<String>,
    pub material_type: Option<String>,
    pub color: Option<String>,
    pub gender: Option<String>,
    // Sports
    pub sports_brand: Option<String>,
    pub size_dimensions: Option<String>,
    pub sport_type: Option<String>,
    pub sports_condition_details: Option<String>,
    pub post_date: DateTime,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SellerId",
        to = "super::user::Column::Id"
    )]
    Seller,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seller.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
