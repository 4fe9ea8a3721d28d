use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::item::{self, Category};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextbookDetails {
    pub isbn: Option<String>,
    pub course_code: Option<String>,
    pub module_name: Option<String>,
    pub edition: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElectronicsDetails {
    pub brand: Option<String>,
    pub model_number: Option<String>,
    pub warranty_status: Option<String>,
    pub original_purchase_date: Option<String>,
    pub accessories_included: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FurnitureDetails {
    pub item_type: Option<String>,
    pub dimensions: Option<String>,
    pub material: Option<String>,
    pub assembly_required: Option<bool>,
    pub condition_details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApparelDetails {
    pub size: Option<String>,
    pub clothing_brand: Option<String>,
    pub material_type: Option<String>,
    pub color: Option<String>,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SportsDetails {
    pub sports_brand: Option<String>,
    pub size_dimensions: Option<String>,
    pub sport_type: Option<String>,
    pub sports_condition_details: Option<String>,
}

/// Category-specific listing payload, keyed by the item's category tag.
/// Only the variant matching the tag is ever persisted or displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CategoryDetails {
    Textbook(TextbookDetails),
    Electronics(ElectronicsDetails),
    Furniture(FurnitureDetails),
    Apparel(ApparelDetails),
    Sports(SportsDetails),
}

impl CategoryDetails {
    /// Extract the payload for `category` from a normalized (snake_case)
    /// request body. Fields belonging to other categories are ignored.
    pub fn from_payload(category: Category, payload: &Value) -> AppResult<Self> {
        let payload = payload.clone();
        let details = match category {
            Category::Textbook => Self::Textbook(from_value(payload)?),
            Category::Electronics => Self::Electronics(from_value(payload)?),
            Category::Furniture => Self::Furniture(from_value(payload)?),
            Category::Apparel => Self::Apparel(from_value(payload)?),
            Category::Sports => Self::Sports(from_value(payload)?),
        };
        Ok(details)
    }

    /// Read the payload matching the stored row's category tag.
    pub fn from_model(item: &item::Model) -> Self {
        match item.category {
            Category::Textbook => Self::Textbook(TextbookDetails {
                isbn: item.isbn.clone(),
                course_code: item.course_code.clone(),
                module_name: item.module_name.clone(),
                edition: item.edition.clone(),
                author: item.author.clone(),
            }),
            Category::Electronics => Self::Electronics(ElectronicsDetails {
                brand: item.brand.clone(),
                model_number: item.model_number.clone(),
                warranty_status: item.warranty_status.clone(),
                original_purchase_date: item.original_purchase_date.clone(),
                accessories_included: item.accessories_included.clone(),
            }),
            Category::Furniture => Self::Furniture(FurnitureDetails {
                item_type: item.item_type.clone(),
                dimensions: item.dimensions.clone(),
                material: item.material.clone(),
                assembly_required: item.assembly_required,
                condition_details: item.condition_details.clone(),
            }),
            Category::Apparel => Self::Apparel(ApparelDetails {
                size: item.size.clone(),
                clothing_brand: item.clothing_brand.clone(),
                material_type: item.material_type.clone(),
                color: item.color.clone(),
                gender: item.gender.clone(),
            }),
            Category::Sports => Self::Sports(SportsDetails {
                sports_brand: item.sports_brand.clone(),
                size_dimensions: item.size_dimensions.clone(),
                sport_type: item.sport_type.clone(),
                sports_condition_details: item.sports_condition_details.clone(),
            }),
        }
    }

    /// Write this payload's columns onto an active model. Columns belonging
    /// to other categories are left unset (NULL on insert).
    pub fn apply(self, active: &mut item::ActiveModel) {
        match self {
            Self::Textbook(d) => {
                active.isbn = Set(d.isbn);
                active.course_code = Set(d.course_code);
                active.module_name = Set(d.module_name);
                active.edition = Set(d.edition);
                active.author = Set(d.author);
            }
            Self::Electronics(d) => {
                active.brand = Set(d.brand);
                active.model_number = Set(d.model_number);
                active.warranty_status = Set(d.warranty_status);
                active.original_purchase_date = Set(d.original_purchase_date);
                active.accessories_included = Set(d.accessories_included);
            }
            Self::Furniture(d) => {
                active.item_type = Set(d.item_type);
                active.dimensions = Set(d.dimensions);
                active.material = Set(d.material);
                active.assembly_required = Set(d.assembly_required);
                active.condition_details = Set(d.condition_details);
            }
            Self::Apparel(d) => {
                active.size = Set(d.size);
                active.clothing_brand = Set(d.clothing_brand);
                active.material_type = Set(d.material_type);
                active.color = Set(d.color);
                active.gender = Set(d.gender);
            }
            Self::Sports(d) => {
                active.sports_brand = Set(d.sports_brand);
                active.size_dimensions = Set(d.size_dimensions);
                active.sport_type = Set(d.sport_type);
                active.sports_condition_details = Set(d.sports_condition_details);
            }
        }
    }
}

fn from_value<T: serde::de::DeserializeOwned>(payload: Value) -> AppResult<T> {
    serde_json::from_value(payload)
        .map_err(|e| AppError::Validation(format!("Invalid category details: {e}")))
}
