use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Category-specific attribute columns. Additive-only: each column is
/// nullable so existing rows keep working, and new ones can be appended
/// the same way later.
const CATEGORY_COLUMNS: &[(&str, &str)] = &[
    // Textbook
    ("isbn", "TEXT"),
    ("course_code", "TEXT"),
    ("module_name", "TEXT"),
    ("edition", "TEXT"),
    ("author", "TEXT"),
    // Electronics
    ("brand", "TEXT"),
    ("model_number", "TEXT"),
    ("warranty_status", "TEXT"),
    ("original_purchase_date", "TEXT"),
    ("accessories_included", "TEXT"),
    // Furniture
    ("item_type", "TEXT"),
    ("dimensions", "TEXT"),
    ("material", "TEXT"),
    ("assembly_required", "BOOLEAN"),
    ("condition_details", "TEXT"),
    // Apparel
    ("size", "TEXT"),
    ("clothing_brand", "TEXT"),
    ("material_type", "TEXT"),
    ("color", "TEXT"),
    ("gender", "TEXT"),
    // Sports
    ("sports_brand", "TEXT"),
    ("size_dimensions", "TEXT"),
    ("sport_type", "TEXT"),
    ("sports_condition_details", "TEXT"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for (name, column_type) in CATEGORY_COLUMNS {
            db.execute_unprepared(&format!(
                "ALTER TABLE items ADD COLUMN {} {} NULL",
                name, column_type
            ))
            .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for (name, _) in CATEGORY_COLUMNS {
            db.execute_unprepared(&format!("ALTER TABLE items DROP COLUMN {}", name))
                .await?;
        }

        Ok(())
    }
}
