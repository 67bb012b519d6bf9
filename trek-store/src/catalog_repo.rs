use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use trek_catalog::{FareVariant, Resource, ResourceId};
use trek_core::CatalogReader;
use uuid::Uuid;

pub struct StoreCatalogRepository {
    pool: PgPool,
}

impl StoreCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ResourceRow {
    id: Uuid,
    title: String,
    fare: Decimal,
    list_price: Option<Decimal>,
    duration: Option<String>,
    media_ref: Option<String>,
}

#[derive(sqlx::FromRow)]
struct VariantRow {
    variant_id: String,
    label: String,
    fare: Decimal,
    duration: Option<String>,
}

#[async_trait]
impl CatalogReader for StoreCatalogRepository {
    async fn get_resource(
        &self,
        id: ResourceId,
    ) -> Result<Option<Resource>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, ResourceRow>(
            "SELECT id, title, fare, list_price, duration, media_ref FROM resources WHERE id = $1 AND is_active",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let variants = sqlx::query_as::<_, VariantRow>(
            "SELECT variant_id, label, fare, duration FROM resource_variants WHERE resource_id = $1 ORDER BY sort_order, variant_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Resource {
            id: row.id,
            title: row.title,
            fare: row.fare,
            list_price: row.list_price,
            variants: variants
                .into_iter()
                .map(|v| FareVariant {
                    id: v.variant_id,
                    label: v.label,
                    fare: v.fare,
                    duration: v.duration,
                })
                .collect(),
            duration: row.duration,
            media_ref: row.media_ref,
        }))
    }
}
