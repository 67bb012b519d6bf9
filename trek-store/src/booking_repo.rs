use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{error, info};
use trek_core::{BookingReference, BookingStore, BookingStoreError, CustomerRef, OperatorBookingRecord};
use uuid::Uuid;

pub struct StoreBookingRepository {
    pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Existing customers are referenced as-is; new customers are matched on
    /// email so repeat guests keep one record.
    async fn resolve_customer(
        tx: &mut Transaction<'_, Postgres>,
        customer: &CustomerRef,
    ) -> Result<Uuid, BookingStoreError> {
        match customer {
            CustomerRef::Existing { customer_id } => {
                let found: Option<Uuid> = sqlx::query_scalar("SELECT id FROM customers WHERE id = $1")
                    .bind(customer_id)
                    .fetch_optional(&mut **tx)
                    .await
                    .map_err(internal)?;
                found.ok_or_else(|| BookingStoreError::Rejected(format!("Customer not found: {}", customer_id)))
            }
            CustomerRef::New(details) => {
                let id: Uuid = sqlx::query_scalar(
                    r#"
                    INSERT INTO customers (id, first_name, last_name, email, phone)
                    VALUES ($1, $2, $3, $4, $5)
                    ON CONFLICT (email) DO UPDATE
                        SET first_name = EXCLUDED.first_name,
                            last_name = EXCLUDED.last_name,
                            phone = COALESCE(EXCLUDED.phone, customers.phone)
                    RETURNING id
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(details.first_name.trim())
                .bind(details.last_name.trim())
                .bind(details.normalized_email())
                .bind(details.phone.as_ref().map(|p| p.expose().clone()))
                .fetch_one(&mut **tx)
                .await
                .map_err(internal)?;
                Ok(id)
            }
        }
    }
}

fn internal(e: sqlx::Error) -> BookingStoreError {
    error!("Booking persistence failed: {}", e);
    BookingStoreError::Internal(e.to_string())
}

fn to_db_count(value: u32) -> Result<i32, BookingStoreError> {
    i32::try_from(value).map_err(|_| BookingStoreError::Rejected(format!("Party size out of range: {}", value)))
}

#[async_trait]
impl BookingStore for StoreBookingRepository {
    async fn create_booking(
        &self,
        record: &OperatorBookingRecord,
    ) -> Result<BookingReference, BookingStoreError> {
        let resource_id = record
            .resource_id
            .ok_or_else(|| BookingStoreError::Rejected("No tour selected".to_string()))?;
        let customer = record
            .customer
            .as_ref()
            .ok_or_else(|| BookingStoreError::Rejected("No customer selected".to_string()))?;
        let date = record
            .schedule
            .date
            .ok_or_else(|| BookingStoreError::Rejected("No date selected".to_string()))?;

        let mut tx = self.pool.begin().await.map_err(internal)?;
        let customer_id = Self::resolve_customer(&mut tx, customer).await?;

        let reference = BookingReference::generate();
        let price = record.pricing.breakdown.rounded();

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, reference, resource_id, variant_id, customer_id,
                booking_date, start_time, adults, children, infants,
                add_on_id, add_on_time,
                fare, subtotal, add_on_fare, service_fee, tax, total, overridden,
                payment_method, payment_status, payment_reference, notes
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23
            )
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(reference.as_str())
        .bind(resource_id)
        .bind(record.variant_id.as_deref())
        .bind(customer_id)
        .bind(date)
        .bind(record.schedule.time)
        .bind(to_db_count(record.schedule.adults)?)
        .bind(to_db_count(record.schedule.children)?)
        .bind(to_db_count(record.schedule.infants)?)
        .bind(record.add_on.as_ref().map(|a| a.id.as_str()))
        .bind(record.add_on.as_ref().map(|a| a.time))
        .bind(record.pricing.fare)
        .bind(price.subtotal)
        .bind(price.add_on_fare)
        .bind(price.service_fee)
        .bind(price.tax)
        .bind(trek_shared::round_currency(record.pricing.amount_due()))
        .bind(price.overridden)
        .bind(record.payment.method.code())
        .bind(record.payment.status.code())
        .bind(record.payment.method.external_reference())
        .bind(&record.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if matches!(&e, sqlx::Error::Database(db) if db.is_foreign_key_violation()) {
                BookingStoreError::Rejected(format!("Tour not found: {}", resource_id))
            } else {
                internal(e)
            }
        })?;

        tx.commit().await.map_err(internal)?;

        info!("Booking {} stored for resource {}", reference, resource_id);
        Ok(reference)
    }
}
