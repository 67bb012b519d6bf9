use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use std::collections::{BTreeMap, BTreeSet};
use trek_catalog::ResourceId;
use trek_core::{AvailabilityError, AvailabilityService, MonthAvailability, Slot, YearMonth};

/// Month availability computed from the departures table
pub struct StoreScheduleRepository {
    pool: PgPool,
}

impl StoreScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SlotRow {
    slot_date: NaiveDate,
    start_time: NaiveTime,
    remaining: i32,
}

/// Group departures by day. Closed days are reported fully booked and carry
/// no slots.
pub(crate) fn assemble_month(
    slots: impl IntoIterator<Item = (NaiveDate, Slot)>,
    closed: impl IntoIterator<Item = NaiveDate>,
) -> MonthAvailability {
    let fully_booked_dates: BTreeSet<NaiveDate> = closed.into_iter().collect();
    let mut available_slots_by_date: BTreeMap<NaiveDate, Vec<Slot>> = BTreeMap::new();

    for (date, slot) in slots {
        if fully_booked_dates.contains(&date) {
            continue;
        }
        available_slots_by_date.entry(date).or_default().push(slot);
    }
    for slots in available_slots_by_date.values_mut() {
        slots.sort_by_key(|s| s.time);
    }

    let mut month = MonthAvailability {
        available_slots_by_date,
        fully_booked_dates,
    };
    month.fully_booked_dates = month.fully_booked();
    month
}

#[async_trait]
impl AvailabilityService for StoreScheduleRepository {
    async fn month_availability(
        &self,
        resource_id: ResourceId,
        month: YearMonth,
    ) -> Result<MonthAvailability, AvailabilityError> {
        let unreachable = |e: sqlx::Error| AvailabilityError::Unreachable(e.to_string());

        let rows = sqlx::query_as::<_, SlotRow>(
            r#"
            SELECT slot_date, start_time, GREATEST(capacity - booked, 0) AS remaining
            FROM resource_slots
            WHERE resource_id = $1 AND slot_date BETWEEN $2 AND $3
            ORDER BY slot_date, start_time
            "#,
        )
        .bind(resource_id)
        .bind(month.first_day())
        .bind(month.last_day())
        .fetch_all(&self.pool)
        .await
        .map_err(unreachable)?;

        let closed: Vec<NaiveDate> = sqlx::query_scalar(
            "SELECT closed_date FROM resource_closures WHERE resource_id = $1 AND closed_date BETWEEN $2 AND $3",
        )
        .bind(resource_id)
        .bind(month.first_day())
        .bind(month.last_day())
        .fetch_all(&self.pool)
        .await
        .map_err(unreachable)?;

        let slots = rows.into_iter().map(|row| {
            let remaining = u32::try_from(row.remaining).unwrap_or(0);
            (row.slot_date, Slot::new(row.start_time, remaining))
        });

        Ok(assemble_month(slots, closed))
    }
}
