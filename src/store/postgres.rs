use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{FromRow, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use super::{Store, StoreError, StoreTx};
use crate::availability::TimeWindow;
use crate::models::{
    AvailabilityWindow, Booking, BookingResources, BookingStatus, Coach, Court, Equipment,
    EquipmentLine, PricingBreakdown, PricingRule, RuleCondition,
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS courts (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        image_url TEXT NOT NULL DEFAULT '',
        court_type TEXT NOT NULL,
        base_price NUMERIC NOT NULL,
        rating DOUBLE PRECISION NOT NULL,
        rating_count INTEGER NOT NULL,
        is_active BOOLEAN NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS coaches (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        expertise TEXT,
        hourly_rate NUMERIC NOT NULL,
        availability JSONB NOT NULL,
        is_active BOOLEAN NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS equipment (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        total_stock INTEGER NOT NULL,
        per_unit_fee NUMERIC NOT NULL,
        is_active BOOLEAN NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS pricing_rules (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        kind TEXT NOT NULL,
        condition JSONB NOT NULL,
        value NUMERIC NOT NULL,
        is_active BOOLEAN NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS pricing_rules_date_key
        ON pricing_rules ((condition->>'date'))
        WHERE condition->>'date' IS NOT NULL
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bookings (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL,
        court_id UUID NOT NULL,
        start_time TIMESTAMPTZ NOT NULL,
        end_time TIMESTAMPTZ NOT NULL,
        coach_id UUID,
        equipment JSONB NOT NULL,
        base_price NUMERIC NOT NULL,
        peak_fee NUMERIC NOT NULL,
        weekend_fee NUMERIC NOT NULL,
        equipment_fee NUMERIC NOT NULL,
        coach_fee NUMERIC NOT NULL,
        total NUMERIC NOT NULL,
        status TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL,
        CHECK (end_time > start_time)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS bookings_court_window_idx ON bookings (court_id, start_time, end_time)",
    "CREATE INDEX IF NOT EXISTS bookings_coach_window_idx ON bookings (coach_id, start_time, end_time)",
    "CREATE INDEX IF NOT EXISTS bookings_user_idx ON bookings (user_id)",
];

macro_rules! court_columns {
    () => {
        "id, name, image_url, court_type, base_price, rating, rating_count, is_active, created_at, updated_at"
    };
}

macro_rules! coach_columns {
    () => {
        "id, name, expertise, hourly_rate, availability, is_active, created_at, updated_at"
    };
}

macro_rules! equipment_columns {
    () => {
        "id, name, total_stock, per_unit_fee, is_active, created_at, updated_at"
    };
}

macro_rules! rule_columns {
    () => {
        "id, name, kind, condition, value, is_active, created_at, updated_at"
    };
}

macro_rules! booking_columns {
    () => {
        "id, user_id, court_id, start_time, end_time, coach_id, equipment, base_price, peak_fee, \
         weekend_fee, equipment_fee, coach_fee, total, status, created_at, updated_at"
    };
}

#[derive(FromRow)]
struct CourtRow {
    id: Uuid,
    name: String,
    image_url: String,
    court_type: String,
    base_price: Decimal,
    rating: f64,
    rating_count: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CourtRow> for Court {
    type Error = StoreError;

    fn try_from(row: CourtRow) -> Result<Self, Self::Error> {
        Ok(Court {
            court_type: row.court_type.parse().map_err(StoreError::Corrupt)?,
            rating_count: non_negative(row.rating_count, "rating_count", row.id)?,
            id: row.id,
            name: row.name,
            image_url: row.image_url,
            base_price: row.base_price,
            rating: row.rating,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct CoachRow {
    id: Uuid,
    name: String,
    expertise: Option<String>,
    hourly_rate: Decimal,
    availability: Json<Vec<AvailabilityWindow>>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CoachRow> for Coach {
    fn from(row: CoachRow) -> Self {
        Coach {
            id: row.id,
            name: row.name,
            expertise: row.expertise,
            hourly_rate: row.hourly_rate,
            availability: row.availability.0,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct EquipmentRow {
    id: Uuid,
    name: String,
    total_stock: i32,
    per_unit_fee: Decimal,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EquipmentRow> for Equipment {
    type Error = StoreError;

    fn try_from(row: EquipmentRow) -> Result<Self, Self::Error> {
        Ok(Equipment {
            total_stock: non_negative(row.total_stock, "total_stock", row.id)?,
            id: row.id,
            name: row.name,
            per_unit_fee: row.per_unit_fee,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct PricingRuleRow {
    id: Uuid,
    name: String,
    kind: String,
    condition: Json<RuleCondition>,
    value: Decimal,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PricingRuleRow> for PricingRule {
    type Error = StoreError;

    fn try_from(row: PricingRuleRow) -> Result<Self, Self::Error> {
        Ok(PricingRule {
            kind: row.kind.parse().map_err(StoreError::Corrupt)?,
            id: row.id,
            name: row.name,
            condition: row.condition.0,
            value: row.value,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    court_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    coach_id: Option<Uuid>,
    equipment: Json<Vec<EquipmentLine>>,
    base_price: Decimal,
    peak_fee: Decimal,
    weekend_fee: Decimal,
    equipment_fee: Decimal,
    coach_fee: Decimal,
    total: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            id: row.id,
            user_id: row.user_id,
            court_id: row.court_id,
            start_time: row.start_time,
            end_time: row.end_time,
            resources: BookingResources {
                equipment: row.equipment.0,
                coach_id: row.coach_id,
            },
            pricing_breakdown: PricingBreakdown {
                base_price: row.base_price,
                peak_fee: row.peak_fee,
                weekend_fee: row.weekend_fee,
                equipment_fee: row.equipment_fee,
                coach_fee: row.coach_fee,
                total: row.total,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn non_negative(value: i32, column: &str, id: Uuid) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::Corrupt(format!("negative {column} on {id}")))
}

// Counts are capped at i32::MAX during validation.
fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

async fn fetch_court(conn: &mut PgConnection, id: Uuid) -> Result<Option<Court>, StoreError> {
    sqlx::query_as::<_, CourtRow>(concat!(
        "SELECT ",
        court_columns!(),
        " FROM courts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?
    .map(Court::try_from)
    .transpose()
}

async fn fetch_coach(conn: &mut PgConnection, id: Uuid) -> Result<Option<Coach>, StoreError> {
    let row = sqlx::query_as::<_, CoachRow>(concat!(
        "SELECT ",
        coach_columns!(),
        " FROM coaches WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(Coach::from))
}

async fn fetch_equipment(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<Equipment>, StoreError> {
    sqlx::query_as::<_, EquipmentRow>(concat!(
        "SELECT ",
        equipment_columns!(),
        " FROM equipment WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?
    .map(Equipment::try_from)
    .transpose()
}

async fn fetch_active_rules(conn: &mut PgConnection) -> Result<Vec<PricingRule>, StoreError> {
    let rows = sqlx::query_as::<_, PricingRuleRow>(concat!(
        "SELECT ",
        rule_columns!(),
        " FROM pricing_rules WHERE is_active ORDER BY created_at, id"
    ))
    .fetch_all(conn)
    .await?;
    convert_all(rows)
}

/// PostgreSQL-backed store. Booking transactions run at `SERIALIZABLE`, so
/// two overlapping check-then-insert sequences cannot both commit.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema ready");
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_courts(&self, active_only: bool) -> Result<Vec<Court>, StoreError> {
        let rows = sqlx::query_as::<_, CourtRow>(concat!(
            "SELECT ",
            court_columns!(),
            " FROM courts WHERE is_active OR NOT $1 ORDER BY created_at DESC"
        ))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn get_court(&self, id: Uuid) -> Result<Option<Court>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        fetch_court(&mut conn, id).await
    }

    async fn insert_court(&self, court: &Court) -> Result<(), StoreError> {
        sqlx::query(concat!(
            "INSERT INTO courts (",
            court_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        ))
        .bind(court.id)
        .bind(&court.name)
        .bind(&court.image_url)
        .bind(court.court_type.as_str())
        .bind(court.base_price)
        .bind(court.rating)
        .bind(to_i32(court.rating_count))
        .bind(court.is_active)
        .bind(court.created_at)
        .bind(court.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_court(&self, court: &Court) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE courts
            SET name = $2, image_url = $3, court_type = $4, base_price = $5, rating = $6,
                rating_count = $7, is_active = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(court.id)
        .bind(&court.name)
        .bind(&court.image_url)
        .bind(court.court_type.as_str())
        .bind(court.base_price)
        .bind(court.rating)
        .bind(to_i32(court.rating_count))
        .bind(court.is_active)
        .bind(court.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_court(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM courts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_coaches(&self, active_only: bool) -> Result<Vec<Coach>, StoreError> {
        let rows = sqlx::query_as::<_, CoachRow>(concat!(
            "SELECT ",
            coach_columns!(),
            " FROM coaches WHERE is_active OR NOT $1 ORDER BY created_at DESC"
        ))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Coach::from).collect())
    }

    async fn get_coach(&self, id: Uuid) -> Result<Option<Coach>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        fetch_coach(&mut conn, id).await
    }

    async fn insert_coach(&self, coach: &Coach) -> Result<(), StoreError> {
        sqlx::query(concat!(
            "INSERT INTO coaches (",
            coach_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        ))
        .bind(coach.id)
        .bind(&coach.name)
        .bind(&coach.expertise)
        .bind(coach.hourly_rate)
        .bind(Json(&coach.availability))
        .bind(coach.is_active)
        .bind(coach.created_at)
        .bind(coach.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_coach(&self, coach: &Coach) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE coaches
            SET name = $2, expertise = $3, hourly_rate = $4, availability = $5,
                is_active = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(coach.id)
        .bind(&coach.name)
        .bind(&coach.expertise)
        .bind(coach.hourly_rate)
        .bind(Json(&coach.availability))
        .bind(coach.is_active)
        .bind(coach.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_equipment(&self, active_only: bool) -> Result<Vec<Equipment>, StoreError> {
        let rows = sqlx::query_as::<_, EquipmentRow>(concat!(
            "SELECT ",
            equipment_columns!(),
            " FROM equipment WHERE is_active OR NOT $1 ORDER BY created_at DESC"
        ))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn get_equipment(&self, id: Uuid) -> Result<Option<Equipment>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        fetch_equipment(&mut conn, id).await
    }

    async fn insert_equipment(&self, equipment: &Equipment) -> Result<(), StoreError> {
        sqlx::query(concat!(
            "INSERT INTO equipment (",
            equipment_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7)"
        ))
        .bind(equipment.id)
        .bind(&equipment.name)
        .bind(to_i32(equipment.total_stock))
        .bind(equipment.per_unit_fee)
        .bind(equipment.is_active)
        .bind(equipment.created_at)
        .bind(equipment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_equipment(&self, equipment: &Equipment) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE equipment
            SET name = $2, total_stock = $3, per_unit_fee = $4, is_active = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(equipment.id)
        .bind(&equipment.name)
        .bind(to_i32(equipment.total_stock))
        .bind(equipment.per_unit_fee)
        .bind(equipment.is_active)
        .bind(equipment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_pricing_rules(&self) -> Result<Vec<PricingRule>, StoreError> {
        let rows = sqlx::query_as::<_, PricingRuleRow>(concat!(
            "SELECT ",
            rule_columns!(),
            " FROM pricing_rules ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn active_pricing_rules(&self) -> Result<Vec<PricingRule>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        fetch_active_rules(&mut conn).await
    }

    async fn get_pricing_rule(&self, id: Uuid) -> Result<Option<PricingRule>, StoreError> {
        sqlx::query_as::<_, PricingRuleRow>(concat!(
            "SELECT ",
            rule_columns!(),
            " FROM pricing_rules WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(PricingRule::try_from)
        .transpose()
    }

    async fn find_pricing_rule_by_date(
        &self,
        date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<Option<PricingRule>, StoreError> {
        sqlx::query_as::<_, PricingRuleRow>(concat!(
            "SELECT ",
            rule_columns!(),
            " FROM pricing_rules WHERE condition->>'date' = $1",
            " AND ($2::uuid IS NULL OR id <> $2) LIMIT 1"
        ))
        .bind(date.format("%Y-%m-%d").to_string())
        .bind(exclude)
        .fetch_optional(&self.pool)
        .await?
        .map(PricingRule::try_from)
        .transpose()
    }

    async fn insert_pricing_rule(&self, rule: &PricingRule) -> Result<(), StoreError> {
        sqlx::query(concat!(
            "INSERT INTO pricing_rules (",
            rule_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        ))
        .bind(rule.id)
        .bind(&rule.name)
        .bind(rule.kind.as_str())
        .bind(Json(&rule.condition))
        .bind(rule.value)
        .bind(rule.is_active)
        .bind(rule.created_at)
        .bind(rule.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_pricing_rule(&self, rule: &PricingRule) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE pricing_rules
            SET name = $2, kind = $3, condition = $4, value = $5, is_active = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(rule.id)
        .bind(&rule.name)
        .bind(rule.kind.as_str())
        .bind(Json(&rule.condition))
        .bind(rule.value)
        .bind(rule.is_active)
        .bind(rule.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_pricing_rule(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM pricing_rules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_bookings(&self, user_id: Option<Uuid>) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(concat!(
            "SELECT ",
            booking_columns!(),
            " FROM bookings WHERE ($1::uuid IS NULL OR user_id = $1) ORDER BY start_time DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        sqlx::query_as::<_, BookingRow>(concat!(
            "SELECT ",
            booking_columns!(),
            " FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Booking::try_from)
        .transpose()
    }

    async fn set_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Booking>, StoreError> {
        sqlx::query_as::<_, BookingRow>(concat!(
            "UPDATE bookings SET status = $2, updated_at = $3 WHERE id = $1 RETURNING ",
            booking_columns!()
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(at)
        .fetch_optional(&self.pool)
        .await?
        .map(Booking::try_from)
        .transpose()
    }

    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;
        Ok(Box::new(PgTx { tx }))
    }
}

pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn court(&mut self, id: Uuid) -> Result<Option<Court>, StoreError> {
        fetch_court(&mut self.tx, id).await
    }

    async fn coach(&mut self, id: Uuid) -> Result<Option<Coach>, StoreError> {
        fetch_coach(&mut self.tx, id).await
    }

    async fn equipment(&mut self, id: Uuid) -> Result<Option<Equipment>, StoreError> {
        fetch_equipment(&mut self.tx, id).await
    }

    async fn active_pricing_rules(&mut self) -> Result<Vec<PricingRule>, StoreError> {
        fetch_active_rules(&mut self.tx).await
    }

    async fn overlapping_bookings(
        &mut self,
        window: &TimeWindow,
    ) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(concat!(
            "SELECT ",
            booking_columns!(),
            " FROM bookings WHERE status = 'confirmed' AND start_time < $2 AND end_time > $1"
        ))
        .bind(window.start())
        .bind(window.end())
        .fetch_all(&mut *self.tx)
        .await?;
        convert_all(rows)
    }

    async fn insert_booking(&mut self, booking: &Booking) -> Result<(), StoreError> {
        let breakdown = &booking.pricing_breakdown;
        sqlx::query(concat!(
            "INSERT INTO bookings (",
            booking_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"
        ))
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(booking.court_id)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.resources.coach_id)
        .bind(Json(&booking.resources.equipment))
        .bind(breakdown.base_price)
        .bind(breakdown.peak_fee)
        .bind(breakdown.weekend_fee)
        .bind(breakdown.equipment_fee)
        .bind(breakdown.coach_fee)
        .bind(breakdown.total)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let PgTx { tx } = *self;
        tx.commit().await?;
        Ok(())
    }
}
