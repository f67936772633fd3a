//! `PostgreSQL` writes into `vehicle_maintenance` and `plant_maintenance`.
//!
//! Completion rules name their column at runtime, so writes use raw SQL.
//! The column is checked against `information_schema` first; interpolating
//! it is safe because [`FieldName`] only admits lowercase identifiers.

use crate::database::{PgPool, with_connection};
use crate::task::{
    domain::{ActorRef, AssetKind, CompletionValue, FieldName, TaskAsset},
    ports::{MaintenanceRepository, MaintenanceRepositoryError, MaintenanceRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Date, Text, Uuid as SqlUuid};

/// Columns owned by the table itself, never writable by a rule.
const RESERVED_COLUMNS: [&str; 5] = ["id", "vehicle_id", "plant_id", "updated_at", "updated_by"];

#[derive(QueryableByName)]
struct ColumnType {
    #[diesel(sql_type = Text)]
    data_type: String,
}

/// `PostgreSQL`-backed maintenance record writer.
#[derive(Debug, Clone)]
pub struct PostgresMaintenanceRepository {
    pool: PgPool,
}

impl PostgresMaintenanceRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MaintenanceRepository for PostgresMaintenanceRepository {
    async fn write_field(
        &self,
        asset: TaskAsset,
        field: &FieldName,
        value: &CompletionValue,
        updated_by: &ActorRef,
    ) -> MaintenanceRepositoryResult<()> {
        let owned_field = field.clone();
        let owned_value = value.clone();
        let editor_id = updated_by.user_id.into_inner();

        with_connection(
            &self.pool,
            MaintenanceRepositoryError::persistence,
            move |connection| {
                let (table, key_column) = table_for(asset.kind());
                if RESERVED_COLUMNS.contains(&owned_field.as_str()) {
                    return Err(MaintenanceRepositoryError::UnknownField(owned_field));
                }
                let Some(column) = column_type(connection, table, &owned_field)? else {
                    return Err(MaintenanceRepositoryError::UnknownField(owned_field));
                };
                if !accepts(&column.data_type, &owned_value) {
                    return Err(MaintenanceRepositoryError::TypeMismatch {
                        field: owned_field,
                        value: owned_value,
                    });
                }

                let sql = format!(
                    "INSERT INTO {table} ({key_column}, {field}, updated_at, updated_by) \
                     VALUES ($1, $2, now(), $3) \
                     ON CONFLICT ({key_column}) DO UPDATE SET \
                     {field} = EXCLUDED.{field}, \
                     updated_at = EXCLUDED.updated_at, \
                     updated_by = EXCLUDED.updated_by",
                    field = owned_field.as_str(),
                );
                let query = diesel::sql_query(sql).bind::<SqlUuid, _>(asset.id());
                let result = match &owned_value {
                    CompletionValue::Date(date) => query
                        .bind::<Date, _>(*date)
                        .bind::<SqlUuid, _>(editor_id)
                        .execute(connection),
                    CompletionValue::Mileage(number) | CompletionValue::Hours(number) => query
                        .bind::<BigInt, _>(i64::from(*number))
                        .bind::<SqlUuid, _>(editor_id)
                        .execute(connection),
                    CompletionValue::Text(text) => query
                        .bind::<Text, _>(text.as_str())
                        .bind::<SqlUuid, _>(editor_id)
                        .execute(connection),
                };
                result.map_err(MaintenanceRepositoryError::persistence)?;
                Ok(())
            },
        )
        .await
    }
}

const fn table_for(kind: AssetKind) -> (&'static str, &'static str) {
    match kind {
        AssetKind::Vehicle => ("vehicle_maintenance", "vehicle_id"),
        AssetKind::Plant => ("plant_maintenance", "plant_id"),
    }
}

fn column_type(
    connection: &mut PgConnection,
    table: &str,
    field: &FieldName,
) -> MaintenanceRepositoryResult<Option<ColumnType>> {
    diesel::sql_query(
        "SELECT data_type::text AS data_type FROM information_schema.columns \
         WHERE table_schema = current_schema() AND table_name = $1 AND column_name = $2",
    )
    .bind::<Text, _>(table)
    .bind::<Text, _>(field.as_str())
    .get_result::<ColumnType>(connection)
    .optional()
    .map_err(MaintenanceRepositoryError::persistence)
}

fn accepts(data_type: &str, value: &CompletionValue) -> bool {
    match value {
        CompletionValue::Date(_) => data_type == "date",
        CompletionValue::Mileage(_) | CompletionValue::Hours(_) => {
            matches!(data_type, "integer" | "bigint" | "numeric")
        }
        CompletionValue::Text(_) => matches!(data_type, "text" | "character varying"),
    }
}

#[cfg(test)]
mod tests {
    use super::accepts;
    use crate::task::domain::CompletionValue;
    use chrono::NaiveDate;
    use rstest::rstest;

    #[rstest]
    #[case("date", true)]
    #[case("text", false)]
    fn date_values_need_date_columns(#[case] data_type: &str, #[case] expected: bool) {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date");
        assert_eq!(accepts(data_type, &CompletionValue::Date(date)), expected);
    }

    #[rstest]
    #[case("integer", true)]
    #[case("bigint", true)]
    #[case("numeric", true)]
    #[case("character varying", false)]
    fn numeric_values_need_numeric_columns(#[case] data_type: &str, #[case] expected: bool) {
        assert_eq!(accepts(data_type, &CompletionValue::Mileage(12_000)), expected);
        assert_eq!(accepts(data_type, &CompletionValue::Hours(350)), expected);
    }

    #[rstest]
    #[case("text", true)]
    #[case("character varying", true)]
    #[case("date", false)]
    fn text_values_need_text_columns(#[case] data_type: &str, #[case] expected: bool) {
        assert_eq!(
            accepts(data_type, &CompletionValue::Text("Replaced".to_owned())),
            expected
        );
    }
}
