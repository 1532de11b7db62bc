use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{Alert, Campground, NewAlert, Park, WeatherDate};

const PARK_COLUMNS: &str = "id, park_code, name, description, latitude, longitude, states,
    designation, directions_info, weather_info, images, campground_count, weather";

const CAMPGROUND_COLUMNS: &str = "id, camp_id, park_id, name, description, latitude, longitude,
    reservation_info, reservation_url, directions_overview, weather_overview, images,
    map_image, reservable, first_come_first_serve";

/// Get a park by its NPS park code.
pub async fn get_park_by_code(pool: &PgPool, park_code: &str) -> Result<Option<Park>, sqlx::Error> {
    sqlx::query_as::<_, Park>(&format!(
        "SELECT {} FROM parks WHERE park_code = $1",
        PARK_COLUMNS
    ))
    .bind(park_code)
    .fetch_optional(pool)
    .await
}

/// List all parks, ordered by name.
pub async fn list_parks(pool: &PgPool) -> Result<Vec<Park>, sqlx::Error> {
    sqlx::query_as::<_, Park>(&format!(
        "SELECT {} FROM parks ORDER BY name, park_code",
        PARK_COLUMNS
    ))
    .fetch_all(pool)
    .await
}

/// Insert or update a park, keyed on `park_code`.
///
/// On conflict the existing row keeps its `id` and `weather`; every other
/// column is replaced by the given values. Only `update_park_weather` writes
/// the forecast of an existing park.
pub async fn upsert_park(pool: &PgPool, park: &Park) -> Result<Park, sqlx::Error> {
    sqlx::query_as::<_, Park>(&format!(
        "INSERT INTO parks (
            id, park_code, name, description, latitude, longitude, states,
            designation, directions_info, weather_info, images, campground_count, weather
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        ON CONFLICT (park_code) DO UPDATE SET
            name = EXCLUDED.name,
            description = EXCLUDED.description,
            latitude = EXCLUDED.latitude,
            longitude = EXCLUDED.longitude,
            states = EXCLUDED.states,
            designation = EXCLUDED.designation,
            directions_info = EXCLUDED.directions_info,
            weather_info = EXCLUDED.weather_info,
            images = EXCLUDED.images,
            campground_count = EXCLUDED.campground_count,
            updated_at = NOW()
        RETURNING {}",
        PARK_COLUMNS
    ))
    .bind(park.id)
    .bind(&park.park_code)
    .bind(&park.name)
    .bind(&park.description)
    .bind(park.latitude)
    .bind(park.longitude)
    .bind(&park.states)
    .bind(&park.designation)
    .bind(&park.directions_info)
    .bind(&park.weather_info)
    .bind(&park.images)
    .bind(park.campground_count)
    .bind(&park.weather)
    .fetch_one(pool)
    .await
}

/// Replace a park's forecast wholesale.
pub async fn update_park_weather(
    pool: &PgPool,
    park_id: Uuid,
    forecast: &[WeatherDate],
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE parks SET weather = $2, updated_at = NOW() WHERE id = $1")
        .bind(park_id)
        .bind(Json(forecast))
        .execute(pool)
        .await?;
    Ok(())
}

/// Get a campground by its NPS id.
pub async fn get_campground_by_camp_id(
    pool: &PgPool,
    camp_id: &str,
) -> Result<Option<Campground>, sqlx::Error> {
    sqlx::query_as::<_, Campground>(&format!(
        "SELECT {} FROM campgrounds WHERE camp_id = $1",
        CAMPGROUND_COLUMNS
    ))
    .bind(camp_id)
    .fetch_optional(pool)
    .await
}

/// List the campgrounds of a park, ordered by name.
pub async fn list_campgrounds_for_park(
    pool: &PgPool,
    park_id: Uuid,
) -> Result<Vec<Campground>, sqlx::Error> {
    sqlx::query_as::<_, Campground>(&format!(
        "SELECT {} FROM campgrounds WHERE park_id = $1 ORDER BY name, camp_id",
        CAMPGROUND_COLUMNS
    ))
    .bind(park_id)
    .fetch_all(pool)
    .await
}

/// Insert or update a campground, keyed on `camp_id`.
pub async fn upsert_campground(
    pool: &PgPool,
    campground: &Campground,
) -> Result<Campground, sqlx::Error> {
    sqlx::query_as::<_, Campground>(&format!(
        "INSERT INTO campgrounds (
            id, camp_id, park_id, name, description, latitude, longitude,
            reservation_info, reservation_url, directions_overview, weather_overview,
            images, map_image, reservable, first_come_first_serve
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        ON CONFLICT (camp_id) DO UPDATE SET
            park_id = EXCLUDED.park_id,
            name = EXCLUDED.name,
            description = EXCLUDED.description,
            latitude = EXCLUDED.latitude,
            longitude = EXCLUDED.longitude,
            reservation_info = EXCLUDED.reservation_info,
            reservation_url = EXCLUDED.reservation_url,
            directions_overview = EXCLUDED.directions_overview,
            weather_overview = EXCLUDED.weather_overview,
            images = EXCLUDED.images,
            map_image = COALESCE(campgrounds.map_image, EXCLUDED.map_image),
            reservable = EXCLUDED.reservable,
            first_come_first_serve = EXCLUDED.first_come_first_serve,
            updated_at = NOW()
        RETURNING {}",
        CAMPGROUND_COLUMNS
    ))
    .bind(campground.id)
    .bind(&campground.camp_id)
    .bind(campground.park_id)
    .bind(&campground.name)
    .bind(&campground.description)
    .bind(campground.latitude)
    .bind(campground.longitude)
    .bind(&campground.reservation_info)
    .bind(&campground.reservation_url)
    .bind(&campground.directions_overview)
    .bind(&campground.weather_overview)
    .bind(&campground.images)
    .bind(&campground.map_image)
    .bind(campground.reservable)
    .bind(campground.first_come_first_serve)
    .fetch_one(pool)
    .await
}

/// Store a file body under `name`.
pub async fn insert_file(
    pool: &PgPool,
    name: &str,
    content_type: &str,
    data: &[u8],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO stored_files (name, content_type, size_bytes, data)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(name)
    .bind(content_type)
    .bind(i32::try_from(data.len()).unwrap_or(i32::MAX))
    .bind(data)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete a stored file by name.
pub async fn delete_file(pool: &PgPool, name: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM stored_files WHERE name = $1")
        .bind(name)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete every alert. Returns the number of rows removed.
pub async fn delete_all_alerts(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM alerts").execute(pool).await?;
    Ok(result.rows_affected())
}

/// Insert a new alert record.
pub async fn insert_alert(pool: &PgPool, alert: &NewAlert) -> Result<Alert, sqlx::Error> {
    sqlx::query_as::<_, Alert>(
        "INSERT INTO alerts (id, park_id, title, description, category, url, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, NOW())
         RETURNING id, park_id, title, description, category, url, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(alert.park_id)
    .bind(&alert.title)
    .bind(&alert.description)
    .bind(&alert.category)
    .bind(&alert.url)
    .fetch_one(pool)
    .await
}

/// List all alerts, newest first.
pub async fn list_alerts(pool: &PgPool) -> Result<Vec<Alert>, sqlx::Error> {
    sqlx::query_as::<_, Alert>(
        "SELECT id, park_id, title, description, category, url, created_at
         FROM alerts ORDER BY created_at DESC, title",
    )
    .fetch_all(pool)
    .await
}
