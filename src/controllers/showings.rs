use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::BookingError;
use crate::format::{format_duration, format_start_time};
use crate::middleware::AuthUser;
use crate::models::{Money, ScheduleDay, SeatGroup, ShowingRef};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/showings", get(get_showing))
        .route("/cinemas/{id}/schedules", get(get_schedules))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowingResponse {
    pub duration: i32,
    pub duration_label: String,
    pub start_time: String,
    pub start_time_label: String,
    pub price: Money,
    pub seat_groups: Vec<SeatGroup>,
}

// GET /api/showings?cinemaId=..&movieId=..&day=..&startTime=..
async fn get_showing(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Query(showing): Query<ShowingRef>,
) -> Result<Json<ShowingResponse>, BookingError> {
    showing.validate()?;
    let item = state.api.fetch_schedule_item(&showing).await?;

    Ok(Json(ShowingResponse {
        duration: item.duration,
        duration_label: format_duration(item.duration),
        start_time_label: format_start_time(&item.start_time),
        start_time: item.start_time,
        price: item.price,
        seat_groups: item.seat_groups,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub cinema_id: String,
    pub days: Vec<ScheduleDayResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDayResponse {
    pub day: String,
    pub items: Vec<ScheduleEntryResponse>,
}

/// Строка расписания; `showing` сразу годится для POST /api/checkouts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntryResponse {
    pub movie_id: String,
    pub start_time: String,
    pub start_time_label: String,
    pub duration: i32,
    pub duration_label: String,
    pub price: Option<Money>,
    pub showing: ShowingRef,
}

fn schedule_day(cinema_id: &str, day: ScheduleDay) -> ScheduleDayResponse {
    let items = day
        .schedule_items
        .into_iter()
        .map(|item| ScheduleEntryResponse {
            showing: ShowingRef {
                cinema_id: cinema_id.to_string(),
                movie_id: item.movie_id.clone(),
                day: day.day.clone(),
                start_time: item.start_time.clone(),
            },
            start_time_label: format_start_time(&item.start_time),
            duration_label: format_duration(item.duration),
            movie_id: item.movie_id,
            start_time: item.start_time,
            duration: item.duration,
            price: item.price,
        })
        .collect();
    ScheduleDayResponse { day: day.day, items }
}

// GET /api/cinemas/{id}/schedules
async fn get_schedules(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(cinema_id): Path<String>,
) -> Result<Json<ScheduleResponse>, BookingError> {
    if cinema_id.trim().is_empty() {
        return Err(BookingError::Validation("Cinema id must not be empty".to_string()));
    }
    let days = state.api.fetch_schedules(&cinema_id).await?;

    Ok(Json(ScheduleResponse {
        days: days.into_iter().map(|day| schedule_day(&cinema_id, day)).collect(),
        cinema_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduleListing;

    #[test]
    fn schedule_entries_carry_a_bookable_showing() {
        let day = ScheduleDay {
            day: "Monday".to_string(),
            schedule_items: vec![ScheduleListing {
                movie_id: "movie-1".to_string(),
                start_time: "2024-05-06T18:00:00".to_string(),
                duration: 125,
                price: Some(Money::from_cents(1250)),
            }],
        };
        let response = schedule_day("cinema-1", day);
        assert_eq!(response.day, "Monday");
        let entry = &response.items[0];
        assert_eq!(entry.showing.cinema_id, "cinema-1");
        assert_eq!(entry.showing.day, "Monday");
        assert_eq!(entry.showing.start_time, entry.start_time);
        assert_eq!(entry.duration_label, format_duration(125));
    }
}
