use crate::calendar::{
    build_day_view, build_month_view, build_week_view, month_dates, week_dates, DayView, MonthView,
    WeekView,
};
use crate::error::CoreError;
use crate::models::{EventFilter, ScheduleFilter};
use crate::repository::{EventRepository, ScheduleRepository, SqliteRepository};
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

#[async_trait]
impl super::CalendarRepository for SqliteRepository {
    async fn week_view(&self, date: NaiveDate) -> Result<WeekView, CoreError> {
        let dates = week_dates(date);
        debug!(week_start = %dates[0], "building week view");
        let events = self
            .find_events_with_details(&EventFilter::between(dates[0], dates[6]))
            .await?;
        Ok(build_week_view(date, &events))
    }

    async fn month_view(&self, year: i32, month: u32) -> Result<MonthView, CoreError> {
        let dates = month_dates(year, month)?;
        let (first, last) = (dates[0], dates[dates.len() - 1]);
        debug!(year, month, "building month view");

        let events = self
            .find_events_with_details(&EventFilter::between(first, last))
            .await?;
        let schedules = self
            .find_schedules(&ScheduleFilter {
                overlapping: Some((first, last)),
                ..Default::default()
            })
            .await?;
        build_month_view(year, month, &events, schedules)
    }

    async fn day_view(&self, date: NaiveDate) -> Result<DayView, CoreError> {
        let events = self
            .find_events_with_details(&EventFilter::between(date, date))
            .await?;
        Ok(build_day_view(date, &events))
    }
}
