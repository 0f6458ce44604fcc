use anyhow::Result;
use chrono::{Datelike, Local};
use lae_core::repository::Repository;

use crate::cli::{CalendarCommand, CalendarSubcommand, DateViewCommand, MonthViewCommand};
use crate::commands::emit;
use crate::parser::parse_date;
use crate::views::calendar::{display_day, display_month, display_week};

pub async fn calendar_command(repo: &impl Repository, command: CalendarCommand) -> Result<()> {
    match command.command {
        CalendarSubcommand::Week(week_command) => show_week(repo, week_command).await,
        CalendarSubcommand::Month(month_command) => show_month(repo, month_command).await,
        CalendarSubcommand::Day(day_command) => show_day(repo, day_command).await,
    }
}

async fn show_week(repo: &impl Repository, command: DateViewCommand) -> Result<()> {
    let date = parse_date(&command.date)?;
    let week = repo.week_view(date).await?;
    emit(command.output, &week, display_week)
}

async fn show_month(repo: &impl Repository, command: MonthViewCommand) -> Result<()> {
    let today = Local::now().date_naive();
    let year = command.year.unwrap_or_else(|| today.year());
    let month = command.month.unwrap_or_else(|| today.month());
    let view = repo.month_view(year, month).await?;
    emit(command.output, &view, display_month)
}

async fn show_day(repo: &impl Repository, command: DateViewCommand) -> Result<()> {
    let date = parse_date(&command.date)?;
    let day = repo.day_view(date).await?;
    emit(command.output, &day, display_day)
}
