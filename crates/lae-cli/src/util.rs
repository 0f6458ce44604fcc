use anyhow::{anyhow, Result};
use lae_core::error::CoreError;
use lae_core::models::TaxonomyKind;
use lae_core::repository::Repository;
use uuid::Uuid;

fn check_short_id(short_id: &str) -> Result<()> {
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::Validation(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    Ok(())
}

/// Narrows prefix matches down to exactly one id.
fn single_match(what: &str, short_id: &str, matches: Vec<(Uuid, String)>) -> Result<Uuid> {
    match matches.as_slice() {
        [(id, _)] => Ok(*id),
        [] => Err(anyhow!(CoreError::NotFound(format!(
            "No {} found with short ID '{}'",
            what, short_id
        )))),
        _ => Err(anyhow!(CoreError::AmbiguousId(
            matches
                .into_iter()
                .map(|(id, name)| (id.to_string(), name))
                .collect()
        ))),
    }
}

pub async fn resolve_node_id(repo: &impl Repository, kind: TaxonomyKind, short_id: &str) -> Result<Uuid> {
    check_short_id(short_id)?;
    let nodes = repo.find_nodes_by_short_id_prefix(kind, short_id).await?;
    single_match(
        &kind.label().to_lowercase(),
        short_id,
        nodes.into_iter().map(|n| (n.id, n.name)).collect(),
    )
}

pub async fn resolve_schedule_id(repo: &impl Repository, short_id: &str) -> Result<Uuid> {
    check_short_id(short_id)?;
    let schedules = repo.find_schedules_by_short_id_prefix(short_id).await?;
    single_match(
        "schedule",
        short_id,
        schedules.into_iter().map(|s| (s.id, s.name)).collect(),
    )
}

pub async fn resolve_event_id(repo: &impl Repository, short_id: &str) -> Result<Uuid> {
    check_short_id(short_id)?;
    let events = repo.find_events_by_short_id_prefix(short_id).await?;
    single_match(
        "event",
        short_id,
        events.into_iter().map(|e| (e.id, e.name)).collect(),
    )
}

/// Resolves an optional id argument.
pub async fn resolve_optional_node_id(
    repo: &impl Repository,
    kind: TaxonomyKind,
    short_id: Option<&str>,
) -> Result<Option<Uuid>> {
    match short_id {
        Some(short_id) => Ok(Some(resolve_node_id(repo, kind, short_id).await?)),
        None => Ok(None),
    }
}

/// `--x <id>` / `--x-clear` pair into the update shape: untouched, cleared
/// or set.
pub async fn resolve_node_link(
    repo: &impl Repository,
    kind: TaxonomyKind,
    short_id: Option<&str>,
    clear: bool,
) -> Result<Option<Option<Uuid>>> {
    if clear {
        return Ok(Some(None));
    }
    Ok(resolve_optional_node_id(repo, kind, short_id).await?.map(Some))
}

/// `--x <value>` / `--x-clear` pair for plain values.
pub fn clearable<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

/// `NotFound` for a record that vanished between id resolution and use.
pub fn missing(what: &str, id: Uuid) -> anyhow::Error {
    anyhow!(CoreError::NotFound(format!("{what} with id {id} not found")))
}

/// Last 8 hex digits. The head of a v7 id is its timestamp, so ids minted
/// close together only differ in the random tail. Lookups accept either end.
pub fn short_id(id: Uuid) -> String {
    id.simple().to_string()[24..].to_string()
}
