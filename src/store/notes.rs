use crate::errors::{Error, Result};
use crate::models::Note;
use crate::sheets::Table;
use crate::store::{now_timestamp, SheetStore};
use tracing::{info, instrument};

/// Saves a quick note. At least one of title/body must be non-blank.
#[instrument(skip(store, title, body))]
pub async fn add_note(store: &SheetStore, title: &str, body: &str) -> Result<i64> {
    let title = title.trim();
    let body = body.trim();
    if title.is_empty() && body.is_empty() {
        return Err(Error::Validation(
            "a note needs a title or a body".into(),
        ));
    }

    let existing = store.tables.read(Table::Notes).await?;
    let id = existing.next_id();
    let now = now_timestamp();
    let note = Note {
        id,
        title: title.to_string(),
        body: body.to_string(),
        created_at: now.clone(),
        updated_at: now,
    };
    store.tables.append(Table::Notes, note.to_row()).await?;
    info!("Added note {}", id);
    Ok(id)
}

/// All notes, most recently touched first (updated_at desc, id desc).
#[instrument(skip(store))]
pub async fn fetch_notes(store: &SheetStore) -> Result<Vec<Note>> {
    let rows = store.tables.read(Table::Notes).await?;
    let mut notes: Vec<Note> = rows.iter().map(|row| Note::from_row(row)).collect();
    notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
    Ok(notes)
}

/// Replaces a note's title and body and refreshes its updated_at stamp.
/// Unknown ids are a no-op.
#[instrument(skip(store, title, body))]
pub async fn update_note(store: &SheetStore, id: i64, title: &str, body: &str) -> Result<()> {
    let mut rows = store.tables.read(Table::Notes).await?;
    let mut changed = false;
    for row in &mut rows.rows {
        if row.first().and_then(|c| c.trim().parse::<i64>().ok()) == Some(id) {
            let mut note = Note::from_row(row);
            note.title = title.trim().to_string();
            note.body = body.trim().to_string();
            note.updated_at = now_timestamp();
            *row = note.to_row();
            changed = true;
        }
    }
    if changed {
        store.tables.rewrite(Table::Notes, &rows).await?;
        info!("Updated note {}", id);
    }
    Ok(())
}

#[instrument(skip(store))]
pub async fn delete_note(store: &SheetStore, id: i64) -> Result<()> {
    let mut rows = store.tables.read(Table::Notes).await?;
    if rows.remove_by_id(id) {
        store.tables.rewrite(Table::Notes, &rows).await?;
        info!("Deleted note {}", id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_utils::setup_store;
    use std::time::Duration;

    #[tokio::test]
    async fn add_and_fetch_round_trip() {
        let (_api, store) = setup_store().await;
        let id = add_note(&store, " Groceries ", "milk, bread").await.unwrap();

        let notes = fetch_notes(&store).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, id);
        assert_eq!(notes[0].title, "Groceries");
        assert_eq!(notes[0].body, "milk, bread");
        assert_eq!(notes[0].created_at, notes[0].updated_at);
    }

    #[tokio::test]
    async fn completely_blank_notes_are_rejected() {
        let (_api, store) = setup_store().await;
        assert!(matches!(
            add_note(&store, "  ", "\n").await,
            Err(Error::Validation(_))
        ));
        // Title-only and body-only are both fine.
        add_note(&store, "title only", "").await.unwrap();
        add_note(&store, "", "body only").await.unwrap();
    }

    #[tokio::test]
    async fn update_refreshes_updated_at_and_resorts() {
        let (_api, store) = setup_store().await;
        let first = add_note(&store, "first", "a").await.unwrap();
        let second = add_note(&store, "second", "b").await.unwrap();

        // Millisecond timestamps; make sure the edit lands later.
        tokio::time::sleep(Duration::from_millis(10)).await;
        update_note(&store, first, "first (edited)", "a2").await.unwrap();

        let notes = fetch_notes(&store).await.unwrap();
        assert_eq!(notes[0].id, first, "edited note surfaces first");
        assert_eq!(notes[0].title, "first (edited)");
        assert!(notes[0].updated_at > notes[0].created_at);
        assert_eq!(notes[1].id, second);
    }

    #[tokio::test]
    async fn update_of_unknown_id_changes_nothing() {
        let (api, store) = setup_store().await;
        add_note(&store, "keep", "me").await.unwrap();
        let before = api.raw_rows(Table::Notes.name());

        update_note(&store, 404, "x", "y").await.unwrap();
        assert_eq!(api.raw_rows(Table::Notes.name()), before);
    }

    #[tokio::test]
    async fn delete_removes_the_note() {
        let (_api, store) = setup_store().await;
        let id = add_note(&store, "bye", "").await.unwrap();
        delete_note(&store, id).await.unwrap();
        assert!(fetch_notes(&store).await.unwrap().is_empty());
    }
}
