use rusqlite::{params, OptionalExtension as _, Transaction};
use storyvault_core::{Importance, PlotThread, PlotThreadDevelopment, PlotThreadInput, ThreadStatus};

use super::{enum_column, get_conn, insert_or_fetch, now, Storage};
use crate::error::{Result, StorageError};

const THREAD_COLUMNS: &str =
    "id, name, description, thread_type, importance, status, created_at, updated_at";

impl Storage {
    /// Create a plot thread, or resolve to the existing thread with the same name.
    ///
    /// # Errors
    /// Returns error if database insert fails.
    pub fn create_plot_thread(&self, input: &PlotThreadInput) -> Result<i64> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        let now = now();
        let (id, inserted) = insert_or_fetch(
            &tx,
            "INSERT INTO plot_threads
               (name, description, thread_type, importance, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(name) DO NOTHING",
            params![
                input.name,
                input.description,
                input.thread_type,
                input.importance.as_str(),
                input.status.as_str(),
                now,
            ],
            "SELECT id FROM plot_threads WHERE name = ?1",
            params![input.name],
        )?;
        tx.commit()?;
        if inserted {
            tracing::debug!(name = %input.name, id, "Plot thread created");
        }
        Ok(id)
    }

    /// Get plot thread by ID.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_plot_thread(&self, id: i64) -> Result<Option<PlotThread>> {
        let conn = get_conn(&self.pool)?;
        let sql = format!("SELECT {THREAD_COLUMNS} FROM plot_threads WHERE id = ?1");
        Ok(conn.query_row(&sql, [id], row_to_thread).optional()?)
    }

    /// Get plot thread by its unique name.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_plot_thread_by_name(&self, name: &str) -> Result<Option<PlotThread>> {
        let conn = get_conn(&self.pool)?;
        let sql = format!("SELECT {THREAD_COLUMNS} FROM plot_threads WHERE name = ?1");
        Ok(conn.query_row(&sql, [name], row_to_thread).optional()?)
    }

    /// All plot threads in creation order.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_plot_threads(&self) -> Result<Vec<PlotThread>> {
        let conn = get_conn(&self.pool)?;
        let sql = format!("SELECT {THREAD_COLUMNS} FROM plot_threads ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;
        let results = stmt.query_map([], row_to_thread)?.collect::<rusqlite::Result<_>>()?;
        Ok(results)
    }

    /// Overwrite a thread's description, type and importance. Status has its own operation.
    ///
    /// # Errors
    /// Returns [`StorageError::NotFound`] if the thread does not exist.
    pub fn update_plot_thread_details(
        &self,
        id: i64,
        description: &str,
        thread_type: Option<&str>,
        importance: Importance,
    ) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute(
            "UPDATE plot_threads
                SET description = ?1, thread_type = ?2, importance = ?3, updated_at = ?4
              WHERE id = ?5",
            params![description, thread_type, importance.as_str(), now(), id],
        )?;
        if affected == 0 {
            return Err(StorageError::not_found("plot thread", id));
        }
        Ok(())
    }

    /// Move a thread to a new status.
    ///
    /// Setting the current status again is a no-op. Resolved and abandoned
    /// threads are final, and nothing returns to `introduced`.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidTransition`] for a disallowed move and
    /// [`StorageError::NotFound`] for an unknown thread.
    pub fn update_plot_thread_status(&self, id: i64, status: ThreadStatus) -> Result<()> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        let current = current_status(&tx, id)?;
        if !current.can_transition_to(status) {
            return Err(StorageError::InvalidTransition { from: current, to: status });
        }
        if current != status {
            set_status(&tx, id, status)?;
            tracing::info!(thread_id = id, from = %current, to = %status, "Plot thread status changed");
        }
        tx.commit()?;
        Ok(())
    }

    /// Append a development to a thread, anchored at a scene.
    ///
    /// A thread still in `introduced` moves to `developing`.
    ///
    /// # Errors
    /// Returns [`StorageError::Integrity`] if the thread or scene does not exist,
    /// and [`StorageError::InvalidTransition`] if the thread is already closed.
    pub fn add_plot_thread_development(
        &self,
        plot_thread_id: i64,
        scene_id: i64,
        development_type: &str,
        description: &str,
    ) -> Result<i64> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        let status = current_status(&tx, plot_thread_id).map_err(|e| match e {
            StorageError::NotFound { id, .. } => {
                StorageError::Integrity(format!("plot thread {id} does not exist"))
            },
            other => other,
        })?;
        if status.is_terminal() {
            return Err(StorageError::InvalidTransition { from: status, to: ThreadStatus::Developing });
        }

        tx.execute(
            "INSERT INTO plot_thread_developments
               (plot_thread_id, scene_id, development_type, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![plot_thread_id, scene_id, development_type, description, now()],
        )?;
        let id = tx.last_insert_rowid();

        if status == ThreadStatus::Introduced {
            set_status(&tx, plot_thread_id, ThreadStatus::Developing)?;
        }
        tx.commit()?;
        Ok(id)
    }

    /// A thread's developments in story order.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_plot_thread_developments(&self, plot_thread_id: i64) -> Result<Vec<PlotThreadDevelopment>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT d.id, d.plot_thread_id, d.scene_id, c.chapter_number, s.scene_number,
                    d.development_type, d.description, d.created_at
               FROM plot_thread_developments d
               JOIN scenes s ON s.id = d.scene_id
               JOIN chapters c ON c.id = s.chapter_id
              WHERE d.plot_thread_id = ?1
              ORDER BY c.chapter_number, s.scene_number, d.id",
        )?;
        let results = stmt
            .query_map([plot_thread_id], row_to_development)?
            .collect::<rusqlite::Result<_>>()?;
        Ok(results)
    }
}

fn current_status(tx: &Transaction<'_>, id: i64) -> Result<ThreadStatus> {
    let raw: String = tx
        .query_row("SELECT status FROM plot_threads WHERE id = ?1", [id], |row| row.get(0))
        .optional()?
        .ok_or_else(|| StorageError::not_found("plot thread", id))?;
    Ok(raw.parse()?)
}

fn set_status(tx: &Transaction<'_>, id: i64, status: ThreadStatus) -> Result<()> {
    tx.execute(
        "UPDATE plot_threads SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now(), id],
    )?;
    Ok(())
}

pub(crate) fn row_to_thread(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlotThread> {
    Ok(PlotThread {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        thread_type: row.get(3)?,
        importance: enum_column(row, 4)?,
        status: enum_column(row, 5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub(crate) fn row_to_development(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlotThreadDevelopment> {
    Ok(PlotThreadDevelopment {
        id: row.get(0)?,
        plot_thread_id: row.get(1)?,
        scene_id: row.get(2)?,
        chapter_number: row.get(3)?,
        scene_number: row.get(4)?,
        development_type: row.get(5)?,
        description: row.get(6)?,
        created_at: row.get(7)?,
    })
}
