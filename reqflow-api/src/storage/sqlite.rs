use crate::DbConnection;
use async_trait::async_trait;
use chrono::Utc;
use reqflow_workbench::{RequirementStore, StoreError};
use rusqlite::{params, Connection, OptionalExtension};
use shared_types::{BaStatus, CreateRequirementRequest, Requirement};
use uuid::Uuid;

pub struct SqliteRequirementStore {
    connection: DbConnection,
}

impl SqliteRequirementStore {
    pub fn new(connection: DbConnection) -> Self {
        Self { connection }
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Requirement> {
        let status_str: String = row.get(3)?;
        Ok(Requirement {
            id: row.get(0)?,
            source_key: row.get(1)?,
            description: row.get(2)?,
            ba_status: BaStatus::parse(&status_str),
            ba_prompt: row.get(4)?,
            ba_response: row.get(5)?,
            ta_prompt: row.get(6)?,
            technical_solution: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn fetch(conn: &Connection, record_id: &str) -> Result<Option<Requirement>, StoreError> {
        let mut stmt = conn
            .prepare(
                r#"
                SELECT id, source_key, description, ba_status, ba_prompt, ba_response,
                       ta_prompt, technical_solution, created_at, updated_at
                FROM requirements
                WHERE id = ?1
                "#,
            )
            .map_err(|e| StoreError::OperationFailed(e.to_string()))?;

        stmt.query_row(params![record_id], Self::map_row)
            .optional()
            .map_err(|e| StoreError::OperationFailed(e.to_string()))
    }
}

#[async_trait]
impl RequirementStore for SqliteRequirementStore {
    async fn create_requirement(
        &self,
        request: CreateRequirementRequest,
    ) -> Result<Requirement, StoreError> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| StoreError::OperationFailed(format!("Lock error: {}", e)))?;

        let now = Utc::now().timestamp();
        let requirement = Requirement {
            id: Uuid::new_v4().to_string(),
            source_key: request.source_key,
            description: request.description,
            ba_status: BaStatus::Draft,
            ba_prompt: None,
            ba_response: None,
            ta_prompt: None,
            technical_solution: None,
            created_at: now,
            updated_at: now,
        };

        conn.execute(
            r#"
            INSERT INTO requirements
                (id, source_key, description, ba_status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                requirement.id,
                requirement.source_key,
                requirement.description,
                requirement.ba_status.as_str(),
                requirement.created_at,
                requirement.updated_at,
            ],
        )
        .map_err(|e| StoreError::OperationFailed(e.to_string()))?;

        Ok(requirement)
    }

    async fn list_requirements(&self) -> Result<Vec<Requirement>, StoreError> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| StoreError::OperationFailed(format!("Lock error: {}", e)))?;

        let mut stmt = conn
            .prepare(
                r#"
                SELECT id, source_key, description, ba_status, ba_prompt, ba_response,
                       ta_prompt, technical_solution, created_at, updated_at
                FROM requirements
                ORDER BY created_at DESC
                "#,
            )
            .map_err(|e| StoreError::OperationFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::map_row)
            .map_err(|e| StoreError::OperationFailed(e.to_string()))?;

        let mut requirements = Vec::new();
        for row in rows {
            requirements.push(row.map_err(|e| StoreError::OperationFailed(e.to_string()))?);
        }
        Ok(requirements)
    }

    async fn get_requirement(&self, record_id: &str) -> Result<Requirement, StoreError> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| StoreError::OperationFailed(format!("Lock error: {}", e)))?;

        Self::fetch(&conn, record_id)?.ok_or_else(|| StoreError::NotFound(record_id.to_string()))
    }

    async fn approve_design(
        &self,
        record_id: &str,
        prompt: &str,
        response: &str,
    ) -> Result<Requirement, StoreError> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| StoreError::OperationFailed(format!("Lock error: {}", e)))?;

        let updated = conn
            .execute(
                r#"
                UPDATE requirements
                SET ta_prompt = ?1, technical_solution = ?2, updated_at = ?3
                WHERE id = ?4
                "#,
                params![prompt, response, Utc::now().timestamp(), record_id],
            )
            .map_err(|e| StoreError::OperationFailed(e.to_string()))?;

        if updated == 0 {
            return Err(StoreError::NotFound(record_id.to_string()));
        }

        Self::fetch(&conn, record_id)?.ok_or_else(|| StoreError::NotFound(record_id.to_string()))
    }

    async fn approve_ba_content(
        &self,
        record_id: &str,
        used_ai_verbatim: bool,
        content: &str,
        prompt: &str,
    ) -> Result<Requirement, StoreError> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| StoreError::OperationFailed(format!("Lock error: {}", e)))?;

        let updated = conn
            .execute(
                r#"
                UPDATE requirements
                SET ba_status = ?1, ba_prompt = ?2, ba_response = ?3,
                    ba_used_ai_verbatim = ?4, updated_at = ?5
                WHERE id = ?6
                "#,
                params![
                    BaStatus::Approved.as_str(),
                    prompt,
                    content,
                    used_ai_verbatim,
                    Utc::now().timestamp(),
                    record_id,
                ],
            )
            .map_err(|e| StoreError::OperationFailed(e.to_string()))?;

        if updated == 0 {
            return Err(StoreError::NotFound(record_id.to_string()));
        }

        Self::fetch(&conn, record_id)?.ok_or_else(|| StoreError::NotFound(record_id.to_string()))
    }
}
