//! Postgres-backed tenant and content stores

use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use subsite_shared::{Page, PageId, StoreError, StoreResult, Tenant, TenantId, TenantStatus};

use super::{ContentStore, TenantStore};

/// Database row for a tenant (status stored as TEXT)
#[derive(Debug, sqlx::FromRow)]
struct TenantRow {
    id: Uuid,
    subdomain: String,
    name: String,
    email: String,
    phone: Option<String>,
    primary_color: Option<String>,
    status: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<TenantRow> for Tenant {
    type Error = StoreError;

    fn try_from(row: TenantRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<TenantStatus>()
            .map_err(|e| StoreError::Corrupt(format!("tenant {}: {}", row.id, e)))?;
        Ok(Tenant {
            id: row.id.into(),
            subdomain: row.subdomain,
            name: row.name,
            email: row.email,
            phone: row.phone,
            primary_color: row.primary_color,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const TENANT_COLUMNS: &str =
    "id, subdomain, name, email, phone, primary_color, status, created_at, updated_at";

#[derive(Clone)]
pub struct PgTenantStore {
    pool: PgPool,
}

impl PgTenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantStore for PgTenantStore {
    async fn find_by_subdomain(&self, subdomain: &str) -> StoreResult<Option<Tenant>> {
        let row: Option<TenantRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tenants WHERE subdomain = $1",
            TENANT_COLUMNS
        ))
        .bind(subdomain)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Tenant::try_from).transpose()
    }

    async fn find_by_id(&self, id: TenantId) -> StoreResult<Option<Tenant>> {
        let row: Option<TenantRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tenants WHERE id = $1",
            TENANT_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Tenant::try_from).transpose()
    }

    async fn insert_pending(&self, tenant: Tenant) -> StoreResult<Tenant> {
        // Duplicate subdomains surface as 23505 -> StoreError::Conflict
        let row: TenantRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO tenants (id, subdomain, name, email, phone, primary_color, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'PENDING', NOW(), NOW())
            RETURNING {}
            "#,
            TENANT_COLUMNS
        ))
        .bind(tenant.id.0)
        .bind(&tenant.subdomain)
        .bind(&tenant.name)
        .bind(&tenant.email)
        .bind(&tenant.phone)
        .bind(&tenant.primary_color)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update_status(&self, id: TenantId, status: TenantStatus) -> StoreResult<Tenant> {
        let row: Option<TenantRow> = sqlx::query_as(&format!(
            "UPDATE tenants SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            TENANT_COLUMNS
        ))
        .bind(id.0)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| StoreError::NotFound(format!("tenant {}", id)))?
            .try_into()
    }

    async fn list_active_subdomains(&self) -> StoreResult<Vec<String>> {
        let subdomains: Vec<String> = sqlx::query_scalar(
            "SELECT subdomain FROM tenants WHERE status = 'ACTIVE' ORDER BY subdomain",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(subdomains)
    }

    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>> {
        let rows: Vec<TenantRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tenants ORDER BY created_at DESC",
            TENANT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Tenant::try_from).collect()
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PageRow {
    id: Uuid,
    tenant_id: Uuid,
    slug: String,
    title: String,
    html: String,
    created_at: OffsetDateTime,
}

impl From<PageRow> for Page {
    fn from(row: PageRow) -> Self {
        Page {
            id: PageId(row.id),
            tenant_id: TenantId(row.tenant_id),
            slug: row.slug,
            title: row.title,
            html: row.html,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn create_page(
        &self,
        tenant_id: TenantId,
        slug: &str,
        title: &str,
        html: &str,
    ) -> StoreResult<Page> {
        let row: PageRow = sqlx::query_as(
            r#"
            INSERT INTO pages (id, tenant_id, slug, title, html, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, tenant_id, slug, title, html, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id.0)
        .bind(slug)
        .bind(title)
        .bind(html)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
