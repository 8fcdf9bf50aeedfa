// Module database - PostgreSQL connection pool and route storage
// Architecture: Clean separation between data layer and matching logic

use std::env;
use std::future::Future;
use std::sync::RwLock;

use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};

use crate::models::Route;
use shared::{GeoPoint, Schedule};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("route {name:?} not found for owner {owner:?}")]
    NotFound { owner: String, name: String },

    #[error("invalid route data: {0}")]
    InvalidData(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Storage seam for routes (Dependency Inversion Principle)
///
/// Abstracts route storage to allow:
/// - **Testing**: In-memory implementation for unit and API tests
/// - **Backends**: PostgreSQL in production, anything query-pushable later
///
/// # Contract
/// All implementations must:
/// - Never return the excluded owner's routes from `candidate_routes`
/// - Treat `(owner, name)` as the unique route identity
/// - Upsert on `save_route` (routes are mutated in place by their owner)
pub trait RouteStore: Send + Sync {
    /// All other users' routes, the given owner's excluded by identity.
    fn candidate_routes(
        &self,
        exclude_owner: &str,
    ) -> impl Future<Output = Result<Vec<Route>, DatabaseError>> + Send;

    fn find_route(
        &self,
        owner: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<Route>, DatabaseError>> + Send;

    fn list_routes(
        &self,
        owner: &str,
    ) -> impl Future<Output = Result<Vec<Route>, DatabaseError>> + Send;

    fn save_route(&self, route: &Route) -> impl Future<Output = Result<(), DatabaseError>> + Send;

    fn delete_route(
        &self,
        owner: &str,
        name: &str,
    ) -> impl Future<Output = Result<(), DatabaseError>> + Send;
}

/// Database connection pool
pub struct Database {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct RouteRow {
    owner: String,
    name: String,
    start_address: String,
    end_address: String,
    path: sqlx::types::JsonValue,
    schedule: sqlx::types::JsonValue,
    comment: Option<String>,
}

impl RouteRow {
    fn into_route(self) -> Result<Route, DatabaseError> {
        let path: Vec<GeoPoint> = serde_json::from_value(self.path)
            .map_err(|e| DatabaseError::InvalidData(e.to_string()))?;
        let schedule: Schedule = serde_json::from_value(self.schedule)
            .map_err(|e| DatabaseError::InvalidData(e.to_string()))?;
        Ok(Route {
            owner: self.owner,
            name: self.name,
            start_address: self.start_address,
            end_address: self.end_address,
            path,
            schedule,
            comment: self.comment,
        })
    }
}

impl Database {
    /// Create new database connection pool
    ///
    /// # Errors
    /// Returns DatabaseError if connection fails or DATABASE_URL is not set
    pub async fn new() -> Result<Self, DatabaseError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| {
            DatabaseError::Config("DATABASE_URL environment variable not set".to_string())
        })?;

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await?;

        tracing::info!("PostgreSQL connection pool created");

        Ok(Self { pool })
    }

    /// Run database migrations
    ///
    /// # Errors
    /// Returns DatabaseError if migration fails
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        // SQLx query() cannot handle multiple statements, so go raw
        let mut conn = self.pool.acquire().await?;

        let migration_sql = include_str!("../migrations/20250601_create_routes.sql");

        sqlx::raw_sql(migration_sql).execute(&mut *conn).await?;

        tracing::info!("Database migrations completed");
        Ok(())
    }

    async fn candidate_routes_impl(&self, exclude_owner: &str) -> Result<Vec<Route>, DatabaseError> {
        let rows = sqlx::query_as::<_, RouteRow>(
            r#"
            SELECT owner, name, start_address, end_address, path, schedule, comment
            FROM routes
            WHERE owner <> $1
            ORDER BY created_at
            "#,
        )
        .bind(exclude_owner)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(
            "fetched {} candidate routes (excluding {})",
            rows.len(),
            exclude_owner
        );
        rows.into_iter().map(RouteRow::into_route).collect()
    }

    async fn find_route_impl(&self, owner: &str, name: &str) -> Result<Option<Route>, DatabaseError> {
        let row = sqlx::query_as::<_, RouteRow>(
            r#"
            SELECT owner, name, start_address, end_address, path, schedule, comment
            FROM routes
            WHERE owner = $1 AND name = $2
            "#,
        )
        .bind(owner)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(RouteRow::into_route).transpose()
    }

    async fn list_routes_impl(&self, owner: &str) -> Result<Vec<Route>, DatabaseError> {
        let rows = sqlx::query_as::<_, RouteRow>(
            r#"
            SELECT owner, name, start_address, end_address, path, schedule, comment
            FROM routes
            WHERE owner = $1
            ORDER BY created_at
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RouteRow::into_route).collect()
    }

    async fn save_route_impl(&self, route: &Route) -> Result<(), DatabaseError> {
        let path = serde_json::to_value(&route.path)
            .map_err(|e| DatabaseError::InvalidData(e.to_string()))?;
        let schedule = serde_json::to_value(&route.schedule)
            .map_err(|e| DatabaseError::InvalidData(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO routes (owner, name, start_address, end_address, path, schedule, comment)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (owner, name) DO UPDATE SET
                start_address = EXCLUDED.start_address,
                end_address = EXCLUDED.end_address,
                path = EXCLUDED.path,
                schedule = EXCLUDED.schedule,
                comment = EXCLUDED.comment,
                updated_at = now()
            "#,
        )
        .bind(&route.owner)
        .bind(&route.name)
        .bind(&route.start_address)
        .bind(&route.end_address)
        .bind(path)
        .bind(schedule)
        .bind(&route.comment)
        .execute(&self.pool)
        .await?;

        tracing::info!("Route saved: {} / {}", route.owner, route.name);
        Ok(())
    }

    async fn delete_route_impl(&self, owner: &str, name: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM routes WHERE owner = $1 AND name = $2")
            .bind(owner)
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound {
                owner: owner.to_string(),
                name: name.to_string(),
            });
        }

        tracing::info!("Route deleted: {} / {}", owner, name);
        Ok(())
    }
}

impl RouteStore for Database {
    async fn candidate_routes(&self, exclude_owner: &str) -> Result<Vec<Route>, DatabaseError> {
        self.candidate_routes_impl(exclude_owner).await
    }

    async fn find_route(&self, owner: &str, name: &str) -> Result<Option<Route>, DatabaseError> {
        self.find_route_impl(owner, name).await
    }

    async fn list_routes(&self, owner: &str) -> Result<Vec<Route>, DatabaseError> {
        self.list_routes_impl(owner).await
    }

    async fn save_route(&self, route: &Route) -> Result<(), DatabaseError> {
        self.save_route_impl(route).await
    }

    async fn delete_route(&self, owner: &str, name: &str) -> Result<(), DatabaseError> {
        self.delete_route_impl(owner, name).await
    }
}

/// In-memory route store for tests and local development. Insertion order
/// doubles as iteration order, like the Postgres `ORDER BY created_at`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    routes: RwLock<Vec<Route>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RouteStore for MemoryStore {
    async fn candidate_routes(&self, exclude_owner: &str) -> Result<Vec<Route>, DatabaseError> {
        let routes = self.routes.read().expect("route store lock");
        Ok(routes
            .iter()
            .filter(|route| route.owner != exclude_owner)
            .cloned()
            .collect())
    }

    async fn find_route(&self, owner: &str, name: &str) -> Result<Option<Route>, DatabaseError> {
        let routes = self.routes.read().expect("route store lock");
        Ok(routes
            .iter()
            .find(|route| route.owner == owner && route.name == name)
            .cloned())
    }

    async fn list_routes(&self, owner: &str) -> Result<Vec<Route>, DatabaseError> {
        let routes = self.routes.read().expect("route store lock");
        Ok(routes
            .iter()
            .filter(|route| route.owner == owner)
            .cloned()
            .collect())
    }

    async fn save_route(&self, route: &Route) -> Result<(), DatabaseError> {
        let mut routes = self.routes.write().expect("route store lock");
        match routes
            .iter_mut()
            .find(|existing| existing.owner == route.owner && existing.name == route.name)
        {
            Some(existing) => *existing = route.clone(),
            None => routes.push(route.clone()),
        }
        Ok(())
    }

    async fn delete_route(&self, owner: &str, name: &str) -> Result<(), DatabaseError> {
        let mut routes = self.routes.write().expect("route store lock");
        let before = routes.len();
        routes.retain(|route| !(route.owner == owner && route.name == name));
        if routes.len() == before {
            return Err(DatabaseError::NotFound {
                owner: owner.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }
}
