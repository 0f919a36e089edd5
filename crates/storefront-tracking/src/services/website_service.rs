use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryOrder, Set};
use storefront_entities::websites;
use tracing::info;

use crate::types::{CreateWebsiteRequest, WebsiteError};

pub struct WebsiteService {
    db: Arc<DatabaseConnection>,
}

impl WebsiteService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn create_website(
        &self,
        request: CreateWebsiteRequest,
    ) -> Result<websites::Model, WebsiteError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(WebsiteError::Validation("name must not be empty".to_string()));
        }
        let domain = normalize_domain(&request.domain)?;

        let website = websites::ActiveModel {
            name: Set(name.to_string()),
            domain: Set(domain),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!("Created website {} ({})", website.id, website.domain);
        Ok(website)
    }

    pub async fn list_websites(&self) -> Result<Vec<websites::Model>, WebsiteError> {
        Ok(websites::Entity::find()
            .order_by_asc(websites::Column::Id)
            .all(self.db.as_ref())
            .await?)
    }

    pub async fn get_website(&self, id: i32) -> Result<websites::Model, WebsiteError> {
        websites::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(WebsiteError::NotFound(id))
    }

    /// Tracking rows go with it through `ON DELETE CASCADE`
    pub async fn delete_website(&self, id: i32) -> Result<(), WebsiteError> {
        let website = self.get_website(id).await?;
        website.delete(self.db.as_ref()).await?;
        info!("Deleted website {}", id);
        Ok(())
    }
}

/// Reduce `https://www.Shop.com/path` style input to a bare lowercase host
fn normalize_domain(raw: &str) -> Result<String, WebsiteError> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    url::Url::parse(&candidate)
        .ok()
        .and_then(|url| url.host_str().map(|h| h.to_lowercase()))
        .filter(|host| !host.is_empty())
        .ok_or_else(|| WebsiteError::Validation(format!("'{}' is not a valid domain", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn website(id: i32) -> websites::Model {
        websites::Model {
            id,
            name: "Shop".to_string(),
            domain: "shop.example.com".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("shop.example.com").unwrap(), "shop.example.com");
        assert_eq!(
            normalize_domain(" https://Shop.Example.com/home ").unwrap(),
            "shop.example.com"
        );
        assert!(normalize_domain("").is_err());
        assert!(normalize_domain("http://").is_err());
    }

    #[tokio::test]
    async fn test_create_website_validates_name() {
        let service = WebsiteService::new(Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ));
        let err = service
            .create_website(CreateWebsiteRequest {
                name: " ".to_string(),
                domain: "shop.example.com".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, WebsiteError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_website() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![website(3)]])
            .into_connection();
        let service = WebsiteService::new(Arc::new(db));

        let created = service
            .create_website(CreateWebsiteRequest {
                name: "Shop".to_string(),
                domain: "https://shop.example.com".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(created.id, 3);
    }

    #[tokio::test]
    async fn test_get_missing_website() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<websites::Model>::new()])
            .into_connection();
        let service = WebsiteService::new(Arc::new(db));

        assert!(matches!(
            service.get_website(9).await.unwrap_err(),
            WebsiteError::NotFound(9)
        ));
    }

    #[tokio::test]
    async fn test_delete_website() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![website(1)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let service = WebsiteService::new(Arc::new(db));

        assert!(service.delete_website(1).await.is_ok());
    }
}
