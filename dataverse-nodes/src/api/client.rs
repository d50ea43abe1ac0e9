//! Dataverse Web API client
//!
//! Every call re-checks the token through [`AuthManager::context`] before it
//! goes out, attaches the standard OData headers and makes exactly one
//! attempt. Non-2xx answers come back as [`DataverseError::Api`].

use log::{debug, info};
use serde_json::{Value, json};
use std::sync::Arc;

use super::auth::AuthManager;
use super::columns::{merge_body, parse_column_values};
use super::constants::DEFAULT_HEADERS;
use super::metadata::{ColumnInfo, MetadataCache, TableInfo, parse_column_list, parse_table_list};
use super::models::CredentialSet;
use super::optionset::decode_option_set;
use super::pluralization::pluralize_entity_name;
use super::query::Query;
use super::transport::{HttpMethod, HttpRequest, Transport};
use crate::error::{DataverseError, Result};

#[derive(Debug)]
pub struct DataverseClient {
    transport: Arc<dyn Transport>,
    auth: AuthManager,
    base_url: String,
    cache: Option<Arc<MetadataCache>>,
}

fn require_name<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DataverseError::validation(format!("{} is required", what)));
    }
    Ok(trimmed)
}

impl DataverseClient {
    /// Client for `credentials` using the default Azure AD authority
    pub fn new(credentials: CredentialSet, transport: Arc<dyn Transport>) -> Self {
        let auth = AuthManager::new(credentials, transport.clone());
        Self::with_auth(auth, transport)
    }

    /// Client around an already configured token manager
    pub fn with_auth(auth: AuthManager, transport: Arc<dyn Transport>) -> Self {
        let base_url = auth.credentials().api_base_url();
        Self {
            transport,
            auth,
            base_url,
            cache: None,
        }
    }

    /// Share a metadata cache with this client
    pub fn with_cache(mut self, cache: Arc<MetadataCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path relative to the API root
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn execute(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> Result<Value> {
        let bearer = self.auth.bearer().await?;
        let url = self.url(path);

        let mut request = HttpRequest::new(method, &url).header("Authorization", bearer);
        for (name, value) in DEFAULT_HEADERS {
            request = request.header(*name, *value);
        }
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        debug!("Dataverse {} {}", method.as_str(), url);

        let response = self.transport.send(request).await?.error_for_status()?;
        response.into_json()
    }

    /// Run a read query
    pub async fn get(&self, query: &Query) -> Result<Value> {
        let path = query.path()?;
        debug!("Executing {}", query.describe());
        self.execute(HttpMethod::Get, &path, None).await
    }

    /// PATCH `entity(record_id)` with `body` merged with the column overrides
    pub async fn update(
        &self,
        entity: &str,
        record_id: &str,
        body: Option<&Value>,
        overrides: Option<&Value>,
    ) -> Result<Value> {
        let entity = require_name(entity, "entity name")?;
        let record_id = require_name(record_id, "record id")?;
        let payload = Value::Object(merge_body(body, &parse_column_values(overrides)?)?);

        let path = format!("{}({})", pluralize_entity_name(entity), record_id);
        let result = self.execute(HttpMethod::Patch, &path, Some(&payload)).await?;
        info!("Updated {} record {}", entity, record_id);
        Ok(result)
    }

    /// POST a new `entity` record built from `body` and the column overrides
    pub async fn create(
        &self,
        entity: &str,
        body: Option<&Value>,
        overrides: Option<&Value>,
    ) -> Result<Value> {
        let entity = require_name(entity, "entity name")?;
        let payload = Value::Object(merge_body(body, &parse_column_values(overrides)?)?);

        let path = pluralize_entity_name(entity);
        let result = self.execute(HttpMethod::Post, &path, Some(&payload)).await?;
        info!("Created {} record", entity);
        Ok(result)
    }

    /// All entity definitions with their display names
    pub async fn list_tables(&self) -> Result<Vec<TableInfo>> {
        if let Some(cache) = &self.cache {
            if let Some(tables) = cache.tables().await {
                return Ok(tables);
            }
        }

        let response = self
            .execute(
                HttpMethod::Get,
                "EntityDefinitions?$select=LogicalName,DisplayName",
                None,
            )
            .await?;
        let tables = parse_table_list(response)?;
        debug!("Fetched {} table definitions", tables.len());

        if let Some(cache) = &self.cache {
            cache.set_tables(tables.clone()).await;
        }
        Ok(tables)
    }

    /// Attribute definitions of one entity
    pub async fn list_columns(&self, entity: &str) -> Result<Vec<ColumnInfo>> {
        let entity = require_name(entity, "entity name")?;
        if let Some(cache) = &self.cache {
            if let Some(columns) = cache.columns(entity).await {
                return Ok(columns);
            }
        }

        let path = format!(
            "EntityDefinitions(LogicalName='{}')/Attributes?$select=LogicalName,DisplayName",
            entity
        );
        let columns = parse_column_list(self.execute(HttpMethod::Get, &path, None).await?)?;
        debug!("Fetched {} column definitions for {}", columns.len(), entity);

        if let Some(cache) = &self.cache {
            cache.set_columns(entity, columns.clone()).await;
        }
        Ok(columns)
    }

    /// Options of a picklist attribute, decoded to `{options: [{Id, Name}]}`
    pub async fn entity_option_set(&self, entity: &str, attribute: &str) -> Result<Value> {
        let entity = require_name(entity, "entity name")?;
        let attribute = require_name(attribute, "attribute name")?;
        let path = format!(
            "EntityDefinitions(LogicalName='{}')/Attributes(LogicalName='{}')/Microsoft.Dynamics.CRM.PicklistAttributeMetadata?$select=LogicalName&$expand=OptionSet",
            entity, attribute
        );
        let response = self.execute(HttpMethod::Get, &path, None).await?;
        Ok(decode_option_set(response).into_json())
    }

    /// Options of a global option set, decoded to `{options: [{Id, Name}]}`
    pub async fn global_option_set(&self, name: &str) -> Result<Value> {
        let name = require_name(name, "option set name")?;
        let path = format!("GlobalOptionSetDefinitions(Name='{}')", name);
        let response = self.execute(HttpMethod::Get, &path, None).await?;
        Ok(decode_option_set(response).into_json())
    }

    /// Id/name pairs read from two columns of an arbitrary entity
    pub async fn entity_lookup(
        &self,
        entity: &str,
        id_column: &str,
        name_column: &str,
    ) -> Result<Value> {
        let entity = require_name(entity, "entity name")?;
        let id_column = require_name(id_column, "id column")?;
        let name_column = require_name(name_column, "name column")?;

        let query = Query::columns(entity, [id_column, name_column]);
        let response = self.get(&query).await?;

        let rows = response
            .get("value")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                DataverseError::decode("lookup response has no value array", response.to_string())
            })?;

        let options: Vec<Value> = rows
            .iter()
            .map(|row| {
                json!({
                    "Id": row.get(id_column).cloned().unwrap_or(Value::Null),
                    "Name": row.get(name_column).cloned().unwrap_or(Value::Null),
                })
            })
            .collect();

        Ok(json!({ "options": options }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::MockTransport;
    use crate::api::transport::HttpResponse;

    fn client(transport: Arc<MockTransport>) -> DataverseClient {
        let credentials = CredentialSet::new(
            "tenant-1",
            "client-1",
            "secret-1",
            "https://org.crm4.dynamics.com",
        );
        DataverseClient::new(credentials, transport)
    }

    #[tokio::test]
    async fn test_fetch_xml_get_targets_pluralized_collection() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!({"value": [{"fullname": "Ada"}]}));
        let client = client(transport.clone());

        let xml = r#"<fetch><entity name="contact"><attribute name="fullname"/></entity></fetch>"#;
        let result = client.get(&Query::fetch_xml(xml)).await.unwrap();

        assert_eq!(result, json!({"value": [{"fullname": "Ada"}]}));
        let requests = transport.api_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(
            requests[0].url,
            format!(
                "https://org.crm4.dynamics.com/api/data/v9.2/contacts?fetchXml={}",
                urlencoding::encode(xml)
            )
        );
    }

    #[tokio::test]
    async fn test_requests_carry_auth_and_odata_headers() {
        let transport = Arc::new(MockTransport::new());
        let client = client(transport.clone());

        client.get(&Query::odata("accounts?$top=1")).await.unwrap();

        let request = &transport.api_requests()[0];
        assert_eq!(request.url, "https://org.crm4.dynamics.com/api/data/v9.2/accounts?$top=1");
        assert_eq!(request.header_value("Authorization"), Some("Bearer token-1"));
        assert_eq!(request.header_value("OData-MaxPageSize"), Some("5000"));
        assert_eq!(request.header_value("Content-Type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_token_requested_once_for_several_calls() {
        let transport = Arc::new(MockTransport::new());
        let client = client(transport.clone());

        client.get(&Query::odata("accounts")).await.unwrap();
        client.get(&Query::odata("contacts")).await.unwrap();

        assert_eq!(transport.token_requests().len(), 1);
        assert_eq!(transport.api_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_fetch_xml_sends_nothing() {
        let transport = Arc::new(MockTransport::new());
        let client = client(transport.clone());

        let err = client.get(&Query::fetch_xml("<fetch/>")).await.unwrap_err();
        assert_eq!(err.kind(), "QueryError");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_column_overrides() {
        let transport = Arc::new(MockTransport::new());
        transport.push(Ok(HttpResponse::new(204, "")));
        let client = client(transport.clone());

        let result = client
            .update(
                "contact",
                "123",
                Some(&json!({"firstname": "A"})),
                Some(&json!({"columnValues": [{"columnName": "lastname", "columnValue": "B"}]})),
            )
            .await
            .unwrap();

        assert_eq!(result, json!({}));
        let request = &transport.api_requests()[0];
        assert_eq!(request.method, HttpMethod::Patch);
        assert_eq!(request.url, "https://org.crm4.dynamics.com/api/data/v9.2/contacts(123)");
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"firstname": "A", "lastname": "B"}));
    }

    #[tokio::test]
    async fn test_create_posts_to_collection() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(201, json!({"accountid": "a1"}));
        let client = client(transport.clone());

        let result = client
            .create(
                "account",
                None,
                Some(&json!({"columnValues": [{"columnName": "name", "columnValue": "Contoso"}]})),
            )
            .await
            .unwrap();

        assert_eq!(result, json!({"accountid": "a1"}));
        let request = &transport.api_requests()[0];
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://org.crm4.dynamics.com/api/data/v9.2/accounts");
        assert_eq!(request.body.as_deref(), Some(r#"{"name":"Contoso"}"#));
    }

    #[tokio::test]
    async fn test_update_requires_record_id() {
        let transport = Arc::new(MockTransport::new());
        let client = client(transport.clone());

        let err = client.update("contact", " ", None, None).await.unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_surfaces_as_api_error() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(404, json!({"error": {"message": "Resource not found"}}));
        let client = client(transport.clone());

        let err = client.get(&Query::odata("nopes")).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("Resource not found"));
        assert_eq!(transport.api_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_list_tables_uses_cache() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(
            200,
            json!({"value": [{"LogicalName": "account", "DisplayName": {"UserLocalizedLabel": {"Label": "Account"}}}]}),
        );
        let cache = Arc::new(MetadataCache::new());
        let client = client(transport.clone()).with_cache(cache.clone());

        let first = client.list_tables().await.unwrap();
        let second = client.list_tables().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].display_name, "Account");
        assert_eq!(transport.api_requests().len(), 1);
        assert_eq!(
            transport.api_requests()[0].url,
            "https://org.crm4.dynamics.com/api/data/v9.2/EntityDefinitions?$select=LogicalName,DisplayName"
        );
    }

    #[tokio::test]
    async fn test_list_columns_without_cache_refetches() {
        let transport = Arc::new(MockTransport::new());
        let columns = json!({"value": [{"LogicalName": "firstname"}]});
        transport.push_json(200, columns.clone());
        transport.push_json(200, columns);
        let client = client(transport.clone());

        client.list_columns("contact").await.unwrap();
        let listed = client.list_columns("contact").await.unwrap();

        assert_eq!(listed[0].display_name, "firstname");
        assert_eq!(transport.api_requests().len(), 2);
        assert_eq!(
            transport.api_requests()[0].url,
            "https://org.crm4.dynamics.com/api/data/v9.2/EntityDefinitions(LogicalName='contact')/Attributes?$select=LogicalName,DisplayName"
        );
    }

    #[tokio::test]
    async fn test_entity_option_set_is_decoded() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(
            200,
            json!({"LogicalName": "statuscode", "OptionSet": {"Options": [{"Value": 1, "Label": {"LocalizedLabels": [{"Label": "Open"}]}}]}}),
        );
        let client = client(transport.clone());

        let result = client.entity_option_set("incident", "statuscode").await.unwrap();

        assert_eq!(result, json!({"options": [{"Id": 1, "Name": "Open"}]}));
        assert!(transport.api_requests()[0].url.contains(
            "EntityDefinitions(LogicalName='incident')/Attributes(LogicalName='statuscode')/Microsoft.Dynamics.CRM.PicklistAttributeMetadata"
        ));
    }

    #[tokio::test]
    async fn test_global_option_set_is_decoded() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(
            200,
            json!({"Name": "budgetstatus", "Options": [{"Value": 0, "Label": {"LocalizedLabels": [{"Label": "No Committed Budget"}]}}]}),
        );
        let client = client(transport.clone());

        let result = client.global_option_set("budgetstatus").await.unwrap();

        assert_eq!(result, json!({"options": [{"Id": 0, "Name": "No Committed Budget"}]}));
        assert_eq!(
            transport.api_requests()[0].url,
            "https://org.crm4.dynamics.com/api/data/v9.2/GlobalOptionSetDefinitions(Name='budgetstatus')"
        );
    }

    #[tokio::test]
    async fn test_entity_lookup_maps_rows() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(
            200,
            json!({"value": [
                {"accountid": "a1", "name": "Contoso"},
                {"accountid": "a2"}
            ]}),
        );
        let client = client(transport.clone());

        let result = client.entity_lookup("account", "accountid", "name").await.unwrap();

        assert_eq!(
            result,
            json!({"options": [{"Id": "a1", "Name": "Contoso"}, {"Id": "a2", "Name": null}]})
        );
        assert_eq!(
            transport.api_requests()[0].url,
            "https://org.crm4.dynamics.com/api/data/v9.2/accounts?$select=accountid,name"
        );
    }
}
