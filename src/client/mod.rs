//! Endpoint dispatcher for the MITRE CWE REST API.
//!
//! Maps each logical lookup onto its upstream path, sends it through a
//! [`Transport`], and turns the reply into typed results. Upstream paths
//! (relative to the API root):
//!
//! | Operation | Path |
//! |---|---|
//! | version | `cwe/version` |
//! | info | `cwe/{id}` (one request per id) |
//! | weakness / category / view | `cwe/{kind}/{ids}` (comma-joined, then per id on 404) |
//! | parents / children / ancestors / descendants | `cwe/{id}/{relation}` |
//!
//! HTTP 404 means "not found" and yields an empty result. Any other
//! non-success status, transport failure, or undecodable body is an
//! `UpstreamRequest` error. Nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{AppError, UpstreamFailure};
use crate::models::{
    Collection, CweEntry, CweId, CweInfo, EntryListing, Hierarchy, Identifier, IdentifierList,
    Relation, Selection, ViewFilter, ALL_SENTINEL,
};
use crate::transport::{HttpTransport, Transport, UpstreamRequest, UpstreamResponse};

const NOT_FOUND: u16 = 404;

/// Identifier label for operations that take none.
const NO_IDENTIFIERS: &str = "-";

/// Client for the CWE API. Holds no per-call state.
#[derive(Clone)]
pub struct CweClient {
    transport: Arc<dyn Transport>,
    listing_timeout: Duration,
}

impl CweClient {
    /// Create a client over any transport.
    ///
    /// `listing_timeout` applies to full `all` listings only.
    pub fn new(transport: Arc<dyn Transport>, listing_timeout: Duration) -> Self {
        Self {
            transport,
            listing_timeout,
        }
    }

    /// Create a client talking HTTP to the configured API root.
    pub fn from_config(api: &ApiConfig) -> Result<Self, AppError> {
        let transport = HttpTransport::new(api)?;
        Ok(Self::new(Arc::new(transport), api.listing_timeout()))
    }

    /// Current CWE content version.
    pub async fn version(&self) -> Result<Value, AppError> {
        const OPERATION: &str = "get_version";

        self.fetch(OPERATION, NO_IDENTIFIERS, UpstreamRequest::get("cwe/version"))
            .await?
            .ok_or_else(|| {
                AppError::upstream(OPERATION, NO_IDENTIFIERS, UpstreamFailure::Status(NOT_FOUND))
            })
    }

    /// Summary metadata, keyed by requested identifier.
    ///
    /// One request per distinct identifier, sequentially in caller order;
    /// the first failure aborts the whole batch.
    pub async fn cwe_info(&self, ids: &IdentifierList) -> Result<CweInfo, AppError> {
        const OPERATION: &str = "get_cwe_info";

        let targets: Vec<Identifier> = match ids.selection()? {
            Selection::All => vec![Identifier::All],
            Selection::Ids(ids) => ids.into_iter().map(Identifier::Id).collect(),
        };

        let mut info = CweInfo::default();
        for identifier in targets {
            if info.contains(&identifier) {
                continue;
            }

            let mut request = UpstreamRequest::get(format!("cwe/{}", identifier));
            if identifier.is_all() {
                request = request.timeout(self.listing_timeout);
            }

            let label = identifier.to_string();
            let value = match self.fetch(OPERATION, &label, request).await? {
                Some(Value::Null) | None => Value::Array(Vec::new()),
                Some(value) => value,
            };
            info.entries.push((identifier, value));
        }

        Ok(info)
    }

    /// Weaknesses by id, or every weakness for `all`.
    pub async fn weaknesses(&self, ids: &IdentifierList) -> Result<EntryListing, AppError> {
        self.listing(Collection::Weaknesses, ids).await
    }

    /// Categories by id, or every category for `all`.
    pub async fn categories(&self, ids: &IdentifierList) -> Result<EntryListing, AppError> {
        self.listing(Collection::Categories, ids).await
    }

    /// Views by id, or every view for `all`.
    pub async fn views(&self, ids: &IdentifierList) -> Result<EntryListing, AppError> {
        self.listing(Collection::Views, ids).await
    }

    /// Direct parents of exactly one weakness.
    pub async fn parents(
        &self,
        ids: &IdentifierList,
        view: Option<ViewFilter>,
    ) -> Result<Hierarchy, AppError> {
        self.hierarchy(Relation::Parents, ids, view, None).await
    }

    /// Direct children of exactly one weakness.
    pub async fn children(
        &self,
        ids: &IdentifierList,
        view: Option<ViewFilter>,
    ) -> Result<Hierarchy, AppError> {
        self.hierarchy(Relation::Children, ids, view, None).await
    }

    /// Ancestor tree of exactly one weakness.
    ///
    /// `primary` limits the walk to primary parents.
    pub async fn ancestors(
        &self,
        ids: &IdentifierList,
        view: Option<ViewFilter>,
        primary: Option<bool>,
    ) -> Result<Hierarchy, AppError> {
        self.hierarchy(Relation::Ancestors, ids, view, primary).await
    }

    /// Descendant tree of exactly one weakness.
    pub async fn descendants(
        &self,
        ids: &IdentifierList,
        view: Option<ViewFilter>,
    ) -> Result<Hierarchy, AppError> {
        self.hierarchy(Relation::Descendants, ids, view, None).await
    }

    /// Batch lookup: one request with comma-joined ids.
    ///
    /// Upstream answers 404 for a whole batch when any id in it is unknown,
    /// so a multi-id 404 is retried one id at a time in caller order and the
    /// entries that exist are kept.
    async fn listing(
        &self,
        collection: Collection,
        ids: &IdentifierList,
    ) -> Result<EntryListing, AppError> {
        let ids = match ids.selection()? {
            Selection::All => {
                let request =
                    listing_request(collection, ALL_SENTINEL).timeout(self.listing_timeout);
                let entries = self
                    .fetch_entries(collection, ALL_SENTINEL, request)
                    .await?
                    .unwrap_or_default();
                return Ok(EntryListing {
                    collection,
                    entries,
                });
            }
            Selection::Ids(ids) if ids.is_empty() => return Ok(EntryListing::empty(collection)),
            Selection::Ids(ids) => ids,
        };

        let segment = join_ids(&ids);
        let request = listing_request(collection, &segment);
        if let Some(entries) = self.fetch_entries(collection, &segment, request).await? {
            return Ok(EntryListing {
                collection,
                entries,
            });
        }

        let mut distinct: Vec<&CweId> = Vec::with_capacity(ids.len());
        for id in &ids {
            if !distinct.contains(&id) {
                distinct.push(id);
            }
        }
        if distinct.len() < 2 {
            return Ok(EntryListing::empty(collection));
        }

        debug!(
            operation = collection.operation(),
            identifiers = %segment,
            "Batch not found, retrying identifiers one at a time"
        );

        let mut entries = Vec::new();
        for id in distinct {
            let label = id.to_string();
            let request = listing_request(collection, &label);
            if let Some(found) = self.fetch_entries(collection, &label, request).await? {
                entries.extend(found);
            }
        }

        Ok(EntryListing {
            collection,
            entries,
        })
    }

    /// Entries of one listing request. `None` means upstream 404.
    async fn fetch_entries(
        &self,
        collection: Collection,
        segment: &str,
        request: UpstreamRequest,
    ) -> Result<Option<Vec<CweEntry>>, AppError> {
        let operation = collection.operation();

        let Some(value) = self.fetch(operation, segment, request).await? else {
            return Ok(None);
        };

        extract_array(value, collection.key())
            .and_then(into_entries)
            .map(Some)
            .map_err(|detail| {
                AppError::upstream(operation, segment, UpstreamFailure::UnexpectedShape(detail))
            })
    }

    async fn hierarchy(
        &self,
        relation: Relation,
        ids: &IdentifierList,
        view: Option<ViewFilter>,
        primary: Option<bool>,
    ) -> Result<Hierarchy, AppError> {
        let operation = relation.operation();
        let cwe_id = ids.single(operation)?;
        let label = cwe_id.to_string();

        let mut request =
            UpstreamRequest::get(format!("cwe/{}/{}", cwe_id, relation.path_segment()));
        if let Some(view) = &view {
            request = request.query("view", view.to_string());
        }
        if let Some(primary) = primary {
            request = request.query("primary", primary.to_string());
        }

        let entries = match self.fetch(operation, &label, request).await? {
            Some(value) => extract_array(value, relation.key()).map_err(|detail| {
                AppError::upstream(operation, &label, UpstreamFailure::UnexpectedShape(detail))
            })?,
            None => Vec::new(),
        };

        Ok(Hierarchy {
            relation,
            cwe_id,
            view,
            entries,
        })
    }

    /// Send a request and decode the JSON body. `None` means upstream 404.
    async fn fetch(
        &self,
        operation: &str,
        identifiers: &str,
        request: UpstreamRequest,
    ) -> Result<Option<Value>, AppError> {
        debug!(operation, identifiers, path = %request.path, "Dispatching upstream request");

        let response = self.transport.get(request).await.map_err(|e| {
            warn!(operation, identifiers, error = %e, "Upstream transport failure");
            AppError::upstream(operation, identifiers, UpstreamFailure::Transport(e.0))
        })?;

        decode(operation, identifiers, response)
    }
}

fn decode(
    operation: &str,
    identifiers: &str,
    response: UpstreamResponse,
) -> Result<Option<Value>, AppError> {
    if response.status == NOT_FOUND {
        debug!(operation, identifiers, "Upstream reported not found");
        return Ok(None);
    }
    if !response.is_success() {
        warn!(operation, identifiers, status = response.status, "Upstream error status");
        return Err(AppError::upstream(
            operation,
            identifiers,
            UpstreamFailure::Status(response.status),
        ));
    }

    let body = response.body.trim();
    if body.is_empty() {
        return Ok(Some(Value::Null));
    }

    serde_json::from_str(body).map(Some).map_err(|e| {
        AppError::upstream(
            operation,
            identifiers,
            UpstreamFailure::MalformedBody(e.to_string()),
        )
    })
}

/// Pull the entry array out of a response: either a bare array or an
/// object wrapping it under `key`. `null` reads as empty.
fn extract_array(value: Value, key: &str) -> Result<Vec<Value>, String> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) => Ok(Vec::new()),
            Some(other) => Err(format!("'{}' is {}, expected an array", key, json_type(&other))),
            None => Err(format!("object without '{}' key", key)),
        },
        other => Err(format!("expected an array or object, got {}", json_type(&other))),
    }
}

fn into_entries(items: Vec<Value>) -> Result<Vec<CweEntry>, String> {
    items
        .into_iter()
        .map(|item| {
            CweEntry::try_from(item)
                .map_err(|other| format!("entry is {}, expected an object", json_type(&other)))
        })
        .collect()
}

fn listing_request(collection: Collection, segment: &str) -> UpstreamRequest {
    UpstreamRequest::get(format!("cwe/{}/{}", collection.path_segment(), segment))
}

fn join_ids(ids: &[CweId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::normalize_list;
    use crate::transport::TransportError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory transport: canned replies by path, records every request.
    #[derive(Default)]
    pub(crate) struct FakeTransport {
        replies: Mutex<HashMap<String, Result<UpstreamResponse, TransportError>>>,
        requests: Mutex<Vec<UpstreamRequest>>,
    }

    impl FakeTransport {
        pub(crate) fn reply(self, path: &str, status: u16, body: impl Into<String>) -> Self {
            self.replies
                .lock()
                .unwrap()
                .insert(path.to_string(), Ok(UpstreamResponse::new(status, body)));
            self
        }

        pub(crate) fn reply_json(self, path: &str, body: Value) -> Self {
            self.reply(path, 200, body.to_string())
        }

        pub(crate) fn fail(self, path: &str, error: &str) -> Self {
            self.replies
                .lock()
                .unwrap()
                .insert(path.to_string(), Err(TransportError(error.to_string())));
            self
        }

        pub(crate) fn requests(&self) -> Vec<UpstreamRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub(crate) fn paths(&self) -> Vec<String> {
            self.requests().into_iter().map(|r| r.path).collect()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
            let reply = self
                .replies
                .lock()
                .unwrap()
                .get(&request.path)
                .cloned()
                .unwrap_or_else(|| Ok(UpstreamResponse::new(404, "")));
            self.requests.lock().unwrap().push(request);
            reply
        }
    }

    pub(crate) fn client(transport: FakeTransport) -> (CweClient, Arc<FakeTransport>) {
        let transport = Arc::new(transport);
        let client = CweClient::new(transport.clone(), Duration::from_secs(60));
        (client, transport)
    }

    fn ids(raw: &str) -> IdentifierList {
        normalize_list(raw).unwrap()
    }

    #[tokio::test]
    async fn test_version() {
        let (client, _) = client(
            FakeTransport::default()
                .reply_json("cwe/version", json!({"ContentVersion": "4.16"})),
        );
        let version = client.version().await.unwrap();
        assert_eq!(version["ContentVersion"], "4.16");
    }

    #[tokio::test]
    async fn test_weaknesses_batch_in_one_request() {
        let (client, transport) = client(FakeTransport::default().reply_json(
            "cwe/weakness/79,89",
            json!({"Weaknesses": [{"ID": "79"}, {"ID": "89"}]}),
        ));

        let listing = client.weaknesses(&ids("CWE-79, cwe89")).await.unwrap();

        assert_eq!(listing.collection, Collection::Weaknesses);
        let got: Vec<_> = listing.entries.iter().filter_map(|e| e.id()).collect();
        assert_eq!(got, vec!["79", "89"]);
        assert_eq!(transport.paths(), vec!["cwe/weakness/79,89"]);
        assert_eq!(transport.requests()[0].timeout, None);
    }

    #[tokio::test]
    async fn test_all_uses_listing_path_and_timeout() {
        let (client, transport) = client(
            FakeTransport::default()
                .reply_json("cwe/category/all", json!({"Categories": [{"ID": "1009"}]})),
        );

        let listing = client.categories(&ids("ALL")).await.unwrap();

        assert_eq!(listing.entries.len(), 1);
        let request = &transport.requests()[0];
        assert_eq!(request.path, "cwe/category/all");
        assert_eq!(request.timeout, Some(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_views_accept_bare_array() {
        let (client, _) = client(
            FakeTransport::default().reply_json("cwe/view/1000", json!([{"ID": "1000"}])),
        );
        let listing = client.views(&ids("1000")).await.unwrap();
        assert_eq!(listing.entries[0].id(), Some("1000"));
    }

    #[tokio::test]
    async fn test_not_found_is_empty() {
        let (client, _) = client(FakeTransport::default().reply("cwe/weakness/999999", 404, "x"));
        let listing = client.weaknesses(&ids("999999")).await.unwrap();
        assert!(listing.entries.is_empty());
    }

    #[tokio::test]
    async fn test_batch_not_found_falls_back_to_single_ids() {
        let (client, transport) = client(
            FakeTransport::default()
                .reply("cwe/weakness/79,999999,89", 404, "")
                .reply_json("cwe/weakness/79", json!({"Weaknesses": [{"ID": "79"}]}))
                .reply_json("cwe/weakness/89", json!({"Weaknesses": [{"ID": "89"}]})),
        );

        let listing = client.weaknesses(&ids("79,999999,89,79")).await.unwrap();

        let got: Vec<_> = listing.entries.iter().filter_map(|e| e.id()).collect();
        assert_eq!(got, vec!["79", "89"]);
        assert_eq!(
            transport.paths(),
            vec![
                "cwe/weakness/79,999999,89,79",
                "cwe/weakness/79",
                "cwe/weakness/999999",
                "cwe/weakness/89",
            ]
        );
    }

    #[tokio::test]
    async fn test_single_id_fallback_aborts_on_failure() {
        let (client, transport) = client(
            FakeTransport::default()
                .reply("cwe/category/1009,1010,1011", 404, "")
                .reply("cwe/category/1010", 502, "bad gateway")
                .reply_json("cwe/category/1011", json!({"Categories": [{"ID": "1011"}]})),
        );

        match client.categories(&ids("1009,1010,1011")).await {
            Err(AppError::UpstreamRequest {
                identifiers,
                failure,
                ..
            }) => {
                assert_eq!(identifiers, "1010");
                assert_eq!(failure, UpstreamFailure::Status(502));
            }
            other => panic!("expected UpstreamRequest, got {other:?}"),
        }
        assert!(!transport.paths().contains(&"cwe/category/1011".to_string()));
    }

    #[tokio::test]
    async fn test_single_id_not_found_is_not_retried() {
        let (client, transport) = client(FakeTransport::default());
        let listing = client.views(&ids("999999,999999")).await.unwrap();
        assert!(listing.entries.is_empty());
        assert_eq!(transport.paths(), vec!["cwe/view/999999,999999"]);
    }

    #[tokio::test]
    async fn test_info_per_identifier_keyed() {
        let (client, transport) = client(
            FakeTransport::default()
                .reply_json("cwe/79", json!([{"ID": "79", "Type": "weakness"}]))
                .reply("cwe/999999", 404, "CWE not found"),
        );

        let info = client.cwe_info(&ids("79,999999,CWE-79")).await.unwrap();

        assert_eq!(info.entries.len(), 2);
        assert_eq!(
            info.get(&Identifier::Id(CweId::new(79))).unwrap()[0]["Type"],
            "weakness"
        );
        assert_eq!(
            info.get(&Identifier::Id(CweId::new(999999))).unwrap(),
            &json!([])
        );
        assert_eq!(transport.paths(), vec!["cwe/79", "cwe/999999"]);
    }

    #[tokio::test]
    async fn test_info_batch_aborts_on_first_failure() {
        let (client, transport) = client(
            FakeTransport::default()
                .reply_json("cwe/79", json!([{"ID": "79"}]))
                .reply("cwe/89", 500, "boom")
                .reply_json("cwe/125", json!([{"ID": "125"}])),
        );

        match client.cwe_info(&ids("79,89,125")).await {
            Err(AppError::UpstreamRequest {
                operation,
                identifiers,
                failure,
            }) => {
                assert_eq!(operation, "get_cwe_info");
                assert_eq!(identifiers, "89");
                assert_eq!(failure, UpstreamFailure::Status(500));
            }
            other => panic!("expected UpstreamRequest, got {other:?}"),
        }
        assert_eq!(transport.paths(), vec!["cwe/79", "cwe/89"]);
    }

    #[tokio::test]
    async fn test_info_rejects_mixed_sentinel() {
        let (client, transport) = client(FakeTransport::default());
        assert!(matches!(
            client.cwe_info(&ids("all,79")).await,
            Err(AppError::InvalidIdentifier { .. })
        ));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_parents_with_view() {
        let (client, transport) = client(FakeTransport::default().reply_json(
            "cwe/79/parents",
            json!([{"Type": "class", "ID": "74", "ViewID": "1000", "Primary": true}]),
        ));

        let view = ViewFilter::parse(Some("CWE-1000")).unwrap();
        let hierarchy = client.parents(&ids("79"), view).await.unwrap();

        assert_eq!(hierarchy.relation, Relation::Parents);
        assert_eq!(hierarchy.entries.len(), 1);
        assert_eq!(
            transport.requests()[0].query,
            vec![("view".to_string(), "1000".to_string())]
        );
    }

    #[tokio::test]
    async fn test_ancestors_primary_flag_and_wrapped_response() {
        let (client, transport) = client(FakeTransport::default().reply_json(
            "cwe/79/ancestors",
            json!({"Ancestors": [{"Data": {"ID": "74"}, "Parents": []}]}),
        ));

        let hierarchy = client.ancestors(&ids("79"), None, Some(true)).await.unwrap();

        assert_eq!(hierarchy.entries.len(), 1);
        assert_eq!(
            transport.requests()[0].query,
            vec![("primary".to_string(), "true".to_string())]
        );
    }

    #[tokio::test]
    async fn test_hierarchy_requires_exactly_one() {
        let (client, transport) = client(FakeTransport::default());

        match client.parents(&ids("79,89"), None).await {
            Err(AppError::UnsupportedCardinality { operation, .. }) => {
                assert_eq!(operation, "get_parents")
            }
            other => panic!("expected UnsupportedCardinality, got {other:?}"),
        }
        assert!(matches!(
            client.descendants(&ids("all"), None).await,
            Err(AppError::UnsupportedCardinality { .. })
        ));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_children_not_found_is_empty() {
        let (client, _) = client(FakeTransport::default());
        let hierarchy = client.children(&ids("999999"), None).await.unwrap();
        assert!(hierarchy.entries.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_names_operation_and_ids() {
        let (client, _) = client(
            FakeTransport::default().fail("cwe/79/descendants", "connection refused"),
        );

        match client.descendants(&ids("79"), None).await {
            Err(AppError::UpstreamRequest {
                operation,
                identifiers,
                failure: UpstreamFailure::Transport(detail),
            }) => {
                assert_eq!(operation, "get_descendants");
                assert_eq!(identifiers, "79");
                assert!(detail.contains("connection refused"));
            }
            other => panic!("expected transport failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (client, _) = client(FakeTransport::default().reply("cwe/weakness/79", 200, "<html>"));
        assert!(matches!(
            client.weaknesses(&ids("79")).await,
            Err(AppError::UpstreamRequest {
                failure: UpstreamFailure::MalformedBody(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_unexpected_shape() {
        let (client, _) = client(
            FakeTransport::default().reply_json("cwe/weakness/79", json!({"Views": []})),
        );
        assert!(matches!(
            client.weaknesses(&ids("79")).await,
            Err(AppError::UpstreamRequest {
                failure: UpstreamFailure::UnexpectedShape(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_version_not_found_is_error() {
        let (client, _) = client(FakeTransport::default());
        assert!(matches!(
            client.version().await,
            Err(AppError::UpstreamRequest { .. })
        ));
    }

    #[test]
    fn test_extract_array() {
        assert_eq!(extract_array(Value::Null, "Parents").unwrap(), Vec::<Value>::new());
        assert_eq!(extract_array(json!([1, 2]), "Parents").unwrap().len(), 2);
        assert_eq!(
            extract_array(json!({"Parents": null}), "Parents").unwrap(),
            Vec::<Value>::new()
        );
        assert!(extract_array(json!({"Parents": "74"}), "Parents").is_err());
        assert!(extract_array(json!("74"), "Parents").is_err());
    }
}
