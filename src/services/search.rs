//! Keyword search over the weakness catalogue.
//!
//! The CWE API has no free-text search, so the full weakness listing is
//! fetched and filtered here.

use tracing::debug;

use crate::client::CweClient;
use crate::error::AppError;
use crate::models::{CweEntry, Identifier, IdentifierList, SearchResult};

/// Case-insensitive substring search on weakness names and descriptions.
#[derive(Clone)]
pub struct SearchService {
    client: CweClient,
}

impl SearchService {
    pub fn new(client: CweClient) -> Self {
        Self { client }
    }

    /// Return up to `max_results` weaknesses whose name or description
    /// contains `keyword`, in upstream listing order.
    ///
    /// The keyword is matched exactly as given, surrounding whitespace
    /// included. Arguments are validated before anything is fetched. No
    /// match is an empty result, not an error.
    pub async fn search(&self, keyword: &str, max_results: i64) -> Result<SearchResult, AppError> {
        if keyword.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "keyword must not be empty".to_string(),
            ));
        }
        if max_results <= 0 {
            return Err(AppError::InvalidArgument(format!(
                "max_results must be a positive integer, got {}",
                max_results
            )));
        }
        let limit = usize::try_from(max_results).unwrap_or(usize::MAX);

        let listing = self
            .client
            .weaknesses(&IdentifierList::new(vec![Identifier::All]))
            .await?;

        let needle = keyword.to_lowercase();
        let mut matches: Vec<CweEntry> = listing
            .entries
            .into_iter()
            .filter(|entry| matches_keyword(entry, &needle))
            .collect();

        let total_matches = matches.len();
        matches.truncate(limit);

        debug!(
            keyword,
            total_matches,
            returned = matches.len(),
            "Keyword search complete"
        );

        Ok(SearchResult {
            keyword: keyword.to_string(),
            total_matches,
            truncated: total_matches > limit,
            entries: matches,
        })
    }
}

/// `needle` must already be lowercase.
fn matches_keyword(entry: &CweEntry, needle: &str) -> bool {
    [entry.name(), entry.description()]
        .into_iter()
        .flatten()
        .any(|text| text.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{client, FakeTransport};
    use serde_json::json;

    fn catalogue() -> FakeTransport {
        FakeTransport::default().reply_json(
            "cwe/weakness/all",
            json!({"Weaknesses": [
                {"ID": "79", "Name": "Cross-site Scripting", "Description": "Improper neutralization of input during web page generation."},
                {"ID": "89", "Name": "Improper Neutralization of Special Elements used in an SQL Command ('SQL Injection')", "Description": "The product constructs all or part of an SQL command."},
                {"ID": "564", "Name": "SQL Injection: Hibernate", "Description": "Using Hibernate to execute a dynamic SQL statement."},
                {"ID": "943", "Name": "Improper Neutralization of Special Elements in Data Query Logic", "Description": "Covers sql injection and similar query attacks."},
                {"ID": "1000", "Status": "Deprecated"}
            ]}),
        )
    }

    fn service(transport: FakeTransport) -> (SearchService, std::sync::Arc<FakeTransport>) {
        let (client, transport) = client(transport);
        (SearchService::new(client), transport)
    }

    #[tokio::test]
    async fn test_matches_name_or_description_case_insensitive() {
        let (service, transport) = service(catalogue());

        let result = service.search("SQL injection", 10).await.unwrap();

        let ids: Vec<_> = result.entries.iter().filter_map(|e| e.id()).collect();
        assert_eq!(ids, vec!["89", "564", "943"]);
        assert_eq!(result.total_matches, 3);
        assert!(!result.truncated);
        for entry in &result.entries {
            let text = format!(
                "{} {}",
                entry.name().unwrap_or_default(),
                entry.description().unwrap_or_default()
            )
            .to_lowercase();
            assert!(text.contains("sql injection"));
        }
        assert_eq!(transport.paths(), vec!["cwe/weakness/all"]);
    }

    #[tokio::test]
    async fn test_truncates_to_max_results() {
        let (service, _) = service(catalogue());

        let result = service.search("improper", 2).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.total_matches, 3);
        assert!(result.truncated);
        assert_eq!(result.entries[0].id(), Some("79"));
    }

    #[tokio::test]
    async fn test_keyword_whitespace_is_significant() {
        let (service, _) = service(FakeTransport::default().reply_json(
            "cwe/weakness/all",
            json!({"Weaknesses": [
                {"ID": "943", "Name": "NoSQL Injection"},
                {"ID": "89", "Name": "Blind SQL Injection"}
            ]}),
        ));

        let result = service.search(" sql", 10).await.unwrap();

        let ids: Vec<_> = result.entries.iter().filter_map(|e| e.id()).collect();
        assert_eq!(ids, vec!["89"]);
        assert_eq!(result.keyword, " sql");
    }

    #[tokio::test]
    async fn test_no_match_is_empty() {
        let (service, _) = service(catalogue());
        let result = service.search("buffer overflow", 10).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(result.total_matches, 0);
    }

    #[tokio::test]
    async fn test_rejects_non_positive_max_results() {
        let (service, transport) = service(catalogue());

        for max_results in [0, -5] {
            assert!(matches!(
                service.search("sql", max_results).await,
                Err(AppError::InvalidArgument(_))
            ));
        }
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_blank_keyword() {
        let (service, _) = service(catalogue());
        assert!(matches!(
            service.search("   ", 10).await,
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let (service, _) = service(
            FakeTransport::default().fail("cwe/weakness/all", "connection refused"),
        );
        assert!(matches!(
            service.search("sql", 10).await,
            Err(AppError::UpstreamRequest { .. })
        ));
    }
}
