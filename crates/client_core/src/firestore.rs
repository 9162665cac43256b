//! Venue store backed by the Firestore REST API.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use shared::{
    domain::{Venue, VenueFields, VenueId},
    error::{FetchError, WriteError, WriteOp},
    protocol::{Document, ErrorResponse, FieldNames, ListDocumentsResponse},
};
use tracing::{debug, info, warn};

use crate::{config::StoreSettings, store::VenueStore};

pub struct FirestoreVenueStore {
    http: Client,
    documents_url: String,
    collection: String,
    api_key: Option<String>,
    bearer_token: Option<String>,
    page_size: u32,
    fields: FieldNames,
}

impl FirestoreVenueStore {
    pub fn new(settings: &StoreSettings) -> Self {
        Self::with_client(Client::new(), settings)
    }

    pub fn with_client(http: Client, settings: &StoreSettings) -> Self {
        let documents_url = format!(
            "{}/projects/{}/databases/{}/documents",
            settings.base_url.trim_end_matches('/'),
            settings.project_id,
            settings.database
        );
        Self {
            http,
            documents_url,
            collection: settings.collection.clone(),
            api_key: settings.api_key.clone(),
            bearer_token: settings.bearer_token.clone(),
            page_size: settings.page_size.max(1),
            fields: settings.fields.clone(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.documents_url, self.collection)
    }

    fn document_url(&self, id: &VenueId) -> String {
        format!("{}/{}", self.collection_url(), id)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let mut builder = self.http.request(method, url);
        if let Some(key) = &self.api_key {
            builder = builder.query(&[("key", key)]);
        }
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }
}

/// Splits a non-success response into its status and the store's message.
async fn failure(response: Response) -> Result<Response, (StatusCode, String)> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .map(|parsed| parsed.error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("HTTP {status}"));
    Err((status, message))
}

fn write_failure(op: WriteOp, status: StatusCode, message: String) -> WriteError {
    if status.is_client_error() {
        WriteError::rejected(op, message)
    } else {
        WriteError::transport(op, message)
    }
}

#[async_trait]
impl VenueStore for FirestoreVenueStore {
    async fn list_all(&self) -> Result<Vec<Venue>, FetchError> {
        let mut venues = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .request(Method::GET, self.collection_url())
                .query(&[("pageSize", self.page_size)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request
                .send()
                .await
                .map_err(|err| FetchError::new(err.to_string()))?;
            let response = failure(response)
                .await
                .map_err(|(status, message)| FetchError::new(format!("{status}: {message}")))?;
            let page: ListDocumentsResponse = response
                .json()
                .await
                .map_err(|err| FetchError::new(format!("invalid list payload: {err}")))?;

            for document in &page.documents {
                match document.to_venue(&self.fields) {
                    Some(venue) => venues.push(venue),
                    None => warn!(
                        document = %document.name,
                        "store: skipping document without an id"
                    ),
                }
            }

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        info!(
            collection = %self.collection,
            count = venues.len(),
            "store: venues loaded"
        );
        Ok(venues)
    }

    async fn create(&self, fields: &VenueFields) -> Result<VenueId, WriteError> {
        let op = WriteOp::Create;
        let body = Document::from_fields(fields, &self.fields);
        let response = self
            .request(Method::POST, self.collection_url())
            .json(&body)
            .send()
            .await
            .map_err(|err| WriteError::transport(op, err.to_string()))?;
        let response = failure(response)
            .await
            .map_err(|(status, message)| write_failure(op, status, message))?;
        let created: Document = response
            .json()
            .await
            .map_err(|err| WriteError::transport(op, format!("invalid create payload: {err}")))?;

        let id = created
            .id()
            .map(VenueId::new)
            .ok_or_else(|| WriteError::transport(op, "store returned a document without a name"))?;
        debug!(venue_id = %id, "store: document created");
        Ok(id)
    }

    async fn update(&self, id: &VenueId, fields: &VenueFields) -> Result<(), WriteError> {
        let op = WriteOp::Update;
        let body = Document::from_fields(
            &VenueFields {
                location: None,
                ..fields.clone()
            },
            &self.fields,
        );
        let mut query: Vec<(&str, &str)> = self
            .fields
            .update_mask()
            .into_iter()
            .map(|path| ("updateMask.fieldPaths", path))
            .collect();
        query.push(("currentDocument.exists", "true"));

        let response = self
            .request(Method::PATCH, self.document_url(id))
            .query(&query)
            .json(&body)
            .send()
            .await
            .map_err(|err| WriteError::transport(op, err.to_string()))?;
        match failure(response).await {
            Ok(_) => Ok(()),
            Err((StatusCode::NOT_FOUND, _)) => Err(WriteError::NotFound(id.clone())),
            Err((status, message)) => Err(write_failure(op, status, message)),
        }
    }

    async fn delete(&self, id: &VenueId) -> Result<(), WriteError> {
        let op = WriteOp::Delete;
        let response = self
            .request(Method::DELETE, self.document_url(id))
            .send()
            .await
            .map_err(|err| WriteError::transport(op, err.to_string()))?;
        failure(response)
            .await
            .map(|_| ())
            .map_err(|(status, message)| write_failure(op, status, message))
    }
}

#[cfg(test)]
#[path = "tests/firestore_tests.rs"]
mod tests;
