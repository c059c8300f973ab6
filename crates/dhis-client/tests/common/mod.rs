//! In-memory transport and fixtures shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fmt;

use dhis_client::{FetchError, HttpResponse, Query, Transport};
use serde_json::{Value, json};

type Handler = Box<dyn Fn(&Query) -> Result<HttpResponse, FetchError>>;

/// A request as seen by [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Request {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn params(&self, key: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
            .collect()
    }
}

/// Routes by exact path; unknown paths answer 404. Records every request.
#[derive(Default)]
pub struct MemoryTransport {
    routes: Vec<(String, Handler)>,
    requests: RefCell<Vec<Request>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(
        mut self,
        path: &str,
        handler: impl Fn(&Query) -> Result<HttpResponse, FetchError> + 'static,
    ) -> Self {
        self.routes.push((path.to_string(), Box::new(handler)));
        self
    }

    pub fn json(self, path: &str, body: Value) -> Self {
        let body = body.to_string();
        self.route(path, move |_| Ok(HttpResponse::ok(body.clone())))
    }

    pub fn status(self, path: &str, status: u16) -> Self {
        self.route(path, move |_| {
            Ok(HttpResponse {
                status,
                body: String::new(),
            })
        })
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|request| request.path.clone())
            .collect()
    }
}

impl fmt::Debug for MemoryTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTransport")
            .field("routes", &self.routes.iter().map(|(path, _)| path).collect::<Vec<_>>())
            .field("requests", &self.requests.borrow().len())
            .finish()
    }
}

impl Transport for MemoryTransport {
    fn get(&self, path: &str, query: &Query) -> Result<HttpResponse, FetchError> {
        self.requests.borrow_mut().push(Request {
            path: path.to_string(),
            query: query
                .iter()
                .map(|(key, value)| ((*key).to_string(), value.clone()))
                .collect(),
        });
        match self.routes.iter().find(|(route, _)| route == path) {
            Some((_, handler)) => handler(query),
            None => Ok(HttpResponse {
                status: 404,
                body: "Not Found".to_string(),
            }),
        }
    }
}

pub fn param<'a>(query: &'a Query, key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value.as_str())
}

pub fn me_json() -> Value {
    json!({
        "id": "U1",
        "name": "Jane Doe",
        "displayName": "Jane Doe",
        "email": "jane@example.org",
        "organisationUnits": [{"id": "OU1", "name": "Dakar"}, {"id": "OU2", "name": "Thiès"}]
    })
}

pub fn dashboard_json(id: &str, name: &str, owner_id: &str, owner_org: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "displayName": name,
        "created": "2024-03-01T10:00:00.000",
        "user": {"id": owner_id, "name": "Owner", "organisationUnits": [{"id": owner_org}]},
        "dashboardItems": [{"id": format!("{id}-item"), "text": "note"}]
    })
}

/// Serves `/api/dashboards` pages out of `all`, honouring `page` and `pageSize`.
pub fn paged(all: Vec<Value>) -> impl Fn(&Query) -> Result<HttpResponse, FetchError> {
    move |query| {
        let page: usize = param(query, "page")
            .and_then(|value| value.parse().ok())
            .unwrap_or(1);
        let size: usize = param(query, "pageSize")
            .and_then(|value| value.parse().ok())
            .unwrap_or(50);
        let total = all.len();
        let page_count = total.div_ceil(size).max(1);
        let items: Vec<Value> = all
            .iter()
            .skip((page - 1) * size)
            .take(size)
            .cloned()
            .collect();
        let body = json!({
            "pager": {"page": page, "pageSize": size, "total": total, "pageCount": page_count},
            "dashboards": items
        });
        Ok(HttpResponse::ok(body.to_string()))
    }
}
