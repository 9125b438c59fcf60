//! Template-based request classification.
//!
//! [`match_route`] maps a method and request target onto a [`RouteMatch`].
//! API routes are declared as path templates in [`API_ROUTES`]; a template
//! is either a literal path or a literal prefix followed by a `*name` tail
//! capture. Tail captures take the raw remainder of the request target,
//! query string included and percent-encoding untouched, so the identifier
//! reaches the upstream exactly as the browser sent it.

use axum::http::{Method, Uri};

/// Upstream endpoint an API template relays to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    MarketItem,
    BulkPrices,
}

#[derive(Debug)]
pub struct RouteTemplate {
    pub method: Method,
    pub template: &'static str,
    pub endpoint: Endpoint,
}

pub const ITEM_PREFIX: &str = "/api/market/item/";
pub const BULK_PATH: &str = "/api/market/prices/bulk";

pub static API_ROUTES: &[RouteTemplate] = &[
    RouteTemplate {
        method: Method::GET,
        template: "/api/market/item/*id",
        endpoint: Endpoint::MarketItem,
    },
    RouteTemplate {
        method: Method::POST,
        template: BULK_PATH,
        endpoint: Endpoint::BulkPrices,
    },
];

/// Raw item identifier captured from the request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemId(String);

impl ItemId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RouteMatch {
    Preflight,
    Item(ItemId),
    BulkPrices,
    Static,
    MethodNotAllowed,
    Unsupported,
}

#[must_use]
pub fn match_route(method: &Method, uri: &Uri) -> RouteMatch {
    if method == Method::OPTIONS {
        return RouteMatch::Preflight;
    }

    let target = uri.path_and_query().map_or("/", |pq| pq.as_str());

    for route in API_ROUTES {
        if route.method != method {
            continue;
        }
        let Some(capture) = match_template(route.template, uri.path(), target) else {
            continue;
        };
        return match route.endpoint {
            Endpoint::MarketItem => {
                RouteMatch::Item(ItemId(capture.unwrap_or_default().to_string()))
            }
            Endpoint::BulkPrices => RouteMatch::BulkPrices,
        };
    }

    match *method {
        Method::GET | Method::HEAD => RouteMatch::Static,
        Method::POST => RouteMatch::MethodNotAllowed,
        _ => RouteMatch::Unsupported,
    }
}

/// Literal templates compare against the path alone; tail templates strip
/// their prefix from the full target and capture the rest.
fn match_template<'a>(template: &str, path: &str, target: &'a str) -> Option<Option<&'a str>> {
    match template.split_once('*') {
        Some((prefix, _name)) => target.strip_prefix(prefix).map(Some),
        None => (template == path).then_some(None),
    }
}
