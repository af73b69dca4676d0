//! Endpoint registration and the exemption registry.

use std::collections::HashMap;

use axum::handler::Handler;
use axum::http::Method;
use axum::routing::MethodRouter;
use axum::Router;
use thiserror::Error;

/// Static properties of a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerTag {
    pub name: &'static str,
    /// Requests resolved to this handler are not written to the request log.
    pub exempt: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("path `{0}` registered more than once")]
    DuplicatePath(&'static str),

    #[error("endpoint `{0}` has no methods")]
    NoMethods(&'static str),
}

/// A route registration: a path, its handlers and their capability flags.
pub struct Endpoint<S = ()> {
    path: &'static str,
    name: &'static str,
    methods: Vec<Method>,
    router: MethodRouter<S>,
    exempt: bool,
    login_required: bool,
}

impl<S> Endpoint<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(path: &'static str, name: &'static str) -> Self {
        Self {
            path,
            name,
            methods: Vec::new(),
            router: MethodRouter::new(),
            exempt: false,
            login_required: false,
        }
    }

    /// Serve `GET` (and `HEAD`) with `handler`.
    pub fn get<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.methods.push(Method::GET);
        self.methods.push(Method::HEAD);
        self.router = self.router.get(handler);
        self
    }

    pub fn post<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.methods.push(Method::POST);
        self.router = self.router.post(handler);
        self
    }

    pub fn put<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.methods.push(Method::PUT);
        self.router = self.router.put(handler);
        self
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_exempt(&self) -> bool {
        self.exempt
    }

    pub fn requires_login(&self) -> bool {
        self.login_required
    }
}

/// Tag an endpoint so the request interceptor skips it.
pub fn mark_exempt<S>(mut endpoint: Endpoint<S>) -> Endpoint<S> {
    endpoint.exempt = true;
    endpoint
}

/// Tag an endpoint so anonymous callers are redirected to the login page.
pub fn login_required<S>(mut endpoint: Endpoint<S>) -> Endpoint<S> {
    endpoint.login_required = true;
    endpoint
}

/// Read-only `(path pattern, method) → HandlerTag` map, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct ExemptionRegistry {
    tags: HashMap<&'static str, HashMap<Method, HandlerTag>>,
}

impl ExemptionRegistry {
    /// Tag of the handler serving `method` on the registered `path` pattern.
    pub fn lookup(&self, path: &str, method: &Method) -> Option<HandlerTag> {
        self.tags.get(path)?.get(method).copied()
    }

    pub fn is_exempt(&self, path: &str, method: &Method) -> bool {
        self.lookup(path, method).is_some_and(|tag| tag.exempt)
    }

    /// Number of registered `(path, method)` pairs.
    pub fn len(&self) -> usize {
        self.tags.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// The frozen result of route registration.
pub struct RouteTable<S> {
    pub registry: ExemptionRegistry,
    pub router: Router<S>,
}

impl<S> RouteTable<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Build the registry and router. `guard` wraps endpoints marked `login_required`.
    pub fn build<G>(endpoints: Vec<Endpoint<S>>, guard: G) -> Result<Self, RouteError>
    where
        G: Fn(MethodRouter<S>) -> MethodRouter<S>,
    {
        let mut registry = ExemptionRegistry::default();
        let mut router = Router::new();
        let mut seen = Vec::with_capacity(endpoints.len());

        for endpoint in endpoints {
            if seen.contains(&endpoint.path) {
                return Err(RouteError::DuplicatePath(endpoint.path));
            }
            if endpoint.methods.is_empty() {
                return Err(RouteError::NoMethods(endpoint.name));
            }
            seen.push(endpoint.path);

            let tag = HandlerTag {
                name: endpoint.name,
                exempt: endpoint.exempt,
            };
            let by_method = registry.tags.entry(endpoint.path).or_default();
            for method in &endpoint.methods {
                by_method.insert(method.clone(), tag);
            }

            let method_router = if endpoint.login_required {
                guard(endpoint.router)
            } else {
                endpoint.router
            };
            router = router.route(endpoint.path, method_router);

            tracing::debug!(
                path = endpoint.path,
                handler = endpoint.name,
                exempt = endpoint.exempt,
                login_required = endpoint.login_required,
                "Registered endpoint"
            );
        }

        Ok(Self { registry, router })
    }
}
