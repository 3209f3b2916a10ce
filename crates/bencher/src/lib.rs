#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    routes: RouteSet,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, routes: RouteSet) -> Self {
        Self { name, group, routes }
    }

    pub fn small(name: &'static str, routes: RouteSet) -> Self {
        Self::new(name, TestGroup::Small, routes)
    }

    pub fn normal(name: &'static str, routes: RouteSet) -> Self {
        Self::new(name, TestGroup::Normal, routes)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn routes(&self) -> &RouteSet {
        &self.routes
    }
}

/// Registered patterns and the request paths resolved against them.
#[derive(Debug, Copy, Clone)]
pub struct RouteSet {
    patterns: &'static [&'static str],
    paths: &'static [&'static str],
}

impl RouteSet {
    pub const fn new(patterns: &'static [&'static str], paths: &'static [&'static str]) -> Self {
        Self { patterns, paths }
    }

    pub fn patterns(&self) -> &'static [&'static str] {
        self.patterns
    }

    pub fn paths(&self) -> &'static [&'static str] {
        self.paths
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Normal,
}

pub static STATIC_ROUTES: RouteSet = RouteSet::new(
    &["/", "/about", "/contact", "/blog", "/blog/archive", "/docs/getting-started", "/docs/api/reference"],
    &["/", "/about", "/blog/archive", "/docs/api/reference", "/missing"],
);

pub static API_ROUTES: RouteSet = RouteSet::new(
    &[
        "/api/v1/users",
        "/api/v1/users/:id",
        "/api/v1/users/:id/orders",
        "/api/v1/users/:id/orders/:order",
        "/api/v1/products",
        "/api/v1/products/:id",
        "/api/v1/products/:id/reviews/:review",
        "/api/v2/search/:term",
        "/assets/*filepath",
    ],
    &[
        "/api/v1/users",
        "/api/v1/users/42",
        "/api/v1/users/42/orders/7",
        "/api/v1/products/9/reviews/3",
        "/api/v2/search/pen",
        "/assets/js/vendor/app.min.js",
        "/api/v3/unknown",
    ],
);
