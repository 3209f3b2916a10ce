use bencher::{TestCase, API_ROUTES, STATIC_ROUTES};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use http::Method;
use nano_web::tree::{split_path, Node};
use nano_web::{handler_fn, Router};
use std::hint::black_box;

fn create_test_cases() -> Vec<TestCase> {
    vec![TestCase::small("static_routes", STATIC_ROUTES), TestCase::normal("api_routes", API_ROUTES)]
}

fn router(case: &TestCase) -> Router {
    let mut router = Router::new();
    for pattern in case.routes().patterns() {
        router.add_route(Method::GET, pattern, vec![Box::new(handler_fn(|_ctx| {}))]);
    }
    router
}

fn benchmark_tree_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("tree_insert");

    for case in create_test_cases() {
        group.throughput(Throughput::Elements(case.routes().patterns().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.iter(|| {
                let mut root = Node::root();
                for pattern in case.routes().patterns() {
                    root.insert(pattern, &split_path(pattern), 0);
                }
                black_box(root);
            });
        });
    }

    group.finish();
}

fn benchmark_find_route(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("find_route");

    for case in create_test_cases() {
        let router = router(&case);
        group.throughput(Throughput::Elements(case.routes().paths().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.iter(|| {
                for path in case.routes().paths() {
                    black_box(router.find_route(&Method::GET, black_box(path)));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(routing, benchmark_tree_insert, benchmark_find_route);
criterion_main!(routing);
