//! Access decision benchmarks
//!
//! Measures warm `has_access` latency as the number of rules grows, and
//! the one-time cost of compiling a role's rules on first use.

use cretoai_rbac::{CallChain, Role, RoleRecord, RuleRecord};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn create_role(rule_count: usize) -> RoleRecord {
    (0..rule_count).fold(RoleRecord::new("bench"), |record, i| {
        let rule = match i % 3 {
            0 => RuleRecord::path(format!("data/area{}/**", i), "read"),
            1 => RuleRecord::regex(format!("^data/area{}/[a-z]+$", i), "read, write"),
            _ => RuleRecord::path(format!("data/area{}/*", i), "read")
                .with_via("procedure/reports/**"),
        };
        record.with_rule(rule)
    })
}

fn bench_has_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("has_access");
    let chain = CallChain::new(["procedure/system/storage/read", "procedure/reports/list"]);

    for rule_count in [10, 100, 1000].iter() {
        let role = Role::new(create_role(*rule_count));
        // Compile every rule before measuring
        for rule in role.rules() {
            rule.matcher();
            rule.gate();
            rule.permissions();
        }

        group.bench_with_input(
            BenchmarkId::new("rules", rule_count),
            rule_count,
            |b, &count| {
                let path = format!("data/area{}/item", count - 1);
                b.iter(|| black_box(role.has_access(black_box(&path), "read", &chain)));
            },
        );
    }

    group.finish();
}

fn bench_first_use(c: &mut Criterion) {
    let chain = CallChain::empty();

    c.bench_function("first_use_100_rules", |b| {
        b.iter_with_setup(
            || Role::new(create_role(100)),
            |role| black_box(role.has_access("data/area1/item", "read", &chain)),
        );
    });
}

criterion_group!(benches, bench_has_access, bench_first_use);
criterion_main!(benches);
