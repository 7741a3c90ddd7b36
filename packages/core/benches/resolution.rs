//! Resolution benchmarks
//!
//! Run with: `cargo bench -p viewtree-core`
//!
//! Measures the read path on a wide, moderately deep view:
//! - structural expansion only
//! - full resolution with markdown rendering and tag derivation

use std::sync::Arc;

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use viewtree_core::{
    expand_tree, EngineConfig, NewView, NodeConfig, NodeId, NodeKind, PostRecord,
    PulldownRenderer, StaticCorpus, ViewResolver, ViewsConfig,
};

/// A view with `sections` containers, each holding a markdown node and a tag list
fn build_site(sections: usize) -> ViewsConfig {
    let mut config = ViewsConfig::new();
    let (view, _) = config
        .create_view(
            NewView {
                path: "/".to_string(),
                title: "Home".to_string(),
                ..Default::default()
            },
            NodeId::generate(),
        )
        .unwrap();

    for i in 0..sections {
        let section = config
            .create_node(
                NodeId::generate(),
                &view.root_node_id,
                NodeConfig::default_for(NodeKind::Container),
                None,
            )
            .unwrap();
        let markdown = NodeConfig::from_value(
            NodeKind::Markdown,
            json!({ "content": format!("## Section {}\n\nSome *text* and `code`.\n\n### Detail\n", i) }),
        )
        .unwrap();
        config
            .create_node(NodeId::generate(), &section.id, markdown, None)
            .unwrap();
        config
            .create_node(
                NodeId::generate(),
                &section.id,
                NodeConfig::default_for(NodeKind::TagList),
                None,
            )
            .unwrap();
    }
    config
}

fn corpus(posts: usize) -> StaticCorpus {
    let records = (0..posts)
        .map(|i| PostRecord {
            slug: format!("post-{}", i),
            title: format!("Post {}", i),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64),
            categories: vec![format!("tag-{}", i % 7), "rust".to_string()],
            series: None,
            toc: false,
            summary: None,
        })
        .collect();
    StaticCorpus::new(records, Vec::new())
}

fn bench_resolution(c: &mut Criterion) {
    let site = build_site(100);
    let config = EngineConfig::default();
    let resolver = ViewResolver::new(
        Arc::new(PulldownRenderer::new()),
        Arc::new(corpus(200)),
        &config,
    );
    let root = site.view("/").unwrap().root_node_id.clone();

    c.bench_function("expand_tree_301_nodes", |b| {
        b.iter(|| expand_tree(black_box(&site), &root, 64, |_| None).unwrap())
    });

    c.bench_function("resolve_view_301_nodes", |b| {
        b.iter(|| resolver.get_resolved_view_by_path(black_box("/"), &site).unwrap())
    });
}

criterion_group!(benches, bench_resolution);
criterion_main!(benches);
