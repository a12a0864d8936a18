//! Persistence engine integration tests against an in-memory store.

use std::collections::HashSet;

use sqlx::SqlitePool;

use process_route::{
    create_pool, init_schema, DatabaseConfig, DesignSession, MaterialAssignment, NodeKey,
    OpRelation, Position, ResourceAssignment, RouteError, RouteGraph, RouteRepository,
    SchedulingPatch, TemplateSummary, TimeSpan, TimeUnit,
};

async fn setup_pool() -> SqlitePool {
    tracing_subscriber::fmt().with_test_writer().try_init().ok();
    let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
    init_schema(&pool).await.unwrap();
    seed_catalog(&pool).await;
    pool
}

/// Two templates, one resource and one material, with T1 carrying default
/// resource/material lists and T2 carrying default scheduling values.
async fn seed_catalog(pool: &SqlitePool) {
    sqlx::query(
        r#"
        INSERT INTO pc_process_template (id, code, name, allow_split, split_strategy, min_batch)
        VALUES (1, 'OP-CUT', 'Cutting', 1, 'even', 5)
        "#,
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        r#"
        INSERT INTO pc_process_template (id, code, name, relation, pre_interval_value, pre_interval_unit)
        VALUES (2, 'OP-ASM', 'Assembly', 'ES', 2, 'hour')
        "#,
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO pc_resource (code, name, resource_group, capacity, productivity_value) VALUES ('R-SAW', 'Saw', 'cutting', 50, 2.5)",
    )
    .execute(pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO pc_template_resources (template_id, resource_code) VALUES (1, 'R-SAW')")
        .execute(pool)
        .await
        .unwrap();

    sqlx::query("INSERT INTO pc_material (code, name) VALUES ('RAW-STEEL', 'Steel')")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO pc_template_materials (template_id, material_code, quantity, is_used) VALUES (1, 'RAW-STEEL', 3, 1)",
    )
    .execute(pool)
    .await
    .unwrap();
}

fn cutting() -> TemplateSummary {
    TemplateSummary {
        id: 1,
        code: "OP-CUT".to_string(),
        name: "Cutting".to_string(),
    }
}

fn assembly() -> TemplateSummary {
    TemplateSummary {
        id: 2,
        code: "OP-ASM".to_string(),
        name: "Assembly".to_string(),
    }
}

async fn table_count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

/// The worked scenario: A (T1, relation=EE with 30min buffer) -> B (T2, no
/// override), saved and loaded back.
fn scenario_graph() -> (RouteGraph, NodeKey, NodeKey) {
    let mut graph = RouteGraph::new("M1");
    graph.name = "M1 route".to_string();

    let a = graph.add_node(Some(&cutting()), Position::new(50.0, 50.0));
    let b = graph.add_node(Some(&assembly()), Position::new(250.0, 50.0));
    graph
        .set_node_overrides(
            a,
            &SchedulingPatch {
                relation: Some(Some(OpRelation::Ee)),
                buffer_time: Some(Some(TimeSpan::minutes(30.0))),
                ..Default::default()
            },
        )
        .unwrap();
    graph.add_link(a, b).unwrap();
    (graph, a, b)
}

#[tokio::test]
async fn loading_unknown_material_yields_empty_route() {
    let pool = setup_pool().await;
    let repo = RouteRepository::new(pool);

    let graph = repo.load("NEVER-DESIGNED").await.unwrap();
    assert!(graph.is_empty());
    assert_eq!(graph.links().count(), 0);
    assert_eq!(graph.material_code, "NEVER-DESIGNED");
    assert!(graph.name.is_empty());
}

#[tokio::test]
async fn save_then_load_round_trips_graph_shape() {
    let pool = setup_pool().await;
    let repo = RouteRepository::new(pool);
    let (graph, a, _) = scenario_graph();

    repo.save(&graph).await.unwrap();
    let loaded = repo.load("M1").await.unwrap();

    assert_eq!(loaded.name, "M1 route");
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.links().count(), 1);

    // keys are now durable ids, in save order
    let keys: Vec<NodeKey> = loaded.nodes().map(|n| n.key).collect();
    assert!(keys.iter().all(|k| !k.is_draft()));

    let node_a = loaded.nodes().find(|n| n.name == "Cutting").unwrap();
    let node_b = loaded.nodes().find(|n| n.name == "Assembly").unwrap();
    assert_eq!(node_a.template_id, Some(1));
    assert_eq!(node_a.template_code.as_deref(), Some("OP-CUT"));
    assert_eq!(node_a.overrides.relation, Some(OpRelation::Ee));
    assert_eq!(node_a.overrides.buffer_time, Some(TimeSpan::minutes(30.0)));
    // the original override against `a` survived the identity swap
    assert_eq!(graph.node(a).unwrap().overrides.relation, Some(OpRelation::Ee));
    // B stayed fully inherited: nothing was flattened into overrides on save
    assert!(node_b.overrides.is_empty());

    // exactly one link, same direction
    let link = loaded.links().next().unwrap();
    assert_eq!(link.from, node_a.key);
    assert_eq!(link.to, node_b.key);
}

#[tokio::test]
async fn node_ids_are_reassigned_on_every_save() {
    let pool = setup_pool().await;
    let repo = RouteRepository::new(pool);
    let (graph, ..) = scenario_graph();

    let first = repo.save(&graph).await.unwrap();
    let mut reloaded = repo.load("M1").await.unwrap();
    reloaded.name = "M1 route v2".to_string();
    let second = repo.save(&reloaded).await.unwrap();

    let first_ids: HashSet<i64> = first.values().copied().collect();
    let second_ids: HashSet<i64> = second.values().copied().collect();
    assert!(first_ids.is_disjoint(&second_ids), "durable ids must not be reused");

    // the remapped link still connects the same two operations
    let after = repo.load("M1").await.unwrap();
    let link = after.links().next().unwrap();
    assert_eq!(after.node(link.from).unwrap().name, "Cutting");
    assert_eq!(after.node(link.to).unwrap().name, "Assembly");
}

#[tokio::test]
async fn resave_with_fewer_nodes_leaves_no_orphans() {
    let pool = setup_pool().await;
    let repo = RouteRepository::new(pool.clone());

    let mut graph = RouteGraph::new("M2");
    graph.name = "M2 route".to_string();
    let a = graph.add_node(Some(&cutting()), Position::default());
    let b = graph.add_node(Some(&assembly()), Position::default());
    let c = graph.add_node(None, Position::default());
    graph
        .set_assignments(
            b,
            vec![ResourceAssignment {
                resource_code: "R-SAW".to_string(),
                resource_name: "Saw".to_string(),
                resource_group: "cutting".to_string(),
                capacity: 50.0,
                productivity: 2.5,
            }],
            vec![MaterialAssignment {
                material_code: "RAW-STEEL".to_string(),
                material_name: "Steel".to_string(),
                quantity: 3.0,
                is_used: true,
            }],
        )
        .unwrap();
    graph.add_link(a, b).unwrap();
    graph.add_link(b, c).unwrap();
    repo.save(&graph).await.unwrap();

    assert_eq!(table_count(&pool, "pc_route_node").await, 3);
    assert_eq!(table_count(&pool, "pc_route_link").await, 2);
    assert_eq!(table_count(&pool, "pc_route_node_resource").await, 1);
    assert_eq!(table_count(&pool, "pc_route_node_material").await, 1);

    // drop the node that carried the assignments and both links
    let mut reloaded = repo.load("M2").await.unwrap();
    let b_key = reloaded.nodes().find(|n| n.name == "Assembly").unwrap().key;
    reloaded.remove_node(b_key);
    repo.save(&reloaded).await.unwrap();

    assert_eq!(table_count(&pool, "pc_route_node").await, 2);
    assert_eq!(table_count(&pool, "pc_route_link").await, 0);
    assert_eq!(table_count(&pool, "pc_route_node_resource").await, 0);
    assert_eq!(table_count(&pool, "pc_route_node_material").await, 0);
}

#[tokio::test]
async fn failed_assignment_insert_rolls_back_the_whole_save() {
    let pool = setup_pool().await;
    let repo = RouteRepository::new(pool.clone());

    let (graph, ..) = scenario_graph();
    repo.save(&graph).await.unwrap();

    // fault injection: the next resource-assignment insert aborts
    sqlx::query(
        r#"
        CREATE TRIGGER fail_resource_insert BEFORE INSERT ON pc_route_node_resource
        BEGIN SELECT RAISE(ABORT, 'simulated fault'); END
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    let mut edited = repo.load("M1").await.unwrap();
    edited.name = "M1 route v2".to_string();
    let extra = edited.add_node(None, Position::default());
    edited
        .set_assignments(
            extra,
            vec![ResourceAssignment {
                resource_code: "R-SAW".to_string(),
                resource_name: "Saw".to_string(),
                resource_group: "cutting".to_string(),
                capacity: 50.0,
                productivity: 2.5,
            }],
            vec![],
        )
        .unwrap();

    let err = repo.save(&edited).await.unwrap_err();
    assert!(matches!(err, RouteError::Database(_)));

    // prior persisted state fully intact: old name, two nodes, one link
    let after = repo.load("M1").await.unwrap();
    assert_eq!(after.name, "M1 route");
    assert_eq!(after.len(), 2);
    assert_eq!(after.links().count(), 1);
    assert_eq!(table_count(&pool, "pc_route_node_resource").await, 0);
}

#[tokio::test]
async fn failed_first_save_leaves_nothing_behind() {
    let pool = setup_pool().await;
    let repo = RouteRepository::new(pool.clone());

    sqlx::query(
        r#"
        CREATE TRIGGER fail_material_insert BEFORE INSERT ON pc_route_node_material
        BEGIN SELECT RAISE(ABORT, 'simulated fault'); END
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    let mut graph = RouteGraph::new("M3");
    graph.name = "M3 route".to_string();
    let key = graph.add_node(None, Position::default());
    graph
        .set_assignments(
            key,
            vec![],
            vec![MaterialAssignment {
                material_code: "RAW-STEEL".to_string(),
                material_name: "Steel".to_string(),
                quantity: 1.0,
                is_used: true,
            }],
        )
        .unwrap();

    assert!(repo.save(&graph).await.is_err());
    assert_eq!(table_count(&pool, "pc_process_route").await, 0);
    assert_eq!(table_count(&pool, "pc_route_node").await, 0);
    assert_eq!(table_count(&pool, "pc_route_node_material").await, 0);
}

#[tokio::test]
async fn missing_route_name_is_rejected_before_any_storage() {
    let pool = setup_pool().await;
    let repo = RouteRepository::new(pool.clone());

    let mut graph = RouteGraph::new("M4");
    graph.add_node(None, Position::default());

    let err = repo.save(&graph).await.unwrap_err();
    assert!(matches!(err, RouteError::MissingRouteName));
    assert_eq!(table_count(&pool, "pc_process_route").await, 0);
    assert_eq!(table_count(&pool, "pc_route_node").await, 0);
}

#[tokio::test]
async fn dangling_link_aborts_the_save() {
    let pool = setup_pool().await;
    let repo = RouteRepository::new(pool.clone());

    // a graph that violates the link invariant can only come from outside
    // the model, e.g. a corrupted session dump
    let graph: RouteGraph = serde_json::from_value(serde_json::json!({
        "material_code": "M5",
        "name": "M5 route",
        "description": "",
        "nodes": [{ "key": { "stored": 1 }, "name": "Lonely", "sort_order": 1 }],
        "links": [{ "from": { "stored": 1 }, "to": { "stored": 999 } }]
    }))
    .unwrap();

    let err = repo.save(&graph).await.unwrap_err();
    assert!(matches!(err, RouteError::ConstraintViolation(NodeKey::Stored(999))));
    assert_eq!(table_count(&pool, "pc_process_route").await, 0);
    assert_eq!(table_count(&pool, "pc_route_node").await, 0);
}

#[tokio::test]
async fn design_session_edits_saves_and_resolves() {
    let pool = setup_pool().await;

    let mut session = DesignSession::open(pool.clone(), "M6").await.unwrap();
    assert!(session.graph().is_empty());

    session.set_header("M6 route", "two-step route");
    let a = session.place_node(Some(1), Position::new(40.0, 40.0)).await.unwrap();
    let b = session.place_node(Some(2), Position::new(240.0, 40.0)).await.unwrap();
    session.connect(a, b).unwrap();
    session
        .set_node_overrides(
            a,
            &SchedulingPatch {
                relation: Some(Some(OpRelation::Ee)),
                buffer_time: Some(Some(TimeSpan::minutes(30.0))),
                ..Default::default()
            },
        )
        .unwrap();

    assert!(matches!(
        session.place_node(Some(404), Position::default()).await,
        Err(RouteError::TemplateNotFound(404))
    ));

    session.save().await.unwrap();
    // after save the session graph carries durable keys
    assert!(session.graph().nodes().all(|n| !n.key.is_draft()));

    // a fresh session sees the same route and resolves inheritance
    let session = DesignSession::open(pool, "M6").await.unwrap();
    let graph = session.graph();
    let a = graph.nodes().find(|n| n.name == "Cutting").unwrap().key;
    let b = graph.nodes().find(|n| n.name == "Assembly").unwrap().key;

    let view_a = session.effective_view(a).await.unwrap();
    assert_eq!(*view_a.relation.value(), OpRelation::Ee);
    assert!(view_a.relation.is_override());
    assert_eq!(*view_a.buffer_time.value(), TimeSpan::minutes(30.0));
    // untouched fields of A still inherit from OP-CUT
    assert!(view_a.allow_split.is_inherited());
    assert_eq!(*view_a.min_batch.value(), 5.0);
    // OP-CUT's catalog lists surface as read-only suggestions
    assert!(view_a.resources.is_inherited());
    assert_eq!(view_a.resources.value()[0].resource_code, "R-SAW");
    assert!(view_a.materials.is_inherited());
    assert_eq!(view_a.materials.value()[0].quantity, 3.0);

    let view_b = session.effective_view(b).await.unwrap();
    assert_eq!(*view_b.relation.value(), OpRelation::Es);
    assert!(view_b.relation.is_inherited());
    assert_eq!(
        *view_b.pre_interval.value(),
        TimeSpan::new(2.0, TimeUnit::Hour)
    );
    // OP-ASM has no catalog lists, so assignments fall to empty defaults
    assert!(!view_b.resources.is_inherited());
    assert!(view_b.resources.value().is_empty());

    let templates = session.templates().await.unwrap();
    assert_eq!(templates.len(), 2);
    assert_eq!(templates[0].code, "OP-ASM");
}

#[tokio::test]
async fn cyclic_routes_persist_as_built() {
    let pool = setup_pool().await;
    let repo = RouteRepository::new(pool);

    let mut graph = RouteGraph::new("M7");
    graph.name = "rework loop".to_string();
    let a = graph.add_node(Some(&cutting()), Position::default());
    let b = graph.add_node(Some(&assembly()), Position::default());
    graph.add_link(a, b).unwrap();
    graph.add_link(b, a).unwrap();
    graph.add_link(a, a).unwrap();

    repo.save(&graph).await.unwrap();
    let loaded = repo.load("M7").await.unwrap();
    assert_eq!(loaded.links().count(), 3);
    assert!(loaded.links().any(|l| l.from == l.to));
}
