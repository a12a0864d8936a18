//! Design session: the facade the canvas layer talks to.
//!
//! Owns the in-memory route graph for one material and the repositories
//! behind it. The canvas translates drag/drop/click events into the mutation
//! calls here and renders from `graph()` and `effective_view()`; it keeps no
//! business state of its own. One session edits one material at a time, and
//! `save` takes `&mut self`, so saves are naturally serialized.

use sqlx::SqlitePool;
use tracing::info;

use crate::graph::RouteGraph;
use crate::models::{
    MaterialAssignment, NodeKey, Position, ResourceAssignment, SchedulingPatch, TemplateDetail,
    TemplateSummary,
};
use crate::repositories::{RouteRepository, TemplateRepository};
use crate::resolver::{self, EffectiveNode};
use crate::utils::errors::{RouteError, RouteResult};

pub struct DesignSession {
    templates: TemplateRepository,
    routes: RouteRepository,
    graph: RouteGraph,
}

impl DesignSession {
    /// Open the designer for a material, loading its route if one was saved
    /// before and starting empty otherwise.
    pub async fn open(pool: SqlitePool, material_code: &str) -> RouteResult<Self> {
        let routes = RouteRepository::new(pool.clone());
        let graph = routes.load(material_code).await?;
        info!(material_code, nodes = graph.len(), "design session opened");

        Ok(Self {
            templates: TemplateRepository::new(pool),
            routes,
            graph,
        })
    }

    pub fn graph(&self) -> &RouteGraph {
        &self.graph
    }

    pub fn set_header(&mut self, name: impl Into<String>, description: impl Into<String>) {
        self.graph.name = name.into();
        self.graph.description = description.into();
    }

    /// Place a node, optionally instantiating a template from the palette.
    pub async fn place_node(
        &mut self,
        template_id: Option<i64>,
        position: Position,
    ) -> RouteResult<NodeKey> {
        let template = match template_id {
            Some(id) => Some(
                self.templates
                    .get_summary(id)
                    .await?
                    .ok_or(RouteError::TemplateNotFound(id))?,
            ),
            None => None,
        };
        Ok(self.graph.add_node(template.as_ref(), position))
    }

    pub fn remove_node(&mut self, key: NodeKey) {
        self.graph.remove_node(key);
    }

    pub fn connect(&mut self, from: NodeKey, to: NodeKey) -> RouteResult<()> {
        self.graph.add_link(from, to)
    }

    pub fn move_node(&mut self, key: NodeKey, position: Position) -> RouteResult<()> {
        self.graph.move_node(key, position)
    }

    pub fn set_node_overrides(&mut self, key: NodeKey, patch: &SchedulingPatch) -> RouteResult<()> {
        self.graph.set_node_overrides(key, patch)
    }

    pub fn set_assignments(
        &mut self,
        key: NodeKey,
        resources: Vec<ResourceAssignment>,
        materials: Vec<MaterialAssignment>,
    ) -> RouteResult<()> {
        self.graph.set_assignments(key, resources, materials)
    }

    /// Persist the current graph, then rewrite the session's node keys to
    /// the durable ids the store assigned, as if the route had been
    /// reloaded.
    pub async fn save(&mut self) -> RouteResult<()> {
        let ids = self.routes.save(&self.graph).await?;
        self.graph.rekey(&ids);
        Ok(())
    }

    /// The fully resolved view of one node, for a detail pane or an export.
    pub async fn effective_view(&self, key: NodeKey) -> RouteResult<EffectiveNode> {
        let node = self.graph.node(key).ok_or(RouteError::UnknownNode(key))?;
        let template = match node.template_id {
            Some(id) => self.templates.get_template(id).await?,
            None => None,
        };
        Ok(resolver::resolve(node, template.as_ref()))
    }

    /// Palette listing for the template sidebar.
    pub async fn templates(&self) -> RouteResult<Vec<TemplateSummary>> {
        self.templates.list_templates().await
    }

    pub async fn template(&self, id: i64) -> RouteResult<Option<TemplateDetail>> {
        self.templates.get_template(id).await
    }
}
