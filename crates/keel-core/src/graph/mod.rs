//! # Keel Core Dependency Graph
//!
//! Orders components so that every component comes after the components it
//! depends on, and detects cycles before anything is started.
//!
//! The sort produces one *base order* in which dependents precede their
//! dependencies. The start order is its reverse and the stop order is the
//! base order itself, so teardown is always the mirror image of startup.
//! Edge targets that are not registered take part in the sort but are
//! filtered out with [`TopologicalOrder::retain_defined`]; the resolver
//! reports them when their dependent starts.
pub mod error;

use std::collections::{HashMap, HashSet};

use crate::registry::Registry;

pub use error::GraphError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Dependency graph between component names
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Nodes in insertion order
    nodes: Vec<String>,
    /// Membership index over `nodes`
    known: HashSet<String>,
    /// Edges in the graph (component -> components it depends on)
    edges: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph of a registry, nodes in registration order
    pub fn from_registry(registry: &Registry) -> Self {
        let mut graph = Self::new();
        for definition in registry.definitions() {
            graph.add_node(definition.name());
            for edge in definition.dependencies() {
                graph.add_edge(definition.name(), &edge.component);
            }
        }
        graph
    }

    pub fn add_node(&mut self, name: &str) {
        if self.known.insert(name.to_string()) {
            self.nodes.push(name.to_string());
        }
    }

    /// Add an edge (`component` depends on `dependency`)
    pub fn add_edge(&mut self, component: &str, dependency: &str) {
        self.add_node(component);
        self.add_node(dependency);
        let dependencies = self.edges.entry(component.to_string()).or_default();
        if !dependencies.iter().any(|existing| existing == dependency) {
            dependencies.push(dependency.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.known.contains(name)
    }

    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.edges.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_cycles(&self) -> bool {
        self.sort().is_err()
    }

    /// Topologically sort the graph
    pub fn sort(&self) -> Result<TopologicalOrder, GraphError> {
        let mut marks = HashMap::new();
        let mut postorder = Vec::with_capacity(self.nodes.len());

        for node in &self.nodes {
            self.visit(node, &mut marks, &mut postorder)?;
        }

        // Postorder lists dependencies first; the base order is the reverse.
        postorder.reverse();
        Ok(TopologicalOrder { base: postorder })
    }

    /// Iterative DFS from `root`. The work stack doubles as the current
    /// path for cycle reports.
    fn visit<'a>(
        &'a self,
        root: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
        postorder: &mut Vec<String>,
    ) -> Result<(), GraphError> {
        if marks.contains_key(root) {
            return Ok(());
        }
        marks.insert(root, Mark::Visiting);
        let mut stack: Vec<(&'a str, usize)> = vec![(root, 0)];

        while let Some(&(node, next)) = stack.last() {
            let Some(dependency) = self.dependencies_of(node).get(next) else {
                marks.insert(node, Mark::Done);
                postorder.push(node.to_string());
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            match marks.get(dependency.as_str()) {
                Some(Mark::Done) => {}
                Some(Mark::Visiting) => {
                    let from = stack
                        .iter()
                        .position(|(name, _)| *name == dependency.as_str())
                        .unwrap_or(0);
                    let mut cycle: Vec<String> =
                        stack[from..].iter().map(|(name, _)| name.to_string()).collect();
                    cycle.push(dependency.clone());
                    return Err(GraphError::CyclicDependency(cycle));
                }
                None => {
                    marks.insert(dependency.as_str(), Mark::Visiting);
                    stack.push((dependency.as_str(), 0));
                }
            }
        }
        Ok(())
    }
}

/// Result of a successful sort
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopologicalOrder {
    /// Dependents before their dependencies
    base: Vec<String>,
}

impl TopologicalOrder {
    /// Drop names that are not registered components
    pub fn retain_defined(mut self, registry: &Registry) -> Self {
        self.base.retain(|name| registry.contains(name));
        self
    }

    pub fn base(&self) -> &[String] {
        &self.base
    }

    /// Dependencies before dependents
    pub fn start_order(&self) -> Vec<String> {
        self.base.iter().rev().cloned().collect()
    }

    /// Dependents before dependencies
    pub fn stop_order(&self) -> Vec<String> {
        self.base.clone()
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }
}
