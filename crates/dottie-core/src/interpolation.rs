//! Dependency-ordered evaluation of assignment values.
//!
//! Enabled assignments form a directed graph with an edge from every
//! referenced assignment to the one referencing it. Evaluation walks that
//! graph in topological order, breaking ties by document order, and stores
//! the results in a local buffer. The caller commits the buffer only when the
//! whole pass succeeds.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap, HashSet},
};

use log::{debug, trace};
use petgraph::{
    Direction,
    algo::tarjan_scc,
    graph::{DiGraph, NodeIndex},
};

use crate::{
    ast::{Assignment, Document},
    cancel::CancellationToken,
    error::{InterpolationError, Warning},
    position::Position,
    selector::Selector,
    template::{ExpandError, Template},
};

/// Where names that no enabled assignment defines are looked up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EnvFallback {
    /// Unset names stay unset.
    #[default]
    Disabled,
    /// Read the environment of the current process.
    Process,
    /// Read a caller-provided snapshot.
    Map(HashMap<String, String>),
}

impl EnvFallback {
    /// Build a snapshot fallback from `(name, value)` pairs.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        EnvFallback::Map(
            vars.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn lookup(&self, name: &str) -> Option<String> {
        match self {
            EnvFallback::Disabled => None,
            EnvFallback::Process => std::env::var(name).ok(),
            EnvFallback::Map(vars) => vars.get(name).cloned(),
        }
    }
}

/// Values computed by a pass, ready to be committed.
#[derive(Debug, Default)]
pub(crate) struct Evaluation {
    pub values: Vec<(String, String)>,
    pub warnings: Vec<Warning>,
}

/// Resolve `name` while evaluating `target`.
///
/// `computed` holds values evaluated earlier in the same pass; they take
/// precedence over the values stored in the document.
pub(crate) fn resolve(
    document: &Document,
    target: Option<&str>,
    name: &str,
    computed: Option<&HashMap<String, String>>,
) -> Option<String> {
    if target != Some(name) {
        if let Some(value) = computed.and_then(|computed| computed.get(name)) {
            return Some(value.clone());
        }
        let visible = document
            .get(name)
            .filter(|assignment| assignment.is_enabled() && assignment.is_complete());
        if let Some(assignment) = visible {
            return Some(assignment.interpolated().to_string());
        }
    }
    document.env_fallback().lookup(name)
}

/// Expand a parsed template, turning unset names into warnings and required
/// failures into errors positioned at `position`.
pub(crate) fn expand_template<F>(
    template: &Template,
    owner: &str,
    position: &Position,
    lookup: &F,
) -> Result<(String, Vec<Warning>), InterpolationError>
where
    F: Fn(&str) -> Option<String>,
{
    let evaluated = template.expand(lookup).map_err(|err| match err {
        ExpandError::Required { name, reason } => InterpolationError::RequiredMissing {
            name,
            reason,
            position: position.clone(),
        },
    })?;

    let warnings = evaluated
        .missing
        .iter()
        .map(|name| {
            trace!(owner = owner, name = name.as_str(); "Reference is not set");
            Warning::missing_variable(name, position.clone())
        })
        .collect();

    Ok((evaluated.value, warnings))
}

pub(crate) struct Interpolator<'d> {
    document: &'d Document,
    graph: DiGraph<&'d Assignment, ()>,
    nodes: HashMap<&'d str, NodeIndex>,
}

impl<'d> Interpolator<'d> {
    /// Build the dependency graph of the enabled assignments in `document`.
    pub fn new(document: &'d Document) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();

        for assignment in document
            .all_assignments(&[Selector::ExcludeDisabled])
            .filter(|assignment| assignment.is_complete())
        {
            let node = graph.add_node(assignment);
            nodes.insert(assignment.name(), node);
        }

        for (&name, &node) in &nodes {
            let assignment: &Assignment = graph[node];
            for dependency in assignment.dependencies().keys() {
                if dependency == name {
                    continue;
                }
                if let Some(&from) = nodes.get(dependency.as_str()) {
                    graph.add_edge(from, node, ());
                }
            }
        }

        Self {
            document,
            graph,
            nodes,
        }
    }

    /// Evaluate every enabled assignment.
    pub fn evaluate_all(&self, cancel: &CancellationToken) -> Result<Evaluation, InterpolationError> {
        let members: Vec<NodeIndex> = self.graph.node_indices().collect();
        let order = self.order(&members)?;
        debug!(assignments = order.len(); "Interpolating document");

        let mut computed = HashMap::new();
        let mut evaluation = Evaluation::default();
        for node in order {
            if cancel.is_cancelled() {
                debug!("Interpolation cancelled");
                return Err(InterpolationError::Cancelled);
            }
            let assignment = self.graph[node];
            let value = self.evaluate(assignment, &computed, &mut evaluation.warnings)?;
            computed.insert(assignment.name().to_string(), value.clone());
            evaluation
                .values
                .push((assignment.name().to_string(), value));
        }
        Ok(evaluation)
    }

    /// Evaluate one assignment after everything it transitively depends on.
    ///
    /// Only the target's value and warnings are returned. Disabled or unknown
    /// names evaluate to nothing.
    pub fn evaluate_one(&self, name: &str) -> Result<Evaluation, InterpolationError> {
        let Some(&target) = self.nodes.get(name) else {
            return Ok(Evaluation::default());
        };

        let mut members = vec![target];
        let mut seen = HashSet::from([target]);
        let mut stack = vec![target];
        while let Some(node) = stack.pop() {
            for dependency in self.graph.neighbors_directed(node, Direction::Incoming) {
                if seen.insert(dependency) {
                    members.push(dependency);
                    stack.push(dependency);
                }
            }
        }

        let order = self.order(&members)?;
        let mut computed = HashMap::new();
        let mut evaluation = Evaluation::default();
        for node in order {
            let assignment = self.graph[node];
            let mut warnings = Vec::new();
            let value = self.evaluate(assignment, &computed, &mut warnings)?;
            if node == target {
                evaluation.warnings = warnings;
                evaluation
                    .values
                    .push((assignment.name().to_string(), value.clone()));
            }
            computed.insert(assignment.name().to_string(), value);
        }
        Ok(evaluation)
    }

    /// Kahn's algorithm over the subgraph induced by `members`. The ready set
    /// is a min-heap on node index, and nodes are added in document order.
    fn order(&self, members: &[NodeIndex]) -> Result<Vec<NodeIndex>, InterpolationError> {
        let member_set: HashSet<NodeIndex> = members.iter().copied().collect();
        let mut in_degree: HashMap<NodeIndex, usize> = members
            .iter()
            .map(|&node| {
                let degree = self
                    .graph
                    .neighbors_directed(node, Direction::Incoming)
                    .filter(|source| member_set.contains(source))
                    .count();
                (node, degree)
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<NodeIndex>> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(&node, _)| Reverse(node))
            .collect();

        let mut order = Vec::with_capacity(members.len());
        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if let Some(degree) = in_degree.get_mut(&next) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse(next));
                    }
                }
            }
        }

        if order.len() < members.len() {
            return Err(self.cycle_error(&member_set));
        }
        Ok(order)
    }

    fn cycle_error(&self, members: &HashSet<NodeIndex>) -> InterpolationError {
        let mut cycle = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .filter(|component| component.iter().all(|node| members.contains(node)))
            .min_by_key(|component| component.iter().min().copied())
            .unwrap_or_default();
        cycle.sort();

        let participants: Vec<String> = cycle
            .iter()
            .map(|&node| self.graph[node].name().to_string())
            .collect();
        let position = cycle
            .first()
            .map(|&node| self.graph[node].position().clone())
            .unwrap_or_else(|| Position::new(self.document.file(), 0));

        debug!(participants:? = participants; "Cyclic dependency detected");
        InterpolationError::Cycle {
            participants,
            position,
        }
    }

    fn evaluate(
        &self,
        assignment: &Assignment,
        computed: &HashMap<String, String>,
        warnings: &mut Vec<Warning>,
    ) -> Result<String, InterpolationError> {
        if !assignment.quote().is_interpolated() {
            return Ok(assignment.literal().to_string());
        }

        let template = Template::parse(assignment.literal()).map_err(|err| {
            InterpolationError::InvalidTemplate {
                name: assignment.name().to_string(),
                message: err.to_string(),
                position: assignment.position().clone(),
            }
        })?;
        let lookup =
            |name: &str| resolve(self.document, Some(assignment.name()), name, Some(computed));
        let (value, mut found) =
            expand_template(&template, assignment.name(), assignment.position(), &lookup)?;
        trace!(name = assignment.name(), value = value.as_str(); "Interpolated assignment");
        warnings.append(&mut found);
        Ok(value)
    }
}
