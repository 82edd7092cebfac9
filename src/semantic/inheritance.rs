//! Inheritance resolution: derivation graph, cycle detection and closures.
//!
//! Base-type references are treated as edges `type -> base`. Because every
//! type has at most one base, a depth-first walk along base references with a
//! "visiting" marker finds every cycle exactly once.

use crate::ir::types::TypeId;
use crate::semantic::diag::DigestError;
use smol_str::SmolStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    Visiting,
    Done,
}

/// Ancestor and descendant closures of one type category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InheritanceGraph {
    ancestors: Vec<Vec<TypeId>>,
    descendants: Vec<Vec<TypeId>>,
}

impl InheritanceGraph {
    /// Builds the closures for types `0..bases.len()`.
    ///
    /// `names[i]` is the qualified name of type `i`, used to report cycles.
    /// Fails with one [`DigestError::CyclicInheritance`] per distinct cycle.
    pub fn build(names: &[SmolStr], bases: &[Option<TypeId>]) -> Result<Self, Vec<DigestError>> {
        let errors = detect_cycles(names, bases);
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut ancestors = Vec::with_capacity(bases.len());
        for base in bases {
            let mut chain = Vec::new();
            let mut current = *base;
            while let Some(base) = current {
                chain.push(base);
                current = bases[base.as_usize()];
            }
            ancestors.push(chain);
        }

        let mut descendants = vec![Vec::new(); bases.len()];
        for (index, chain) in ancestors.iter().enumerate() {
            for ancestor in chain {
                descendants[ancestor.as_usize()].push(TypeId::new(index));
            }
        }

        Ok(Self {
            ancestors,
            descendants,
        })
    }

    /// Returns the number of types in the graph.
    pub fn len(&self) -> usize {
        self.ancestors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ancestors.is_empty()
    }

    /// Ancestor chain of a type, nearest first.
    pub fn ancestors(&self, id: TypeId) -> &[TypeId] {
        &self.ancestors[id.as_usize()]
    }

    /// Transitive descendants of a type, in declaration order.
    pub fn descendants(&self, id: TypeId) -> &[TypeId] {
        &self.descendants[id.as_usize()]
    }

    /// Returns true if `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: TypeId, id: TypeId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// Returns true if the two types are equal or one derives from the other.
    pub fn is_related(&self, a: TypeId, b: TypeId) -> bool {
        a == b || self.is_ancestor(a, b) || self.is_ancestor(b, a)
    }

    /// Returns the type itself followed by its ancestors, nearest first.
    pub fn self_and_ancestors(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        std::iter::once(id).chain(self.ancestors(id).iter().copied())
    }
}

fn detect_cycles(names: &[SmolStr], bases: &[Option<TypeId>]) -> Vec<DigestError> {
    let mut state = vec![VisitState::Unvisited; bases.len()];
    let mut errors = Vec::new();

    for start in 0..bases.len() {
        if state[start] != VisitState::Unvisited {
            continue;
        }

        let mut path: Vec<usize> = Vec::new();
        let mut current = Some(start);
        while let Some(index) = current {
            match state[index] {
                VisitState::Done => break,
                VisitState::Visiting => {
                    // Walk entered a node of its own path: the suffix from that node is a cycle.
                    if let Some(position) = path.iter().position(|member| *member == index) {
                        let mut members: Vec<SmolStr> = path[position..]
                            .iter()
                            .map(|member| names[*member].clone())
                            .collect();
                        members.push(names[index].clone());
                        errors.push(DigestError::CyclicInheritance { members });
                    }
                    break;
                }
                VisitState::Unvisited => {
                    state[index] = VisitState::Visiting;
                    path.push(index);
                    current = bases[index].map(TypeId::as_usize);
                }
            }
        }

        for index in path {
            state[index] = VisitState::Done;
        }
    }

    errors
}

/// Closures for both structured type categories.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedInheritance {
    pub entities: InheritanceGraph,
    pub complexes: InheritanceGraph,
}

/// Builds the entity and complex graphs, collecting cycles from both.
pub(crate) fn run_inheritance_resolution(
    entity_names: &[SmolStr],
    entity_bases: &[Option<TypeId>],
    complex_names: &[SmolStr],
    complex_bases: &[Option<TypeId>],
    errors: &mut Vec<DigestError>,
) -> Option<ResolvedInheritance> {
    let entities = InheritanceGraph::build(entity_names, entity_bases);
    let complexes = InheritanceGraph::build(complex_names, complex_bases);

    debug!(
        entity_types = entity_bases.len(),
        complex_types = complex_bases.len(),
        "inheritance resolution finished"
    );

    match (entities, complexes) {
        (Ok(entities), Ok(complexes)) => Some(ResolvedInheritance {
            entities,
            complexes,
        }),
        (entities, complexes) => {
            errors.extend(entities.err().unwrap_or_default());
            errors.extend(complexes.err().unwrap_or_default());
            None
        }
    }
}
