//! Stepwise normalization of a schema to 1NF, 2NF, 3NF and BCNF.

pub mod bcnf;
pub mod closure;
pub mod cover;
pub mod keys;
pub mod second;
pub mod third;

use crate::ast::{FunctionalDependency, Relation, dedup};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::{debug, info};

/// Why a relation appears in a normal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    AtomicValues,
    PartialDependenciesRemoved,
    SingleRelation,
    Synthesis3nf,
    BcnfDecomposition,
}

impl Reason {
    pub fn label(self) -> &'static str {
        match self {
            Reason::AtomicValues => "Atomic values assumed",
            Reason::PartialDependenciesRemoved => "Removed partial dependencies",
            Reason::SingleRelation => "Single relation",
            Reason::Synthesis3nf => "3NF synthesis",
            Reason::BcnfDecomposition => "BCNF decomposition",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedRelation {
    pub name: String,
    pub attributes: Vec<String>,
    pub reason: Reason,
}

impl NormalizedRelation {
    fn from_relation(relation: Relation, reason: Reason) -> Self {
        Self {
            name: relation.name,
            attributes: relation.attributes,
            reason,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalForms {
    #[serde(rename = "1NF")]
    pub first: Vec<NormalizedRelation>,
    #[serde(rename = "2NF")]
    pub second: Vec<NormalizedRelation>,
    #[serde(rename = "3NF")]
    pub third: Vec<NormalizedRelation>,
    #[serde(rename = "BCNF")]
    pub bcnf: Vec<NormalizedRelation>,
}

impl NormalForms {
    /// Steps in display order, paired with their labels.
    pub fn steps(&self) -> [(&'static str, &[NormalizedRelation]); 4] {
        [
            ("1NF", &self.first),
            ("2NF", &self.second),
            ("3NF", &self.third),
            ("BCNF", &self.bcnf),
        ]
    }
}

/// Attribute set the engine works over.
///
/// A single relation contributes its attributes, several contribute their
/// union in first-appearance order. Without relations the FD attributes are
/// used instead.
pub fn universe(relations: &[Relation], fds: &[FunctionalDependency]) -> Vec<String> {
    match relations {
        [single] => single.attributes.clone(),
        [] => dedup(fds.iter().flat_map(|fd| fd.attributes().cloned()).collect()),
        many => dedup(many.iter().flat_map(|r| r.attributes.iter().cloned()).collect()),
    }
}

pub fn normalize_steps(relations: &[Relation], fds: &[FunctionalDependency]) -> NormalForms {
    let attrs = universe(relations, fds);
    let fds: Vec<FunctionalDependency> = if attrs.is_empty() {
        fds.to_vec()
    } else {
        fds.iter().filter(|fd| fd.within(&attrs)).cloned().collect()
    };
    debug!(attributes = attrs.len(), fds = fds.len(), "normalizing");

    let first = relations
        .iter()
        .cloned()
        .map(|r| NormalizedRelation::from_relation(r, Reason::AtomicValues))
        .collect();

    let second = if relations.is_empty() {
        if attrs.is_empty() {
            Vec::new()
        } else {
            let r = Relation::new(crate::parser::UNIVERSAL_RELATION, attrs.clone());
            vec![NormalizedRelation::from_relation(r, Reason::SingleRelation)]
        }
    } else {
        relations
            .iter()
            .flat_map(|r| second::decompose_2nf(r, &fds))
            .map(|r| NormalizedRelation::from_relation(r, Reason::PartialDependenciesRemoved))
            .collect()
    };

    let third: Vec<NormalizedRelation> = third::synthesize_3nf(&attrs, &fds)
        .into_iter()
        .map(|r| NormalizedRelation::from_relation(r, Reason::Synthesis3nf))
        .collect();

    let bcnf: Vec<NormalizedRelation> = bcnf::decompose_bcnf(&attrs, &fds)
        .into_iter()
        .map(|r| NormalizedRelation::from_relation(r, Reason::BcnfDecomposition))
        .collect();

    info!(third = third.len(), bcnf = bcnf.len(), "normalized");
    NormalForms {
        first,
        second,
        third,
        bcnf,
    }
}
