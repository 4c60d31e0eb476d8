use std::fmt::{Display, Formatter};
use std::sync::Arc;

use anyhow::bail;
use anyk::Cost;
use itertools::Itertools;
use prettytable::{Cell, Row, Table};
use smallvec::SmallVec;

use crate::error::JoinError;
use crate::AnyKResult;

/// Values of the join attributes of a tuple.
pub type JoinKey = SmallVec<[i64; 4]>;

#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    values: SmallVec<[i64; 4]>,
    cost: Cost,
    relation: Arc<str>,
}

impl Tuple {
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// Projection on the given attribute indices. Indices are checked when a query is built.
    pub fn key(&self, attributes: &[usize]) -> JoinKey {
        attributes.iter().map(|idx| self.values[*idx]).collect()
    }
}

impl Display for Tuple {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.relation, self.values.iter().join(", "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    name: Arc<str>,
    attributes: Vec<String>,
    tuples: Vec<Tuple>,
}

impl Relation {
    pub fn new<S: AsRef<str>>(name: &str, attributes: &[S]) -> Self {
        Self {
            name: Arc::from(name),
            attributes: attributes.iter().map(|a| a.as_ref().to_string()).collect(),
            tuples: vec![],
        }
    }

    pub fn insert<C: Into<Cost>>(&mut self, values: &[i64], cost: C) -> AnyKResult<()> {
        if values.len() != self.attributes.len() {
            bail!(JoinError::ArityMismatch {
                relation: self.name.to_string(),
                expected: self.attributes.len(),
                found: values.len(),
            });
        }
        self.tuples.push(Tuple {
            values: values.iter().copied().collect(),
            cost: cost.into(),
            relation: self.name.clone(),
        });
        Ok(())
    }

    /// Builder form of [`Relation::insert`].
    pub fn with_tuple<C: Into<Cost>>(mut self, values: &[i64], cost: C) -> AnyKResult<Self> {
        self.insert(values, cost)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn tuples(&self) -> &[Tuple] {
        &self.tuples
    }

    pub fn arity(&self) -> usize {
        self.attributes.len()
    }

    pub fn attribute_index(&self, attribute: &str) -> AnyKResult<usize> {
        match self.attributes.iter().position(|a| a == attribute) {
            Some(idx) => Ok(idx),
            None => bail!(JoinError::UnknownAttribute {
                relation: self.name.to_string(),
                attribute: attribute.to_string(),
            }),
        }
    }

    pub(crate) fn check_attributes(&self, attributes: &[usize]) -> AnyKResult<()> {
        if let Some(index) = attributes.iter().find(|idx| **idx >= self.arity()) {
            bail!(JoinError::AttributeOutOfRange {
                relation: self.name.to_string(),
                index: *index,
            });
        }
        Ok(())
    }

    /// One row per tuple, attributes first and the cost last.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        let mut titles = self
            .attributes
            .iter()
            .map(|a| Cell::new(a))
            .collect::<Vec<_>>();
        titles.push(Cell::new("cost"));
        table.set_titles(Row::new(titles));
        for tuple in &self.tuples {
            let mut cells = tuple
                .values
                .iter()
                .map(|v| Cell::new(&v.to_string()))
                .collect::<Vec<_>>();
            cells.push(Cell::new(&tuple.cost.to_string()));
            table.add_row(Row::new(cells));
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_checks_arity() {
        let mut r = Relation::new("R", &["A", "B"]);
        r.insert(&[1, 2], 3.0).unwrap();
        let err = r.insert(&[1], 1.0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<JoinError>(),
            Some(&JoinError::ArityMismatch {
                relation: "R".to_string(),
                expected: 2,
                found: 1
            })
        );
        assert_eq!(r.tuples().len(), 1);
        assert_eq!(r.tuples()[0].to_string(), "R(1, 2)");
        assert_eq!(r.tuples()[0].key(&[1, 0]).as_slice(), &[2, 1]);
    }

    #[test]
    fn test_attribute_lookup() {
        let r = Relation::new("R", &["A", "B"]);
        assert_eq!(r.attribute_index("B").unwrap(), 1);
        assert!(r.attribute_index("C").is_err());
        assert!(r.check_attributes(&[0, 1]).is_ok());
        assert!(r.check_attributes(&[2]).is_err());
    }

    #[test]
    fn test_to_table() {
        let r = Relation::new("R", &["A"]).with_tuple(&[7], 2.5).unwrap();
        let table = r.to_table();
        assert_eq!(table.len(), 1);
        assert!(table.to_string().contains("2.5"));
    }
}
