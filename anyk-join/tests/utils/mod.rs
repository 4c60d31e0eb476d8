use anyhow::{bail, Context};
use anyk::{Algorithm, AnyK, Cost, DpGraph, EnumerationConfig, QueueKind, SuccessorKind};
use anyk_join::{PathEquijoinQuery, Relation, StarEquijoinQuery, TreeEquijoinQuery, Tuple};
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Debug;
use std::fs::File;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Path,
    Tree,
    Star,
}

#[derive(Serialize, Deserialize)]
pub struct TupleCase {
    pub values: Vec<i64>,
    pub cost: f64,
}

#[derive(Serialize, Deserialize)]
pub struct RelationCase {
    pub name: String,
    pub attributes: Vec<String>,
    pub tuples: Vec<TupleCase>,
}

#[derive(Serialize, Deserialize)]
pub struct JoinCase {
    /// Parent relation, only used by tree queries.
    #[serde(default)]
    pub parent: Option<usize>,
    pub left: Vec<usize>,
    pub right: Vec<usize>,
}

#[derive(Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub shape: Shape,
    pub relations: Vec<RelationCase>,
    #[serde(default)]
    pub joins: Vec<JoinCase>,
    pub expected: Vec<f64>,
}

impl TestCase {
    fn relations(&self) -> anyhow::Result<Vec<Relation>> {
        self.relations
            .iter()
            .map(|r| {
                let mut relation = Relation::new(&r.name, r.attributes.as_slice());
                for t in &r.tuples {
                    relation.insert(&t.values, t.cost)?;
                }
                Ok(relation)
            })
            .collect()
    }

    pub fn build(&self) -> anyhow::Result<DpGraph<Tuple>> {
        let mut relations = self.relations()?.into_iter();
        let Some(first) = relations.next() else {
            bail!("test case {} has no relations", self.name);
        };
        match self.shape {
            Shape::Path => {
                let mut query = PathEquijoinQuery::new(first);
                for (relation, join) in relations.zip(&self.joins) {
                    query = query.join(relation, &join.left, &join.right)?;
                }
                query.build()
            }
            Shape::Tree => {
                let mut query = TreeEquijoinQuery::new(first);
                for (relation, join) in relations.zip(&self.joins) {
                    let parent = join
                        .parent
                        .with_context(|| format!("join of {} has no parent", relation.name()))?;
                    query = query.join(parent, relation, &join.left, &join.right)?;
                }
                query.build()
            }
            Shape::Star => relations
                .fold(StarEquijoinQuery::new(first), |q, r| q.with_satellite(r))
                .build(),
        }
    }
}

/// Every algorithm with every successor order and queue it can use.
pub fn all_configs() -> Vec<EnumerationConfig> {
    let mut configs = vec![];
    for algorithm in Algorithm::iter() {
        let kinds = if algorithm.uses_successors() {
            SuccessorKind::iter().collect::<Vec<_>>()
        } else {
            vec![SuccessorKind::Lazy]
        };
        for kind in kinds {
            for queue in QueueKind::iter() {
                for lazy_init in [true, false] {
                    configs.push(
                        EnumerationConfig::new(algorithm)
                            .with_successors(kind)
                            .with_queue(queue)
                            .with_lazy_init(lazy_init)
                            .with_seed(3),
                    );
                }
            }
        }
    }
    configs
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct TestCaseRunner {
    /// Input file path.
    pub paths: Vec<PathBuf>,
    pub configs: Vec<EnumerationConfig>,
}

impl TestCaseRunner {
    pub fn run(self) {
        for path in &self.paths {
            let file = File::options()
                .read(true)
                .open(path)
                .with_context(|| format!("Failed to open test case file: {:?}", &path))
                .unwrap();

            let test_cases: Vec<TestCase> = serde_yaml::from_reader(file)
                .with_context(|| format!("Failed to load test cases from file: {:?}", &path))
                .unwrap();

            for test_case in test_cases {
                self.run_case(path, test_case);
            }
        }
    }

    fn run_case<P: AsRef<Path> + Debug>(&self, path: &P, test_case: TestCase) {
        let mut graph = test_case
            .build()
            .with_context(|| format!("Failed to build {} in {:?}", test_case.name, path))
            .unwrap();
        graph.bottom_up();
        assert_eq!(
            graph.count_solutions().unwrap(),
            test_case.expected.len() as u128,
            "Answer count of {} in {:?} is different.",
            test_case.name,
            path
        );

        let expected = test_case
            .expected
            .iter()
            .copied()
            .map(Cost::from)
            .collect::<Vec<_>>();
        for config in &self.configs {
            let mut costs = AnyK::new(&graph, config)
                .unwrap()
                .map(|s| s.cost())
                .collect::<Vec<_>>();
            if !config.algorithm.is_ranked() {
                costs.sort_by(Cost::total_cmp);
            }
            assert_eq!(
                costs.len(),
                expected.len(),
                "Answers of {} in {:?} with {:?}",
                test_case.name,
                path,
                config
            );
            for (found, wanted) in costs.iter().zip(&expected) {
                assert!(
                    found.approx_eq(*wanted),
                    "Answers of {} in {:?} with {:?}: {:?} vs {:?}",
                    test_case.name,
                    path,
                    config,
                    costs,
                    expected
                );
            }
        }
    }
}
