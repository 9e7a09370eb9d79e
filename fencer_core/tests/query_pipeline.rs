//! End-to-end pipeline scenarios over a small fixed set of countries,
//! mirroring the population/region aggregation examples the pipeline design
//! is built around.

use fencer_core::{Condition, FencerResult, Mapper, Match, Point, QueryBuilder, Reducer};
use fencer_core::Result as PipelineResult;
use pretty_assertions::assert_eq;
use rtree::Rect;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CountryId(i64);

impl std::fmt::Display for CountryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Country {
    id: CountryId,
    name: &'static str,
    population: i64,
    change: f64,
    region: &'static str,
    bounds: Rect,
}

impl fencer_core::Feature for Country {
    type Key = CountryId;

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn contains(&self, point: Point) -> FencerResult<bool> {
        Ok(point.min_dist(&self.bounds) == 0.0)
    }

    fn key(&self) -> CountryId {
        self.id.clone()
    }
}

fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Rect {
    Rect::new(Point::new(min_x, min_y), max_x - min_x, max_y - min_y).unwrap()
}

fn countries() -> Vec<Arc<Country>> {
    vec![
        Country {
            id: CountryId(1),
            name: "Vatican City",
            population: 800,
            change: -0.011,
            region: "Europe",
            bounds: rect(12.44450569152832, 41.89978557507729, 12.459547519683836, 41.907946360630994),
        },
        Country {
            id: CountryId(2),
            name: "Tokelau",
            population: 1300,
            change: 0.014,
            region: "Polynesia",
            bounds: rect(-172.7874755859375, -9.66573839518868, -170.947265625, -8.303905908124174),
        },
        Country {
            id: CountryId(3),
            name: "Niue",
            population: 1600,
            change: -0.004,
            region: "Polynesia",
            bounds: rect(-170.13702392578125, -19.265776189877485, -169.5849609375, -18.818567424622376),
        },
        Country {
            id: CountryId(4),
            name: "Tuvalu",
            population: 11200,
            change: 0.009,
            region: "Oceania",
            bounds: rect(174.74853515625, -11.059820828563412, 180.296630859375, -5.397273407690904),
        },
        Country {
            id: CountryId(5),
            name: "Nauru",
            population: 11300,
            change: 0.001,
            region: "Oceania",
            bounds: rect(166.79443359375, -0.6227752122036241, 167.07595825195312, -0.4051174740026618),
        },
        Country {
            id: CountryId(6),
            name: "Poland",
            population: 38224,
            change: -0.001,
            region: "Europe",
            bounds: rect(14.04052734375, 48.922499263758255, 24.27978515625, 54.99022172004893),
        },
        Country {
            id: CountryId(7),
            name: "Ukraine",
            population: 44400,
            change: 0.0,
            region: "Europe",
            bounds: rect(21.665039062499996, 44.02442151965934, 40.341796875, 52.482780222078226),
        },
    ]
    .into_iter()
    .map(Arc::new)
    .collect()
}

fn sorted_names(features: &[Arc<Country>]) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = features.iter().map(|c| c.name).collect();
    names.sort_unstable();
    names
}

struct PopulationGreaterThan {
    threshold: i64,
}

impl Condition<Country> for PopulationGreaterThan {
    fn is_match(&self, feature: &Country) -> FencerResult<bool> {
        Ok(feature.population > self.threshold)
    }
}

struct NameStartsWith {
    prefix: &'static str,
}

impl Condition<Country> for NameStartsWith {
    fn is_match(&self, feature: &Country) -> FencerResult<bool> {
        Ok(feature.name.starts_with(self.prefix))
    }
}

/// Replaces a match's result keys with its country's region.
struct GroupByRegion;

impl Mapper<Country> for GroupByRegion {
    fn map(&self, mut m: Match<Country>) -> FencerResult<Match<Country>> {
        m.replace_keys(fencer_core::ResultKey::new(m.feature.region.to_string()));
        Ok(m)
    }
}

/// Keeps the larger-population feature per result key.
struct MostPopulated;

impl Reducer<Country> for MostPopulated {
    fn reduce(&self, result: &mut PipelineResult<Country>, m: &Match<Country>) -> FencerResult<()> {
        for key in &m.result_keys {
            result.update(key.clone(), |entry| {
                let replace = match entry.features.first() {
                    None => true,
                    Some(existing) => existing.population < m.feature.population,
                };
                if replace {
                    entry.features = vec![m.feature.clone()];
                }
            });
        }
        Ok(())
    }
}

/// Adds an extra "declining" result key for countries with negative change.
struct DecliningPopulation;

impl Mapper<Country> for DecliningPopulation {
    fn map(&self, mut m: Match<Country>) -> FencerResult<Match<Country>> {
        if m.feature.change < 0.0 {
            m.add_key(fencer_core::ResultKey::new("declining".to_string()));
        }
        Ok(m)
    }
}

#[test]
fn population_filter() {
    let mut builder = QueryBuilder::new();
    builder.r#where(PopulationGreaterThan { threshold: 10000 });
    let mut query = builder.build();
    for country in countries() {
        query.scan(country).unwrap();
    }
    let distinct = query.distinct();
    assert_eq!(distinct.len(), 4);
    assert_eq!(sorted_names(&distinct), vec!["Nauru", "Poland", "Tuvalu", "Ukraine"]);
}

#[test]
fn conjunction() {
    let mut builder = QueryBuilder::new();
    builder
        .r#where(PopulationGreaterThan { threshold: 10000 })
        .r#where(NameStartsWith { prefix: "T" });
    let mut query = builder.build();
    for country in countries() {
        query.scan(country).unwrap();
    }
    let distinct = query.distinct();
    assert_eq!(distinct.len(), 1);
    assert_eq!(distinct[0].name, "Tuvalu");
}

#[test]
fn most_populated_by_region() {
    let mut builder = QueryBuilder::new();
    builder.stream_to(MostPopulated).map(GroupByRegion);
    let mut query = builder.build();
    for country in countries() {
        query.scan(country).unwrap();
    }
    let distinct = query.distinct();
    assert_eq!(distinct.len(), 3);
    assert_eq!(sorted_names(&distinct), vec!["Nauru", "Niue", "Ukraine"]);
}

#[test]
fn complex_aggregation() {
    let mut builder = QueryBuilder::new();
    builder
        .stream_to(MostPopulated)
        .map(GroupByRegion)
        .map(DecliningPopulation);
    let mut query = builder.build();
    for country in countries() {
        query.scan(country).unwrap();
    }
    let distinct = query.distinct();
    assert_eq!(distinct.len(), 4);
    assert_eq!(
        sorted_names(&distinct),
        vec!["Nauru", "Niue", "Poland", "Ukraine"]
    );
}
