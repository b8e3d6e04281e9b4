use proptest::prelude::*;
use quadskip::{Point, Region, SpatialDb};
use std::collections::BTreeMap;

const WORLD: i32 = 64;

#[derive(Debug, Clone)]
enum Op {
    Insert(String, i32, i32),
    RemoveByName(String),
    RemoveAt(i32, i32),
    Region(i32, i32, i32, i32),
}

fn name_strategy() -> impl Strategy<Value = String> + Clone {
    // A small alphabet so names repeat.
    prop::sample::select(vec!["a", "b", "c", "d", "e_1", "F2"]).prop_map(str::to_string)
}

fn coord_strategy() -> impl Strategy<Value = i32> + Clone {
    // Clustered coordinates force coincident records and deep splits.
    prop_oneof![
        3 => 0..WORLD,
        1 => prop::sample::select(vec![0, 1, 31, 32, 63]),
    ]
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let name = name_strategy();
    let coord = coord_strategy();
    let op = prop_oneof![
        50 => (name.clone(), coord.clone(), coord.clone())
            .prop_map(|(n, x, y)| Op::Insert(n, x, y)),
        15 => name.prop_map(Op::RemoveByName),
        15 => (coord.clone(), coord.clone()).prop_map(|(x, y)| Op::RemoveAt(x, y)),
        20 => (-8..WORLD, -8..WORLD, 1..48, 1..48)
            .prop_map(|(x, y, w, h)| Op::Region(x, y, w, h)),
    ];
    prop::collection::vec(op, 0..=300)
}

fn sorted(mut points: Vec<Point>) -> Vec<Point> {
    points.sort_by(|a, b| (a.x, a.y, &a.name).cmp(&(b.x, b.y, &b.name)));
    points
}

fn nodes_intersecting(db: &SpatialDb, region: &Region) -> usize {
    db.dump()
        .tree
        .iter()
        .filter(|node| node.quadrant.intersects(region))
        .count()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_matches_model(ops in ops_strategy(), seed in any::<u64>()) {
        let mut db = SpatialDb::builder()
            .world_size(WORLD)
            .seed(seed)
            .build()
            .unwrap();
        let mut model: Vec<Point> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(name, x, y) => {
                    let point = Point::new(name, x, y);
                    let duplicate = model.contains(&point);
                    prop_assert_eq!(db.insert(point.clone()).is_err(), duplicate);
                    if !duplicate {
                        model.push(point);
                    }
                }
                Op::RemoveByName(name) => {
                    let expected = model
                        .iter()
                        .rposition(|p| p.name() == Some(name.as_str()))
                        .map(|i| model.remove(i));
                    prop_assert_eq!(db.remove_by_name(&name), expected);
                    prop_assert!(db.search_by_name(&name).len()
                        == model.iter().filter(|p| p.name() == Some(name.as_str())).count());
                }
                Op::RemoveAt(x, y) => {
                    let removed = db.remove_by_coords(x, y).unwrap();
                    match removed {
                        Some(point) => {
                            prop_assert_eq!(point.coords(), (x, y));
                            let i = model.iter().position(|p| *p == point);
                            prop_assert!(i.is_some(), "removed {} not in model", point);
                            if let Some(i) = i {
                                model.remove(i);
                            }
                        }
                        None => {
                            prop_assert!(!model.iter().any(|p| p.coords() == (x, y)));
                        }
                    }
                }
                Op::Region(x, y, w, h) => {
                    let region = Region::new(x, y, w, h);
                    let hits = db.region_search(&region).unwrap();
                    let found = sorted(hits.points.into_iter().cloned().collect());
                    let expected =
                        sorted(model.iter().filter(|p| region.contains(p)).cloned().collect());
                    prop_assert_eq!(found, expected);
                    prop_assert_eq!(hits.nodes_visited, nodes_intersecting(&db, &region));
                }
            }
            prop_assert_eq!(db.len(), model.len());
            prop_assert!(db.validate().is_ok());
        }

        let mut by_location: BTreeMap<(i32, i32), usize> = BTreeMap::new();
        for p in &model {
            *by_location.entry(p.coords()).or_default() += 1;
        }
        let mut expected: Vec<((i32, i32), usize)> =
            by_location.into_iter().filter(|(_, n)| *n > 1).collect();
        let mut groups: Vec<((i32, i32), usize)> =
            db.duplicates().iter().map(|g| ((g.x, g.y), g.points.len())).collect();
        expected.sort();
        groups.sort();
        prop_assert_eq!(groups, expected);
    }

    #[test]
    fn prop_inserted_records_are_found_both_ways(
        points in prop::collection::btree_set((0..1024i32, 0..1024i32), 1..200)
    ) {
        let mut db = SpatialDb::builder().seed(1).build().unwrap();
        let records: Vec<Point> = points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Point::new(format!("p{}", i), x, y))
            .collect();
        for record in &records {
            db.insert(record.clone()).unwrap();
        }

        for record in &records {
            let name = record.name().unwrap_or_default();
            prop_assert_eq!(db.search_by_name(name), vec![record]);
            prop_assert_eq!(db.find_at(record.x, record.y), Some(record));
        }

        for record in &records {
            let name = record.name().unwrap_or_default();
            let removed = db.remove_by_name(name);
            prop_assert_eq!(removed.as_ref(), Some(record));
            prop_assert!(db.search_by_name(name).is_empty());
            let around = Region::new(record.x, record.y, 1, 1);
            prop_assert!(db.region_search(&around).unwrap().points.is_empty());
        }
        prop_assert!(db.is_empty());
        prop_assert_eq!(db.dump().tree_node_count(), 1);
    }
}
