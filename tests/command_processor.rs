use quadskip::{CommandProcessor, SpatialDb};
use std::fs::File;
use std::io::{BufReader, Write};
use tempfile::NamedTempFile;

fn run_file(script: &str) -> (String, usize) {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(script.as_bytes()).unwrap();
    file.flush().unwrap();

    let db = SpatialDb::builder().seed(2021).build().unwrap();
    let mut processor = CommandProcessor::new(db, Vec::new());
    let input = BufReader::new(File::open(file.path()).unwrap());
    let executed = processor.run(input).unwrap();
    (String::from_utf8(processor.into_output()).unwrap(), executed)
}

#[test]
fn test_full_session() {
    let script = "\
insert r1 10 10
insert r2 100 100
insert r3 200 150
insert r4 300 100
insert r5 100 200

regionsearch 5 5 200 200
regionsearch 5 5 -1 200
search r3
search r10
remove 101 100
remove -101 100
remove r1
remove r1
duplicates
";
    let (output, executed) = run_file(script);
    assert_eq!(executed, 14);
    assert_eq!(
        output,
        "Point Inserted: (r1, 10, 10)
Point Inserted: (r2, 100, 100)
Point Inserted: (r3, 200, 150)
Point Inserted: (r4, 300, 100)
Point Inserted: (r5, 100, 200)
Points Intersecting Region: (5, 5, 200, 200)
Point Found: (r1, 10, 10)
Point Found: (r2, 100, 100)
Point Found: (r5, 100, 200)
Point Found: (r3, 200, 150)
7 QuadTree Nodes Visited
Rectangle Rejected: (5, 5, -1, 200)
Point Found (r3, 200, 150)
Point Not Found: r10
Point Not Found: (101, 100)
Point Rejected: (-101, 100)
Point (r1, 10, 10) Removed
Point Not Removed: r1
Duplicate Points:
"
    );
}

#[test]
fn test_dump_after_split() {
    let script = "\
INSERT a 1 20
Insert b 10 30
insert c 1 20
insert d 200 200
dump
";
    let (output, _) = run_file(script);
    let dump = output
        .split_once("SkipList Dump:\n")
        .map(|(_, rest)| rest)
        .unwrap();
    let (skip_list, tree) = dump.split_once("QuadTree Dump:\n").unwrap();

    let levels: Vec<&str> = skip_list.lines().filter(|l| l.starts_with("level: ")).collect();
    assert_eq!(levels.len(), 5);
    assert!(levels[0].ends_with("Value: null"));
    assert!(levels[1].ends_with("Value: (a, 1, 20)"));
    assert!(levels[4].ends_with("Value: (d, 200, 200)"));
    assert!(skip_list.ends_with("The SkipList's Size is: 4\n"));

    assert_eq!(
        tree,
        "Node at 0, 0, 1024: Internal
  Node at 0, 0, 512: Internal
    Node at 0, 0, 256: Internal
      Node at 0, 0, 128:
      (a, 1, 20)
      (b, 10, 30)
      (c, 1, 20)
      Node at 128, 0, 128: Empty
      Node at 0, 128, 128: Empty
      Node at 128, 128, 128:
      (d, 200, 200)
    Node at 256, 0, 256: Empty
    Node at 0, 256, 256: Empty
    Node at 256, 256, 256: Empty
  Node at 512, 0, 512: Empty
  Node at 0, 512, 512: Empty
  Node at 512, 512, 512: Empty
QuadTree Size: 13 QuadTree Nodes Printed.
"
    );
}

#[test]
fn test_duplicates_listing() {
    let script = "\
insert r1 10 10
insert r2 100 100
insert r3 100 100
insert r4 100 100
insert r5 100 100
insert r6 10 10
insert r10 100 150
duplicates
";
    let (output, _) = run_file(script);
    assert!(output.ends_with("Duplicate Points:\n(10, 10)\n(100, 100)\n"));
}

#[test]
fn test_bad_lines_do_not_stop_the_run() {
    let script = "\
insert a 1 1
teleport a 5 5
insert b two 2
search
insert b 2 2
search b
";
    let (output, executed) = run_file(script);
    assert_eq!(executed, 3);
    assert_eq!(
        output,
        "Point Inserted: (a, 1, 1)\nPoint Inserted: (b, 2, 2)\nPoint Found (b, 2, 2)\n"
    );
}
