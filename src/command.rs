//! Line-oriented command files.
//!
//! Each non-blank line holds one whitespace-separated command. Keywords are
//! case-insensitive:
//!
//! ```text
//! insert <name> <x> <y>
//! remove <name>
//! remove <x> <y>
//! regionsearch <x> <y> <w> <h>
//! search <name>
//! duplicates
//! dump
//! ```
//!
//! [`CommandProcessor`] runs commands against a [`SpatialDb`] and writes one
//! report per command to its output.

use crate::compute::spatial::NodeKind;
use crate::db::SpatialDb;
use crate::error::{IndexError, Result};
use crate::types::{Point, Region};
use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Insert(Point),
    RemoveByName(String),
    RemoveByCoords { x: i32, y: i32 },
    RegionSearch(Region),
    Search(String),
    Duplicates,
    Dump,
}

impl FromStr for Command {
    type Err = IndexError;

    fn from_str(line: &str) -> Result<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((keyword, args)) = tokens.split_first() else {
            return Err(IndexError::Parse("empty line".to_string()));
        };

        let command = match (keyword.to_ascii_lowercase().as_str(), args) {
            ("insert", [name, x, y]) => {
                Command::Insert(Point::new(*name, parse_int(x)?, parse_int(y)?))
            }
            ("remove", [name]) => Command::RemoveByName((*name).to_string()),
            ("remove", [x, y]) => Command::RemoveByCoords {
                x: parse_int(x)?,
                y: parse_int(y)?,
            },
            ("regionsearch", [x, y, w, h]) => Command::RegionSearch(Region::new(
                parse_int(x)?,
                parse_int(y)?,
                parse_int(w)?,
                parse_int(h)?,
            )),
            ("search", [name]) => Command::Search((*name).to_string()),
            ("duplicates", []) => Command::Duplicates,
            ("dump", []) => Command::Dump,
            (
                "insert" | "remove" | "regionsearch" | "search" | "duplicates" | "dump",
                _,
            ) => {
                return Err(IndexError::Parse(format!(
                    "wrong number of arguments for '{}': {}",
                    keyword,
                    args.len()
                )));
            }
            _ => {
                return Err(IndexError::Parse(format!("unknown command '{}'", keyword)));
            }
        };
        Ok(command)
    }
}

fn parse_int(token: &str) -> Result<i32> {
    token
        .parse()
        .map_err(|e| IndexError::Parse(format!("'{}' is not an integer: {}", token, e)))
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Insert(p) => match p.name() {
                Some(name) => write!(f, "insert {} {} {}", name, p.x, p.y),
                None => write!(f, "insert {} {}", p.x, p.y),
            },
            Command::RemoveByName(name) => write!(f, "remove {}", name),
            Command::RemoveByCoords { x, y } => write!(f, "remove {} {}", x, y),
            Command::RegionSearch(r) => {
                write!(f, "regionsearch {} {} {} {}", r.x, r.y, r.width, r.height)
            }
            Command::Search(name) => write!(f, "search {}", name),
            Command::Duplicates => write!(f, "duplicates"),
            Command::Dump => write!(f, "dump"),
        }
    }
}

/// Runs commands against a database and reports each outcome to `out`.
///
/// # Example
///
/// ```rust
/// use quadskip::{CommandProcessor, SpatialDb};
///
/// let mut processor = CommandProcessor::new(SpatialDb::memory()?, Vec::new());
/// processor.run("insert a 1 20\nsearch a\n".as_bytes())?;
///
/// let output = String::from_utf8(processor.into_output()).unwrap();
/// assert_eq!(output, "Point Inserted: (a, 1, 20)\nPoint Found (a, 1, 20)\n");
/// # Ok::<(), quadskip::IndexError>(())
/// ```
pub struct CommandProcessor<W: Write> {
    db: SpatialDb,
    out: W,
}

impl<W: Write> CommandProcessor<W> {
    pub fn new(db: SpatialDb, out: W) -> Self {
        Self { db, out }
    }

    pub fn db(&self) -> &SpatialDb {
        &self.db
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Process every line of `input`. Malformed lines are logged and
    /// skipped. Returns the number of commands executed.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<usize> {
        let mut executed = 0;
        for (number, line) in input.lines().enumerate() {
            if self.process_line(&line?, number + 1)? {
                executed += 1;
            }
        }
        self.out.flush()?;
        Ok(executed)
    }

    /// Parse and execute one line. Returns whether a command ran.
    pub fn process_line(&mut self, line: &str, number: usize) -> Result<bool> {
        if line.trim().is_empty() {
            return Ok(false);
        }
        match line.parse::<Command>() {
            Ok(command) => {
                self.execute(&command)?;
                Ok(true)
            }
            Err(e) => {
                log::warn!("Skipping line {}: {}", number, e);
                Ok(false)
            }
        }
    }

    /// Execute a command and write its report.
    pub fn execute(&mut self, command: &Command) -> Result<()> {
        match command {
            Command::Insert(point) => self.insert(point),
            Command::RemoveByName(name) => self.remove_by_name(name),
            Command::RemoveByCoords { x, y } => self.remove_by_coords(*x, *y),
            Command::RegionSearch(region) => self.region_search(region),
            Command::Search(name) => self.search(name),
            Command::Duplicates => self.duplicates(),
            Command::Dump => self.dump(),
        }
    }

    fn insert(&mut self, point: &Point) -> Result<()> {
        match self.db.insert(point.clone()) {
            Ok(()) => writeln!(self.out, "Point Inserted: {}", point)?,
            Err(e) if e.is_rejection() => writeln!(self.out, "Point Rejected: {}", point)?,
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn remove_by_name(&mut self, name: &str) -> Result<()> {
        match self.db.remove_by_name(name) {
            Some(point) => writeln!(self.out, "Point {} Removed", point)?,
            None => writeln!(self.out, "Point Not Removed: {}", name)?,
        }
        Ok(())
    }

    fn remove_by_coords(&mut self, x: i32, y: i32) -> Result<()> {
        let probe = Point::unnamed(x, y);
        match self.db.remove_by_coords(x, y) {
            Ok(Some(point)) => writeln!(self.out, "Point {} Removed", point)?,
            Ok(None) => writeln!(self.out, "Point Not Found: {}", probe)?,
            Err(e) if e.is_rejection() => writeln!(self.out, "Point Rejected: {}", probe)?,
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn region_search(&mut self, region: &Region) -> Result<()> {
        let found = match self.db.region_search(region) {
            Ok(found) => found,
            Err(e) if e.is_rejection() => {
                writeln!(self.out, "Rectangle Rejected: ({})", region)?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        writeln!(self.out, "Points Intersecting Region: ({})", region)?;
        for point in &found.points {
            writeln!(self.out, "Point Found: {}", point)?;
        }
        writeln!(self.out, "{} QuadTree Nodes Visited", found.nodes_visited)?;
        Ok(())
    }

    fn search(&mut self, name: &str) -> Result<()> {
        let found = self.db.search_by_name(name);
        if found.is_empty() {
            writeln!(self.out, "Point Not Found: {}", name)?;
        }
        for point in found {
            writeln!(self.out, "Point Found {}", point)?;
        }
        Ok(())
    }

    fn duplicates(&mut self) -> Result<()> {
        writeln!(self.out, "Duplicate Points:")?;
        for group in self.db.duplicates() {
            writeln!(self.out, "({}, {})", group.x, group.y)?;
        }
        Ok(())
    }

    fn dump(&mut self) -> Result<()> {
        let dump = self.db.dump();

        writeln!(self.out, "SkipList Dump:")?;
        for node in &dump.skip_list.nodes {
            match node.value {
                Some(point) => writeln!(self.out, "level: {} Value: {}", node.links(), point)?,
                None => writeln!(self.out, "level: {} Value: null", node.links())?,
            }
        }
        writeln!(self.out, "The SkipList's Size is: {}", dump.skip_list.len)?;

        writeln!(self.out, "QuadTree Dump:")?;
        for node in &dump.tree {
            let indent = "  ".repeat(node.depth);
            match node.kind {
                NodeKind::Empty => writeln!(self.out, "{}Node at {}: Empty", indent, node.quadrant)?,
                NodeKind::Internal => {
                    writeln!(self.out, "{}Node at {}: Internal", indent, node.quadrant)?
                }
                NodeKind::Leaf => {
                    writeln!(self.out, "{}Node at {}:", indent, node.quadrant)?;
                    for point in node.records {
                        writeln!(self.out, "{}{}", indent, point)?;
                    }
                }
            }
        }
        writeln!(
            self.out,
            "QuadTree Size: {} QuadTree Nodes Printed.",
            dump.tree_node_count()
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn run(script: &str) -> String {
        let db = SpatialDb::memory_with_config(Config::default().with_seed(1)).unwrap();
        let mut processor = CommandProcessor::new(db, Vec::new());
        processor.run(script.as_bytes()).unwrap();
        String::from_utf8(processor.into_output()).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "insert a 1 20".parse::<Command>().unwrap(),
            Command::Insert(Point::new("a", 1, 20))
        );
        assert_eq!(
            "REMOVE  a".parse::<Command>().unwrap(),
            Command::RemoveByName("a".to_string())
        );
        assert_eq!(
            "remove 3 4".parse::<Command>().unwrap(),
            Command::RemoveByCoords { x: 3, y: 4 }
        );
        assert_eq!(
            "\tregionSearch 0 0 -5 5".parse::<Command>().unwrap(),
            Command::RegionSearch(Region::new(0, 0, -5, 5))
        );
        assert_eq!("Dump".parse::<Command>().unwrap(), Command::Dump);
        assert_eq!("duplicates".parse::<Command>().unwrap(), Command::Duplicates);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("".parse::<Command>(), Err(IndexError::Parse(_))));
        assert!("fly a 1 2".parse::<Command>().is_err());
        assert!("insert a 1".parse::<Command>().is_err());
        assert!("insert a one 2".parse::<Command>().is_err());
        assert!("dump now".parse::<Command>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for line in ["insert a 1 20", "remove a", "remove 1 2", "regionsearch 1 2 3 4", "dump"] {
            assert_eq!(line.parse::<Command>().unwrap().to_string(), line);
        }
    }

    #[test]
    fn test_insert_messages() {
        let out = run("insert a 1 20\ninsert a 1 20\ninsert b! 1 1\ninsert c 1024 5\n");
        assert_eq!(
            out,
            "Point Inserted: (a, 1, 20)\n\
             Point Rejected: (a, 1, 20)\n\
             Point Rejected: (b!, 1, 1)\n\
             Point Rejected: (c, 1024, 5)\n"
        );
    }

    #[test]
    fn test_remove_messages() {
        let out = run("insert a 1 20\nremove a\nremove a\ninsert b 5 5\nremove 5 5\nremove 6 6\nremove -1 6\n");
        assert_eq!(
            out,
            "Point Inserted: (a, 1, 20)\n\
             Point (a, 1, 20) Removed\n\
             Point Not Removed: a\n\
             Point Inserted: (b, 5, 5)\n\
             Point (b, 5, 5) Removed\n\
             Point Not Found: (6, 6)\n\
             Point Rejected: (-1, 6)\n"
        );
    }

    #[test]
    fn test_search_messages() {
        let out = run("insert a 1 1\ninsert a 2 2\nsearch a\nsearch b\n");
        assert_eq!(
            out,
            "Point Inserted: (a, 1, 1)\n\
             Point Inserted: (a, 2, 2)\n\
             Point Found (a, 2, 2)\n\
             Point Found (a, 1, 1)\n\
             Point Not Found: b\n"
        );
    }

    #[test]
    fn test_region_search_messages() {
        let out = run("insert a 1 20\nregionsearch 0 0 10 30\nregionsearch 0 0 0 30\n");
        assert_eq!(
            out,
            "Point Inserted: (a, 1, 20)\n\
             Points Intersecting Region: (0, 0, 10, 30)\n\
             Point Found: (a, 1, 20)\n\
             1 QuadTree Nodes Visited\n\
             Rectangle Rejected: (0, 0, 0, 30)\n"
        );
    }

    #[test]
    fn test_duplicates_message() {
        let out = run("insert a 1 20\ninsert c 1 20\ninsert b 4 4\nduplicates\n");
        assert!(out.ends_with("Duplicate Points:\n(1, 20)\n"));
    }

    #[test]
    fn test_dump_of_empty_database() {
        let out = run("dump\n");
        assert_eq!(
            out,
            "SkipList Dump:\n\
             level: 1 Value: null\n\
             The SkipList's Size is: 0\n\
             QuadTree Dump:\n\
             Node at 0, 0, 1024: Empty\n\
             QuadTree Size: 1 QuadTree Nodes Printed.\n"
        );
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let db = SpatialDb::memory().unwrap();
        let mut processor = CommandProcessor::new(db, Vec::new());
        let executed = processor
            .run("\nfrobnicate\ninsert a 1 2\ninsert a x 2\n   \n".as_bytes())
            .unwrap();
        assert_eq!(executed, 1);
        assert_eq!(processor.db().len(), 1);
    }
}
