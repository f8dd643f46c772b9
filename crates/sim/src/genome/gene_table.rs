//! Driver and passenger gene layouts.
//!
//! A [`GeneTable`] holds one [`RegionMap`] per genome half. It is built
//! either from uniform parameters or from a mutation-advantage table, a
//! small comma-separated text file:
//!
//! ```text
//! # comments and blank lines are ignored
//! gene,kind,size,advantage
//! TP53,driver,1200,0.12
//! OR2T4,passenger,900,0.002
//! ```

use crate::errors::ConfigError;
use crate::genome::{Gene, GenomeHalf, RegionMap};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Expected header of a mutation-advantage table.
pub const TABLE_HEADER: [&str; 4] = ["gene", "kind", "size", "advantage"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneTable {
    drivers: RegionMap,
    passengers: RegionMap,
}

impl GeneTable {
    pub fn new(drivers: RegionMap, passengers: RegionMap) -> Self {
        Self {
            drivers,
            passengers,
        }
    }

    /// Uniform genes on both halves.
    pub fn uniform(
        driver_genes: u32,
        driver_gene_size: u32,
        driver_advantage: f64,
        passenger_genes: u32,
        passenger_gene_size: u32,
        passenger_advantage: f64,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            drivers: RegionMap::uniform("driver", driver_genes, driver_gene_size, driver_advantage)?,
            passengers: RegionMap::uniform(
                "passenger",
                passenger_genes,
                passenger_gene_size,
                passenger_advantage,
            )?,
        })
    }

    #[inline]
    pub fn region(&self, half: GenomeHalf) -> &RegionMap {
        match half {
            GenomeHalf::Driver => &self.drivers,
            GenomeHalf::Passenger => &self.passengers,
        }
    }

    /// Total width of both halves.
    pub fn total_width(&self) -> usize {
        self.drivers.width() + self.passengers.width()
    }

    /// Load a mutation-advantage table from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse the text of a mutation-advantage table.
    ///
    /// # Errors
    /// - [`ConfigError::MissingHeader`] if there is no non-comment line.
    /// - [`ConfigError::InvalidHeader`] if the first line is not `gene,kind,size,advantage`.
    /// - [`ConfigError::MalformedRow`] for rows with the wrong arity, an unknown
    ///   kind, or unparsable numbers.
    /// - [`ConfigError::InvalidParameter`] if either half ends up empty.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));

        let (_, header) = lines.next().ok_or(ConfigError::MissingHeader)?;
        let columns: Vec<String> = header
            .split(',')
            .map(|c| c.trim().to_ascii_lowercase())
            .collect();
        if columns != TABLE_HEADER {
            return Err(ConfigError::InvalidHeader {
                found: header.to_string(),
            });
        }

        let mut drivers = Vec::new();
        let mut passengers = Vec::new();
        for (line, row) in lines {
            let (half, gene) = parse_row(line, row)?;
            match half {
                GenomeHalf::Driver => drivers.push(gene),
                GenomeHalf::Passenger => passengers.push(gene),
            }
        }

        if drivers.is_empty() {
            return Err(ConfigError::InvalidParameter(
                "mutation-advantage table lists no driver genes".into(),
            ));
        }
        if passengers.is_empty() {
            return Err(ConfigError::InvalidParameter(
                "mutation-advantage table lists no passenger genes".into(),
            ));
        }

        Ok(Self {
            drivers: RegionMap::new(drivers)?,
            passengers: RegionMap::new(passengers)?,
        })
    }
}

fn parse_row(line: usize, row: &str) -> Result<(GenomeHalf, Gene), ConfigError> {
    let malformed = |reason: String| ConfigError::MalformedRow { line, reason };

    let fields: Vec<&str> = row.split(',').map(str::trim).collect();
    let [name, kind, size, advantage] = fields[..] else {
        return Err(malformed(format!("expected 4 fields, found {}", fields.len())));
    };

    if name.is_empty() {
        return Err(malformed("empty gene name".into()));
    }
    let half = match kind.to_ascii_lowercase().as_str() {
        "driver" => GenomeHalf::Driver,
        "passenger" => GenomeHalf::Passenger,
        other => return Err(malformed(format!("unknown kind `{other}`"))),
    };
    let size: u32 = size
        .parse()
        .map_err(|e| malformed(format!("size `{size}`: {e}")))?;
    if size == 0 {
        return Err(malformed("size must be at least 1".into()));
    }
    let advantage: f64 = advantage
        .parse()
        .map_err(|e| malformed(format!("advantage `{advantage}`: {e}")))?;
    if !advantage.is_finite() || advantage <= -1.0 {
        return Err(malformed(format!(
            "advantage {advantage} must be finite and > -1"
        )));
    }

    Ok((half, Gene::new(name, size, advantage)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TABLE: &str = "\
# cancer genes
gene,kind,size,advantage
TP53, driver, 3, 0.2

KRAS,driver,1,0.5
OR1,passenger,4,0.01
";

    #[test]
    fn test_parse_valid_table() {
        let table = GeneTable::parse(TABLE).unwrap();
        let drivers = table.region(GenomeHalf::Driver);
        assert_eq!(drivers.width(), 4);
        assert_eq!(drivers.gene_at(3).unwrap().name, "KRAS");
        assert_eq!(table.region(GenomeHalf::Passenger).width(), 4);
        assert_eq!(table.total_width(), 8);
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            GeneTable::parse("# only comments\n\n"),
            Err(ConfigError::MissingHeader)
        ));
        assert!(matches!(GeneTable::parse(""), Err(ConfigError::MissingHeader)));
    }

    #[test]
    fn test_invalid_header() {
        let err = GeneTable::parse("name,kind,size\nTP53,driver,1,0.1\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHeader { .. }));
    }

    #[test]
    fn test_header_is_case_insensitive() {
        let text = "Gene,Kind,Size,Advantage\na,driver,1,0.1\nb,passenger,1,0.1\n";
        assert!(GeneTable::parse(text).is_ok());
    }

    #[test]
    fn test_malformed_rows_report_line() {
        let bad_arity = "gene,kind,size,advantage\nTP53,driver,1\n";
        match GeneTable::parse(bad_arity) {
            Err(ConfigError::MalformedRow { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected: {other:?}"),
        }

        let bad_kind = "gene,kind,size,advantage\nTP53,hitchhiker,1,0.1\n";
        assert!(matches!(
            GeneTable::parse(bad_kind),
            Err(ConfigError::MalformedRow { line: 2, .. })
        ));

        let bad_number = "gene,kind,size,advantage\n\nTP53,driver,x,0.1\n";
        assert!(matches!(
            GeneTable::parse(bad_number),
            Err(ConfigError::MalformedRow { line: 3, .. })
        ));

        let bad_advantage = "gene,kind,size,advantage\nTP53,driver,1,-2\n";
        assert!(matches!(
            GeneTable::parse(bad_advantage),
            Err(ConfigError::MalformedRow { .. })
        ));

        // -1 would zero the cumulative advantage for good
        let absorbing = "gene,kind,size,advantage\nA,driver,1,-1\nB,passenger,1,0.1\n";
        assert!(matches!(
            GeneTable::parse(absorbing),
            Err(ConfigError::MalformedRow { line: 2, .. })
        ));
    }

    #[test]
    fn test_requires_both_halves() {
        let text = "gene,kind,size,advantage\nTP53,driver,1,0.1\n";
        assert!(matches!(
            GeneTable::parse(text),
            Err(ConfigError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TABLE.as_bytes()).unwrap();
        let table = GeneTable::from_file(file.path()).unwrap();
        assert_eq!(table.region(GenomeHalf::Driver).genes().len(), 2);

        let missing = GeneTable::from_file("/definitely/not/here.csv");
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
